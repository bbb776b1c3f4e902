//! Touch input types.
//!
//! The module's touch controller is polled, not interrupt driven: each poll
//! yields a status word plus the X and Y coordinates of the last contact.

use serde::{Deserialize, Serialize};

/// A position on the display in pixels, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Status word returned by the touch controller.
///
/// The discriminants are the values the module reports on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum TouchStatus {
    /// No touch activity since the last poll.
    Idle = 0,
    /// A finger or stylus made contact.
    Press = 1,
    /// Contact was lifted.
    Release = 2,
    /// Contact is held and has moved.
    Moving = 3,
}

impl TryFrom<u16> for TouchStatus {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TouchStatus::Idle),
            1 => Ok(TouchStatus::Press),
            2 => Ok(TouchStatus::Release),
            3 => Ok(TouchStatus::Moving),
            other => Err(other),
        }
    }
}

/// One polled touch sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub status: TouchStatus,
    pub point: Point,
}

impl TouchEvent {
    pub const fn new(status: TouchStatus, x: i32, y: i32) -> Self {
        Self {
            status,
            point: Point::new(x, y),
        }
    }

    /// An idle sample at the origin.
    pub const fn idle() -> Self {
        Self::new(TouchStatus::Idle, 0, 0)
    }

    /// `true` while contact is held (pressed or moving).
    pub fn is_touching(&self) -> bool {
        matches!(self.status, TouchStatus::Press | TouchStatus::Moving)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
