//! The interactive draw test: a touch-tracking cursor drawn in real time.
//!
//! # State machine
//!
//! ```text
//!            Press                Moving
//!   Idle ───────────▶ Pressed ───────────▶ Moving ──┐ Moving (new point)
//!    ▲                  │                    ▲  └────┘
//!    │                  │ Release            │
//!    │ Idle             ▼                    │ Press
//!    └────────────── Released ───────────────┘
//! ```
//!
//! - Entering `Pressed`/`Moving` at a new point draws a filled marker there.
//! - Entering `Released` clears the screen.
//! - The cursor is set to the event's point after every event.
//!
//! The loop checks its [`CancelToken`] once per iteration, polls one event,
//! handles it, and sleeps for the poll interval.  Any device failure ends the
//! loop with that failure; the session stays open for the caller to close.

use std::time::Duration;

use tracing::{debug, info, trace, warn};
use ulcd_core::{Colour, Point, TouchEvent, TouchStatus};

use crate::application::cancel::CancelToken;
use crate::application::display::{DeviceError, DisplayDriver};
use crate::application::error::{CommandOutput, CommandResult};
use crate::application::session::Session;

/// Tunables for the draw test.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractiveConfig {
    /// Pause between two touch polls.
    pub poll_interval: Duration,
    /// Radius of the cursor marker in pixels.
    pub marker_radius: u16,
    pub marker_colour: Colour,
    /// Colour used to erase the previous marker.
    pub background: Colour,
    /// Erase the previous marker before drawing the next one.
    pub erase_previous: bool,
}

impl Default for InteractiveConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(20),
            marker_radius: 30,
            marker_colour: Colour::WHITE,
            background: Colour::BLACK,
            erase_previous: false,
        }
    }
}

/// Cursor state, mirroring the status of the last handled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchState {
    Idle,
    Pressed,
    Moving,
    Released,
}

impl TouchState {
    fn is_touching(self) -> bool {
        matches!(self, TouchState::Pressed | TouchState::Moving)
    }
}

impl From<TouchStatus> for TouchState {
    fn from(status: TouchStatus) -> Self {
        match status {
            TouchStatus::Idle => TouchState::Idle,
            TouchStatus::Press => TouchState::Pressed,
            TouchStatus::Moving => TouchState::Moving,
            TouchStatus::Release => TouchState::Released,
        }
    }
}

/// The modal draw loop and its cursor.
pub struct InteractiveSession {
    config: InteractiveConfig,
    state: TouchState,
    cursor: Option<Point>,
}

impl InteractiveSession {
    pub fn new(config: InteractiveConfig) -> Self {
        Self {
            config,
            state: TouchState::Idle,
            cursor: None,
        }
    }

    pub fn state(&self) -> TouchState {
        self.state
    }

    /// Last handled point, or `None` before the first event.
    pub fn cursor(&self) -> Option<Point> {
        self.cursor
    }

    /// Runs until `cancel` is set or a device call fails.
    ///
    /// Powers the display on and enables the touch controller first.
    ///
    /// # Errors
    ///
    /// Returns the first transport or protocol failure, or a transport error
    /// if `session` is not open.
    pub async fn run(&mut self, session: &mut Session, cancel: &CancelToken) -> CommandResult {
        let driver = session.driver_mut()?;
        driver.set_display_power(true)?;
        driver.init_touch()?;
        info!("draw test running; interrupt to stop");

        let mut polls: u64 = 0;
        while !cancel.is_cancelled() {
            if let Err(e) = self.poll_once(driver) {
                warn!(polls, "draw test stopped by device failure: {e}");
                return Err(e.into());
            }
            polls += 1;
            tokio::time::sleep(self.config.poll_interval).await;
        }

        info!(polls, "draw test cancelled");
        Ok(CommandOutput::Done)
    }

    fn poll_once(&mut self, driver: &mut dyn DisplayDriver) -> Result<(), DeviceError> {
        let event = driver.poll_touch()?;
        trace!(status = ?event.status, x = event.point.x, y = event.point.y, "touch event");
        self.handle_event(driver, event)
    }

    /// Applies one event to the state machine, issuing draw calls as needed.
    ///
    /// # Errors
    ///
    /// Returns the failure of the draw or clear call.
    pub fn handle_event(
        &mut self,
        driver: &mut dyn DisplayDriver,
        event: TouchEvent,
    ) -> Result<(), DeviceError> {
        let next = TouchState::from(event.status);
        let was_touching = self.state.is_touching();

        match next {
            TouchState::Pressed | TouchState::Moving => {
                if !was_touching || self.cursor != Some(event.point) {
                    if let (true, true, Some(previous)) =
                        (self.config.erase_previous, was_touching, self.cursor)
                    {
                        driver.draw_filled_circle(
                            previous,
                            self.config.marker_radius,
                            self.config.background,
                        )?;
                    }
                    driver.draw_filled_circle(
                        event.point,
                        self.config.marker_radius,
                        self.config.marker_colour,
                    )?;
                    debug!(point = %event.point, "marker drawn");
                }
            }
            TouchState::Released => {
                if self.state != TouchState::Released {
                    driver.clear_screen()?;
                    debug!("touch released, screen cleared");
                }
            }
            TouchState::Idle => {}
        }

        self.state = next;
        self.cursor = Some(event.point);
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
