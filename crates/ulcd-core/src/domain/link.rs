//! Serial link parameters.
//!
//! # Why an enum for baud rates? (for beginners)
//!
//! The module only understands a fixed list of line speeds, and it selects
//! them by *index* rather than by value (index 6 means 9600 baud).  Modelling
//! the list as an enum means an unsupported rate can never reach the wire: the
//! only way to get a [`BaudRate`] is through [`BaudRate::try_from`], which
//! rejects everything outside the list.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A baud rate outside the supported set was requested.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("unsupported baud rate {0}; supported rates are 110, 300, 600, 1200, 2400, 4800, 9600, 19200, 38400, 57600, 115200, 500000")]
pub struct UnsupportedBaudRate(pub u32);

/// Line speeds supported by both the host tool and the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum BaudRate {
    B110,
    B300,
    B600,
    B1200,
    B2400,
    B4800,
    B9600,
    B19200,
    B38400,
    B57600,
    B115200,
    B500000,
}

impl BaudRate {
    /// Every supported rate, slowest first.
    pub const ALL: [BaudRate; 12] = [
        BaudRate::B110,
        BaudRate::B300,
        BaudRate::B600,
        BaudRate::B1200,
        BaudRate::B2400,
        BaudRate::B4800,
        BaudRate::B9600,
        BaudRate::B19200,
        BaudRate::B38400,
        BaudRate::B57600,
        BaudRate::B115200,
        BaudRate::B500000,
    ];

    /// Rate the module uses after power-on.
    pub const DEFAULT: BaudRate = BaudRate::B9600;

    /// The rate in bits per second.
    pub const fn bits_per_second(self) -> u32 {
        match self {
            BaudRate::B110 => 110,
            BaudRate::B300 => 300,
            BaudRate::B600 => 600,
            BaudRate::B1200 => 1200,
            BaudRate::B2400 => 2400,
            BaudRate::B4800 => 4800,
            BaudRate::B9600 => 9600,
            BaudRate::B19200 => 19200,
            BaudRate::B38400 => 38400,
            BaudRate::B57600 => 57600,
            BaudRate::B115200 => 115200,
            BaudRate::B500000 => 500000,
        }
    }

    /// Index sent with the `setbaudWait` command.
    ///
    /// The module's table has entries the host tool does not offer (14400,
    /// 31250, ...), so the indices are not contiguous.
    pub const fn spe_index(self) -> u16 {
        match self {
            BaudRate::B110 => 0,
            BaudRate::B300 => 1,
            BaudRate::B600 => 2,
            BaudRate::B1200 => 3,
            BaudRate::B2400 => 4,
            BaudRate::B4800 => 5,
            BaudRate::B9600 => 6,
            BaudRate::B19200 => 8,
            BaudRate::B38400 => 10,
            BaudRate::B57600 => 12,
            BaudRate::B115200 => 13,
            BaudRate::B500000 => 18,
        }
    }
}

impl Default for BaudRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for BaudRate {
    type Error = UnsupportedBaudRate;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        BaudRate::ALL
            .into_iter()
            .find(|rate| rate.bits_per_second() == value)
            .ok_or(UnsupportedBaudRate(value))
    }
}

impl From<BaudRate> for u32 {
    fn from(rate: BaudRate) -> Self {
        rate.bits_per_second()
    }
}

impl std::fmt::Display for BaudRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.bits_per_second())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
