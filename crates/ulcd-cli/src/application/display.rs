//! The seam between the command layer and whatever drives the display.
//!
//! The application layer only ever talks to a [`DisplayDriver`] trait object.
//! The production implementation (`SpeDriver` over a serial port) lives in the
//! infrastructure layer; tests use `MockDisplay` or a `mockall` automock.

use thiserror::Error;
use ulcd_core::{BaudRate, Colour, Point, TouchEvent, VersionInfo};

/// Failure reported by a display driver.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceError {
    /// The serial line could not be opened, or an I/O operation on it failed.
    #[error("{0}")]
    Transport(String),

    /// The module answered but signalled a failure.
    ///
    /// `message` is shown to the user unchanged; `code` is the reply byte or
    /// firmware code when one is available.
    #[error("{message}")]
    Protocol { code: Option<i32>, message: String },
}

impl DeviceError {
    pub fn transport(message: impl Into<String>) -> Self {
        DeviceError::Transport(message.into())
    }

    pub fn protocol(code: Option<i32>, message: impl Into<String>) -> Self {
        DeviceError::Protocol {
            code,
            message: message.into(),
        }
    }
}

/// Operations the display module offers to the command layer.
///
/// Each method is one library call: it either completes or reports one
/// [`DeviceError`].  Implementations are not assumed to be reentrant; callers
/// never issue two calls concurrently.
#[cfg_attr(test, mockall::automock)]
pub trait DisplayDriver: Send {
    /// Baud rate the link is actually running at.
    fn baud_rate(&self) -> Result<u32, DeviceError>;

    /// Switches the module and the host port to `rate`; returns the rate the
    /// link reports afterwards.
    fn set_baud_rate(&mut self, rate: BaudRate) -> Result<u32, DeviceError>;

    /// Hardware-resets the module.
    fn reset(&mut self) -> Result<(), DeviceError>;

    /// Clears the screen to the background colour.
    fn clear_screen(&mut self) -> Result<(), DeviceError>;

    /// Turns the display on or off.
    fn set_display_power(&mut self, on: bool) -> Result<(), DeviceError>;

    /// Sets the contrast level, 0 to 15.
    fn set_contrast(&mut self, level: u8) -> Result<(), DeviceError>;

    /// Restores text colours and moves the text cursor home.
    fn reset_text(&mut self) -> Result<(), DeviceError>;

    /// Prints `text` at the text cursor, exactly as given.
    fn write_text(&mut self, text: &str) -> Result<(), DeviceError>;

    /// Queries model name and firmware versions.
    fn query_version(&mut self) -> Result<VersionInfo, DeviceError>;

    /// Enables and resets the touch controller.
    fn init_touch(&mut self) -> Result<(), DeviceError>;

    /// Draws a filled circle.
    fn draw_filled_circle(
        &mut self,
        centre: Point,
        radius: u16,
        colour: Colour,
    ) -> Result<(), DeviceError>;

    /// Polls one touch sample.
    fn poll_touch(&mut self) -> Result<TouchEvent, DeviceError>;

    /// Releases the connection.
    fn close(&mut self) -> Result<(), DeviceError>;
}

/// Opens display drivers.
pub trait DisplayConnector: Send + Sync {
    /// Connects to the module at `path` running at `baud`.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Transport`] when the path cannot be opened.
    fn connect(&self, path: &str, baud: BaudRate) -> Result<Box<dyn DisplayDriver>, DeviceError>;
}
