//! Connection lifecycle for one display module.
//!
//! A [`Session`] starts `Closed`, becomes `Open` once a driver has been
//! acquired, and goes back to `Closed` exactly once: either through an
//! explicit [`Session::close`] or, on every other exit path, through `Drop`.
//! Closing twice is harmless; the driver is taken out of the session the
//! first time so it can only be released once.

use tracing::{debug, info, warn};
use ulcd_core::BaudRate;

use crate::application::display::{DisplayConnector, DisplayDriver};
use crate::application::error::CommandError;

/// Whether the session currently holds a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Open,
}

/// The serial connection to the module and its negotiated parameters.
pub struct Session {
    device_path: String,
    requested_baud: BaudRate,
    negotiated_baud: Option<u32>,
    driver: Option<Box<dyn DisplayDriver>>,
    last_error: Option<CommandError>,
}

impl Session {
    /// Creates a closed session requesting the module's power-on baud rate.
    pub fn new() -> Self {
        Self {
            device_path: String::new(),
            requested_baud: BaudRate::DEFAULT,
            negotiated_baud: None,
            driver: None,
            last_error: None,
        }
    }

    /// Opens the connection to `path` at `baud`.
    ///
    /// # Errors
    ///
    /// - Validation: unsupported `baud`, empty `path`, or already open.
    /// - Transport: the connector could not reach the device.
    pub fn open(
        &mut self,
        connector: &dyn DisplayConnector,
        path: &str,
        baud: u32,
    ) -> Result<(), CommandError> {
        if let Some(open_path) = self.is_open().then(|| self.device_path.clone()) {
            return Err(CommandError::validation(format!(
                "session is already open on {open_path}"
            )));
        }
        if path.trim().is_empty() {
            return Err(CommandError::validation("no serial device given"));
        }
        self.set_baud(baud)?;

        let driver = connector
            .connect(path, self.requested_baud)
            .map_err(|e| CommandError::transport(format!("could not open serial device {path}: {e}")))?;
        self.device_path = path.to_string();
        let driver = self.driver.insert(driver);

        // From here on the session is open; a failure below still leaves the
        // driver to be released by close().
        let negotiated = driver.baud_rate()?;
        self.negotiated_baud = Some(negotiated);

        if negotiated != self.requested_baud.bits_per_second() {
            warn!(
                requested = %self.requested_baud,
                negotiated,
                "device link runs at a different baud rate than requested"
            );
        }
        info!(device = path, baud = negotiated, "serial session opened");
        Ok(())
    }

    /// Releases the connection.  Safe to call any number of times.
    pub fn close(&mut self) {
        let Some(mut driver) = self.driver.take() else {
            return;
        };
        if let Err(e) = driver.close() {
            warn!(device = %self.device_path, "error while closing display: {e}");
        }
        debug!(device = %self.device_path, "serial session closed");
    }

    /// Validates and applies a baud rate.
    ///
    /// While closed the rate is recorded for the next [`open`](Self::open).
    /// While open the module is switched immediately and the rate the link
    /// reports afterwards is recorded and returned.
    ///
    /// # Errors
    ///
    /// Returns a validation error, without touching the device, when `rate`
    /// is not in the supported set.
    pub fn set_baud(&mut self, rate: u32) -> Result<u32, CommandError> {
        let baud = BaudRate::try_from(rate).map_err(|e| CommandError::validation(e.to_string()))?;

        match self.driver.as_mut() {
            None => {
                self.requested_baud = baud;
                Ok(rate)
            }
            Some(driver) => {
                let actual = driver.set_baud_rate(baud)?;
                self.requested_baud = baud;
                self.negotiated_baud = Some(actual);
                info!(requested = rate, negotiated = actual, "baud rate changed");
                Ok(actual)
            }
        }
    }

    /// Borrows the driver of an open session.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the session is closed.
    pub fn driver_mut(&mut self) -> Result<&mut dyn DisplayDriver, CommandError> {
        match self.driver {
            Some(ref mut driver) => Ok(driver.as_mut()),
            None => Err(CommandError::transport("serial session is not open")),
        }
    }

    pub fn state(&self) -> ConnectionState {
        if self.driver.is_some() {
            ConnectionState::Open
        } else {
            ConnectionState::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    pub fn requested_baud(&self) -> BaudRate {
        self.requested_baud
    }

    pub fn negotiated_baud(&self) -> Option<u32> {
        self.negotiated_baud
    }

    /// Remembers the most recent failure.
    pub fn record_error(&mut self, err: CommandError) {
        self.last_error = Some(err);
    }

    pub fn last_error(&self) -> Option<&CommandError> {
        self.last_error.as_ref()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
