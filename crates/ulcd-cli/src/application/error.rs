//! The unified result every command path returns.
//!
//! Failures come from three places: argument validation, the serial
//! transport, and the module itself.  They are all folded into one
//! [`CommandError`] so the top level has a single thing to print and a single
//! exit status to compute.

use thiserror::Error;
use ulcd_core::VersionInfo;

use crate::application::display::DeviceError;

/// Failure categories shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed, missing, or out-of-range arguments.  Never reaches the device.
    Validation,
    /// The serial line could not be opened or an I/O operation failed.
    Transport,
    /// The module answered with a failure.
    Protocol,
    /// The command name is not recognised.
    UnknownCommand,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation error",
            ErrorKind::Transport => "transport error",
            ErrorKind::Protocol => "protocol error",
            ErrorKind::UnknownCommand => "unknown command",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully populated command failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct CommandError {
    pub kind: ErrorKind,
    pub message: String,
    /// Code reported by the device, when there is one.
    pub device_code: Option<i32>,
}

impl CommandError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: message.into(),
            device_code: None,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Transport,
            message: message.into(),
            device_code: None,
        }
    }

    pub fn unknown_command(name: &str) -> Self {
        Self {
            kind: ErrorKind::UnknownCommand,
            message: format!("unknown command '{name}'"),
            device_code: None,
        }
    }
}

impl From<DeviceError> for CommandError {
    fn from(err: DeviceError) -> Self {
        match err {
            DeviceError::Transport(message) => Self {
                kind: ErrorKind::Transport,
                message,
                device_code: None,
            },
            DeviceError::Protocol { code, message } => Self {
                kind: ErrorKind::Protocol,
                message,
                device_code: code,
            },
        }
    }
}

/// What a successful command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// The command had a side effect and nothing to print.
    Done,
    /// Result of `version`.
    Version(VersionInfo),
}

/// The single value every dispatch path returns.
pub type CommandResult = Result<CommandOutput, CommandError>;

// ── Tests ─────────────────────────────────────────────────────────────────────
