//! ulcd-cli library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does ulcdctl do? (for beginners)
//!
//! `ulcdctl` drives a 4D Systems uLCD touch display attached over a serial
//! line.  Each invocation runs exactly one command:
//!
//! 1. The command name and its arguments are parsed and validated.  Nothing
//!    is sent to the display if that fails.
//! 2. The serial device is opened at the requested baud rate.
//! 3. The command runs: usually a single display call (`clear`, `contrast 8`,
//!    `write "hello"`), or the interactive `drawtest` loop, which draws where
//!    the screen is touched until Ctrl-C.
//! 4. The device is closed, the outcome printed, and the process exits with
//!    status 0 on success or a non-zero code describing the failure.

/// Application layer: session, dispatch, interactive loop, reporting.
pub mod application;

/// Infrastructure layer: serial driver, interrupt handling, configuration.
pub mod infrastructure;
