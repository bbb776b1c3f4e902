//! Application layer: the command use-cases.
//!
//! # What lives here (for beginners)
//!
//! Everything in this module is pure logic over traits.  It never opens a
//! serial port, installs a signal handler, or reads a file; those are
//! infrastructure concerns injected through [`display::DisplayConnector`] and
//! [`cancel::InterruptSource`].  That is what lets every behaviour below be
//! tested with mocks.
//!
//! - [`session`] – connection lifecycle (open, baud rate, close exactly once)
//! - [`dispatch`] – parse a command name and run it against the session
//! - [`interactive`] – the `drawtest` touch-tracking loop
//! - [`report`] – print the result and compute the exit status
//! - [`error`] – the unified command result

pub mod cancel;
pub mod dispatch;
pub mod display;
pub mod error;
pub mod interactive;
pub mod report;
pub mod session;
