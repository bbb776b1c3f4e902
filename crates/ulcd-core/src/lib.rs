//! # ulcd-core
//!
//! Shared library for `ulcdctl` containing the display-module domain types and
//! the Picaso SPE serial command codec.
//!
//! It has zero dependencies on serial ports, async runtimes, or the command line.
//!
//! # Architecture overview (for beginners)
//!
//! A uLCD module is a small touch screen with its own graphics processor.  The
//! host talks to it over a plain serial line: it writes a *command* (a 16-bit
//! opcode followed by 16-bit arguments) and the module answers with a single
//! acknowledgement byte, optionally followed by a result.
//!
//! This crate is the shared foundation.  It defines:
//!
//! - **`domain`** – Plain value types: touch points and events, the supported
//!   baud rates, RGB565 colours, and the version triple reported by the module.
//!
//! - **`protocol`** – How commands become bytes and how reply bytes become
//!   typed values.  Nothing here performs I/O; a driver feeds bytes in and out.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `ulcd_core::TouchEvent` instead of `ulcd_core::domain::touch::TouchEvent`.
pub use domain::device::{Colour, VersionInfo};
pub use domain::link::{BaudRate, UnsupportedBaudRate};
pub use domain::touch::{Point, TouchEvent, TouchStatus};
pub use protocol::codec::{decode_reply, encode_command, ProtocolError};
pub use protocol::commands::{Reply, ReplyShape, SpeCommand};
