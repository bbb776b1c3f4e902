//! Protocol module containing the SPE command set and the byte codec.

pub mod codec;
pub mod commands;

pub use codec::{decode_reply, encode_command, ProtocolError};
pub use commands::*;
