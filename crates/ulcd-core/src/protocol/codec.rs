//! Byte codec for Picaso SPE commands and replies.
//!
//! Command wire format:
//! ```text
//! [opcode:2][arg0:2][arg1:2]...            word arguments
//! [0x00 0x18][byte...][0x00]               putstr
//! ```
//!
//! Reply wire format:
//! ```text
//! [ACK]                                    ReplyShape::Ack
//! [ACK][word:2]                            ReplyShape::AckWord
//! [ACK][len:2][byte * len]                 ReplyShape::AckString
//! [NAK]                                    rejection, no payload
//! ```
//! All multi-byte integers are big-endian.

use thiserror::Error;
use tracing::trace;

use crate::protocol::commands::{
    Reply, ReplyShape, SpeCommand, ACK, MAX_CONTRAST, MAX_PUTSTR_LEN, NAK,
};

/// Errors that can occur while encoding a command or decoding a reply.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// More bytes are needed before the reply can be decoded.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The module rejected the command.
    #[error("{command} rejected by display (NAK)")]
    Nak { command: &'static str },

    /// The first reply byte was neither ACK nor NAK.
    #[error("{command}: unexpected reply byte 0x{byte:02X}")]
    UnexpectedReply { command: &'static str, byte: u8 },

    /// The string argument does not fit in the module's buffer.
    #[error("text is {len} bytes encoded, the display accepts at most {max}")]
    TextTooLong { len: usize, max: usize },

    /// The string argument contains a NUL byte, which would end it early.
    #[error("text must not contain NUL bytes")]
    EmbeddedNul,

    /// A numeric argument is outside the range the command accepts.
    #[error("{command}: argument {value} out of range")]
    ArgumentOutOfRange { command: &'static str, value: u16 },
}

impl ProtocolError {
    /// The raw byte the module answered with, when the error came from it.
    pub fn reply_byte(&self) -> Option<u8> {
        match self {
            ProtocolError::Nak { .. } => Some(NAK),
            ProtocolError::UnexpectedReply { byte, .. } => Some(*byte),
            _ => None,
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes an [`SpeCommand`] into the bytes written to the serial line.
///
/// # Errors
///
/// Returns [`ProtocolError`] if an argument cannot be represented on the wire
/// (over-long or NUL-containing text, contrast above 15).
///
/// # Examples
///
/// ```rust
/// use ulcd_core::{encode_command, SpeCommand};
///
/// let bytes = encode_command(&SpeCommand::ClearScreen).unwrap();
/// assert_eq!(bytes, vec![0xFF, 0xCD]);
/// ```
pub fn encode_command(command: &SpeCommand) -> Result<Vec<u8>, ProtocolError> {
    let mut buf = Vec::with_capacity(10);
    write_word(&mut buf, command.opcode());

    match command {
        SpeCommand::ClearScreen
        | SpeCommand::GetModel
        | SpeCommand::GetSpeVersion
        | SpeCommand::GetPmmcVersion => {}
        SpeCommand::Contrast(level) => {
            if *level > MAX_CONTRAST {
                return Err(ProtocolError::ArgumentOutOfRange {
                    command: command.name(),
                    value: *level,
                });
            }
            write_word(&mut buf, *level);
        }
        SpeCommand::CircleFilled {
            x,
            y,
            radius,
            colour,
        } => {
            write_word(&mut buf, *x);
            write_word(&mut buf, *y);
            write_word(&mut buf, *radius);
            write_word(&mut buf, colour.0);
        }
        SpeCommand::MoveCursor { line, column } => {
            write_word(&mut buf, *line);
            write_word(&mut buf, *column);
        }
        SpeCommand::TextForeground(colour) | SpeCommand::TextBackground(colour) => {
            write_word(&mut buf, colour.0);
        }
        SpeCommand::PutString(text) => encode_putstr(&mut buf, text)?,
        SpeCommand::TouchSet(mode) => write_word(&mut buf, *mode as u16),
        SpeCommand::TouchGet(query) => write_word(&mut buf, *query as u16),
        SpeCommand::SetBaud { index } => write_word(&mut buf, *index),
    }

    trace!(command = command.name(), len = buf.len(), "encoded SPE command");
    Ok(buf)
}

/// Decodes the reply to `command` from the beginning of `bytes`.
///
/// Returns the decoded reply and the number of bytes consumed.  When the
/// slice is too short, [`ProtocolError::InsufficientData`] tells the caller
/// how many bytes in total it must have before trying again; a serial driver
/// uses this to read exactly as much as the reply needs.
///
/// # Errors
///
/// - [`ProtocolError::InsufficientData`] – read more and retry.
/// - [`ProtocolError::Nak`] – the module rejected the command.
/// - [`ProtocolError::UnexpectedReply`] – the line is out of sync.
///
/// # Examples
///
/// ```rust
/// use ulcd_core::{decode_reply, Reply, SpeCommand};
///
/// let (reply, n) = decode_reply(&SpeCommand::GetSpeVersion, &[0x06, 0x01, 0x02]).unwrap();
/// assert_eq!(reply, Reply::Word(0x0102));
/// assert_eq!(n, 3);
/// ```
pub fn decode_reply(command: &SpeCommand, bytes: &[u8]) -> Result<(Reply, usize), ProtocolError> {
    require_len(bytes, 1)?;
    match bytes[0] {
        ACK => {}
        NAK => {
            return Err(ProtocolError::Nak {
                command: command.name(),
            })
        }
        byte => {
            return Err(ProtocolError::UnexpectedReply {
                command: command.name(),
                byte,
            })
        }
    }

    match command.reply_shape() {
        ReplyShape::Ack => Ok((Reply::Ack, 1)),
        ReplyShape::AckWord => {
            require_len(bytes, 3)?;
            Ok((Reply::Word(read_word(bytes, 1)), 3))
        }
        ReplyShape::AckString => {
            require_len(bytes, 3)?;
            let len = read_word(bytes, 1) as usize;
            let total = 3 + len;
            require_len(bytes, total)?;
            // Model names are ASCII; anything else is shown, not rejected.
            let text = String::from_utf8_lossy(&bytes[3..total]).into_owned();
            Ok((Reply::Text(text), total))
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn encode_putstr(buf: &mut Vec<u8>, text: &str) -> Result<(), ProtocolError> {
    if text.as_bytes().contains(&0) {
        return Err(ProtocolError::EmbeddedNul);
    }
    let encoded_len = text.len() + 1;
    if encoded_len > MAX_PUTSTR_LEN {
        return Err(ProtocolError::TextTooLong {
            len: encoded_len,
            max: MAX_PUTSTR_LEN,
        });
    }
    buf.extend_from_slice(text.as_bytes());
    buf.push(0x00);
    Ok(())
}

fn write_word(buf: &mut Vec<u8>, word: u16) {
    buf.extend_from_slice(&word.to_be_bytes());
}

fn read_word(bytes: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([bytes[offset], bytes[offset + 1]])
}

fn require_len(bytes: &[u8], needed: usize) -> Result<(), ProtocolError> {
    if bytes.len() < needed {
        Err(ProtocolError::InsufficientData {
            needed,
            available: bytes.len(),
        })
    } else {
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
