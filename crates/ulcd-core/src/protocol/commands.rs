//! The Picaso SPE serial command set used by `ulcdctl`.
//!
//! Every command starts with a 16-bit opcode.  Arguments are 16-bit words,
//! except `putstr` which carries a NUL-terminated byte string.  All words are
//! big-endian on the wire.
//!
//! The module answers each command with `ACK` (0x06) or `NAK` (0x15).  Some
//! commands append a result; [`ReplyShape`] describes what follows the ACK.

use crate::domain::device::Colour;

/// Positive acknowledgement byte.
pub const ACK: u8 = 0x06;

/// Negative acknowledgement byte.
pub const NAK: u8 = 0x15;

/// Longest string `putstr` accepts, including the NUL terminator.
pub const MAX_PUTSTR_LEN: usize = 511;

/// Highest contrast level; 0 turns the backlight off.
pub const MAX_CONTRAST: u16 = 15;

/// Sub-modes of `touch_Set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum TouchMode {
    Enable = 0,
    Disable = 1,
    Reset = 2,
}

/// Sub-modes of `touch_Get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum TouchQuery {
    Status = 0,
    X = 1,
    Y = 2,
}

/// One SPE command with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeCommand {
    /// `gfx_Cls` – clear the screen to the background colour.
    ClearScreen,
    /// `gfx_Contrast` – 0 (off) to 15; replies with the previous level.
    Contrast(u16),
    /// `gfx_CircleFilled`.
    CircleFilled { x: u16, y: u16, radius: u16, colour: Colour },
    /// `txt_MoveCursor` – text line and column.
    MoveCursor { line: u16, column: u16 },
    /// `txt_FGcolour` – replies with the previous colour.
    TextForeground(Colour),
    /// `txt_BGcolour` – replies with the previous colour.
    TextBackground(Colour),
    /// `putstr` – replies with the number of characters printed.
    PutString(String),
    /// `touch_Set`.
    TouchSet(TouchMode),
    /// `touch_Get` – replies with the requested value.
    TouchGet(TouchQuery),
    /// `sys_GetModel` – replies with a length-prefixed string.
    GetModel,
    /// `sys_GetVersion` – replies with the SPE version word.
    GetSpeVersion,
    /// `sys_GetPmmC` – replies with the PmmC version word.
    GetPmmcVersion,
    /// `setbaudWait` – the ACK arrives at the *new* rate.
    SetBaud { index: u16 },
}

/// What the module sends after a successful ACK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyShape {
    /// A bare ACK.
    Ack,
    /// ACK followed by one 16-bit word.
    AckWord,
    /// ACK followed by a 16-bit length and that many bytes.
    AckString,
}

/// A decoded reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Ack,
    Word(u16),
    Text(String),
}

impl SpeCommand {
    /// The 16-bit opcode sent first on the wire.
    pub fn opcode(&self) -> u16 {
        match self {
            SpeCommand::ClearScreen => 0xFFCD,
            SpeCommand::Contrast(_) => 0xFF9C,
            SpeCommand::CircleFilled { .. } => 0xFFC2,
            SpeCommand::MoveCursor { .. } => 0xFFE9,
            SpeCommand::TextForeground(_) => 0xFFE7,
            SpeCommand::TextBackground(_) => 0xFFE6,
            SpeCommand::PutString(_) => 0x0018,
            SpeCommand::TouchSet(_) => 0xFF38,
            SpeCommand::TouchGet(_) => 0xFF37,
            SpeCommand::GetModel => 0x001A,
            SpeCommand::GetSpeVersion => 0x001B,
            SpeCommand::GetPmmcVersion => 0x001C,
            SpeCommand::SetBaud { .. } => 0x0026,
        }
    }

    /// Firmware name of the command, used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            SpeCommand::ClearScreen => "gfx_Cls",
            SpeCommand::Contrast(_) => "gfx_Contrast",
            SpeCommand::CircleFilled { .. } => "gfx_CircleFilled",
            SpeCommand::MoveCursor { .. } => "txt_MoveCursor",
            SpeCommand::TextForeground(_) => "txt_FGcolour",
            SpeCommand::TextBackground(_) => "txt_BGcolour",
            SpeCommand::PutString(_) => "putstr",
            SpeCommand::TouchSet(_) => "touch_Set",
            SpeCommand::TouchGet(_) => "touch_Get",
            SpeCommand::GetModel => "sys_GetModel",
            SpeCommand::GetSpeVersion => "sys_GetVersion",
            SpeCommand::GetPmmcVersion => "sys_GetPmmC",
            SpeCommand::SetBaud { .. } => "setbaudWait",
        }
    }

    /// The reply layout the module uses for this command.
    pub fn reply_shape(&self) -> ReplyShape {
        match self {
            SpeCommand::ClearScreen
            | SpeCommand::CircleFilled { .. }
            | SpeCommand::MoveCursor { .. }
            | SpeCommand::TouchSet(_)
            | SpeCommand::SetBaud { .. } => ReplyShape::Ack,
            SpeCommand::Contrast(_)
            | SpeCommand::TextForeground(_)
            | SpeCommand::TextBackground(_)
            | SpeCommand::PutString(_)
            | SpeCommand::TouchGet(_)
            | SpeCommand::GetSpeVersion
            | SpeCommand::GetPmmcVersion => ReplyShape::AckWord,
            SpeCommand::GetModel => ReplyShape::AckString,
        }
    }
}
