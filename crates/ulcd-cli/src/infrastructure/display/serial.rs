//! Picaso SPE display driver over a serial port.
//!
//! # How a call works (for beginners)
//!
//! Every [`DisplayDriver`] method maps to one or a few SPE commands.  For each
//! command the driver:
//!
//! 1. Encodes it with [`encode_command`] and writes the bytes to the port.
//! 2. Reads the reply in as many steps as [`decode_reply`] asks for: it first
//!    reads the ACK byte, then, if the command returns a value, the value.
//!
//! Reads block for at most the port timeout.  A timeout or any other I/O
//! error becomes [`DeviceError::Transport`]; a NAK or a byte that is neither
//! ACK nor NAK becomes [`DeviceError::Protocol`] carrying that byte as code.
//!
//! The driver is generic over [`SerialLink`] so tests can script the byte
//! stream without hardware.

use std::io::{self, Read, Write};
use std::thread;
use std::time::Duration;

use tracing::{debug, trace};
use ulcd_core::protocol::{TouchMode, TouchQuery, MAX_CONTRAST};
use ulcd_core::{
    decode_reply, encode_command, BaudRate, Colour, Point, ProtocolError, Reply, SpeCommand,
    TouchEvent, TouchStatus, VersionInfo,
};

use crate::application::display::{DeviceError, DisplayConnector, DisplayDriver};

/// How long the reset line is held asserted.
const RESET_PULSE: Duration = Duration::from_millis(100);

/// Time the module needs to boot after a reset before it accepts commands.
pub const DEFAULT_RESET_SETTLE: Duration = Duration::from_secs(3);

/// Default read timeout for replies.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

/// The parts of a serial port the driver needs.
pub trait SerialLink: Read + Write + Send {
    fn baud_rate(&self) -> io::Result<u32>;
    fn set_baud_rate(&mut self, rate: u32) -> io::Result<()>;
    /// Drives the module's reset line (wired to DTR).
    fn set_reset_line(&mut self, asserted: bool) -> io::Result<()>;
    /// Drops any bytes already received but not yet read.
    fn discard_input(&mut self) -> io::Result<()>;
}

impl SerialLink for Box<dyn serialport::SerialPort> {
    fn baud_rate(&self) -> io::Result<u32> {
        Ok(serialport::SerialPort::baud_rate(self.as_ref())?)
    }

    fn set_baud_rate(&mut self, rate: u32) -> io::Result<()> {
        Ok(serialport::SerialPort::set_baud_rate(self.as_mut(), rate)?)
    }

    fn set_reset_line(&mut self, asserted: bool) -> io::Result<()> {
        Ok(self.write_data_terminal_ready(asserted)?)
    }

    fn discard_input(&mut self) -> io::Result<()> {
        Ok(self.clear(serialport::ClearBuffer::Input)?)
    }
}

/// [`DisplayDriver`] speaking SPE over a [`SerialLink`].
pub struct SpeDriver<L: SerialLink> {
    link: L,
    reset_settle: Duration,
}

impl<L: SerialLink> SpeDriver<L> {
    pub fn new(link: L) -> Self {
        Self {
            link,
            reset_settle: DEFAULT_RESET_SETTLE,
        }
    }

    /// Overrides how long [`DisplayDriver::reset`] waits for the module to boot.
    pub fn with_reset_settle(mut self, settle: Duration) -> Self {
        self.reset_settle = settle;
        self
    }

    /// Gives the link back.
    pub fn into_inner(self) -> L {
        self.link
    }

    /// Sends `command` and waits for its reply.
    fn transact(&mut self, command: SpeCommand) -> Result<Reply, DeviceError> {
        self.send(&command)?;
        self.read_reply(&command)
    }

    fn transact_word(&mut self, command: SpeCommand) -> Result<u16, DeviceError> {
        match self.transact(command.clone())? {
            Reply::Word(word) => Ok(word),
            other => Err(unexpected_shape(&command, &other)),
        }
    }

    fn send(&mut self, command: &SpeCommand) -> Result<(), DeviceError> {
        let bytes = encode_command(command).map_err(protocol_error)?;
        trace!(command = command.name(), len = bytes.len(), "-> display");
        self.link
            .write_all(&bytes)
            .and_then(|()| self.link.flush())
            .map_err(|e| io_error(command, "write", e))
    }

    /// Reads exactly as many bytes as the reply to `command` needs.
    fn read_reply(&mut self, command: &SpeCommand) -> Result<Reply, DeviceError> {
        let mut buf: Vec<u8> = Vec::with_capacity(4);
        loop {
            match decode_reply(command, &buf) {
                Ok((reply, _)) => {
                    trace!(command = command.name(), ?reply, "<- display");
                    return Ok(reply);
                }
                Err(ProtocolError::InsufficientData { needed, .. }) => {
                    let start = buf.len();
                    buf.resize(needed, 0);
                    self.link
                        .read_exact(&mut buf[start..])
                        .map_err(|e| io_error(command, "read reply", e))?;
                }
                Err(e) => return Err(protocol_error(e)),
            }
        }
    }

    fn touch_value(&mut self, query: TouchQuery) -> Result<u16, DeviceError> {
        self.transact_word(SpeCommand::TouchGet(query))
    }
}

impl<L: SerialLink> DisplayDriver for SpeDriver<L> {
    fn baud_rate(&self) -> Result<u32, DeviceError> {
        self.link
            .baud_rate()
            .map_err(|e| DeviceError::transport(format!("could not read port baud rate: {e}")))
    }

    fn set_baud_rate(&mut self, rate: BaudRate) -> Result<u32, DeviceError> {
        let command = SpeCommand::SetBaud {
            index: rate.spe_index(),
        };
        self.send(&command)?;
        // The module acknowledges at the new rate.
        self.link
            .set_baud_rate(rate.bits_per_second())
            .map_err(|e| io_error(&command, "switch port baud rate", e))?;
        self.read_reply(&command)?;
        self.baud_rate()
    }

    fn reset(&mut self) -> Result<(), DeviceError> {
        let pulse = |link: &mut L, asserted: bool| {
            link.set_reset_line(asserted)
                .map_err(|e| DeviceError::transport(format!("could not drive reset line: {e}")))
        };
        pulse(&mut self.link, true)?;
        thread::sleep(RESET_PULSE);
        pulse(&mut self.link, false)?;
        debug!(settle_ms = self.reset_settle.as_millis() as u64, "waiting for module to boot");
        thread::sleep(self.reset_settle);
        self.link
            .discard_input()
            .map_err(|e| DeviceError::transport(format!("could not flush input after reset: {e}")))
    }

    fn clear_screen(&mut self) -> Result<(), DeviceError> {
        self.transact(SpeCommand::ClearScreen).map(drop)
    }

    fn set_display_power(&mut self, on: bool) -> Result<(), DeviceError> {
        let level = if on { MAX_CONTRAST } else { 0 };
        self.transact(SpeCommand::Contrast(level)).map(drop)
    }

    fn set_contrast(&mut self, level: u8) -> Result<(), DeviceError> {
        self.transact(SpeCommand::Contrast(u16::from(level))).map(drop)
    }

    fn reset_text(&mut self) -> Result<(), DeviceError> {
        self.transact(SpeCommand::TextForeground(Colour::WHITE))?;
        self.transact(SpeCommand::TextBackground(Colour::BLACK))?;
        self.transact(SpeCommand::MoveCursor { line: 0, column: 0 })
            .map(drop)
    }

    fn write_text(&mut self, text: &str) -> Result<(), DeviceError> {
        self.transact(SpeCommand::PutString(text.to_string())).map(drop)
    }

    fn query_version(&mut self) -> Result<VersionInfo, DeviceError> {
        let model = match self.transact(SpeCommand::GetModel)? {
            Reply::Text(model) => model,
            other => return Err(unexpected_shape(&SpeCommand::GetModel, &other)),
        };
        let spe_version = self.transact_word(SpeCommand::GetSpeVersion)?;
        let pmmc_version = self.transact_word(SpeCommand::GetPmmcVersion)?;
        Ok(VersionInfo {
            model,
            spe_version,
            pmmc_version,
        })
    }

    fn init_touch(&mut self) -> Result<(), DeviceError> {
        self.transact(SpeCommand::TouchSet(TouchMode::Enable))?;
        self.transact(SpeCommand::TouchSet(TouchMode::Reset)).map(drop)
    }

    fn draw_filled_circle(
        &mut self,
        centre: Point,
        radius: u16,
        colour: Colour,
    ) -> Result<(), DeviceError> {
        let command = SpeCommand::CircleFilled {
            x: coordinate(centre.x)?,
            y: coordinate(centre.y)?,
            radius,
            colour,
        };
        self.transact(command).map(drop)
    }

    fn poll_touch(&mut self) -> Result<TouchEvent, DeviceError> {
        let raw = self.touch_value(TouchQuery::Status)?;
        let status = TouchStatus::try_from(raw).map_err(|raw| {
            DeviceError::protocol(Some(i32::from(raw)), format!("touch_Get: unknown touch status {raw}"))
        })?;
        if status == TouchStatus::Idle {
            return Ok(TouchEvent::idle());
        }
        let x = self.touch_value(TouchQuery::X)?;
        let y = self.touch_value(TouchQuery::Y)?;
        Ok(TouchEvent::new(status, i32::from(x), i32::from(y)))
    }

    fn close(&mut self) -> Result<(), DeviceError> {
        self.link
            .flush()
            .map_err(|e| DeviceError::transport(format!("could not flush serial port: {e}")))
    }
}

fn coordinate(value: i32) -> Result<u16, DeviceError> {
    u16::try_from(value).map_err(|_| {
        DeviceError::protocol(None, format!("gfx_CircleFilled: coordinate {value} is off screen"))
    })
}

fn protocol_error(err: ProtocolError) -> DeviceError {
    DeviceError::protocol(err.reply_byte().map(i32::from), err.to_string())
}

fn io_error(command: &SpeCommand, action: &str, err: io::Error) -> DeviceError {
    if err.kind() == io::ErrorKind::TimedOut {
        DeviceError::transport(format!("{}: timed out waiting for the display", command.name()))
    } else {
        DeviceError::transport(format!("{}: could not {action}: {err}", command.name()))
    }
}

fn unexpected_shape(command: &SpeCommand, reply: &Reply) -> DeviceError {
    DeviceError::protocol(None, format!("{}: unexpected reply {reply:?}", command.name()))
}

/// Opens real serial ports.
#[derive(Debug, Clone)]
pub struct SerialConnector {
    timeout: Duration,
}

impl SerialConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for SerialConnector {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl DisplayConnector for SerialConnector {
    fn connect(&self, path: &str, baud: BaudRate) -> Result<Box<dyn DisplayDriver>, DeviceError> {
        debug!(device = path, %baud, timeout_ms = self.timeout.as_millis() as u64, "opening serial port");
        let port = serialport::new(path, baud.bits_per_second())
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(self.timeout)
            .open()
            .map_err(|e| DeviceError::transport(e.to_string()))?;
        Ok(Box::new(SpeDriver::new(port)))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// A link that replays canned reply bytes and records everything written.
    #[derive(Default)]
    struct ScriptedLink {
        replies: VecDeque<u8>,
        written: Vec<u8>,
        baud: u32,
        reset_line: Vec<bool>,
        /// Bytes that only become readable once the baud rate changes.
        after_baud_change: Vec<u8>,
    }

    impl ScriptedLink {
        fn replying(bytes: &[u8]) -> Self {
            Self {
                replies: bytes.iter().copied().collect(),
                baud: 9600,
                ..Self::default()
            }
        }
    }

    impl Read for ScriptedLink {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.replies.is_empty() {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "no data"));
            }
            let n = buf.len().min(self.replies.len());
            for slot in buf.iter_mut().take(n) {
                *slot = self.replies.pop_front().unwrap();
            }
            Ok(n)
        }
    }

    impl Write for ScriptedLink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SerialLink for ScriptedLink {
        fn baud_rate(&self) -> io::Result<u32> {
            Ok(self.baud)
        }

        fn set_baud_rate(&mut self, rate: u32) -> io::Result<()> {
            self.baud = rate;
            self.replies.extend(self.after_baud_change.drain(..));
            Ok(())
        }

        fn set_reset_line(&mut self, asserted: bool) -> io::Result<()> {
            self.reset_line.push(asserted);
            Ok(())
        }

        fn discard_input(&mut self) -> io::Result<()> {
            self.replies.clear();
            Ok(())
        }
    }

    fn driver(replies: &[u8]) -> SpeDriver<ScriptedLink> {
        SpeDriver::new(ScriptedLink::replying(replies)).with_reset_settle(Duration::ZERO)
    }

    #[test]
    fn test_clear_screen_writes_opcode_and_accepts_ack() {
        // Arrange
        let mut d = driver(&[0x06]);

        // Act
        d.clear_screen().unwrap();

        // Assert
        assert_eq!(d.into_inner().written, vec![0xFF, 0xCD]);
    }

    #[test]
    fn test_nak_becomes_protocol_error_with_reply_byte_code() {
        let mut d = driver(&[0x15]);

        let err = d.clear_screen().unwrap_err();

        assert_eq!(
            err,
            DeviceError::protocol(Some(0x15), "gfx_Cls rejected by display (NAK)")
        );
    }

    #[test]
    fn test_missing_reply_is_transport_timeout() {
        let mut d = driver(&[]);

        let err = d.clear_screen().unwrap_err();

        match err {
            DeviceError::Transport(message) => assert!(message.contains("timed out")),
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[test]
    fn test_display_power_maps_to_contrast_levels() {
        let mut d = driver(&[0x06, 0x00, 0x0F, 0x06, 0x00, 0x00]);

        d.set_display_power(false).unwrap();
        d.set_display_power(true).unwrap();

        assert_eq!(
            d.into_inner().written,
            vec![0xFF, 0x9C, 0x00, 0x00, 0xFF, 0x9C, 0x00, 0x0F]
        );
    }

    #[test]
    fn test_write_text_sends_putstr_with_nul() {
        let mut d = driver(&[0x06, 0x00, 0x06]);

        d.write_text("hello\n").unwrap();

        let written = d.into_inner().written;
        assert_eq!(&written[..2], &[0x00, 0x18]);
        assert_eq!(&written[2..], b"hello\n\0");
    }

    #[test]
    fn test_reset_text_restores_colours_and_homes_cursor() {
        let mut d = driver(&[0x06, 0x00, 0x00, 0x06, 0xFF, 0xFF, 0x06]);

        d.reset_text().unwrap();

        assert_eq!(
            d.into_inner().written,
            vec![
                0xFF, 0xE7, 0xFF, 0xFF, // txt_FGcolour white
                0xFF, 0xE6, 0x00, 0x00, // txt_BGcolour black
                0xFF, 0xE9, 0x00, 0x00, 0x00, 0x00, // txt_MoveCursor 0,0
            ]
        );
    }

    #[test]
    fn test_query_version_collects_three_replies() {
        // Arrange
        let mut replies = vec![0x06, 0x00, 0x09];
        replies.extend_from_slice(b"uLCD-43PT");
        replies.extend_from_slice(&[0x06, 0x01, 0x02, 0x06, 0x02, 0x08]);
        let mut d = driver(&replies);

        // Act
        let info = d.query_version().unwrap();

        // Assert
        assert_eq!(info.model, "uLCD-43PT");
        assert_eq!(info.spe_version, 0x0102);
        assert_eq!(info.pmmc_version, 0x0208);
    }

    #[test]
    fn test_poll_touch_idle_skips_coordinate_queries() {
        let mut d = driver(&[0x06, 0x00, 0x00]);

        let event = d.poll_touch().unwrap();

        assert_eq!(event, TouchEvent::idle());
        assert_eq!(d.into_inner().written, vec![0xFF, 0x37, 0x00, 0x00]);
    }

    #[test]
    fn test_poll_touch_press_reads_coordinates() {
        let mut d = driver(&[0x06, 0x00, 0x01, 0x06, 0x00, 0x0A, 0x06, 0x01, 0x2C]);

        let event = d.poll_touch().unwrap();

        assert_eq!(event, TouchEvent::new(TouchStatus::Press, 10, 300));
    }

    #[test]
    fn test_poll_touch_unknown_status_is_protocol_error() {
        let mut d = driver(&[0x06, 0x00, 0x07]);

        let err = d.poll_touch().unwrap_err();

        assert!(matches!(err, DeviceError::Protocol { code: Some(7), .. }));
    }

    #[test]
    fn test_init_touch_enables_then_resets() {
        let mut d = driver(&[0x06, 0x06]);

        d.init_touch().unwrap();

        assert_eq!(
            d.into_inner().written,
            vec![0xFF, 0x38, 0x00, 0x00, 0xFF, 0x38, 0x00, 0x02]
        );
    }

    #[test]
    fn test_draw_rejects_negative_coordinates_without_writing() {
        let mut d = driver(&[]);

        let err = d
            .draw_filled_circle(Point::new(-1, 5), 30, Colour::WHITE)
            .unwrap_err();

        assert!(matches!(err, DeviceError::Protocol { code: None, .. }));
        assert!(d.into_inner().written.is_empty());
    }

    #[test]
    fn test_set_baud_reads_ack_at_new_rate() {
        // Arrange – the ACK is only readable after the port switched rate
        let mut link = ScriptedLink::replying(&[]);
        link.after_baud_change = vec![0x06];
        let mut d = SpeDriver::new(link);

        // Act
        let negotiated = d.set_baud_rate(BaudRate::B115200).unwrap();

        // Assert
        assert_eq!(negotiated, 115_200);
        assert_eq!(d.into_inner().written, vec![0x00, 0x26, 0x00, 0x0D]);
    }

    #[test]
    fn test_reset_pulses_line_and_discards_boot_noise() {
        let mut d = driver(&[0xAA, 0xBB]);

        d.reset().unwrap();

        let link = d.into_inner();
        assert_eq!(link.reset_line, vec![true, false]);
        assert!(link.replies.is_empty());
    }

    #[test]
    fn test_connector_reports_missing_port_as_transport_error() {
        let connector = SerialConnector::new(Duration::from_millis(10));

        let err = connector
            .connect("/dev/this-port-does-not-exist", BaudRate::B9600)
            .err()
            .unwrap();

        assert!(matches!(err, DeviceError::Transport(_)));
    }
}
