//! Command parsing and dispatch.
//!
//! A command arrives as a name plus positional string arguments.  It is turned
//! into a typed [`Command`] first; only a command that parsed and validated
//! completely is ever executed against the session.  Unknown names and bad
//! arguments therefore never reach the device.
//!
//! Execution performs at most one display-driver call, except for `drawtest`,
//! which hands control to the [`InteractiveSession`] loop.

use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, info};
use ulcd_core::protocol::{MAX_CONTRAST, MAX_PUTSTR_LEN};

use crate::application::cancel::{CancelToken, InterruptSource};
use crate::application::display::DisplayConnector;
use crate::application::error::{CommandError, CommandOutput, CommandResult};
use crate::application::interactive::{InteractiveConfig, InteractiveSession};
use crate::application::report::ErrorReporter;
use crate::application::session::Session;

/// Line terminator appended to `write` text.
pub const LINE_TERMINATOR: char = '\n';

/// Every command name the tool understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Reset,
    Clear,
    On,
    Off,
    Contrast,
    BaudRate,
    TextReset,
    Write,
    Version,
    DrawTest,
}

impl CommandKind {
    pub const ALL: [CommandKind; 10] = [
        CommandKind::Reset,
        CommandKind::Clear,
        CommandKind::On,
        CommandKind::Off,
        CommandKind::Contrast,
        CommandKind::BaudRate,
        CommandKind::TextReset,
        CommandKind::Write,
        CommandKind::Version,
        CommandKind::DrawTest,
    ];

    /// The name typed on the command line.
    pub fn name(self) -> &'static str {
        match self {
            CommandKind::Reset => "reset",
            CommandKind::Clear => "clear",
            CommandKind::On => "on",
            CommandKind::Off => "off",
            CommandKind::Contrast => "contrast",
            CommandKind::BaudRate => "baudrate",
            CommandKind::TextReset => "textreset",
            CommandKind::Write => "write",
            CommandKind::Version => "version",
            CommandKind::DrawTest => "drawtest",
        }
    }

    /// One-line usage shown in `--help`.
    pub fn usage(self) -> &'static str {
        match self {
            CommandKind::Reset => "reset              Reset the display module",
            CommandKind::Clear => "clear              Clear the screen",
            CommandKind::On => "on                 Turn the display on",
            CommandKind::Off => "off                Turn the display off",
            CommandKind::Contrast => "contrast <0-15>    Set the contrast level",
            CommandKind::BaudRate => "baudrate <rate>    Switch the serial link speed",
            CommandKind::TextReset => "textreset          Reset text colours and cursor",
            CommandKind::Write => "write <text>       Print one line of text",
            CommandKind::Version => "version            Show model, SPE and PmmC versions",
            CommandKind::DrawTest => "drawtest           Interactive drawing until interrupted",
        }
    }
}

impl FromStr for CommandKind {
    type Err = CommandError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        CommandKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| CommandError::unknown_command(name))
    }
}

/// A validated command, ready to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Reset,
    Clear,
    DisplayOn,
    DisplayOff,
    Contrast(u8),
    /// Checked against the supported set by [`Session::set_baud`].
    BaudRate(u32),
    TextReset,
    /// Text without the line terminator.
    Write(String),
    Version,
    DrawTest,
}

impl Command {
    /// Parses and validates a command name and its arguments.
    ///
    /// # Errors
    ///
    /// - Unknown command: `name` is not in the command table.
    /// - Validation: wrong number of arguments, non-numeric or out-of-range
    ///   numbers, or `write` text that does not fit the display's buffer.
    pub fn parse(name: &str, args: &[String]) -> Result<Self, CommandError> {
        let kind = CommandKind::from_str(name)?;
        let command = match kind {
            CommandKind::Reset => no_args(kind, args, Command::Reset)?,
            CommandKind::Clear => no_args(kind, args, Command::Clear)?,
            CommandKind::On => no_args(kind, args, Command::DisplayOn)?,
            CommandKind::Off => no_args(kind, args, Command::DisplayOff)?,
            CommandKind::TextReset => no_args(kind, args, Command::TextReset)?,
            CommandKind::Version => no_args(kind, args, Command::Version)?,
            CommandKind::DrawTest => no_args(kind, args, Command::DrawTest)?,
            CommandKind::Contrast => {
                let raw = one_arg(kind, args)?;
                let level = parse_integer(kind, raw)?;
                if !(0..=i64::from(MAX_CONTRAST)).contains(&level) {
                    return Err(CommandError::validation(format!(
                        "contrast must be between 0 and {MAX_CONTRAST}, got {level}"
                    )));
                }
                Command::Contrast(level as u8)
            }
            CommandKind::BaudRate => {
                let raw = one_arg(kind, args)?;
                let rate = parse_integer(kind, raw)?;
                let rate = u32::try_from(rate).map_err(|_| {
                    CommandError::validation(format!("baudrate must be positive, got {rate}"))
                })?;
                Command::BaudRate(rate)
            }
            CommandKind::Write => {
                let text = one_arg(kind, args)?;
                validate_text(text)?;
                Command::Write(text.to_string())
            }
        };
        Ok(command)
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Reset => CommandKind::Reset,
            Command::Clear => CommandKind::Clear,
            Command::DisplayOn => CommandKind::On,
            Command::DisplayOff => CommandKind::Off,
            Command::Contrast(_) => CommandKind::Contrast,
            Command::BaudRate(_) => CommandKind::BaudRate,
            Command::TextReset => CommandKind::TextReset,
            Command::Write(_) => CommandKind::Write,
            Command::Version => CommandKind::Version,
            Command::DrawTest => CommandKind::DrawTest,
        }
    }
}

fn no_args(kind: CommandKind, args: &[String], command: Command) -> Result<Command, CommandError> {
    if args.is_empty() {
        Ok(command)
    } else {
        Err(CommandError::validation(format!(
            "{} takes no arguments, got {}",
            kind.name(),
            args.len()
        )))
    }
}

fn one_arg(kind: CommandKind, args: &[String]) -> Result<&str, CommandError> {
    match args {
        [only] => Ok(only.as_str()),
        [] => Err(CommandError::validation(format!(
            "{} requires one argument",
            kind.name()
        ))),
        _ => Err(CommandError::validation(format!(
            "{} takes exactly one argument, got {}",
            kind.name(),
            args.len()
        ))),
    }
}

fn parse_integer(kind: CommandKind, raw: &str) -> Result<i64, CommandError> {
    raw.trim().parse::<i64>().map_err(|_| {
        CommandError::validation(format!("{} expects an integer, got '{raw}'", kind.name()))
    })
}

/// Rejects text the display cannot take in one `putstr`.
///
/// The encoded string is the text, the line terminator, and a NUL byte.
fn validate_text(text: &str) -> Result<(), CommandError> {
    if text.contains('\0') {
        return Err(CommandError::validation("text must not contain NUL characters"));
    }
    let encoded = text.len() + LINE_TERMINATOR.len_utf8() + 1;
    if encoded > MAX_PUTSTR_LEN {
        return Err(CommandError::validation(format!(
            "text is too long: {} bytes, at most {} fit on one line",
            text.len(),
            MAX_PUTSTR_LEN - LINE_TERMINATOR.len_utf8() - 1
        )));
    }
    Ok(())
}

/// Executes commands against an open [`Session`].
pub struct CommandDispatcher {
    interactive: InteractiveConfig,
    interrupts: Arc<dyn InterruptSource>,
    cancel: CancelToken,
}

impl CommandDispatcher {
    /// Creates a dispatcher.
    ///
    /// `interrupts` is installed only while `drawtest` runs and forwards to
    /// `cancel`, which is cleared at the start of every `drawtest`.
    pub fn new(
        interactive: InteractiveConfig,
        interrupts: Arc<dyn InterruptSource>,
        cancel: CancelToken,
    ) -> Self {
        Self {
            interactive,
            interrupts,
            cancel,
        }
    }

    /// Parses `name` and `args`, then executes the command.
    ///
    /// Parsing happens before the session is looked at, so an unknown name or
    /// invalid arguments leave it untouched.
    pub async fn dispatch(&self, session: &mut Session, name: &str, args: &[String]) -> CommandResult {
        let command = Command::parse(name, args)?;
        self.execute(session, command).await
    }

    /// Runs one command from start to finish.
    ///
    /// The command is parsed before the device is touched.  The session is
    /// then opened, the command executed, and the session closed exactly once
    /// whatever the outcome.
    pub async fn run_once(
        &self,
        connector: &dyn DisplayConnector,
        device: &str,
        baud: u32,
        name: &str,
        args: &[String],
    ) -> CommandResult {
        self.run_with(connector, device, baud, name, args, |_| ()).await
    }

    /// Like [`run_once`](Self::run_once), but hands the outcome to `reporter`
    /// while the session is still open and returns the exit status.
    pub async fn run_and_report<O: Write, E: Write>(
        &self,
        connector: &dyn DisplayConnector,
        device: &str,
        baud: u32,
        name: &str,
        args: &[String],
        reporter: &mut ErrorReporter<O, E>,
    ) -> u8 {
        let mut status = 0;
        self.run_with(connector, device, baud, name, args, |result| {
            status = reporter.report(name, result);
        })
        .await;
        status
    }

    /// Parse, open, execute, then `before_close`, then close.
    async fn run_with(
        &self,
        connector: &dyn DisplayConnector,
        device: &str,
        baud: u32,
        name: &str,
        args: &[String],
        before_close: impl FnOnce(&CommandResult),
    ) -> CommandResult {
        let command = match Command::parse(name, args) {
            Ok(command) => command,
            Err(e) => {
                let result = Err(e);
                before_close(&result);
                return result;
            }
        };

        let mut session = Session::new();
        let result = match session.open(connector, device, baud) {
            Ok(()) => self.execute(&mut session, command).await,
            Err(e) => Err(e),
        };
        before_close(&result);
        session.close();
        result
    }

    /// Executes a validated command and records any failure on the session.
    pub async fn execute(&self, session: &mut Session, command: Command) -> CommandResult {
        let kind = command.kind();
        debug!(command = kind.name(), "executing command");

        let result = self.run(session, command).await;
        match &result {
            Ok(_) => debug!(command = kind.name(), "command succeeded"),
            Err(e) => {
                debug!(command = kind.name(), kind = %e.kind, "command failed: {e}");
                session.record_error(e.clone());
            }
        }
        result
    }

    async fn run(&self, session: &mut Session, command: Command) -> CommandResult {
        if !session.is_open() {
            return Err(CommandError::transport("serial session is not open"));
        }

        match command {
            Command::Reset => session.driver_mut()?.reset()?,
            Command::Clear => session.driver_mut()?.clear_screen()?,
            Command::DisplayOn => session.driver_mut()?.set_display_power(true)?,
            Command::DisplayOff => session.driver_mut()?.set_display_power(false)?,
            Command::Contrast(level) => session.driver_mut()?.set_contrast(level)?,
            Command::BaudRate(rate) => {
                session.set_baud(rate)?;
            }
            Command::TextReset => session.driver_mut()?.reset_text()?,
            Command::Write(text) => {
                let line = format!("{text}{LINE_TERMINATOR}");
                session.driver_mut()?.write_text(&line)?;
            }
            Command::Version => {
                let info = session.driver_mut()?.query_version()?;
                return Ok(CommandOutput::Version(info));
            }
            Command::DrawTest => {
                // A Ctrl-C that ended an earlier draw test must not end this one.
                self.cancel.reset();
                let _interrupt = self.interrupts.install(self.cancel.clone());
                info!("interactive mode: draw on the display, interrupt to quit");
                return InteractiveSession::new(self.interactive.clone())
                    .run(session, &self.cancel)
                    .await;
            }
        }
        Ok(CommandOutput::Done)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
