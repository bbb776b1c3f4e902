//! Turns a [`CommandResult`] into user-visible output and an exit status.
//!
//! Diagnostics go to the error stream as `<command> failed: <message>`.  The
//! only success that prints anything is `version`, on the output stream, as
//! plain text or as one JSON object.

use std::io::{self, Write};

use tracing::warn;

use crate::application::error::{CommandError, CommandOutput, CommandResult, ErrorKind};

/// Exit status for a failure.
///
/// A device-reported code in `1..=255` is passed through.  Otherwise the
/// status is derived from the error kind: validation and unknown command 2,
/// transport 3, protocol 4.
pub fn exit_code(err: &CommandError) -> u8 {
    if let Some(code) = err.device_code.and_then(|c| u8::try_from(c).ok()) {
        if code != 0 {
            return code;
        }
    }
    match err.kind {
        ErrorKind::Validation | ErrorKind::UnknownCommand => 2,
        ErrorKind::Transport => 3,
        ErrorKind::Protocol => 4,
    }
}

/// Exit status when the command succeeded but its output was lost.
pub const OUTPUT_FAILED: u8 = 1;

/// Writes results to an output and an error stream.
pub struct ErrorReporter<O: Write, E: Write> {
    out: O,
    err: E,
    json: bool,
}

impl ErrorReporter<io::Stdout, io::Stderr> {
    /// Reporter bound to the process's stdout and stderr.
    pub fn stdio(json: bool) -> Self {
        Self::new(io::stdout(), io::stderr(), json)
    }
}

impl<O: Write, E: Write> ErrorReporter<O, E> {
    pub fn new(out: O, err: E, json: bool) -> Self {
        Self { out, err, json }
    }

    /// Prints `result` for `command` and returns the exit status.
    ///
    /// A success whose output could not be written exits with
    /// [`OUTPUT_FAILED`].
    pub fn report(&mut self, command: &str, result: &CommandResult) -> u8 {
        match result {
            Ok(output) => match self.print_output(output).and_then(|()| self.out.flush()) {
                Ok(()) => 0,
                Err(e) => {
                    warn!("could not write command output: {e}");
                    OUTPUT_FAILED
                }
            },
            Err(failure) => {
                let written = writeln!(self.err, "{command} failed: {failure}")
                    .and_then(|()| self.err.flush());
                if let Err(e) = written {
                    warn!("could not write diagnostic: {e}");
                }
                exit_code(failure)
            }
        }
    }

    fn print_output(&mut self, output: &CommandOutput) -> io::Result<()> {
        match output {
            CommandOutput::Done => Ok(()),
            CommandOutput::Version(info) if self.json => {
                let line = serde_json::to_string(info).map_err(io::Error::other)?;
                writeln!(self.out, "{line}")
            }
            CommandOutput::Version(info) => writeln!(self.out, "{info}"),
        }
    }

    /// Gives the streams back, mostly so tests can inspect them.
    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ulcd_core::VersionInfo;

    fn reporter(json: bool) -> ErrorReporter<Vec<u8>, Vec<u8>> {
        ErrorReporter::new(Vec::new(), Vec::new(), json)
    }

    fn version() -> CommandOutput {
        CommandOutput::Version(VersionInfo {
            model: "uLCD-32PTU".to_string(),
            spe_version: 0x0102,
            pmmc_version: 0x0208,
        })
    }

    #[test]
    fn test_success_without_output_prints_nothing_and_exits_zero() {
        let mut r = reporter(false);

        let status = r.report("clear", &Ok(CommandOutput::Done));

        let (out, err) = r.into_inner();
        assert_eq!(status, 0);
        assert!(out.is_empty());
        assert!(err.is_empty());
    }

    #[test]
    fn test_failure_prints_command_and_message_to_error_stream() {
        // Arrange
        let mut r = reporter(false);
        let failure = CommandError::validation("contrast must be between 0 and 15, got 16");

        // Act
        let status = r.report("contrast", &Err(failure));

        // Assert
        let (out, err) = r.into_inner();
        assert_eq!(status, 2);
        assert!(out.is_empty());
        assert_eq!(
            String::from_utf8(err).unwrap(),
            "contrast failed: contrast must be between 0 and 15, got 16\n"
        );
    }

    #[test]
    fn test_version_prints_three_lines() {
        let mut r = reporter(false);

        r.report("version", &Ok(version()));

        let (out, _) = r.into_inner();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("uLCD-32PTU"));
        assert!(text.contains("1.2"));
        assert!(text.contains("2.8"));
    }

    #[test]
    fn test_version_json_is_one_parseable_object() {
        let mut r = reporter(true);

        r.report("version", &Ok(version()));

        let (out, _) = r.into_inner();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["model"], "uLCD-32PTU");
        assert_eq!(value["spe_version"], 0x0102);
    }

    /// Accepts writes but fails to flush, like a closed pipe behind a buffer.
    struct FailingFlush;

    impl Write for FailingFlush {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
        }
    }

    #[test]
    fn test_version_with_lost_output_does_not_exit_zero() {
        let mut r = ErrorReporter::new(FailingFlush, Vec::new(), false);

        let status = r.report("version", &Ok(version()));

        assert_eq!(status, OUTPUT_FAILED);
    }

    #[test]
    fn test_failure_status_survives_unwritable_error_stream() {
        let mut r = ErrorReporter::new(Vec::new(), FailingFlush, false);

        let status = r.report("clear", &Err(CommandError::transport("port vanished")));

        assert_eq!(status, 3);
    }

    #[test]
    fn test_exit_code_by_kind() {
        assert_eq!(exit_code(&CommandError::validation("x")), 2);
        assert_eq!(exit_code(&CommandError::unknown_command("x")), 2);
        assert_eq!(exit_code(&CommandError::transport("x")), 3);
        let protocol = CommandError {
            kind: ErrorKind::Protocol,
            message: "x".to_string(),
            device_code: None,
        };
        assert_eq!(exit_code(&protocol), 4);
    }

    #[test]
    fn test_exit_code_prefers_device_code_in_range() {
        let mut err = CommandError {
            kind: ErrorKind::Protocol,
            message: "NAK".to_string(),
            device_code: Some(0x15),
        };
        assert_eq!(exit_code(&err), 0x15);

        for out_of_range in [0, -1, 256] {
            err.device_code = Some(out_of_range);
            assert_eq!(exit_code(&err), 4, "code {out_of_range}");
        }
    }
}
