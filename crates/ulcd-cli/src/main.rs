//! ulcdctl entry point.
//!
//! # Usage
//!
//! ```text
//! ulcdctl [OPTIONS] <COMMAND> [ARGS]...
//!
//! Options:
//!   -d, --device <PATH>      Serial device [env: ULCD_DEVICE]
//!   -b, --baud-rate <RATE>   Serial baud rate [env: ULCD_BAUDRATE]
//!       --config <FILE>      Config file [env: ULCD_CONFIG]
//!   -v, --verbose...         More log output (repeatable)
//!       --json               Machine-readable output
//! ```
//!
//! Flags win over environment variables, which win over the config file,
//! which wins over the built-in defaults (`/dev/ttyUSB0`, 9600 baud).

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{CommandFactory, FromArgMatches, Parser};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use ulcd_cli::application::cancel::CancelToken;
use ulcd_cli::application::dispatch::{CommandDispatcher, CommandKind};
use ulcd_cli::application::report::ErrorReporter;
use ulcd_cli::infrastructure::config::{load_config, Settings};
use ulcd_cli::infrastructure::display::serial::SerialConnector;
use ulcd_cli::infrastructure::interrupt::CtrlCInterrupts;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Control a uLCD serial touch display.
#[derive(Debug, Parser)]
#[command(name = "ulcdctl", version)]
struct Cli {
    /// Serial device the display is attached to.
    #[arg(short = 'd', long, env = "ULCD_DEVICE")]
    device: Option<String>,

    /// Serial baud rate.
    ///
    /// One of 110, 300, 600, 1200, 2400, 4800, 9600, 19200, 38400, 57600,
    /// 115200, 500000.
    #[arg(short = 'b', long, env = "ULCD_BAUDRATE")]
    baud_rate: Option<u32>,

    /// Config file to read instead of the platform default.
    #[arg(long, env = "ULCD_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print `version` output as JSON.
    #[arg(long)]
    json: bool,

    /// Command to run.
    command: String,

    /// Command arguments.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn commands_help() -> String {
    let mut help = String::from("Commands:\n");
    for kind in CommandKind::ALL {
        help.push_str("  ");
        help.push_str(kind.usage());
        help.push('\n');
    }
    help
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// # What happens at startup
///
/// 1. CLI arguments are parsed with `clap`; `clap` also reads the `ULCD_*`
///    environment variables.
/// 2. The config file is loaded and merged into [`Settings`].
/// 3. `tracing_subscriber` is initialised.  `RUST_LOG` wins over `-v` and the
///    configured level.  Logs go to stderr.
/// 4. The command is run once through [`CommandDispatcher::run_and_report`],
///    which prints the result before the device is closed and returns the
///    exit status.
#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let matches = Cli::command().after_help(commands_help()).get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let file = load_config(cli.config.as_deref()).context("could not load configuration")?;
    let settings = Settings::resolve(cli.device, cli.baud_rate, cli.verbose, cli.json, file);

    // ── Logging setup ─────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    debug!(?settings, "resolved settings");
    info!(device = %settings.device, baud = settings.baud_rate, command = %cli.command, "ulcdctl starting");

    // ── Run the command ───────────────────────────────────────────────────────
    let connector = SerialConnector::new(settings.timeout);
    let dispatcher = CommandDispatcher::new(
        settings.interactive.clone(),
        Arc::new(CtrlCInterrupts),
        CancelToken::new(),
    );
    let mut reporter = ErrorReporter::stdio(settings.json);
    let status = dispatcher
        .run_and_report(
            &connector,
            &settings.device,
            settings.baud_rate,
            &cli.command,
            &cli.args,
            &mut reporter,
        )
        .await;

    Ok(ExitCode::from(status))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_collects_command_and_hyphenated_arguments() {
        let cli = Cli::parse_from(["ulcdctl", "contrast", "-1"]);

        assert_eq!(cli.command, "contrast");
        assert_eq!(cli.args, vec!["-1".to_string()]);
    }

    #[test]
    fn test_cli_device_and_baud_flags() {
        let cli = Cli::parse_from(["ulcdctl", "-d", "/dev/ttyACM0", "-b", "115200", "-vv", "clear"]);

        assert_eq!(cli.device.as_deref(), Some("/dev/ttyACM0"));
        assert_eq!(cli.baud_rate, Some(115_200));
        assert_eq!(cli.verbose, 2);
        assert!(cli.args.is_empty());
    }

    #[test]
    fn test_cli_requires_a_command() {
        assert!(Cli::try_parse_from(["ulcdctl"]).is_err());
    }

    #[test]
    fn test_commands_help_lists_every_command() {
        let help = commands_help();
        for kind in CommandKind::ALL {
            assert!(help.contains(kind.name()), "missing {}", kind.name());
        }
    }

    #[test]
    fn test_clap_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
