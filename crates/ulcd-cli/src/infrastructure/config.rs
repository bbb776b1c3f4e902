//! TOML configuration file and resolved run settings.
//!
//! The optional config file lives at the platform-appropriate location:
//! - Linux:    `$XDG_CONFIG_HOME/ulcdctl/config.toml` (or `~/.config/ulcdctl/`)
//! - macOS:    `~/Library/Application Support/ulcdctl/config.toml`
//! - Windows:  `%APPDATA%\ulcdctl\config.toml`
//!
//! Example:
//!
//! ```toml
//! [serial]
//! device = "/dev/ttyACM0"
//! baud_rate = 115200
//!
//! [interactive]
//! marker_radius = 12
//! erase_previous = true
//!
//! [logging]
//! level = "info"
//! ```
//!
//! # Where each setting comes from (for beginners)
//!
//! A value is taken from the first place that has it:
//!
//! 1. A command-line flag (`-d`, `-b`).
//! 2. An environment variable (`ULCD_DEVICE`, `ULCD_BAUDRATE`).  `clap` folds
//!    1 and 2 together, so [`Settings::resolve`] just sees an `Option`.
//! 3. The config file.
//! 4. The built-in default.
//!
//! Every field carries `#[serde(default)]`, so a partial file (or none at all)
//! still yields a complete [`AppConfig`].  The file is only ever read.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use ulcd_core::Colour;

use crate::application::interactive::InteractiveConfig;

/// Directory name under the platform config root.
const APP_DIR: &str = "ulcdctl";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Contents of the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub interactive: InteractiveFileConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[serial]` – which port to open and how.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SerialConfig {
    #[serde(default = "default_device")]
    pub device: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Reply timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// `[interactive]` – draw test tunables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractiveFileConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_marker_radius")]
    pub marker_radius: u16,
    /// RGB565 value.
    #[serde(default = "default_marker_colour")]
    pub marker_colour: Colour,
    #[serde(default)]
    pub erase_previous: bool,
}

/// `[logging]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` filter used when neither `-v` nor `RUST_LOG` is given.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_device() -> String {
    "/dev/ttyUSB0".to_string()
}
fn default_baud_rate() -> u32 {
    ulcd_core::BaudRate::DEFAULT.bits_per_second()
}
fn default_timeout_ms() -> u64 {
    2000
}
fn default_poll_interval_ms() -> u64 {
    20
}
fn default_marker_radius() -> u16 {
    30
}
fn default_marker_colour() -> Colour {
    Colour::WHITE
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            baud_rate: default_baud_rate(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for InteractiveFileConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            marker_radius: default_marker_radius(),
            marker_colour: default_marker_colour(),
            erase_previous: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl InteractiveFileConfig {
    pub fn to_interactive_config(&self) -> InteractiveConfig {
        InteractiveConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            marker_radius: self.marker_radius,
            marker_colour: self.marker_colour,
            erase_previous: self.erase_previous,
            ..InteractiveConfig::default()
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Default config file path for this platform, if one can be determined.
pub fn default_config_path() -> Option<PathBuf> {
    platform_config_dir().map(|dir| dir.join("config.toml"))
}

/// Loads the config file.
///
/// With `explicit = Some(path)` that file must exist.  Otherwise the platform
/// default is tried, and a missing file yields [`AppConfig::default`].
///
/// # Errors
///
/// Returns [`ConfigError`] if the file exists but cannot be read or parsed,
/// or if an explicitly named file is missing.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => match default_config_path() {
            Some(path) => (path, false),
            None => return Ok(AppConfig::default()),
        },
    };

    match std::fs::read_to_string(&path) {
        Ok(content) => {
            debug!(path = %path.display(), "loading config file");
            toml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
            debug!(path = %path.display(), "no config file, using defaults");
            Ok(AppConfig::default())
        }
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join(APP_DIR))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(|h| PathBuf::from(h).join("Library").join("Application Support").join(APP_DIR))
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join(APP_DIR))
    }
}

// ── Resolved settings ─────────────────────────────────────────────────────────

/// Everything one run needs, after flags, environment and file are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub device: String,
    pub baud_rate: u32,
    pub timeout: Duration,
    pub interactive: InteractiveConfig,
    /// `tracing` filter directive.
    pub log_filter: String,
    pub json: bool,
}

impl Settings {
    /// Merges flag/env values over the file config.
    ///
    /// `verbosity` is the `-v` count: 0 keeps the configured level, then
    /// info, debug, and trace.
    pub fn resolve(
        device: Option<String>,
        baud_rate: Option<u32>,
        verbosity: u8,
        json: bool,
        file: AppConfig,
    ) -> Self {
        let log_filter = match verbosity {
            0 => file.logging.level.clone(),
            1 => "info".to_string(),
            2 => "debug".to_string(),
            _ => "trace".to_string(),
        };
        Self {
            device: device.unwrap_or(file.serial.device),
            baud_rate: baud_rate.unwrap_or(file.serial.baud_rate),
            timeout: Duration::from_millis(file.serial.timeout_ms),
            interactive: file.interactive.to_interactive_config(),
            log_filter,
            json,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ulcdctl_test_{}_{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_config_matches_built_in_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.serial.device, "/dev/ttyUSB0");
        assert_eq!(cfg.serial.baud_rate, 9600);
        assert_eq!(cfg.logging.level, "warn");
        assert_eq!(cfg.interactive.marker_radius, 30);
    }

    #[test]
    fn test_deserialize_empty_toml_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_deserialize_partial_section_keeps_other_defaults() {
        // Arrange
        let toml_str = r#"
[serial]
baud_rate = 115200

[interactive]
marker_colour = 63488
erase_previous = true
"#;

        // Act
        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(cfg.serial.baud_rate, 115_200);
        assert_eq!(cfg.serial.device, "/dev/ttyUSB0");
        assert_eq!(cfg.interactive.marker_colour, Colour::RED);
        assert!(cfg.interactive.erase_previous);
        assert_eq!(cfg.interactive.poll_interval_ms, 20);
    }

    #[test]
    fn test_load_explicit_file() {
        let path = scratch_file("explicit", "[serial]\ndevice = \"/dev/ttyACM3\"\n");

        let cfg = load_config(Some(&path)).unwrap();

        assert_eq!(cfg.serial.device, "/dev/ttyACM3");
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_load_explicit_missing_file_is_io_error() {
        let path = PathBuf::from("/nonexistent/path/that/cannot/exist/config.toml");

        let err = load_config(Some(&path)).unwrap_err();

        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_invalid_toml_is_parse_error_naming_the_file() {
        let path = scratch_file("invalid", "[[[ not valid toml");

        let err = load_config(Some(&path)).unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_resolve_prefers_flags_over_file() {
        // Arrange
        let mut file = AppConfig::default();
        file.serial.device = "/dev/from-file".to_string();
        file.serial.baud_rate = 57_600;

        // Act
        let settings = Settings::resolve(Some("/dev/from-flag".to_string()), None, 0, false, file);

        // Assert
        assert_eq!(settings.device, "/dev/from-flag");
        assert_eq!(settings.baud_rate, 57_600);
        assert_eq!(settings.log_filter, "warn");
    }

    #[test]
    fn test_resolve_maps_verbosity_to_filter() {
        let filter = |v| Settings::resolve(None, None, v, false, AppConfig::default()).log_filter;
        assert_eq!(filter(1), "info");
        assert_eq!(filter(2), "debug");
        assert_eq!(filter(3), "trace");
        assert_eq!(filter(9), "trace");
    }

    #[test]
    fn test_resolve_converts_interactive_section() {
        let mut file = AppConfig::default();
        file.interactive.poll_interval_ms = 5;
        file.interactive.marker_radius = 8;

        let settings = Settings::resolve(None, None, 0, false, file);

        assert_eq!(settings.interactive.poll_interval, Duration::from_millis(5));
        assert_eq!(settings.interactive.marker_radius, 8);
        assert_eq!(settings.interactive.background, Colour::BLACK);
    }

    #[test]
    fn test_default_config_path_ends_with_config_toml() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with(Path::new(APP_DIR).join("config.toml")));
        }
    }
}
