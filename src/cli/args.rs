//! CLI argument parsing and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::input::{MagicConfig, DEFAULT_ESC_TIMEOUT, DEFAULT_MAGIC_COUNT, DEFAULT_MAGIC_WINDOW};
use crate::models::{MAX_DELTA, MAX_HEIGHT, MIN_HEIGHT};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Starting absolute height when `--height` is not given
pub const DEFAULT_HEIGHT: u16 = 1000;

/// Starting delta when neither `--height` nor `--delta` is given
pub const DEFAULT_DELTA: i32 = 2000;

/// CLI arguments for tallpty
#[derive(Parser, Debug, Clone)]
#[command(name = "tallpty")]
#[command(version)]
#[command(about = "Run a program in a PTY that reports a fake, adjustable terminal height")]
#[command(after_help = "\
Press the magic byte (Ctrl-\\ by default) three times quickly to enter command mode:
  space        toggle the real terminal height
  n            type a new height, Enter to apply
  d            type a signed delta from the real height (+N / -N)
  r            reset height and delta to their starting values
  Up/Down      step by 1 (Shift: 20, Ctrl: 200)
  Esc          back to the program")]
pub struct CliArgs {
    /// Fixed row count to report [default: real height +2000]
    #[arg(short = 'n', long, value_name = "ROWS",
          value_parser = clap::value_parser!(u16).range(MIN_HEIGHT as i64..=MAX_HEIGHT as i64))]
    pub height: Option<u16>,

    /// Rows added to the real height instead of a fixed height (e.g. +5, -3)
    #[arg(short, long, value_name = "ROWS", allow_hyphen_values = true,
          value_parser = parse_delta)]
    pub delta: Option<i32>,

    /// Byte that enters command mode when repeated (decimal or 0x hex)
    #[arg(long, value_name = "BYTE", default_value = "0x1c", value_parser = parse_byte)]
    pub magic_byte: u8,

    /// How many magic bytes in a row enter command mode
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAGIC_COUNT,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub magic_count: u32,

    /// Window the magic bytes must arrive within, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_MAGIC_WINDOW.as_millis() as u64)]
    pub magic_window_ms: u64,

    /// How long a lone ESC waits for the rest of an escape sequence, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_ESC_TIMEOUT.as_millis() as u64)]
    pub esc_timeout_ms: u64,

    /// Do not draw the status line in command mode
    #[arg(long)]
    pub no_status: bool,

    /// Write logs to FILE (filter with TALLPTY_LOG)
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Program to run and its arguments (default: $SHELL)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Validated configuration the session runs with
#[derive(Debug, Clone)]
pub struct Config {
    pub height: u16,
    pub delta: i32,
    pub magic: MagicConfig,
    pub esc_timeout: Duration,
    pub status: bool,
    pub log_file: Option<PathBuf>,
    pub command: Vec<String>,
}

impl From<CliArgs> for Config {
    fn from(args: CliArgs) -> Self {
        let (height, delta) = match (args.height, args.delta) {
            (None, None) => (DEFAULT_HEIGHT, DEFAULT_DELTA),
            (height, delta) => (height.unwrap_or(DEFAULT_HEIGHT), delta.unwrap_or(0)),
        };
        Self {
            height,
            delta,
            magic: MagicConfig {
                byte: args.magic_byte,
                count: args.magic_count,
                window: Duration::from_millis(args.magic_window_ms),
            },
            esc_timeout: Duration::from_millis(args.esc_timeout_ms),
            status: !args.no_status,
            log_file: args.log_file,
            command: args.command,
        }
    }
}

/// Parse CLI arguments and return configuration
///
/// Exits with usage on invalid arguments, before the terminal is touched.
pub fn parse_args() -> Config {
    CliArgs::parse().into()
}

fn parse_delta(s: &str) -> Result<i32, String> {
    let delta: i32 = s
        .parse()
        .map_err(|_| format!("invalid delta value: {}", s))?;
    if (-MAX_DELTA..=MAX_DELTA).contains(&delta) {
        Ok(delta)
    } else {
        Err(format!("delta must be between -{} and +{}", MAX_DELTA, MAX_DELTA))
    }
}

fn parse_byte(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|_| format!("invalid byte value: {} (expected 0-255 or 0x00-0xff)", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Config, clap::Error> {
        let argv = std::iter::once("tallpty").chain(args.iter().copied());
        CliArgs::try_parse_from(argv).map(Config::from)
    }

    #[test]
    fn test_cli_definition_is_valid() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.height, DEFAULT_HEIGHT);
        assert_eq!(config.delta, DEFAULT_DELTA);
        assert_eq!(config.magic, MagicConfig::default());
        assert_eq!(config.esc_timeout, Duration::from_millis(100));
        assert!(config.status);
        assert!(config.command.is_empty());
    }

    #[test]
    fn test_command_with_its_own_flags() {
        let config = parse(&["-n", "300", "less", "-R", "+G", "file.txt"]).unwrap();
        assert_eq!(config.height, 300);
        assert_eq!(config.delta, 0);
        assert_eq!(config.command, vec!["less", "-R", "+G", "file.txt"]);
    }

    #[test]
    fn test_delta_accepts_sign() {
        assert_eq!(parse(&["--delta", "-3"]).unwrap().delta, -3);
        assert_eq!(parse(&["-d", "+12"]).unwrap().delta, 12);
        assert_eq!(parse(&["-d", "0"]).unwrap().delta, 0);
        assert!(parse(&["--delta", "+10000"]).is_err());
    }

    #[test]
    fn test_height_range() {
        assert!(parse(&["--height", "0"]).is_err());
        assert!(parse(&["--height", "10000"]).is_err());
        assert_eq!(parse(&["--height", "9999"]).unwrap().height, 9999);
    }

    #[test]
    fn test_magic_options() {
        let config = parse(&[
            "--magic-byte",
            "0x07",
            "--magic-count",
            "2",
            "--magic-window-ms",
            "250",
            "--no-status",
        ])
        .unwrap();
        assert_eq!(config.magic.byte, 0x07);
        assert_eq!(config.magic.count, 2);
        assert_eq!(config.magic.window, Duration::from_millis(250));
        assert!(!config.status);
        assert_eq!(parse(&["--magic-byte", "28"]).unwrap().magic.byte, 0x1c);
        assert!(parse(&["--magic-byte", "0x100"]).is_err());
        assert!(parse(&["--magic-count", "0"]).is_err());
    }

    #[test]
    fn test_explicit_height_drops_default_delta() {
        let config = parse(&["-n", "500"]).unwrap();
        assert_eq!((config.height, config.delta), (500, 0));

        let config = parse(&["-n", "500", "-d", "-4"]).unwrap();
        assert_eq!((config.height, config.delta), (500, -4));

        let config = parse(&["-d", "+7"]).unwrap();
        assert_eq!((config.height, config.delta), (DEFAULT_HEIGHT, 7));
    }
}
