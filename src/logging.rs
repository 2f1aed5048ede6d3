//! Logging setup.
//!
//! The child owns stdout and stderr, so logs only ever go to a file: the one
//! given with `--log-file`, or a default one when `TALLPTY_LOG` is set.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "TALLPTY_LOG";

const DEFAULT_FILTER: &str = "info";

/// Log file used when only `TALLPTY_LOG` is set
pub fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("tallpty"))
        .unwrap_or_else(std::env::temp_dir)
        .join("tallpty.log")
}

/// Where logs should go, if anywhere
pub fn log_path(explicit: Option<&Path>, filter_set: bool) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None if filter_set => Some(default_log_path()),
        None => None,
    }
}

/// Install the global subscriber. Returns the log file in use, if any.
pub fn init(log_file: Option<&Path>) -> io::Result<Option<PathBuf>> {
    let filter_set = std::env::var_os(LOG_ENV).is_some();
    let Some(path) = log_path(log_file, filter_set) else {
        return Ok(None);
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .try_init()
        .map_err(io::Error::other)?;

    Ok(Some(path))
}
