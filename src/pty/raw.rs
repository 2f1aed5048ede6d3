//! Raw mode for the controlling terminal.

use std::io::{self, IsTerminal};

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::{debug, warn};

/// Puts stdin in raw mode for as long as it lives.
///
/// Does nothing when stdin is not a terminal (piped input, tests).
#[derive(Debug)]
pub struct RawModeGuard {
    active: bool,
}

impl RawModeGuard {
    pub fn enter() -> io::Result<Self> {
        if !io::stdin().is_terminal() {
            debug!("stdin is not a terminal, leaving terminal mode alone");
            return Ok(Self { active: false });
        }
        enable_raw_mode()?;
        debug!("raw mode enabled");
        Ok(Self { active: true })
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if !self.active {
            return;
        }
        match disable_raw_mode() {
            Ok(()) => debug!("raw mode restored"),
            Err(e) => warn!(error = %e, "failed to restore terminal mode"),
        }
    }
}
