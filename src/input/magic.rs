//! Magic-sequence detector.
//!
//! Watches the raw stdin stream for a trigger byte repeated quickly enough
//! and fires a command-mode pulse. It only observes: bytes are neither
//! consumed nor suppressed.

use std::time::{Duration, Instant};

/// Ctrl-\, the byte a terminal maps to SIGQUIT.
pub const DEFAULT_MAGIC_BYTE: u8 = 0x1c;
pub const DEFAULT_MAGIC_COUNT: u32 = 3;
pub const DEFAULT_MAGIC_WINDOW: Duration = Duration::from_millis(500);

/// Trigger byte, repetition count, and sliding window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MagicConfig {
    pub byte: u8,
    pub count: u32,
    pub window: Duration,
}

impl Default for MagicConfig {
    fn default() -> Self {
        Self {
            byte: DEFAULT_MAGIC_BYTE,
            count: DEFAULT_MAGIC_COUNT,
            window: DEFAULT_MAGIC_WINDOW,
        }
    }
}

#[derive(Debug)]
pub struct MagicDetector {
    config: MagicConfig,
    seen: u32,
    last_seen: Option<Instant>,
}

impl MagicDetector {
    pub fn new(config: MagicConfig) -> Self {
        Self {
            config: MagicConfig {
                count: config.count.max(1),
                ..config
            },
            seen: 0,
            last_seen: None,
        }
    }

    /// Count trigger bytes in a chunk received at `now`.
    ///
    /// Returns true if the threshold was reached at least once in this chunk.
    pub fn observe(&mut self, bytes: &[u8], now: Instant) -> bool {
        if let Some(last) = self.last_seen {
            if now.saturating_duration_since(last) > self.config.window {
                self.seen = 0;
            }
        }

        let mut fired = false;
        for &byte in bytes {
            if byte != self.config.byte {
                continue;
            }
            self.seen += 1;
            self.last_seen = Some(now);
            if self.seen >= self.config.count {
                self.seen = 0;
                fired = true;
            }
        }
        fired
    }

    /// Trigger bytes counted toward the next firing.
    pub fn pending(&self) -> u32 {
        self.seen
    }
}
