//! Terminal input handling.
//!
//! - `parser`: escape-sequence parser turning raw bytes into keys
//! - `magic`: repeated trigger byte detector for entering command mode
//! - `numeric`: buffer for typing a new height or delta
//! - `stdin`: the loop that fans raw stdin out to all of the above

mod magic;
mod numeric;
mod parser;
mod stdin;

use std::time::Instant;

pub use magic::{MagicConfig, MagicDetector, DEFAULT_MAGIC_COUNT, DEFAULT_MAGIC_WINDOW};
pub use numeric::{Entry, EntryError, NumericBuffer};
pub use parser::{EscapeParser, DEFAULT_ESC_TIMEOUT};
pub use stdin::InputPump;

/// Raw bytes read from the terminal and when they arrived
#[derive(Debug, Clone)]
pub struct InputChunk {
    pub bytes: Vec<u8>,
    pub received_at: Instant,
}

impl InputChunk {
    pub fn new(bytes: &[u8], received_at: Instant) -> Self {
        Self {
            bytes: bytes.to_vec(),
            received_at,
        }
    }
}
