//! Escape-sequence parser for command mode keystrokes.
//!
//! Byte `0x1B` is both the Escape key and the first byte of a CSI sequence.
//! A pending ESC that sees no follow-up within the timeout is a standalone
//! Escape; the check runs when the next byte arrives, and the parser task
//! also flushes it once the deadline passes with no input at all.

use std::time::{Duration, Instant};

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, trace, warn};

use super::InputChunk;
use crate::models::Key;

/// Default timeout for disambiguating a bare ESC from a CSI sequence.
pub const DEFAULT_ESC_TIMEOUT: Duration = Duration::from_millis(100);

/// Longest CSI body kept before the sequence is abandoned.
const MAX_CSI_LEN: usize = 32;

const ESC: u8 = 0x1b;
const DEL: u8 = 0x7f;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    SawEscape,
    SawEscapeBracket,
}

/// Byte-at-a-time key decoder.
#[derive(Debug)]
pub struct EscapeParser {
    state: State,
    /// Bytes after `ESC [`, including the final byte once it arrives.
    csi: Vec<u8>,
    /// When the pending ESC was seen.
    esc_at: Option<Instant>,
    timeout: Duration,
}

impl Default for EscapeParser {
    fn default() -> Self {
        Self::new(DEFAULT_ESC_TIMEOUT)
    }
}

impl EscapeParser {
    pub fn new(timeout: Duration) -> Self {
        Self {
            state: State::Idle,
            csi: Vec::with_capacity(8),
            esc_at: None,
            timeout,
        }
    }

    /// Decode a chunk of raw bytes received at `now`.
    pub fn feed(&mut self, bytes: &[u8], now: Instant) -> Vec<Key> {
        let mut keys = Vec::new();
        for &byte in bytes {
            self.push(byte, now, &mut keys);
        }
        keys
    }

    /// Instant after which a pending ESC counts as standalone.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            State::Idle => None,
            _ => self.esc_at.map(|at| at + self.timeout),
        }
    }

    /// Emit the pending ESC if its timeout has elapsed with no further input.
    pub fn flush_expired(&mut self, now: Instant) -> Option<Key> {
        if self.state != State::Idle && self.expired(now) {
            self.reset();
            Some(Key::Escape)
        } else {
            None
        }
    }

    fn expired(&self, now: Instant) -> bool {
        self.esc_at
            .is_some_and(|at| now.saturating_duration_since(at) > self.timeout)
    }

    fn reset(&mut self) {
        self.state = State::Idle;
        self.csi.clear();
        self.esc_at = None;
    }

    fn push(&mut self, byte: u8, now: Instant, keys: &mut Vec<Key>) {
        if self.state != State::Idle && self.expired(now) {
            keys.push(Key::Escape);
            self.reset();
        }

        // A standalone ESC hands its follow-up byte back to Idle; loop rather
        // than recurse so the stack stays flat whatever the input.
        loop {
            match self.state {
                State::Idle => {
                    self.push_idle(byte, now, keys);
                    return;
                }
                State::SawEscape => {
                    if byte == b'[' {
                        self.state = State::SawEscapeBracket;
                        self.csi.clear();
                        return;
                    }
                    keys.push(Key::Escape);
                    self.reset();
                }
                State::SawEscapeBracket => {
                    self.csi.push(byte);
                    if (0x40..=0x7e).contains(&byte) {
                        match Key::from_csi(&self.csi) {
                            Some(key) => keys.push(key),
                            None => trace!(sequence = ?self.csi, "ignoring unsupported CSI sequence"),
                        }
                        self.reset();
                    } else if self.csi.len() > MAX_CSI_LEN {
                        self.reset();
                    }
                    return;
                }
            }
        }
    }

    fn push_idle(&mut self, byte: u8, now: Instant, keys: &mut Vec<Key>) {
        match byte {
            ESC => {
                self.state = State::SawEscape;
                self.esc_at = Some(now);
            }
            DEL => keys.push(Key::Backspace),
            b'\r' | b'\n' => keys.push(Key::Enter),
            0x20..=0x7e => keys.push(Key::Char(byte as char)),
            _ => {}
        }
    }

    /// Parser task: decode chunks from the stdin loop and queue the keys.
    ///
    /// Runs until the chunk channel closes. A full key queue drops the key
    /// rather than stalling the stdin loop behind it.
    pub async fn run(mut self, mut chunks: mpsc::Receiver<InputChunk>, keys: mpsc::Sender<Key>) {
        loop {
            let chunk = match self.deadline() {
                Some(deadline) => {
                    // One tick past the deadline so `expired` sees strictly more than the timeout.
                    let wake = tokio::time::Instant::from_std(deadline + Duration::from_millis(1));
                    match tokio::time::timeout_at(wake, chunks.recv()).await {
                        Ok(chunk) => chunk,
                        Err(_) => {
                            if let Some(key) = self.flush_expired(Instant::now()) {
                                if !deliver(&keys, key) {
                                    return;
                                }
                            }
                            continue;
                        }
                    }
                }
                None => chunks.recv().await,
            };

            let Some(chunk) = chunk else {
                debug!("input closed, parser stopping");
                return;
            };
            for key in self.feed(&chunk.bytes, chunk.received_at) {
                if !deliver(&keys, key) {
                    return;
                }
            }
        }
    }
}

/// Queue a key without blocking. Returns false once the consumer is gone.
fn deliver(keys: &mpsc::Sender<Key>, key: Key) -> bool {
    match keys.try_send(key) {
        Ok(()) => true,
        Err(TrySendError::Full(key)) => {
            warn!(?key, "key event queue full, dropping key");
            true
        }
        Err(TrySendError::Closed(_)) => false,
    }
}
