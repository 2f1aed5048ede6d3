//! Mode/command controller.
//!
//! Owns the normal/command state machine and the numeric entry buffer, and
//! is the only writer of the shared height state. Every committed change is
//! followed by a resize pulse.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::StatusLine;
use crate::input::{Entry, EntryError, NumericBuffer};
use crate::models::{EntryMode, HeightState, Key, Mode, SharedMode};
use crate::pulse::{PulseReceiver, PulseSender};

/// What handling one event did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Normal mode, or a key with nothing bound to it
    Ignored,
    /// Controller-local state changed (entry buffer, mode entered)
    Changed,
    /// Height state changed and a resize was requested
    Resized,
    /// Back to normal mode
    Left,
    /// Numeric entry failed validation; nothing was committed
    Rejected(EntryError),
}

pub struct Controller {
    state: Arc<HeightState>,
    mode: Arc<SharedMode>,
    buffer: NumericBuffer,
    resize: PulseSender,
    last_error: Option<EntryError>,
}

impl Controller {
    pub fn new(state: Arc<HeightState>, mode: Arc<SharedMode>, resize: PulseSender) -> Self {
        Self {
            state,
            mode,
            buffer: NumericBuffer::default(),
            resize,
            last_error: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode.get()
    }

    pub fn buffer(&self) -> &NumericBuffer {
        &self.buffer
    }

    pub fn last_error(&self) -> Option<&EntryError> {
        self.last_error.as_ref()
    }

    /// Magic sequence seen: switch to command mode whatever the current mode.
    pub fn enter_command_mode(&mut self) -> Outcome {
        if self.mode.replace(Mode::Command) == Mode::Normal {
            info!("entered command mode");
        }
        Outcome::Changed
    }

    pub fn handle_key(&mut self, key: Key) -> Outcome {
        if self.mode.get() != Mode::Command {
            return Outcome::Ignored;
        }
        self.last_error = None;
        debug!(?key, entry = ?self.buffer.mode(), "command key");
        if self.buffer.is_active() {
            self.handle_entry_key(key)
        } else {
            self.dispatch(key)
        }
    }

    fn dispatch(&mut self, key: Key) -> Outcome {
        match key {
            Key::Escape => {
                self.buffer.clear();
                self.mode.set(Mode::Normal);
                info!("left command mode");
                Outcome::Left
            }
            Key::Char('n') => {
                self.buffer.begin(EntryMode::EnteringHeight);
                Outcome::Changed
            }
            Key::Char('d') => {
                self.buffer.begin(EntryMode::EnteringDelta);
                Outcome::Changed
            }
            Key::Char(' ') => {
                let real = self.state.toggle_real_size();
                debug!(use_real_size = real, "toggled real size");
                self.request_resize()
            }
            Key::Char('r') => {
                self.state.reset();
                debug!(snapshot = ?self.state.snapshot(), "reset height state");
                self.request_resize()
            }
            Key::Up(modifier) => {
                self.state.step(modifier.step());
                self.request_resize()
            }
            Key::Down(modifier) => {
                self.state.step(-modifier.step());
                self.request_resize()
            }
            _ => Outcome::Ignored,
        }
    }

    fn handle_entry_key(&mut self, key: Key) -> Outcome {
        match key {
            Key::Escape => {
                self.buffer.clear();
                Outcome::Changed
            }
            Key::Backspace => {
                self.buffer.backspace();
                Outcome::Changed
            }
            Key::Char(c) => {
                if self.buffer.push(c) {
                    Outcome::Changed
                } else {
                    Outcome::Ignored
                }
            }
            Key::Enter => match self.buffer.parse() {
                Ok(entry) => {
                    match entry {
                        Entry::Height(rows) => self.state.set_absolute(rows),
                        Entry::Delta(delta) => self.state.set_delta(delta),
                    }
                    info!(?entry, "committed entry");
                    self.buffer.clear();
                    self.request_resize()
                }
                Err(e) => {
                    debug!(error = %e, text = self.buffer.text(), "rejected entry");
                    self.last_error = Some(e.clone());
                    Outcome::Rejected(e)
                }
            },
            _ => Outcome::Ignored,
        }
    }

    fn request_resize(&self) -> Outcome {
        self.resize.fire();
        Outcome::Resized
    }

    /// Controller task: consume decoded keys and magic pulses until the key
    /// queue closes.
    pub async fn run(
        mut self,
        mut keys: mpsc::Receiver<Key>,
        mut magic: PulseReceiver,
        status: Option<StatusLine>,
    ) {
        let mut magic_open = true;
        loop {
            // A magic pulse is handled before any key queued behind it
            let outcome = tokio::select! {
                biased;
                fired = magic.wait(), if magic_open => {
                    if !fired {
                        magic_open = false;
                        continue;
                    }
                    self.enter_command_mode()
                }
                key = keys.recv() => match key {
                    Some(key) => self.handle_key(key),
                    None => break,
                },
            };

            if let Some(status) = &status {
                self.refresh_status(status, &outcome);
            }
        }
        debug!("key queue closed, controller stopping");
    }

    fn refresh_status(&self, status: &StatusLine, outcome: &Outcome) {
        match outcome {
            Outcome::Ignored => {}
            Outcome::Left => status.clear(),
            _ => status.show(
                self.state.snapshot(),
                self.buffer.mode(),
                self.buffer.text(),
                self.last_error.as_ref(),
            ),
        }
    }
}
