//! Enums used throughout tallpty
//!
//! This module contains the mode types shared between the input loop,
//! the command controller, and the status line.

use std::sync::atomic::{AtomicU8, Ordering};

/// Operating mode for the input pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,  // Input is forwarded verbatim to the child
    Command, // Input is intercepted and interpreted as commands
}

impl Mode {
    fn to_u8(self) -> u8 {
        match self {
            Mode::Normal => 0,
            Mode::Command => 1,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => Mode::Command,
            _ => Mode::Normal,
        }
    }
}

/// Operating mode shared between the stdin loop, the magic trigger consumer,
/// and the controller.
///
/// A single atomic byte: reads never block and never observe a torn value.
#[derive(Debug, Default)]
pub struct SharedMode(AtomicU8);

impl SharedMode {
    pub fn new(mode: Mode) -> Self {
        Self(AtomicU8::new(mode.to_u8()))
    }

    pub fn get(&self) -> Mode {
        Mode::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, mode: Mode) {
        self.0.store(mode.to_u8(), Ordering::Release);
    }

    /// Switch to `mode`, returning the mode that was replaced.
    pub fn replace(&self, mode: Mode) -> Mode {
        Mode::from_u8(self.0.swap(mode.to_u8(), Ordering::AcqRel))
    }

    pub fn is_normal(&self) -> bool {
        self.get() == Mode::Normal
    }
}

/// What the numeric input buffer is composing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryMode {
    #[default]
    None,
    EnteringHeight,
    EnteringDelta,
}

impl EntryMode {
    pub fn is_active(&self) -> bool {
        *self != EntryMode::None
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            EntryMode::None => "",
            EntryMode::EnteringHeight => "height",
            EntryMode::EnteringDelta => "delta (+/-)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_default_is_normal() {
        assert_eq!(Mode::default(), Mode::Normal);
        assert!(SharedMode::default().is_normal());
    }

    #[test]
    fn test_shared_mode_set_get() {
        let mode = SharedMode::new(Mode::Normal);
        mode.set(Mode::Command);
        assert_eq!(mode.get(), Mode::Command);
        mode.set(Mode::Normal);
        assert_eq!(mode.get(), Mode::Normal);
    }

    #[test]
    fn test_shared_mode_replace_returns_previous() {
        let mode = SharedMode::new(Mode::Normal);
        assert_eq!(mode.replace(Mode::Command), Mode::Normal);
        assert_eq!(mode.replace(Mode::Command), Mode::Command);
    }

    #[test]
    fn test_entry_mode_is_active() {
        assert!(!EntryMode::None.is_active());
        assert!(EntryMode::EnteringHeight.is_active());
        assert!(EntryMode::EnteringDelta.is_active());
    }
}
