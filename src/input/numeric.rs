//! Numeric input buffer for typing a new height or delta in command mode.

use std::num::IntErrorKind;

use thiserror::Error;

use crate::models::{EntryMode, MAX_DELTA, MAX_HEIGHT, MIN_HEIGHT};

/// Why a numeric entry could not be committed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error("nothing entered")]
    Empty,
    #[error("delta needs a leading + or -")]
    MissingSign,
    #[error("not a number: {0}")]
    NotANumber(String),
    #[error("height must be between {} and {}", MIN_HEIGHT, MAX_HEIGHT)]
    HeightOutOfRange,
    #[error("delta must be between -{} and +{}", MAX_DELTA, MAX_DELTA)]
    DeltaOutOfRange,
    #[error("no entry in progress")]
    Inactive,
}

/// A validated value ready to be committed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    Height(u16),
    Delta(i32),
}

/// Characters typed so far and what they are for
#[derive(Debug, Default)]
pub struct NumericBuffer {
    mode: EntryMode,
    text: String,
}

impl NumericBuffer {
    /// Start composing a value, discarding anything typed before.
    pub fn begin(&mut self, mode: EntryMode) {
        self.mode = mode;
        self.text.clear();
    }

    /// Drop the entry and return to command dispatch.
    pub fn clear(&mut self) {
        self.mode = EntryMode::None;
        self.text.clear();
    }

    pub fn mode(&self) -> EntryMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.mode.is_active()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Append a character if it is valid at this position.
    ///
    /// Digits are always accepted; a sign only as the first character of a
    /// delta. Returns whether the character was taken.
    pub fn push(&mut self, c: char) -> bool {
        let accepted = match c {
            '0'..='9' => true,
            '+' | '-' => self.mode == EntryMode::EnteringDelta && self.text.is_empty(),
            _ => false,
        };
        if accepted {
            self.text.push(c);
        }
        accepted
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    /// Validate the buffer without consuming it.
    pub fn parse(&self) -> Result<Entry, EntryError> {
        if self.text.is_empty() {
            return Err(EntryError::Empty);
        }
        match self.mode {
            EntryMode::None => Err(EntryError::Inactive),
            EntryMode::EnteringHeight => {
                let rows = parse_int(&self.text, EntryError::HeightOutOfRange)?;
                if (MIN_HEIGHT..=MAX_HEIGHT).contains(&rows) {
                    Ok(Entry::Height(rows as u16))
                } else {
                    Err(EntryError::HeightOutOfRange)
                }
            }
            EntryMode::EnteringDelta => {
                if !self.text.starts_with(['+', '-']) {
                    return Err(EntryError::MissingSign);
                }
                let delta = parse_int(&self.text, EntryError::DeltaOutOfRange)?;
                if (-MAX_DELTA..=MAX_DELTA).contains(&delta) {
                    Ok(Entry::Delta(delta))
                } else {
                    Err(EntryError::DeltaOutOfRange)
                }
            }
        }
    }
}

fn parse_int(text: &str, overflow: EntryError) -> Result<i32, EntryError> {
    text.parse::<i32>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => overflow,
        _ => EntryError::NotANumber(text.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(mode: EntryMode, text: &str) -> NumericBuffer {
        let mut buffer = NumericBuffer::default();
        buffer.begin(mode);
        for c in text.chars() {
            buffer.push(c);
        }
        buffer
    }

    #[test]
    fn test_height_entry() {
        assert_eq!(
            typed(EntryMode::EnteringHeight, "50").parse(),
            Ok(Entry::Height(50))
        );
        assert_eq!(
            typed(EntryMode::EnteringHeight, "9999").parse(),
            Ok(Entry::Height(9999))
        );
    }

    #[test]
    fn test_height_out_of_range() {
        assert_eq!(
            typed(EntryMode::EnteringHeight, "0").parse(),
            Err(EntryError::HeightOutOfRange)
        );
        assert_eq!(
            typed(EntryMode::EnteringHeight, "10000").parse(),
            Err(EntryError::HeightOutOfRange)
        );
        assert_eq!(
            typed(EntryMode::EnteringHeight, "99999999999999").parse(),
            Err(EntryError::HeightOutOfRange)
        );
    }

    #[test]
    fn test_height_rejects_sign() {
        let mut buffer = typed(EntryMode::EnteringHeight, "");
        assert!(!buffer.push('+'));
        assert!(!buffer.push('-'));
        assert_eq!(buffer.text(), "");
    }

    #[test]
    fn test_delta_requires_sign() {
        assert_eq!(
            typed(EntryMode::EnteringDelta, "5").parse(),
            Err(EntryError::MissingSign)
        );
        assert_eq!(
            typed(EntryMode::EnteringDelta, "+5").parse(),
            Ok(Entry::Delta(5))
        );
        assert_eq!(
            typed(EntryMode::EnteringDelta, "-12").parse(),
            Ok(Entry::Delta(-12))
        );
    }

    #[test]
    fn test_delta_sign_only_first() {
        let mut buffer = typed(EntryMode::EnteringDelta, "+");
        assert!(!buffer.push('-'));
        assert!(!buffer.push('+'));
        buffer.push('3');
        assert!(!buffer.push('-'));
        assert_eq!(buffer.text(), "+3");
    }

    #[test]
    fn test_delta_bare_sign_is_not_a_number() {
        assert_eq!(
            typed(EntryMode::EnteringDelta, "-").parse(),
            Err(EntryError::NotANumber("-".to_string()))
        );
    }

    #[test]
    fn test_delta_out_of_range() {
        assert_eq!(
            typed(EntryMode::EnteringDelta, "+10000").parse(),
            Err(EntryError::DeltaOutOfRange)
        );
        assert_eq!(
            typed(EntryMode::EnteringDelta, "-9999").parse(),
            Ok(Entry::Delta(-9999))
        );
    }

    #[test]
    fn test_empty_buffer() {
        assert_eq!(
            typed(EntryMode::EnteringHeight, "").parse(),
            Err(EntryError::Empty)
        );
    }

    #[test]
    fn test_backspace_and_clear() {
        let mut buffer = typed(EntryMode::EnteringDelta, "+42");
        buffer.backspace();
        assert_eq!(buffer.text(), "+4");
        buffer.backspace();
        buffer.backspace();
        buffer.backspace();
        assert_eq!(buffer.text(), "");
        // Sign is allowed again once the buffer is empty
        assert!(buffer.push('-'));
        buffer.clear();
        assert!(!buffer.is_active());
        assert_eq!(buffer.text(), "");
    }

    #[test]
    fn test_non_digits_rejected() {
        let mut buffer = typed(EntryMode::EnteringHeight, "");
        assert!(!buffer.push('x'));
        assert!(!buffer.push(' '));
        assert!(buffer.push('7'));
        assert_eq!(buffer.text(), "7");
    }

    #[test]
    fn test_begin_discards_previous_text() {
        let mut buffer = typed(EntryMode::EnteringHeight, "12");
        buffer.begin(EntryMode::EnteringDelta);
        assert_eq!(buffer.text(), "");
        assert_eq!(buffer.mode(), EntryMode::EnteringDelta);
    }
}
