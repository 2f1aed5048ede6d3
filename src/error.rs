//! Error types for tallpty.

use std::io;
use thiserror::Error;

/// Errors that can end a session.
///
/// Only resource acquisition at startup is fatal; everything that goes wrong
/// once the child is running is logged and recovered from locally.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// PTY creation failed
    #[error("failed to create PTY: {0}")]
    PtyCreation(String),

    /// Failed to spawn the child process
    #[error("failed to spawn `{program}`: {reason}")]
    SpawnFailed { program: String, reason: String },

    /// Failed to apply a window size to the PTY
    #[error("failed to resize PTY to {rows}x{cols}: {reason}")]
    Resize { rows: u16, cols: u16, reason: String },

    /// Waiting on the child failed
    #[error("failed to wait for child: {0}")]
    ChildWait(String),

    /// The async runtime could not be built or a task panicked
    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Result type for tallpty operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts() {
        let err: Error = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "I/O error: gone");
    }

    #[test]
    fn test_spawn_failed_message_names_program() {
        let err = Error::SpawnFailed {
            program: "less".to_string(),
            reason: "no such file".to_string(),
        };
        assert_eq!(err.to_string(), "failed to spawn `less`: no such file");
    }

    #[test]
    fn test_resize_message_is_rows_by_cols() {
        let err = Error::Resize {
            rows: 1000,
            cols: 80,
            reason: "EBADF".to_string(),
        };
        assert_eq!(err.to_string(), "failed to resize PTY to 1000x80: EBADF");
    }
}
