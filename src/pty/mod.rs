//! PTY (pseudo-terminal) handling for the wrapped child process.
//!
//! This module encapsulates all PTY-related functionality:
//! - `spawn`: program resolution and child spawning with PTY setup
//! - `resize`: effective size computation and PTY resizing
//! - `raw`: raw mode for the controlling terminal

mod raw;
mod resize;
mod spawn;

pub use raw::RawModeGuard;
pub use resize::{
    target_size, watch_window_changes, ControllingTerminal, ResizeOrchestrator, TerminalSize,
};
pub use spawn::{spawn_child, Launch, SpawnResult};

#[cfg(test)]
pub(crate) use resize::testing;
