//! Data models for tallpty
//!
//! This module contains the core data structures:
//! - Operating and numeric entry modes
//! - Decoded key events
//! - The shared fake height state
//! - Window sizes

pub mod enums;
pub mod height;
pub mod key;
pub mod size;

// Re-exports for convenient access
pub use enums::{EntryMode, Mode, SharedMode};
pub use height::{HeightSnapshot, HeightSource, HeightState, MAX_DELTA, MAX_HEIGHT, MIN_HEIGHT};
pub use key::{Key, Modifier};
pub use size::WindowSize;
