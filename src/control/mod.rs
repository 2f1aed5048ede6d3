//! Command mode handling.
//!
//! - `controller`: the normal/command state machine driving the height state
//! - `status`: the status line shown while in command mode

mod controller;
mod status;

pub use controller::Controller;
pub use status::StatusLine;
