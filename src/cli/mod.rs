//! CLI argument parsing for tallpty.

mod args;

pub use args::{parse_args, Config, VERSION};
