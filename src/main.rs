mod cli;
mod control;
mod error;
mod input;
mod logging;
mod models;
mod pty;
mod pulse;
mod session;

use std::process::ExitCode;

use tracing::{error, info};

fn main() -> ExitCode {
    let config = cli::parse_args();

    match logging::init(config.log_file.as_deref()) {
        Ok(Some(path)) => info!(version = cli::VERSION, log = %path.display(), "tallpty starting"),
        Ok(None) => {}
        Err(e) => eprintln!("tallpty: cannot open log file: {}", e),
    }

    match session::run(config) {
        Ok(code) => {
            info!(code, "session finished");
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
        Err(e) => {
            error!(error = %e, "session failed");
            eprintln!("tallpty: {}", e);
            ExitCode::FAILURE
        }
    }
}
