//! Child process spawning with PTY setup.

use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::thread;

use portable_pty::{native_pty_system, CommandBuilder};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::WindowSize;

/// Shell used when `$SHELL` is unset
const FALLBACK_SHELL: &str = "/bin/sh";

/// Result of spawning the child process
pub struct SpawnResult {
    pub child: Box<dyn portable_pty::Child + Send + Sync>,
    pub reader_thread: thread::JoinHandle<()>,
    pub master_pty: Box<dyn portable_pty::MasterPty + Send>,
    pub pty_writer: Box<dyn Write + Send>,
}

/// Program and arguments to run in the PTY
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launch {
    pub program: OsString,
    pub args: Vec<String>,
}

impl Launch {
    /// Work out what to run for a user-supplied command line.
    ///
    /// - nothing given: the user's shell
    /// - a program found on `PATH`: that program, directly
    /// - anything else (alias, builtin, function): `$SHELL -ic '<command line>'`,
    ///   interactive so the shell reads the rc files that define them
    pub fn resolve(command: &[String], shell: Option<String>) -> Self {
        let shell = shell
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| FALLBACK_SHELL.to_string());

        let Some((program, args)) = command.split_first() else {
            return Self {
                program: shell.into(),
                args: Vec::new(),
            };
        };

        match which::which(program) {
            Ok(path) => Self {
                program: path.into_os_string(),
                args: args.to_vec(),
            },
            Err(e) => {
                debug!(program = %program, error = %e, "not on PATH, running through the shell");
                let line = command
                    .iter()
                    .map(|arg| shell_quote(arg))
                    .collect::<Vec<_>>()
                    .join(" ");
                Self {
                    program: shell.into(),
                    args: vec!["-ic".to_string(), line],
                }
            }
        }
    }

    pub fn display_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    fn command(&self) -> CommandBuilder {
        let mut cmd = CommandBuilder::new(&self.program);
        cmd.args(&self.args);
        // Start where tallpty was invoked
        if let Ok(cwd) = std::env::current_dir() {
            cmd.cwd(&cwd);
        }
        cmd.env("TALLPTY", "1");
        cmd
    }
}

/// Quote an argument for `sh -c` unless it is plainly safe
fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Spawn the child on a fresh PTY of the given size.
///
/// A background thread copies everything the child writes to our stdout
/// until the PTY reports end of file.
pub fn spawn_child(launch: &Launch, size: WindowSize) -> Result<SpawnResult> {
    let pty_system = native_pty_system();
    let pair = pty_system
        .openpty(size.into())
        .map_err(|e| Error::PtyCreation(e.to_string()))?;

    let child = pair
        .slave
        .spawn_command(launch.command())
        .map_err(|e| Error::SpawnFailed {
            program: launch.display_name(),
            reason: e.to_string(),
        })?;
    info!(
        program = %launch.display_name(),
        pid = ?child.process_id(),
        rows = size.rows,
        cols = size.cols,
        "spawned child"
    );

    // Drop slave after spawning so EOF reaches us when the child exits
    drop(pair.slave);

    // Clone reader for background thread (must be done before take_writer)
    let reader = pair
        .master
        .try_clone_reader()
        .map_err(|e| Error::PtyCreation(e.to_string()))?;

    let pty_writer = pair
        .master
        .take_writer()
        .map_err(|e| Error::PtyCreation(e.to_string()))?;

    let reader_thread = thread::Builder::new()
        .name("pty-output".to_string())
        .spawn(move || {
            // Unlocked handle: each write takes the stdout lock on its own,
            // so the status line can draw between chunks
            match forward_output(reader, io::stdout()) {
                Ok(total) => debug!(bytes = total, "child output closed"),
                Err(e) => debug!(error = %e, "child output forwarding stopped"),
            }
        })?;

    Ok(SpawnResult {
        child,
        reader_thread,
        master_pty: pair.master,
        pty_writer,
    })
}

/// Copy child output to `out` unmodified until end of file.
///
/// `out` must not hold a lock across reads: while the child is idle this
/// blocks in `read` for as long as the child runs.
///
/// On Linux, reading the master after the last slave closes fails with EIO;
/// that is the normal end of the stream, not an error.
pub fn forward_output<R: Read, W: Write>(mut reader: R, mut out: W) -> io::Result<u64> {
    let mut buf = [0u8; 4096];
    let mut total = 0u64;
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => {
                out.write_all(&buf[..n])?;
                out.flush()?;
                total += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if is_eio(&e) => return Ok(total),
            Err(e) => return Err(e),
        }
    }
}

/// EIO on every unix portable-pty supports
#[cfg(unix)]
const EIO: i32 = 5;

#[cfg(unix)]
fn is_eio(e: &io::Error) -> bool {
    e.raw_os_error() == Some(EIO)
}

#[cfg(not(unix))]
fn is_eio(_e: &io::Error) -> bool {
    false
}
