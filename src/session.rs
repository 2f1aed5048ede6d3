//! Session wiring.
//!
//! Spawns the child at its initial fake size, puts the terminal in raw mode,
//! and runs the concurrent pieces until the child exits:
//! - stdin pump (thread): magic detector, parser queue, PTY input
//! - output forwarder (thread): PTY output to stdout
//! - parser, controller, and resize tasks on the tokio runtime
//! - SIGWINCH and termination signal watchers

use std::io;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use portable_pty::ChildKiller;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::Config;
use crate::control::{Controller, StatusLine};
use crate::error::{Error, Result};
use crate::input::{EscapeParser, InputPump, MagicDetector};
use crate::models::{HeightState, SharedMode};
use crate::pty::{
    spawn_child, target_size, watch_window_changes, ControllingTerminal, Launch, RawModeGuard,
    ResizeOrchestrator, SpawnResult, TerminalSize,
};
use crate::pulse::pulse;

/// Raw chunks waiting for the parser
const CHUNK_QUEUE_CAPACITY: usize = 64;
/// Decoded keys waiting for the controller
const KEY_QUEUE_CAPACITY: usize = 64;
/// How long to wait for trailing child output after exit
const OUTPUT_DRAIN_TIMEOUT: Duration = Duration::from_millis(500);
/// How long runtime shutdown waits for tasks still blocked
const SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(100);

/// Run the configured command and return its exit code.
pub fn run(config: Config) -> Result<i32> {
    let state = Arc::new(HeightState::new(config.height, config.delta));
    let mode = Arc::new(SharedMode::default());
    let terminal: Arc<dyn TerminalSize> = Arc::new(ControllingTerminal);

    let initial = target_size(&state, terminal.size());
    let launch = Launch::resolve(&config.command, std::env::var("SHELL").ok());
    let SpawnResult {
        mut child,
        reader_thread,
        master_pty,
        pty_writer,
    } = spawn_child(&launch, initial)?;

    let raw_mode = match RawModeGuard::enter() {
        Ok(guard) => guard,
        Err(e) => {
            let _ = child.kill();
            return Err(e.into());
        }
    };
    debug!(raw = raw_mode.is_active(), "terminal ready");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("tallpty-worker")
        .enable_all()
        .build()
        .map_err(|e| Error::Runtime(e.to_string()))?;

    let killer = child.clone_killer();
    let exit_code = runtime.block_on(async move {
        let (resize_tx, resize_rx) = pulse();
        let (magic_tx, magic_rx) = pulse();
        let (chunk_tx, chunk_rx) = mpsc::channel(CHUNK_QUEUE_CAPACITY);
        let (key_tx, key_rx) = mpsc::channel(KEY_QUEUE_CAPACITY);

        let orchestrator = ResizeOrchestrator::new(state.clone(), terminal.clone(), master_pty);
        tokio::spawn(orchestrator.run(resize_rx));

        tokio::spawn(EscapeParser::new(config.esc_timeout).run(chunk_rx, key_tx));

        let controller = Controller::new(state.clone(), mode.clone(), resize_tx.clone());
        let status = config.status.then(|| StatusLine::new(terminal.clone()));
        tokio::spawn(controller.run(key_rx, magic_rx, status));

        tokio::spawn(watch_window_changes(resize_tx.clone()));
        tokio::spawn(watch_termination(killer));

        // Blocking stdin reads cannot be cancelled, so this thread is never
        // joined; it goes away with the process.
        let pump = InputPump::new(
            MagicDetector::new(config.magic),
            mode.clone(),
            magic_tx,
            chunk_tx,
            pty_writer,
        );
        thread::Builder::new()
            .name("stdin".to_string())
            .spawn(move || {
                if let Err(e) = pump.run(io::stdin().lock()) {
                    debug!(error = %e, "stdin pump stopped");
                }
            })?;

        // Reconcile the spawn-time size against the live terminal
        resize_tx.fire();

        let status = tokio::task::spawn_blocking(move || child.wait())
            .await
            .map_err(|e| Error::Runtime(e.to_string()))?
            .map_err(|e| Error::ChildWait(e.to_string()))?;
        info!(code = status.exit_code(), "child exited");
        Ok::<i32, Error>(i32::try_from(status.exit_code()).unwrap_or(1))
    })?;

    wait_for_output(reader_thread);
    runtime.shutdown_timeout(SHUTDOWN_TIMEOUT);
    drop(raw_mode);
    Ok(exit_code)
}

/// Give the output thread a moment to flush what the child wrote last.
///
/// A background grandchild can keep the PTY open after the child exits, so
/// this does not wait forever.
fn wait_for_output(reader_thread: thread::JoinHandle<()>) {
    let deadline = Instant::now() + OUTPUT_DRAIN_TIMEOUT;
    while !reader_thread.is_finished() {
        if Instant::now() >= deadline {
            debug!("child output still open, not waiting for it");
            return;
        }
        thread::sleep(Duration::from_millis(10));
    }
    if reader_thread.join().is_err() {
        warn!("output thread panicked");
    }
}

/// Kill the child on SIGTERM, SIGHUP, or SIGINT so the session unwinds and
/// the terminal gets restored.
#[cfg(unix)]
async fn watch_termination(mut killer: Box<dyn ChildKiller + Send + Sync>) {
    use tokio::signal::unix::{signal, SignalKind};

    let (Ok(mut term), Ok(mut hup), Ok(mut int)) = (
        signal(SignalKind::terminate()),
        signal(SignalKind::hangup()),
        signal(SignalKind::interrupt()),
    ) else {
        warn!("cannot watch termination signals");
        return;
    };

    tokio::select! {
        _ = term.recv() => info!("SIGTERM received"),
        _ = hup.recv() => info!("SIGHUP received"),
        _ = int.recv() => info!("SIGINT received"),
    }
    if let Err(e) = killer.kill() {
        warn!(error = %e, "failed to stop child");
    }
}

#[cfg(not(unix))]
async fn watch_termination(mut killer: Box<dyn ChildKiller + Send + Sync>) {
    if tokio::signal::ctrl_c().await.is_ok() {
        let _ = killer.kill();
    }
}
