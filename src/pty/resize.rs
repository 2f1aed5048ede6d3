//! Resize orchestration.
//!
//! Every resize pulse (height state commit, SIGWINCH, startup) recomputes
//! the effective size from the shared state and the real terminal, and
//! applies it to the child's PTY. The width always passes through.

use std::sync::Arc;

use portable_pty::MasterPty;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{HeightState, WindowSize};
use crate::pulse::{PulseReceiver, PulseSender};

/// Source of the real terminal size
pub trait TerminalSize: Send + Sync {
    /// Current size, or `None` if it cannot be determined.
    fn query(&self) -> Option<WindowSize>;

    /// Current size, falling back to 80x24.
    fn size(&self) -> WindowSize {
        self.query().unwrap_or_default()
    }
}

/// The terminal tallpty itself runs in
#[derive(Debug, Default, Clone, Copy)]
pub struct ControllingTerminal;

impl TerminalSize for ControllingTerminal {
    fn query(&self) -> Option<WindowSize> {
        match crossterm::terminal::size() {
            Ok((cols, rows)) if cols > 0 && rows > 0 => Some(WindowSize::new(rows, cols)),
            Ok(_) => None,
            Err(e) => {
                debug!(error = %e, "terminal size unavailable");
                None
            }
        }
    }
}

/// Something that can take a new window size
pub trait PtyResizer: Send {
    fn resize(&self, size: WindowSize) -> Result<()>;
}

impl PtyResizer for Box<dyn MasterPty + Send> {
    fn resize(&self, size: WindowSize) -> Result<()> {
        MasterPty::resize(self.as_ref(), size.into()).map_err(|e| Error::Resize {
            rows: size.rows,
            cols: size.cols,
            reason: e.to_string(),
        })
    }
}

/// Size the child should see right now
pub fn target_size(state: &HeightState, real: WindowSize) -> WindowSize {
    real.with_rows(state.effective_height(real.rows))
}

pub struct ResizeOrchestrator<P> {
    state: Arc<HeightState>,
    terminal: Arc<dyn TerminalSize>,
    pty: P,
    last_applied: Option<WindowSize>,
}

impl<P: PtyResizer> ResizeOrchestrator<P> {
    pub fn new(state: Arc<HeightState>, terminal: Arc<dyn TerminalSize>, pty: P) -> Self {
        Self {
            state,
            terminal,
            pty,
            last_applied: None,
        }
    }

    /// Recompute the effective size and push it to the PTY.
    pub fn apply(&mut self) -> Result<WindowSize> {
        let target = target_size(&self.state, self.terminal.size());
        self.pty.resize(target)?;
        if self.last_applied != Some(target) {
            debug!(rows = target.rows, cols = target.cols, "applied PTY size");
        }
        self.last_applied = Some(target);
        Ok(target)
    }

    pub fn last_applied(&self) -> Option<WindowSize> {
        self.last_applied
    }

    /// Resize task: one apply per pulse until every pulse sender is gone.
    pub async fn run(mut self, mut signals: PulseReceiver) {
        while signals.wait().await {
            if let Err(e) = self.apply() {
                warn!(error = %e, "resize failed");
            }
        }
        debug!("resize signals closed, orchestrator stopping");
    }
}

/// Turn SIGWINCH into resize pulses for the lifetime of the session.
#[cfg(unix)]
pub async fn watch_window_changes(resize: PulseSender) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut winch = match signal(SignalKind::window_change()) {
        Ok(winch) => winch,
        Err(e) => {
            warn!(error = %e, "cannot watch window size changes");
            return;
        }
    };
    while winch.recv().await.is_some() {
        resize.fire();
    }
}

#[cfg(not(unix))]
pub async fn watch_window_changes(_resize: PulseSender) {}
