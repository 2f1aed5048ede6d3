//! Coalescing wake-up signals.
//!
//! A pulse is a capacity-one channel of `()`: firing never blocks, and a
//! pulse fired while another is still pending is dropped. Consumers only care
//! that *something* changed since they last looked, not how many times.

use tokio::sync::mpsc::{self, error::TrySendError};

/// Create a connected pulse sender/receiver pair.
pub fn pulse() -> (PulseSender, PulseReceiver) {
    let (tx, rx) = mpsc::channel(1);
    (PulseSender { tx }, PulseReceiver { rx })
}

#[derive(Debug, Clone)]
pub struct PulseSender {
    tx: mpsc::Sender<()>,
}

impl PulseSender {
    /// Fire the pulse. Returns false when it was coalesced into a pending one
    /// or the receiver is gone.
    pub fn fire(&self) -> bool {
        match self.tx.try_send(()) {
            Ok(()) => true,
            Err(TrySendError::Full(())) | Err(TrySendError::Closed(())) => false,
        }
    }
}

#[derive(Debug)]
pub struct PulseReceiver {
    rx: mpsc::Receiver<()>,
}

impl PulseReceiver {
    /// Wait for the next pulse. Returns false once every sender is dropped.
    pub async fn wait(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }

    /// Consume a pending pulse without waiting.
    pub fn try_take(&mut self) -> bool {
        self.rx.try_recv().is_ok()
    }
}
