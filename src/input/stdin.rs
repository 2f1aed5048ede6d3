//! Raw stdin pump.
//!
//! Every chunk read from the controlling terminal goes to the magic-sequence
//! detector and the escape parser; it reaches the child only while the
//! session is in normal mode.

use std::io::{self, Read, Write};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

use super::{InputChunk, MagicDetector};
use crate::models::SharedMode;
use crate::pulse::PulseSender;

pub struct InputPump<W: Write> {
    detector: MagicDetector,
    mode: Arc<SharedMode>,
    magic: PulseSender,
    chunks: mpsc::Sender<InputChunk>,
    pty_writer: W,
}

impl<W: Write> InputPump<W> {
    pub fn new(
        detector: MagicDetector,
        mode: Arc<SharedMode>,
        magic: PulseSender,
        chunks: mpsc::Sender<InputChunk>,
        pty_writer: W,
    ) -> Self {
        Self {
            detector,
            mode,
            magic,
            chunks,
            pty_writer,
        }
    }

    /// Read until end of input or until the PTY stops accepting writes.
    pub fn run<R: Read>(mut self, mut reader: R) -> io::Result<()> {
        let mut buf = [0u8; 1024];
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => {
                    debug!("stdin reached end of input");
                    return Ok(());
                }
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            self.pump(&buf[..n], Instant::now())?;
        }
    }

    /// Fan one chunk out to the detector, the parser, and (in normal mode) the child.
    pub fn pump(&mut self, bytes: &[u8], now: Instant) -> io::Result<()> {
        if self.detector.observe(bytes, now) && self.magic.fire() {
            info!("magic sequence seen, entering command mode");
        }

        match self.chunks.try_send(InputChunk::new(bytes, now)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => warn!(len = bytes.len(), "parser queue full, dropping input chunk"),
            Err(TrySendError::Closed(_)) => {}
        }

        if self.mode.is_normal() {
            self.pty_writer.write_all(bytes)?;
            self.pty_writer.flush()?;
        }
        Ok(())
    }
}
