//! Async link I/O over the shared serial channel.
//!
//! The channel is a plain byte stream (typed against `AsyncRead` /
//! `AsyncWrite`, so tests can substitute `tokio::io::duplex`). Baud rate
//! and line discipline of the physical device are host provisioning, like
//! key material; this layer only needs bytes.
//!
//! Writes go through `SharedWriter`, which holds the write half behind an
//! async mutex and emits a whole line per critical section — the capture
//! loop and the relay share one handle, and two envelopes' bytes must never
//! interleave.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::codec::LineBuffer;
use crate::error::ProtoError;

const READ_CHUNK: usize = 1024;

/// Default poll timeout, matching the 100 ms the link hardware is idled at.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Open the serial device twice, one independent handle per direction.
///
/// `tokio::fs::File` funnels reads and writes through one internal
/// blocking operation, so a read parked on a quiet channel would stall
/// every write on a shared handle. Two handles keep the write path free
/// while a read is pending.
pub async fn open_serial(path: &Path) -> Result<(File, File), ProtoError> {
    // Both opens are read+write: a tty does not care, and a FIFO used as
    // a loopback channel blocks a read-only open until a writer appears.
    let read_half = OpenOptions::new().read(true).write(true).open(path).await?;
    let write_half = OpenOptions::new().read(true).write(true).open(path).await?;
    Ok((read_half, write_half))
}

/// Buffering line reader over the channel's read half.
pub struct LineReader<R> {
    inner: R,
    buf: LineBuffer,
    ready: VecDeque<String>,
    read_timeout: Duration,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(inner: R, read_timeout: Duration) -> Self {
        Self {
            inner,
            buf: LineBuffer::new(),
            ready: VecDeque::new(),
            read_timeout,
        }
    }

    /// Next complete line off the channel.
    ///
    /// Returns `Ok(None)` on EOF and `Err(ProtoError::Timeout)` when no
    /// bytes arrived within the read timeout — a transient condition the
    /// caller's loop simply retries.
    pub async fn next_line(&mut self) -> Result<Option<String>, ProtoError> {
        loop {
            if let Some(line) = self.ready.pop_front() {
                return Ok(Some(line));
            }
            let mut chunk = [0u8; READ_CHUNK];
            let n = match tokio::time::timeout(self.read_timeout, self.inner.read(&mut chunk))
                .await
            {
                Ok(read) => read?,
                Err(_) => return Err(ProtoError::Timeout),
            };
            if n == 0 {
                return Ok(None);
            }
            self.buf.extend(&chunk[..n]);
            self.ready.extend(self.buf.lines());
        }
    }
}

/// Cloneable handle to the channel's write half.
pub struct SharedWriter<W> {
    inner: Arc<Mutex<W>>,
}

impl<W> Clone for SharedWriter<W> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<W: AsyncWrite + Unpin> SharedWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// Write `line` plus the terminator in one critical section.
    pub async fn send_line(&self, line: &str) -> Result<(), ProtoError> {
        let mut writer = self.inner.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        Ok(())
    }
}
