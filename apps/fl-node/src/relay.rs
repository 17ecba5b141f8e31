//! Pass-through relay.
//!
//! Reads lines off the shared channel, validates that each is structurally
//! an envelope (decodable per the codec — whether anyone could ever open it
//! is irrelevant), and retransmits the exact original line. It never calls
//! open and never holds the secret key, so a captured relay reveals
//! nothing.
//!
//! There is no dedup, no hop count, and no cycle prevention: wiring two
//! relays into a loop retransmits indefinitely. That is an accepted
//! operational constraint of the flat single-hop design, not a defect.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

use fl_proto::{LineReader, ProtoError, SharedWriter};

pub struct Relay<R, W> {
    reader: LineReader<R>,
    writer: SharedWriter<W>,
}

impl<R, W> Relay<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: LineReader<R>, writer: SharedWriter<W>) -> Self {
        Self { reader, writer }
    }

    /// Forward until the link closes or shutdown is signalled.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        info!("relay started");
        loop {
            tokio::select! {
                result = self.reader.next_line() => match result {
                    Ok(Some(line)) => self.forward(&line).await,
                    Ok(None) => {
                        info!("link closed, relay stopping");
                        return;
                    }
                    Err(ProtoError::Timeout) => continue,
                    Err(err) => warn!(error = %err, "link read failed"),
                },
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("relay shutting down");
                        return;
                    }
                }
            }
        }
    }

    async fn forward(&self, line: &str) {
        match fl_proto::decode(line) {
            Ok(ciphertext) => {
                // Retransmit the original line untouched, not a re-encode.
                if let Err(err) = self.writer.send_line(line).await {
                    warn!(error = %err, "forward failed");
                } else {
                    debug!(chars = line.len(), sealed = ciphertext.len(), "envelope forwarded");
                }
            }
            // Structurally invalid: dropped, never fatal.
            Err(err) => trace!(error = %err, "non-envelope line dropped"),
        }
    }
}
