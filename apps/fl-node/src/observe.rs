//! Read-only channel observer.
//!
//! A diagnostic role: reads the shared channel and logs a preview of every
//! structurally valid envelope without forwarding or decrypting anything.
//! Useful when provisioning a node to confirm traffic is flowing.

use tokio::io::AsyncRead;
use tokio::sync::watch;
use tracing::{info, trace};

use fl_proto::{LineReader, ProtoError};

const PREVIEW_CHARS: usize = 48;

pub struct Observer<R> {
    reader: LineReader<R>,
    seen: u64,
}

impl<R: AsyncRead + Unpin> Observer<R> {
    pub fn new(reader: LineReader<R>) -> Self {
        Self { reader, seen: 0 }
    }

    /// Envelopes observed so far.
    pub fn seen(&self) -> u64 {
        self.seen
    }

    /// Observe until the link closes or shutdown is signalled.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        info!("observer started");
        loop {
            tokio::select! {
                result = self.reader.next_line() => match result {
                    Ok(Some(line)) => self.observe_line(&line),
                    Ok(None) => {
                        info!(seen = self.seen, "link closed, observer stopping");
                        return;
                    }
                    Err(ProtoError::Timeout) => continue,
                    Err(err) => trace!(error = %err, "link read failed"),
                },
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!(seen = self.seen, "observer shutting down");
                        return;
                    }
                }
            }
        }
    }

    fn observe_line(&mut self, line: &str) {
        match fl_proto::decode(line) {
            Ok(ciphertext) => {
                self.seen += 1;
                let preview: String = line.chars().take(PREVIEW_CHARS).collect();
                info!(
                    seen = self.seen,
                    sealed = ciphertext.len(),
                    %preview,
                    "envelope observed"
                );
            }
            Err(err) => trace!(error = %err, "non-envelope line ignored"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn counts_envelopes_and_ignores_garbage() {
        let (mut feed, channel) = tokio::io::duplex(4 * 1024);
        let envelope = fl_proto::encode(b"opaque ciphertext");
        feed.write_all(format!("{envelope}\nnot json\n\n{envelope}\n").as_bytes())
            .await
            .unwrap();
        drop(feed); // EOF ends the loop

        let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
        let mut observer = Observer::new(LineReader::new(channel, Duration::from_secs(1)));
        observer.run(shutdown_rx).await;

        assert_eq!(observer.seen(), 2);
    }
}
