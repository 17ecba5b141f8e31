//! Hub ingestion loop: decode → open → parse → persist.

use chrono::Utc;
use tokio::io::AsyncRead;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use fl_crypto::HubKeyPair;
use fl_proto::{LineReader, ProtoError, TelemetryReading};
use fl_store::Store;

pub struct HubIngest<R> {
    reader: LineReader<R>,
    keys: HubKeyPair,
    store: Store,
}

impl<R: AsyncRead + Unpin> HubIngest<R> {
    pub fn new(reader: LineReader<R>, keys: HubKeyPair, store: Store) -> Self {
        Self {
            reader,
            keys,
            store,
        }
    }

    /// Ingest until the link closes or shutdown is signalled.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        info!("hub ingestion started");
        loop {
            tokio::select! {
                result = self.reader.next_line() => match result {
                    Ok(Some(line)) => self.ingest_line(&line).await,
                    Ok(None) => {
                        info!("link closed, ingestion stopping");
                        return;
                    }
                    Err(ProtoError::Timeout) => continue,
                    Err(err) => warn!(error = %err, "link read failed"),
                },
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("hub ingestion shutting down");
                        return;
                    }
                }
            }
        }
    }

    /// One line through the full trust boundary. Every failure drops the
    /// line and keeps the loop alive.
    async fn ingest_line(&self, line: &str) {
        let ciphertext = match fl_proto::decode(line) {
            Ok(ciphertext) => ciphertext,
            Err(err) if err.is_skippable() => {
                debug!(error = %err, "non-envelope line dropped");
                return;
            }
            Err(err) => {
                warn!(error = %err, "decode failed, line dropped");
                return;
            }
        };

        let plaintext = match fl_crypto::open(&self.keys, &ciphertext) {
            Ok(plaintext) => plaintext,
            Err(err) => {
                warn!(error = %err, "envelope not openable, dropped");
                return;
            }
        };

        // Mandatory-field policy: a payload missing any field is rejected
        // outright; rows are never persisted with empty columns.
        let reading = match TelemetryReading::from_bytes(&plaintext) {
            Ok(reading) => reading,
            Err(err) => {
                warn!(error = %err, "payload rejected");
                return;
            }
        };

        // Synthetic ingestion timestamp; the protocol carries no transmit
        // time.
        let at = Utc::now();
        match self.store.record_reading(&reading, at).await {
            Ok(()) => info!(
                source = %reading.source,
                location = %reading.location,
                hash = %reading.hash,
                "reading persisted"
            ),
            Err(err) => warn!(error = %err, "persistence failed, record dropped"),
        }
    }
}
