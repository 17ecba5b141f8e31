//! Capture node loop.
//!
//! Idle → Capturing(channel) → Hashing → Sealing → Transmitting → next
//! channel, cycling the fixed plan forever with a quiescent pause after
//! each full pass. A failed channel is logged and skipped; the loop never
//! aborts. The loop blocks for the full duration of each external capture
//! call by design.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWrite;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use fl_crypto::HubPublicKey;
use fl_proto::{SharedWriter, TelemetryReading};

use crate::capture::Capturer;
use crate::error::NodeError;
use crate::geo::GeoSampler;

/// Fixed transmission plan for one node.
#[derive(Debug, Clone)]
pub struct NodePlan {
    /// Ordered channel list in MHz, cycled forever.
    pub channels: Vec<f64>,
    /// Length of each capture.
    pub capture_duration: Duration,
    /// Pause between channels, respecting the link's effective throughput.
    pub inter_channel_delay: Duration,
    /// Quiescent interval after one full pass.
    pub cycle_pause: Duration,
}

impl Default for NodePlan {
    fn default() -> Self {
        Self {
            channels: vec![93.3, 96.5, 107.5, 100.7, 87.0],
            capture_duration: Duration::from_secs(5),
            inter_channel_delay: Duration::from_secs(3),
            cycle_pause: Duration::from_secs(10),
        }
    }
}

/// The capture role: owns its collaborators explicitly, shares only the
/// line writer with the relay.
pub struct CaptureNode<W> {
    pub source: String,
    pub hub_key: HubPublicKey,
    pub capturer: Arc<dyn Capturer>,
    pub geo: GeoSampler,
    pub plan: NodePlan,
    pub writer: SharedWriter<W>,
}

impl<W: AsyncWrite + Unpin + Send> CaptureNode<W> {
    /// Cycle the channel plan until shutdown is signalled.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            source = %self.source,
            channels = self.plan.channels.len(),
            "capture node started"
        );
        loop {
            for &channel in &self.plan.channels {
                if *shutdown.borrow() {
                    info!("capture node shutting down");
                    return;
                }
                match self.capture_and_send(channel).await {
                    Ok(()) => {}
                    Err(err) => warn!(channel, error = %err, "channel skipped"),
                }
                tokio::select! {
                    _ = tokio::time::sleep(self.plan.inter_channel_delay) => {}
                    _ = shutdown.changed() => {}
                }
            }
            debug!("channel pass complete, pausing");
            tokio::select! {
                _ = tokio::time::sleep(self.plan.cycle_pause) => {}
                _ = shutdown.changed() => {}
            }
        }
    }

    /// One channel: capture → hash → build reading → seal → one line out.
    async fn capture_and_send(&self, channel: f64) -> Result<(), NodeError> {
        let artifact = self
            .capturer
            .capture(channel, self.plan.capture_duration)
            .await?;
        let hash = fl_crypto::hash::file_digest(&artifact)?;

        let reading = TelemetryReading {
            source: self.source.clone(),
            location: self.geo.sample_location(),
            message: format!("Frequency {channel} MHz captured"),
            hash,
        };

        let sealed = fl_crypto::seal(&self.hub_key, &reading.to_bytes())?;
        let line = fl_proto::encode(&sealed);
        self.writer.send_line(&line).await?;
        info!(channel, chars = line.len(), "sealed reading transmitted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureError, Capturer};
    use async_trait::async_trait;
    use fl_crypto::HubKeyPair;
    use fl_proto::LineReader;
    use std::io::Write;
    use std::path::PathBuf;

    /// Capturer that always yields the same pre-written artifact.
    struct FixedArtifact(PathBuf);

    #[async_trait]
    impl Capturer for FixedArtifact {
        async fn capture(
            &self,
            _channel_mhz: f64,
            _duration: Duration,
        ) -> Result<PathBuf, CaptureError> {
            Ok(self.0.clone())
        }
    }

    /// Capturer that always fails, as a missing RTL-SDR dongle would.
    struct NoHardware;

    #[async_trait]
    impl Capturer for NoHardware {
        async fn capture(
            &self,
            _channel_mhz: f64,
            _duration: Duration,
        ) -> Result<PathBuf, CaptureError> {
            Err(CaptureError::Command("rtl_fm pipeline exited with 1".into()))
        }
    }

    fn test_plan(channels: Vec<f64>) -> NodePlan {
        NodePlan {
            channels,
            capture_duration: Duration::from_millis(1),
            inter_channel_delay: Duration::from_millis(1),
            cycle_pause: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn one_pass_transmits_sealed_readings() {
        let mut artifact = tempfile::NamedTempFile::new().unwrap();
        artifact.write_all(b"fake wav bytes").unwrap();
        artifact.flush().unwrap();
        let expected_hash = fl_crypto::hash::file_digest(artifact.path()).unwrap();

        let keys = HubKeyPair::generate();
        let (tx, rx) = tokio::io::duplex(64 * 1024);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let node = CaptureNode {
            source: "node-test".to_string(),
            hub_key: keys.public.clone(),
            capturer: Arc::new(FixedArtifact(artifact.path().to_path_buf())),
            geo: GeoSampler::default(),
            plan: test_plan(vec![93.3, 96.5]),
            writer: SharedWriter::new(tx),
        };
        let task = tokio::spawn(async move { node.run(shutdown_rx).await });

        let mut reader = LineReader::new(rx, Duration::from_secs(5));
        let line1 = reader.next_line().await.unwrap().expect("first envelope");
        let line2 = reader.next_line().await.unwrap().expect("second envelope");
        shutdown_tx.send(true).unwrap();
        task.await.unwrap();

        let opened = fl_crypto::open(&keys, &fl_proto::decode(&line1).unwrap()).unwrap();
        let reading = TelemetryReading::from_bytes(&opened).unwrap();
        assert_eq!(reading.source, "node-test");
        assert_eq!(reading.message, "Frequency 93.3 MHz captured");
        assert_eq!(reading.hash, expected_hash);
        assert!(reading.lat_lon().is_some());

        let opened = fl_crypto::open(&keys, &fl_proto::decode(&line2).unwrap()).unwrap();
        let reading = TelemetryReading::from_bytes(&opened).unwrap();
        assert_eq!(reading.message, "Frequency 96.5 MHz captured");
    }

    #[tokio::test]
    async fn failed_channel_is_skipped_not_fatal() {
        let mut artifact = tempfile::NamedTempFile::new().unwrap();
        artifact.write_all(b"bytes").unwrap();
        artifact.flush().unwrap();

        struct FlakyFirst {
            good: FixedArtifact,
            calls: std::sync::atomic::AtomicUsize,
        }

        #[async_trait]
        impl Capturer for FlakyFirst {
            async fn capture(
                &self,
                channel_mhz: f64,
                duration: Duration,
            ) -> Result<PathBuf, CaptureError> {
                let n = self
                    .calls
                    .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                if n == 0 {
                    Err(CaptureError::Command("no dongle".into()))
                } else {
                    self.good.capture(channel_mhz, duration).await
                }
            }
        }

        let keys = HubKeyPair::generate();
        let (tx, rx) = tokio::io::duplex(64 * 1024);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let node = CaptureNode {
            source: "node-test".to_string(),
            hub_key: keys.public.clone(),
            capturer: Arc::new(FlakyFirst {
                good: FixedArtifact(artifact.path().to_path_buf()),
                calls: std::sync::atomic::AtomicUsize::new(0),
            }),
            geo: GeoSampler::default(),
            plan: test_plan(vec![93.3, 96.5]),
            writer: SharedWriter::new(tx),
        };
        let task = tokio::spawn(async move { node.run(shutdown_rx).await });

        // Only the second channel produced an envelope.
        let mut reader = LineReader::new(rx, Duration::from_secs(5));
        let line = reader.next_line().await.unwrap().expect("second channel");
        shutdown_tx.send(true).unwrap();
        task.await.unwrap();

        let opened = fl_crypto::open(&keys, &fl_proto::decode(&line).unwrap()).unwrap();
        let reading = TelemetryReading::from_bytes(&opened).unwrap();
        assert_eq!(reading.message, "Frequency 96.5 MHz captured");
    }

    #[tokio::test]
    async fn all_channels_failing_keeps_cycling() {
        let keys = HubKeyPair::generate();
        let (tx, _rx) = tokio::io::duplex(1024);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let node = CaptureNode {
            source: "node-test".to_string(),
            hub_key: keys.public.clone(),
            capturer: Arc::new(NoHardware),
            geo: GeoSampler::default(),
            plan: test_plan(vec![93.3]),
            writer: SharedWriter::new(tx),
        };
        let task = tokio::spawn(async move { node.run(shutdown_rx).await });

        // Give it a few cycles, then ask it to stop; it must still be alive
        // to honour the request.
        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("loop exits on shutdown")
            .unwrap();
    }
}
