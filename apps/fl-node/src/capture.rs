//! External capture collaborator.
//!
//! The RF capture step is an opaque external invocation: given a channel
//! and a duration it either yields an artifact file or fails. The trait
//! seam keeps the loop testable without radio hardware.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Capture command failed: {0}")]
    Command(String),

    #[error("Capture I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait Capturer: Send + Sync {
    /// Record `duration` worth of `channel_mhz`; returns the artifact path.
    async fn capture(&self, channel_mhz: f64, duration: Duration)
        -> Result<PathBuf, CaptureError>;
}

/// Production capturer: shells out to the `rtl_fm | sox` pipeline and
/// writes a timestamped WAV under `out_dir`.
pub struct RtlFmCapture {
    pub out_dir: PathBuf,
}

#[async_trait]
impl Capturer for RtlFmCapture {
    async fn capture(
        &self,
        channel_mhz: f64,
        duration: Duration,
    ) -> Result<PathBuf, CaptureError> {
        tokio::fs::create_dir_all(&self.out_dir).await?;
        let stamp = chrono::Local::now().format("%H%M%S");
        let artifact = self.out_dir.join(format!(
            "fm{}_{stamp}.wav",
            channel_mhz.to_string().replace('.', "")
        ));

        let pipeline = format!(
            "rtl_fm -f {channel_mhz}M -M wbfm -s 200k -r 48k -E deemp - | \
             sox -t raw -r 48k -e signed -b 16 -c 1 -V1 - {} trim 0 {}",
            artifact.display(),
            duration.as_secs()
        );

        let status = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(&pipeline)
            .status()
            .await?;
        if !status.success() {
            return Err(CaptureError::Command(format!(
                "rtl_fm pipeline exited with {status}"
            )));
        }
        Ok(artifact)
    }
}
