use thiserror::Error;

use crate::capture::CaptureError;

/// Per-channel failure in the capture loop. Every variant is logged and the
/// channel skipped; none aborts the pass.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("Artifact hash failed: {0}")]
    Hash(#[from] std::io::Error),

    #[error("Seal failed: {0}")]
    Crypto(#[from] fl_crypto::CryptoError),

    #[error("Link error: {0}")]
    Link(#[from] fl_proto::ProtoError),
}
