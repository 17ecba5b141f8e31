//! fl-node — Fieldlink capture node and relay roles.
//!
//! Both roles share one process and one serial handle: the capture loop
//! cycles a fixed channel plan, seals readings to the hub public key, and
//! transmits them; the relay reads whatever arrives on the shared channel
//! and forwards valid envelopes byte-identical. Neither role can decrypt
//! anything — only the hub holds the secret key.

pub mod capture;
pub mod error;
pub mod geo;
pub mod identity;
pub mod observe;
pub mod relay;
pub mod transmit;

pub use capture::{CaptureError, Capturer, RtlFmCapture};
pub use error::NodeError;
pub use geo::GeoSampler;
pub use observe::Observer;
pub use relay::Relay;
pub use transmit::{CaptureNode, NodePlan};
