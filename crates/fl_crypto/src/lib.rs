//! fl_crypto — Fieldlink cryptographic boundary
//!
//! # Design principles
//! - NO custom crypto; all primitives come from audited Rust crates.
//! - Zeroize secret material on drop.
//! - Asymmetric trust split: capture and relay roles hold only the hub's
//!   public key (can seal, cannot open); the hub alone holds the secret.
//!
//! # Module layout
//! - `keys`  — hub X25519 key pair + hex key files on disk
//! - `seal`  — integrated asymmetric seal/open (ephemeral DH + AEAD)
//! - `hash`  — SHA-256 content hashing for capture artifacts
//! - `error` — unified error type

pub mod error;
pub mod hash;
pub mod keys;
pub mod seal;

pub use error::CryptoError;
pub use keys::{HubKeyPair, HubPublicKey};
pub use seal::{open, seal};
