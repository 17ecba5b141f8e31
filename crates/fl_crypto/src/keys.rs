//! Hub key material.
//!
//! The hub owns one long-term X25519 key pair. The public half is
//! distributed to every capture node as a hex file; the secret half never
//! leaves the hub. Both are 32 bytes, hex-encoded on disk.
//!
//! Roles: anything can `seal` with a [`HubPublicKey`]; only a process
//! holding the [`HubKeyPair`] can `open`. There is deliberately no
//! sender-side key — possession of the public key is the only requirement
//! to produce a valid envelope.

use std::path::Path;

use rand::rngs::OsRng;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::ZeroizeOnDrop;

use crate::error::CryptoError;

/// 32-byte X25519 public key, hex-encoded on disk and on key exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubPublicKey(PublicKey);

impl HubPublicKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(PublicKey::from(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    pub(crate) fn inner(&self) -> &PublicKey {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0.as_bytes())
    }

    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s.trim())?;
        let arr: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
            CryptoError::InvalidKey(format!("public key must be 32 bytes, got {}", v.len()))
        })?;
        Ok(Self::from_bytes(arr))
    }

    /// Load from a hex key file (whitespace tolerated).
    pub fn load(path: &Path) -> Result<Self, CryptoError> {
        Self::from_hex(&std::fs::read_to_string(path)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), CryptoError> {
        std::fs::write(path, self.to_hex() + "\n")?;
        Ok(())
    }
}

/// Long-term hub key pair. Drop clears the secret via ZeroizeOnDrop.
#[derive(ZeroizeOnDrop)]
pub struct HubKeyPair {
    #[zeroize(skip)]
    pub public: HubPublicKey,
    secret_bytes: [u8; 32],
}

impl HubKeyPair {
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = HubPublicKey(PublicKey::from(&secret));
        Self {
            public,
            secret_bytes: secret.to_bytes(),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidKey(format!("secret key must be 32 bytes, got {}", bytes.len()))
        })?;
        let secret = StaticSecret::from(arr);
        let public = HubPublicKey(PublicKey::from(&secret));
        Ok(Self {
            public,
            secret_bytes: arr,
        })
    }

    pub(crate) fn static_secret(&self) -> StaticSecret {
        StaticSecret::from(self.secret_bytes)
    }

    /// Load the secret half from a hex key file; the public half is
    /// rederived.
    pub fn load(path: &Path) -> Result<Self, CryptoError> {
        let bytes = hex::decode(std::fs::read_to_string(path)?.trim())?;
        Self::from_bytes(&bytes)
    }

    /// Write the secret half as a hex key file, owner-readable only.
    pub fn save(&self, path: &Path) -> Result<(), CryptoError> {
        std::fs::write(path, hex::encode(self.secret_bytes) + "\n")?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }
}
