//! Integrated asymmetric seal/open.
//!
//! No handshake: the sender generates an ephemeral X25519 key, derives a
//! shared secret against the hub's static public key, expands it through
//! HKDF-SHA256, and encrypts with XChaCha20-Poly1305. The ephemeral public
//! key rides in front of the ciphertext and is bound into both the KDF salt
//! and the AEAD associated data.
//!
//! Sealed wire format:
//!   [ ephemeral public (32) | nonce (24) | ciphertext + tag ]

use chacha20poly1305::{
    aead::{Aead, AeadCore, KeyInit, OsRng as AeadOsRng},
    XChaCha20Poly1305,
};
use hkdf::Hkdf;
use rand::rngs::OsRng;
use sha2::Sha256;
use x25519_dalek::{EphemeralSecret, PublicKey};
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::keys::{HubKeyPair, HubPublicKey};

const EPH_PUB_LEN: usize = 32;
const NONCE_LEN: usize = 24;
const TAG_LEN: usize = 16;

const SEAL_INFO: &[u8] = b"fieldlink-seal-v1";

fn derive_key(
    shared: &[u8],
    eph_public: &PublicKey,
    hub_public: &PublicKey,
) -> Result<Zeroizing<[u8; 32]>, CryptoError> {
    let mut salt = [0u8; 64];
    salt[..32].copy_from_slice(eph_public.as_bytes());
    salt[32..].copy_from_slice(hub_public.as_bytes());

    let hk = Hkdf::<Sha256>::new(Some(&salt), shared);
    let mut key = [0u8; 32];
    hk.expand(SEAL_INFO, &mut key)
        .map_err(|_| CryptoError::KeyDerivation)?;
    Ok(Zeroizing::new(key))
}

/// Seal `plaintext` so only the holder of the matching secret can read it.
/// Any party with the hub public key can seal; this is by construction not
/// sender authentication.
pub fn seal(hub_public: &HubPublicKey, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let eph_secret = EphemeralSecret::random_from_rng(OsRng);
    let eph_public = PublicKey::from(&eph_secret);

    let shared = eph_secret.diffie_hellman(hub_public.inner());
    if !shared.was_contributory() {
        return Err(CryptoError::Seal);
    }
    let key = derive_key(shared.as_bytes(), &eph_public, hub_public.inner())?;

    let cipher = XChaCha20Poly1305::new_from_slice(key.as_slice()).map_err(|_| CryptoError::Seal)?;
    let nonce = XChaCha20Poly1305::generate_nonce(&mut AeadOsRng);
    let ciphertext = cipher
        .encrypt(
            &nonce,
            chacha20poly1305::aead::Payload {
                msg: plaintext,
                aad: eph_public.as_bytes(),
            },
        )
        .map_err(|_| CryptoError::Seal)?;

    let mut out = Vec::with_capacity(EPH_PUB_LEN + NONCE_LEN + ciphertext.len());
    out.extend_from_slice(eph_public.as_bytes());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Open a sealed message with the hub's key pair.
///
/// Fails with [`CryptoError::Open`] when the input is truncated, corrupted,
/// or sealed to a different key. Callers log and drop; a bad envelope never
/// stops ingestion.
pub fn open(keys: &HubKeyPair, sealed: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if sealed.len() < EPH_PUB_LEN + NONCE_LEN + TAG_LEN {
        return Err(CryptoError::Open);
    }
    let (eph_bytes, rest) = sealed.split_at(EPH_PUB_LEN);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);

    let eph_arr: [u8; 32] = eph_bytes.try_into().map_err(|_| CryptoError::Open)?;
    let eph_public = PublicKey::from(eph_arr);

    let shared = keys.static_secret().diffie_hellman(&eph_public);
    let key = derive_key(shared.as_bytes(), &eph_public, keys.public.inner())?;

    let cipher = XChaCha20Poly1305::new_from_slice(key.as_slice()).map_err(|_| CryptoError::Open)?;
    let nonce = chacha20poly1305::XNonce::from_slice(nonce_bytes);
    let plaintext = cipher
        .decrypt(
            nonce,
            chacha20poly1305::aead::Payload {
                msg: ciphertext,
                aad: eph_bytes,
            },
        )
        .map_err(|_| CryptoError::Open)?;

    Ok(Zeroizing::new(plaintext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::HubKeyPair;

    #[test]
    fn seal_open_roundtrip() {
        let keys = HubKeyPair::generate();
        let plaintext = b"{\"source\":\"node-a\",\"hash\":\"abcd\"}";
        let sealed = seal(&keys.public, plaintext).unwrap();
        let opened = open(&keys, &sealed).unwrap();
        assert_eq!(&opened[..], plaintext);
    }

    #[test]
    fn sealing_twice_differs() {
        // Fresh ephemeral key + nonce per seal.
        let keys = HubKeyPair::generate();
        let a = seal(&keys.public, b"same plaintext").unwrap();
        let b = seal(&keys.public, b"same plaintext").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_key_fails() {
        let keys = HubKeyPair::generate();
        let other = HubKeyPair::generate();
        let sealed = seal(&keys.public, b"for the hub only").unwrap();
        assert!(matches!(open(&other, &sealed), Err(CryptoError::Open)));
    }

    #[test]
    fn truncated_fails() {
        let keys = HubKeyPair::generate();
        let sealed = seal(&keys.public, b"payload").unwrap();
        assert!(matches!(open(&keys, &sealed[..10]), Err(CryptoError::Open)));
        assert!(matches!(open(&keys, b""), Err(CryptoError::Open)));
    }

    #[test]
    fn tampered_fails() {
        let keys = HubKeyPair::generate();
        let mut sealed = seal(&keys.public, b"payload").unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0x01;
        assert!(matches!(open(&keys, &sealed), Err(CryptoError::Open)));
        // Flipping a bit of the ephemeral key breaks the AAD binding too.
        let mut sealed = seal(&keys.public, b"payload").unwrap();
        sealed[0] ^= 0x01;
        assert!(open(&keys, &sealed).is_err());
    }

    #[test]
    fn empty_plaintext_roundtrips() {
        let keys = HubKeyPair::generate();
        let sealed = seal(&keys.public, b"").unwrap();
        assert_eq!(&open(&keys, &sealed).unwrap()[..], b"");
    }
}
