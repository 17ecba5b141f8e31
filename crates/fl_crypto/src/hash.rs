//! SHA-256 content hashing for capture artifacts.

use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Streaming SHA-256 of a file's bytes, as a lowercase hex digest.
/// Reads in 4 KiB chunks so large recordings never sit in memory whole.
pub fn file_digest(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = file.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        hasher.update(&chunk[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// SHA-256 of an in-memory buffer, lowercase hex.
pub fn digest(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
