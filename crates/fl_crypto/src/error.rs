use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Seal failed")]
    Seal,

    #[error("Open failed (truncated, corrupted, or not sealed to this key)")]
    Open,

    #[error("Key derivation failed")]
    KeyDerivation,

    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    #[error("Key file error: {0}")]
    KeyFile(#[from] std::io::Error),

    #[error("Hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}
