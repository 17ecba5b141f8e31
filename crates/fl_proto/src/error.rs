use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtoError {
    #[error("Blank line")]
    BlankLine,

    #[error("Malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    #[error("Channel I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Read timed out")]
    Timeout,
}

impl ProtoError {
    /// Malformed input a loop should drop and move past, as opposed to a
    /// channel fault worth logging.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            ProtoError::BlankLine | ProtoError::Malformed(_) | ProtoError::Base64Decode(_)
        )
    }
}
