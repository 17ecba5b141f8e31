//! Line codec — one envelope per `\n`-terminated JSON line.
//!
//! Base64 plus JSON string escaping means an encoded line can never contain
//! a raw line terminator, so `\n` is unambiguous framing on a channel with
//! no inherent message boundaries. `LineBuffer` owns the reassembly side:
//! raw reads go in, complete lines come out, the trailing partial stays
//! buffered for the next read.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::envelope::Envelope;
use crate::error::ProtoError;

/// Encode a sealed ciphertext as one transportable line (no terminator).
pub fn encode(ciphertext: &[u8]) -> String {
    let envelope = Envelope {
        payload: STANDARD.encode(ciphertext),
    };
    serde_json::to_string(&envelope).expect("string-only struct serialises infallibly")
}

/// Decode one line back into the sealed ciphertext.
///
/// Blank lines, non-JSON lines, and JSON without a `payload` field all
/// return skippable errors; callers drop the line and continue.
pub fn decode(line: &str) -> Result<Vec<u8>, ProtoError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ProtoError::BlankLine);
    }
    let envelope: Envelope = serde_json::from_str(line)?;
    Ok(STANDARD.decode(envelope.payload.as_bytes())?)
}

/// Reassembly buffer over a byte stream with no message boundaries.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one raw read.
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Drain every complete `\n`-terminated line accumulated so far.
    /// Yields zero or more lines per read; a trailing partial line stays
    /// buffered. Non-UTF-8 lines (radio noise) are dropped, not fatal.
    pub fn lines(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buf.drain(..=pos).collect();
            match std::str::from_utf8(&raw[..raw.len() - 1]) {
                Ok(s) => out.push(s.trim_end_matches('\r').to_string()),
                Err(_) => continue,
            }
        }
        out
    }

    /// Bytes currently held back as an incomplete line.
    pub fn pending_len(&self) -> usize {
        self.buf.len()
    }
}
