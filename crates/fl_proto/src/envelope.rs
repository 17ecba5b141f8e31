//! Encrypted envelope — what a relay sees.
//!
//! A relay sees only the base64 ciphertext; it can verify the line is
//! structurally an envelope and nothing else. Unknown extra fields are
//! tolerated so the wire format can grow without breaking old relays.

use serde::{Deserialize, Serialize};

/// On-wire envelope. Serialized as exactly one JSON line:
/// `{"payload":"<base64 ciphertext>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Base64 (standard alphabet) of the sealed ciphertext.
    pub payload: String,
}
