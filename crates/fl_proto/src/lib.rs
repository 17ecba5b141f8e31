//! fl_proto — Fieldlink wire types, line codec, and link I/O
//!
//! One envelope = one UTF-8 JSON line terminated by `\n`. The underlying
//! serial channel has no message boundaries of its own, so the codec owns
//! the reassembly buffer that turns raw reads back into lines.
//!
//! # Modules
//! - `envelope` — the on-wire envelope (what relays see)
//! - `payload`  — plaintext telemetry reading (inside the ciphertext)
//! - `codec`    — encode/decode + line reassembly buffer
//! - `link`     — async reader/writer over the shared channel
//! - `error`    — unified error type

pub mod codec;
pub mod envelope;
pub mod error;
pub mod link;
pub mod payload;

pub use codec::{decode, encode, LineBuffer};
pub use envelope::Envelope;
pub use error::ProtoError;
pub use link::{LineReader, SharedWriter};
pub use payload::TelemetryReading;
