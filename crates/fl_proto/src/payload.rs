//! Plaintext telemetry reading (inside the encrypted envelope).

use serde::{Deserialize, Serialize};

use crate::error::ProtoError;

/// Deserialized plaintext carried inside an envelope's ciphertext.
///
/// All four fields are mandatory: a decrypted payload that is missing any
/// of them fails to parse and is rejected by the hub rather than persisted
/// with empty columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryReading {
    /// Stable capture-node identifier (derived from host identity).
    pub source: String,
    /// `"<lat>,<lon>"` in decimal degrees.
    pub location: String,
    /// Human-readable capture description.
    pub message: String,
    /// Lowercase hex SHA-256 of the captured artifact's bytes.
    pub hash: String,
}

impl TelemetryReading {
    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("string-only struct serialises infallibly")
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtoError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Location parsed into numeric coordinates, if well-formed.
    pub fn lat_lon(&self) -> Option<(f64, f64)> {
        parse_location(&self.location)
    }
}

/// Parse `"<lat>,<lon>"`. Returns `None` for anything unparsable; callers
/// that render maps skip such readings instead of failing.
pub fn parse_location(location: &str) -> Option<(f64, f64)> {
    let (lat, lon) = location.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    Some((lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_roundtrip() {
        let reading = TelemetryReading {
            source: "node-a".into(),
            location: "50.0,23.0".into(),
            message: "Frequency 93.3 MHz captured".into(),
            hash: "abcd".into(),
        };
        let bytes = reading.to_bytes();
        assert_eq!(TelemetryReading::from_bytes(&bytes).unwrap(), reading);
    }

    #[test]
    fn missing_field_is_rejected() {
        let json = br#"{"source":"node-a","location":"50.0,23.0","message":"hi"}"#;
        assert!(TelemetryReading::from_bytes(json).is_err());
    }

    #[test]
    fn location_parsing() {
        assert_eq!(parse_location("49.5,24.25"), Some((49.5, 24.25)));
        assert_eq!(parse_location(" 49.5 , 24.25 "), Some((49.5, 24.25)));
        assert_eq!(parse_location("nowhere"), None);
        assert_eq!(parse_location("49.5,east"), None);
        assert_eq!(parse_location(""), None);
    }
}
