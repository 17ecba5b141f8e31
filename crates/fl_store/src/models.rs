//! Database row models — these map to/from SQL rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DeviceRow {
    pub id: i64,
    pub source: String,
    /// Ingestion timestamp of the first decrypted message from this source.
    pub first_seen: DateTime<Utc>,
    /// Updated on every later message; rows are never deleted.
    pub last_seen: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MessageRow {
    pub id: i64,
    /// Synthetic wall-clock ingestion timestamp — the protocol carries no
    /// transmit time.
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub location: String,
    pub message: String,
    pub filehash: String,
}

/// One reading of the dashboard map snapshot: a message row whose location
/// parsed into numeric coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub source: String,
    pub lat: f64,
    pub lon: f64,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}
