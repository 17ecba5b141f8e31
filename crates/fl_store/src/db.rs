//! Database abstraction over SQLite via sqlx.

use std::path::Path;

use chrono::{DateTime, Utc};
use fl_proto::payload::{parse_location, TelemetryReading};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool};

use crate::error::StoreError;
use crate::models::{DeviceRow, MapPoint, MessageRow};

/// Central store handle. Cheap to clone (pool is Arc internally).
#[derive(Clone)]
pub struct Store {
    pub pool: SqlitePool,
}

impl Store {
    /// Open (or create) the SQLite database at `db_path` and run pending
    /// migrations.
    ///
    /// WAL journal mode is configured at connection time, not inside a
    /// migration — SQLite forbids changing `journal_mode` inside a
    /// transaction and sqlx wraps every migration in one.
    pub async fn open(db_path: &Path) -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePool::connect_with(opts).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Persist one decrypted reading stamped with its ingestion time:
    /// upsert the device row, then append the message row.
    ///
    /// The two statements are deliberately independent — per-record
    /// atomicity only.
    pub async fn record_reading(
        &self,
        reading: &TelemetryReading,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO devices (source, first_seen, last_seen) VALUES (?, ?, ?) \
             ON CONFLICT(source) DO UPDATE SET last_seen = excluded.last_seen",
        )
        .bind(&reading.source)
        .bind(at)
        .bind(at)
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "INSERT INTO messages (timestamp, source, location, message, filehash) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(at)
        .bind(&reading.source)
        .bind(&reading.location)
        .bind(&reading.message)
        .bind(&reading.hash)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ── Dashboard read side ──────────────────────────────────────────────

    /// One page of devices, most recently seen first. Pages are 1-based.
    pub async fn devices_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<DeviceRow>, StoreError> {
        let offset = page.saturating_sub(1).saturating_mul(per_page);
        let rows = sqlx::query_as::<_, DeviceRow>(
            "SELECT id, source, first_seen, last_seen FROM devices \
             ORDER BY last_seen DESC LIMIT ? OFFSET ?",
        )
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// One page of messages, newest first. Pages are 1-based.
    pub async fn messages_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<MessageRow>, StoreError> {
        let offset = page.saturating_sub(1).saturating_mul(per_page);
        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT id, timestamp, source, location, message, filehash FROM messages \
             ORDER BY id DESC LIMIT ? OFFSET ?",
        )
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Latest `limit` readings with their locations parsed into numeric
    /// coordinates. Rows whose location does not parse are skipped, not
    /// errors — the map simply cannot place them.
    pub async fn recent_map_points(&self, limit: u32) -> Result<Vec<MapPoint>, StoreError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT id, timestamp, source, location, message, filehash FROM messages \
             ORDER BY id DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let (lat, lon) = parse_location(&row.location)?;
                Some(MapPoint {
                    source: row.source,
                    lat,
                    lon,
                    timestamp: row.timestamp,
                    message: row.message,
                })
            })
            .collect())
    }
}
