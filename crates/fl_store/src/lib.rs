//! fl_store — hub-side persistence for decrypted telemetry
//!
//! SQLite via sqlx. Two tables: `devices` (upserted, one row per source
//! ever seen, never deleted) and `messages` (append-only, never mutated).
//! Writes are atomic per record only; there is deliberately no transaction
//! spanning records, so one bad write cannot take earlier rows with it.
//!
//! The read side serves the dashboard collaborator: paginated
//! most-recent-first views of both tables, plus the periodic map snapshot
//! (latest 200 readings with parsed coordinates).
//!
//! Migrations in `migrations/` run on open.

pub mod db;
pub mod error;
pub mod models;

pub use db::Store;
pub use error::StoreError;
pub use models::{DeviceRow, MapPoint, MessageRow};
