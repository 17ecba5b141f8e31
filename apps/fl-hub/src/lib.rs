//! fl-hub — Fieldlink hub: sole holder of the secret key.
//!
//! The hub is the only reader of its channel and the only role that can
//! open envelopes. Every successfully opened reading is persisted (device
//! upsert + message append); every failure class is logged and skipped so
//! one bad line never halts ingestion. A side task feeds the dashboard
//! periodic snapshots of the freshest readings.

pub mod feed;
pub mod ingest;

pub use feed::{spawn_feed, MapSnapshot, SNAPSHOT_INTERVAL, SNAPSHOT_LIMIT};
pub use ingest::HubIngest;
