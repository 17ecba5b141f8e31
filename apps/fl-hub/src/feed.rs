//! Dashboard feed: periodic pushed snapshots of the freshest readings.
//!
//! The web layer is an external collaborator; it subscribes to the
//! broadcast channel and pages through the store directly. A subscriber
//! that lags (or does not exist yet) simply misses snapshots — the feed
//! never blocks ingestion.

use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use fl_store::{MapPoint, Store};

/// One pushed snapshot: the latest readings with parsed coordinates.
pub type MapSnapshot = Vec<MapPoint>;

pub const SNAPSHOT_LIMIT: u32 = 200;
pub const SNAPSHOT_INTERVAL: Duration = Duration::from_secs(5);

/// Spawn the feed task. Returns the task handle and the broadcast sender
/// dashboard consumers subscribe to.
pub fn spawn_feed(
    store: Store,
    mut shutdown: watch::Receiver<bool>,
) -> (JoinHandle<()>, broadcast::Sender<MapSnapshot>) {
    let (tx, _) = broadcast::channel(8);
    let sender = tx.clone();

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SNAPSHOT_INTERVAL);
        info!(
            interval_secs = SNAPSHOT_INTERVAL.as_secs(),
            limit = SNAPSHOT_LIMIT,
            "dashboard feed started"
        );
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("dashboard feed shutting down");
                        return;
                    }
                }
            }

            match store.recent_map_points(SNAPSHOT_LIMIT).await {
                // send() errs only when nobody is subscribed; that is fine.
                Ok(points) => {
                    debug!(points = points.len(), "snapshot published");
                    let _ = sender.send(points);
                }
                Err(err) => warn!(error = %err, "snapshot query failed"),
            }
        }
    });

    (handle, tx)
}
