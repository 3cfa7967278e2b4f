//! Periodic expiry of PENDING records that never got merged.

use chrono::{DateTime, Duration, Utc};
use sea_rust_core::QueueStore;
use std::sync::Arc;
use tracing::{debug, warn};

/// Run one sweep. Errors are logged, never propagated.
pub async fn sweep_once(store: &dyn QueueStore, ttl: Duration, now: DateTime<Utc>) -> usize {
    match store.expire_stale(ttl, now).await {
        Ok(expired) => {
            debug!("Expiry sweep on {}: {} expired", store.store_name(), expired);
            expired
        }
        Err(e) => {
            warn!("Expiry sweep on {} failed: {}", store.store_name(), e);
            0
        }
    }
}

/// Sweep forever on a fixed interval. The first sweep runs immediately.
pub async fn run_expiry_sweeper(
    store: Arc<dyn QueueStore>,
    ttl: Duration,
    interval: std::time::Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        sweep_once(store.as_ref(), ttl, Utc::now()).await;
    }
}
