//! Background removal of expired assistance cache entries.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{info, warn};
use sqlx::{Pool, Sqlite};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::store::{freshness_cutoff, purge_expired};
use crate::config::DEFAULT_SWEEP_INTERVAL;

/// Spawns a task that deletes entries older than `cache_time` every `interval`.
///
/// Reads never return expired entries, so the sweeper only reclaims space;
/// a failed sweep is logged and retried on the next tick. A zero `interval`
/// falls back to [`DEFAULT_SWEEP_INTERVAL`]. Abort the returned handle to stop it.
pub fn spawn_expiry_sweeper(
    pool: Arc<Pool<Sqlite>>,
    cache_time: Duration,
    interval: Duration,
) -> JoinHandle<()> {
    let period = if interval.is_zero() {
        DEFAULT_SWEEP_INTERVAL
    } else {
        interval
    };
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match purge_expired(&pool, freshness_cutoff(Utc::now(), cache_time)).await {
                Ok(0) => {}
                Ok(removed) => info!("Removed {removed} expired assistance cache entries"),
                Err(e) => warn!("Assistance cache sweep failed: {e}"),
            }
        }
    })
}
