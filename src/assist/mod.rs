//! GNSS assistance-data cache.
//!
//! Cache-aside in front of the assistance origins: a lookup first asks the
//! store for a fresh entry with the same profile near the requested point and
//! only goes to the origins on a miss, writing the answer back before
//! returning it.

mod origin;
mod profile;
mod query;
mod store;
mod sweeper;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{debug, warn};
use sqlx::{Pool, Sqlite};
use tokio::task::JoinHandle;

pub use origin::{Failover, FailoverStep, OriginFetcher, OriginPool};
pub use profile::{AssistanceProfile, AssistanceRequest};
pub use query::{build_query, sends_pacc};
pub use store::AssistanceCacheEntry;
pub use sweeper::spawn_expiry_sweeper;

use crate::config::AssistanceConfig;
use crate::error_handling::ServiceError;
use crate::geometry::Point;

/// Lookup policy of an [`AssistanceCache`].
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    /// Maximum distance in meters between the request and a cached reading
    pub max_distance: f64,
    /// Age after which an entry no longer answers requests
    pub cache_time: Duration,
    /// Propagate store read errors instead of treating them as misses
    pub strict_reads: bool,
}

impl From<&AssistanceConfig> for CacheSettings {
    fn from(config: &AssistanceConfig) -> Self {
        Self {
            max_distance: config.max_distance,
            cache_time: config.cache_time(),
            strict_reads: config.strict_cache_reads,
        }
    }
}

/// Assistance-data lookups backed by the `assistance_cache` collection.
pub struct AssistanceCache {
    pool: Arc<Pool<Sqlite>>,
    fetcher: Arc<dyn OriginFetcher>,
    settings: CacheSettings,
}

impl AssistanceCache {
    /// Creates a cache over `pool` that consults `fetcher` on a miss.
    pub fn new(
        pool: Arc<Pool<Sqlite>>,
        fetcher: Arc<dyn OriginFetcher>,
        settings: CacheSettings,
    ) -> Self {
        Self {
            pool,
            fetcher,
            settings,
        }
    }

    /// Lookup policy this cache was built with.
    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// Returns assistance data for `profile` near `point`.
    ///
    /// A fresh cached entry within `max_distance` answers directly, nearest
    /// first, with no side effects. Otherwise the origins are asked and the
    /// answer is stored with the current time. Failing to store it is logged
    /// and does not fail the request.
    ///
    /// # Errors
    ///
    /// - `ServiceError::OriginUnavailable` if the cache missed and every origin failed
    /// - `ServiceError::StoreFailure` if the cache read failed and `strict_reads` is set
    pub async fn get_assistance_data(
        &self,
        profile: &AssistanceProfile,
        point: Point,
    ) -> Result<Vec<u8>, ServiceError> {
        let profile_key = profile.cache_key()?;

        match self.lookup(&profile_key, point).await {
            Ok(Some(data)) => {
                debug!("Assistance cache hit near {:?}", point.coordinates());
                return Ok(data);
            }
            Ok(None) => debug!("Assistance cache miss near {:?}", point.coordinates()),
            Err(e) if !self.settings.strict_reads => {
                warn!("Assistance cache lookup failed, fetching from origin: {e}");
            }
            Err(e) => return Err(e),
        }

        let data = self.fetcher.fetch(point, profile).await?;

        let entry = AssistanceCacheEntry {
            profile: profile_key,
            point,
            data,
            time: Utc::now(),
        };
        if let Err(e) = store::insert_entry(&self.pool, &entry).await {
            warn!("Failed to cache assistance data: {e}");
        }
        Ok(entry.data)
    }

    /// Deletes expired entries now, returning how many were removed.
    pub async fn purge_expired(&self) -> Result<u64, ServiceError> {
        let cutoff = store::freshness_cutoff(Utc::now(), self.settings.cache_time);
        Ok(store::purge_expired(&self.pool, cutoff).await?)
    }

    /// Starts the background expiry sweeper over this cache's store.
    pub fn spawn_expiry_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        sweeper::spawn_expiry_sweeper(Arc::clone(&self.pool), self.settings.cache_time, interval)
    }

    async fn lookup(&self, profile_key: &str, point: Point) -> Result<Option<Vec<u8>>, ServiceError> {
        let cutoff = store::freshness_cutoff(Utc::now(), self.settings.cache_time);
        store::find_nearest(
            &self.pool,
            profile_key,
            point,
            self.settings.max_distance,
            cutoff,
        )
        .await
    }
}
