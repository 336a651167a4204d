//! The location service façade.
//!
//! Owns the optional components and routes each operation to the one that
//! serves it. An operation whose component was never wired fails with
//! `NotInitialized` instead of reaching for a default.

use std::sync::Arc;
use std::time::Duration;

use log::info;
use tokio::task::JoinHandle;

use crate::assist::{AssistanceCache, AssistanceRequest, CacheSettings, OriginPool};
use crate::config::Config;
use crate::error_handling::{DatabaseError, InitializationError, ServiceError};
use crate::geofence::{GeofenceIndex, Place};
use crate::geometry::Point;
use crate::initialization::init_origin_client;
use crate::storage::{ensure_schema, init_db_pool_with_path};

const ASSISTANCE: &str = "assistance";
const GEOFENCE: &str = "geofence";

/// Assistance-data lookups and geofence queries behind one handle.
///
/// # Examples
///
/// ```no_run
/// use location_service::{Config, LocationService, Place, Point};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::load("service.json")?;
/// let service = LocationService::from_config(&config).await?;
///
/// let id = service
///     .save_fence(Place {
///         group: "family".into(),
///         id: String::new(),
///         name: "Home".into(),
///         center: Point::new(37.6173, 55.7558)?,
///         radius: 150.0,
///         address: None,
///         comments: None,
///     })
///     .await?;
/// let inside = service
///     .find_containing("family", Point::new(37.6173, 55.7558)?)
///     .await?;
/// assert!(inside.contains(&id));
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct LocationService {
    assistance: Option<AssistanceCache>,
    geofences: Option<GeofenceIndex>,
    sweep_interval: Option<Duration>,
}

impl LocationService {
    /// Wraps already constructed components; either may be absent.
    pub fn new(assistance: Option<AssistanceCache>, geofences: Option<GeofenceIndex>) -> Self {
        Self {
            assistance,
            geofences,
            sweep_interval: None,
        }
    }

    /// Opens the store and wires every component configured in `config`.
    ///
    /// The database is only opened when at least one component is configured.
    /// Its schema and indexes are created if missing.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::DatabaseError` if the store cannot be
    /// opened or provisioned, and `InitializationError::HttpClientError` if the
    /// origin client cannot be built.
    pub async fn from_config(config: &Config) -> Result<Self, InitializationError> {
        if config.assistance.is_none() && config.geofence.is_none() {
            info!("No components configured");
            return Ok(Self::default());
        }

        let pool = init_db_pool_with_path(&config.db_path).await?;
        ensure_schema(&pool)
            .await
            .map_err(DatabaseError::SqlError)?;

        let mut service = Self::default();
        if let Some(assistance) = &config.assistance {
            let client = init_origin_client(assistance.timeout())?;
            let origins = OriginPool::new(
                client,
                assistance.servers.clone(),
                assistance.token.clone(),
                assistance.pacc,
            );
            service.assistance = Some(AssistanceCache::new(
                Arc::clone(&pool),
                Arc::new(origins),
                CacheSettings::from(assistance),
            ));
            service.sweep_interval = Some(assistance.sweep_interval());
            info!(
                "Assistance cache ready with {} origin server(s)",
                assistance.servers.len()
            );
        }
        if config.geofence.is_some() {
            service.geofences = Some(GeofenceIndex::new(Arc::clone(&pool)));
            info!("Geofence index ready");
        }
        Ok(service)
    }

    /// Starts the expiry sweeper of the assistance cache, if it is wired.
    ///
    /// Uses the configured sweep interval, or one minute for services built
    /// with [`LocationService::new`].
    pub fn spawn_expiry_sweeper(&self) -> Option<JoinHandle<()>> {
        let interval = self
            .sweep_interval
            .unwrap_or(crate::config::DEFAULT_SWEEP_INTERVAL);
        self.assistance
            .as_ref()
            .map(|cache| cache.spawn_expiry_sweeper(interval))
    }

    /// Returns assistance data for the request, from cache or origin.
    pub async fn get_assistance_data(
        &self,
        request: &AssistanceRequest,
    ) -> Result<Vec<u8>, ServiceError> {
        self.assistance()?
            .get_assistance_data(&request.profile, request.point)
            .await
    }

    /// Deletes expired assistance cache entries now.
    pub async fn purge_expired(&self) -> Result<u64, ServiceError> {
        self.assistance()?.purge_expired().await
    }

    /// Saves a place and returns its id.
    pub async fn save_fence(&self, place: Place) -> Result<String, ServiceError> {
        self.geofences()?.save_fence(place).await
    }

    /// Deletes a place; deleting an absent place succeeds.
    pub async fn delete_fence(&self, group: &str, id: &str) -> Result<String, ServiceError> {
        self.geofences()?.delete_fence(group, id).await
    }

    /// Lists the places of a group.
    pub async fn list_fences(&self, group: &str) -> Result<Vec<Place>, ServiceError> {
        self.geofences()?.list_fences(group).await
    }

    /// Ids of the places of a group that contain `point`.
    pub async fn find_containing(
        &self,
        group: &str,
        point: Point,
    ) -> Result<Vec<String>, ServiceError> {
        self.geofences()?.find_containing(group, point).await
    }

    fn assistance(&self) -> Result<&AssistanceCache, ServiceError> {
        self.assistance
            .as_ref()
            .ok_or(ServiceError::NotInitialized(ASSISTANCE))
    }

    fn geofences(&self) -> Result<&GeofenceIndex, ServiceError> {
        self.geofences
            .as_ref()
            .ok_or(ServiceError::NotInitialized(GEOFENCE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assist::AssistanceProfile;
    use crate::config::{AssistanceConfig, GeofenceConfig};
    use crate::error_handling::ErrorKind;
    use tempfile::TempDir;

    fn request() -> AssistanceRequest {
        AssistanceRequest {
            point: Point::new(1.0, 1.0).unwrap(),
            profile: AssistanceProfile::default(),
        }
    }

    fn place() -> Place {
        Place {
            group: "g".into(),
            id: "p".into(),
            name: "P".into(),
            center: Point::new(1.0, 1.0).unwrap(),
            radius: 100.0,
            address: None,
            comments: None,
        }
    }

    #[tokio::test]
    async fn test_unwired_components_report_not_initialized() {
        let service = LocationService::new(None, None);

        let err = service.get_assistance_data(&request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotInitialized);
        assert_eq!(err.to_string(), "assistance service not initialized");
        assert!(matches!(
            service.purge_expired().await,
            Err(ServiceError::NotInitialized("assistance"))
        ));

        for result in [
            service.save_fence(place()).await,
            service.delete_fence("g", "p").await,
        ] {
            assert!(matches!(result, Err(ServiceError::NotInitialized("geofence"))));
        }
        assert!(service.list_fences("g").await.is_err());
        assert!(service
            .find_containing("g", Point::new(0.0, 0.0).unwrap())
            .await
            .is_err());
        assert!(service.spawn_expiry_sweeper().is_none());
    }

    #[tokio::test]
    async fn test_from_config_without_components_opens_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = Config {
            db_path: temp_dir.path().join("unused.db"),
            ..Default::default()
        };
        let service = LocationService::from_config(&config).await.unwrap();
        assert!(service.list_fences("g").await.is_err());
        assert!(!config.db_path.exists());
    }

    #[tokio::test]
    async fn test_from_config_wires_geofence_only() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = Config {
            db_path: temp_dir.path().join("fences.db"),
            geofence: Some(GeofenceConfig::default()),
            ..Default::default()
        };
        let service = LocationService::from_config(&config).await.unwrap();

        assert_eq!(service.save_fence(place()).await.unwrap(), "p");
        assert_eq!(service.list_fences("g").await.unwrap(), vec![place()]);
        assert_eq!(
            service.get_assistance_data(&request()).await.unwrap_err().kind(),
            ErrorKind::NotInitialized
        );
    }

    #[tokio::test]
    async fn test_from_config_wires_assistance() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = Config {
            db_path: temp_dir.path().join("assist.db"),
            assistance: Some(AssistanceConfig {
                servers: vec!["http://127.0.0.1:9/".into()],
                ..Default::default()
            }),
            ..Default::default()
        };
        let service = LocationService::from_config(&config).await.unwrap();

        assert_eq!(service.purge_expired().await.unwrap(), 0);
        let sweeper = service.spawn_expiry_sweeper().expect("assistance is wired");
        sweeper.abort();
        assert!(matches!(
            service.list_fences("g").await,
            Err(ServiceError::NotInitialized("geofence"))
        ));
    }
}
