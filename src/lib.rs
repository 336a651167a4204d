//! location_service library: GNSS assistance-data cache and geofence index
//!
//! This library answers two kinds of location lookups against a SQLite-backed
//! document store:
//! - assistance data for a device profile near a point, served from a
//!   proximity cache in front of a list of origin servers with failover
//! - named circular places per group, stored with a derived polygon, and the
//!   places of a group that contain a point
//!
//! # Example
//!
//! ```no_run
//! use location_service::{AssistanceProfile, AssistanceRequest, Config, LocationService, Point};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load("service.json")?;
//! let service = LocationService::from_config(&config).await?;
//! let _sweeper = service.spawn_expiry_sweeper();
//!
//! let request = AssistanceRequest {
//!     point: Point::new(38.67451, 55.715084)?,
//!     profile: AssistanceProfile {
//!         datatype: vec!["eph".into(), "alm".into()],
//!         format: "mga".into(),
//!         gnss: vec!["gps".into(), "glo".into()],
//!         filter_on_pos: false,
//!     },
//! };
//! let payload = service.get_assistance_data(&request).await?;
//! println!("{} bytes of assistance data", payload.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

pub mod assist;
pub mod config;
mod error_handling;
pub mod geofence;
pub mod geometry;
pub mod initialization;
mod service;
mod storage;

// Re-export public API
pub use assist::{
    AssistanceCache, AssistanceProfile, AssistanceRequest, CacheSettings, Failover,
    FailoverStep, OriginFetcher, OriginPool,
};
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::{
    ConfigError, ConfigValidationError, DatabaseError, ErrorKind, InitializationError,
    OriginError, ServiceError,
};
pub use geofence::{GeofenceIndex, Place};
pub use geometry::{as_coordinates, circle_to_polygon, Point, Polygon};
pub use service::LocationService;
pub use storage::{ensure_schema, init_db_pool_with_path};
