//! Configuration constants.
//!
//! This module defines the constants used throughout the service, including
//! geometry parameters, origin protocol thresholds and default timeouts.

use std::time::Duration;

/// Default SQLite database file.
pub const DB_PATH: &str = "./location_service.db";

// Geometry
/// Equatorial Earth radius in meters used to convert a radius into degrees
pub const EARTH_RADIUS_METERS: f64 = 6_378_137.0;
/// Number of segments used to approximate a circle as a polygon
/// 16 keeps containment accurate near the boundary without bloating the index
pub const CIRCLE_SEGMENTS: usize = 16;
/// Cosine/sine samples smaller than this are snapped to exactly zero
pub const CIRCLE_SNAP_EPSILON: f64 = 0.01;

// Origin protocol
/// `pacc` value the origin treats as its own default; never sent
pub const PACC_DEFAULT_SENTINEL: u32 = 300_000;
/// `pacc` values at or above this bound are rejected by the origin; never sent
pub const PACC_UPPER_BOUND: u32 = 6_000_000;

// Timeouts and expiry
/// Per-origin request timeout when the configuration leaves it unset
pub const DEFAULT_ORIGIN_TIMEOUT: Duration = Duration::from_secs(2 * 60);
/// Lifetime of an assistance cache entry when the configuration leaves it unset
pub const DEFAULT_CACHE_TIME: Duration = Duration::from_secs(30 * 60);
/// How often expired cache entries are physically removed
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);
/// Maximum distance in meters at which a cached reading may answer a request
pub const DEFAULT_MAX_DISTANCE_METERS: f64 = 10_000.0;
