//! Assistance cache entries in the `assistance_cache` collection.
//!
//! Proximity lookups first narrow candidates in SQL by profile, age and a
//! lat/lon window, then rank the survivors by great-circle distance.

use std::time::Duration;

use chrono::{DateTime, Utc};
use geo::{Distance, Haversine};
use sqlx::{Pool, Row, Sqlite};

use crate::config::EARTH_RADIUS_METERS;
use crate::error_handling::ServiceError;
use crate::geometry::Point;

/// Widens the SQL prefilter window; the exact distance check happens in Rust.
const WINDOW_MARGIN: f64 = 1.1;

/// One stored origin answer. Entries are inserted once and never updated.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistanceCacheEntry {
    /// Canonical profile key, see `AssistanceProfile::cache_key`
    pub profile: String,
    /// Position the origin answer was fetched for
    pub point: Point,
    /// Opaque origin payload, returned verbatim
    pub data: Vec<u8>,
    /// Insertion time; the entry expires once it is older than the cache time
    pub time: DateTime<Utc>,
}

/// Oldest insertion time, in epoch milliseconds, still considered fresh.
///
/// Saturates instead of overflowing, so an oversized `cache_time` keeps every
/// entry fresh rather than wrapping the cutoff into the future.
pub fn freshness_cutoff(now: DateTime<Utc>, cache_time: Duration) -> i64 {
    let cache_ms = i64::try_from(cache_time.as_millis()).unwrap_or(i64::MAX);
    now.timestamp_millis().saturating_sub(cache_ms)
}

/// Returns the payload of the nearest fresh entry for `profile` within
/// `max_distance` meters of `point`, if any.
pub async fn find_nearest(
    pool: &Pool<Sqlite>,
    profile: &str,
    point: Point,
    max_distance: f64,
    cutoff_ms: i64,
) -> Result<Option<Vec<u8>>, ServiceError> {
    let [min_lon, min_lat, max_lon, max_lat] = search_window(point, max_distance);
    let candidates = sqlx::query(
        "SELECT id, lon, lat FROM assistance_cache
         WHERE profile = ? AND time >= ?
           AND lat BETWEEN ? AND ? AND lon BETWEEN ? AND ?",
    )
    .bind(profile)
    .bind(cutoff_ms)
    .bind(min_lat)
    .bind(max_lat)
    .bind(min_lon)
    .bind(max_lon)
    .fetch_all(pool)
    .await?;

    let origin = geo::Point::from(point);
    let nearest = candidates
        .iter()
        .map(|row| {
            let id: i64 = row.get("id");
            let candidate = geo::Point::new(row.get::<f64, _>("lon"), row.get::<f64, _>("lat"));
            (id, Haversine.distance(origin, candidate))
        })
        .filter(|(_, distance)| *distance <= max_distance)
        .min_by(|(_, a), (_, b)| a.total_cmp(b));

    let Some((id, distance)) = nearest else {
        return Ok(None);
    };
    log::debug!("Nearest cached assistance entry {id} is {distance:.0} m away");

    let data: Option<Vec<u8>> = sqlx::query_scalar("SELECT data FROM assistance_cache WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(data)
}

/// Inserts a new cache entry.
pub async fn insert_entry(
    pool: &Pool<Sqlite>,
    entry: &AssistanceCacheEntry,
) -> Result<(), ServiceError> {
    sqlx::query(
        "INSERT INTO assistance_cache (profile, point, lon, lat, data, time)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&entry.profile)
    .bind(serde_json::to_string(&entry.point)?)
    .bind(entry.point.lon())
    .bind(entry.point.lat())
    .bind(&entry.data)
    .bind(entry.time.timestamp_millis())
    .execute(pool)
    .await?;
    Ok(())
}

/// Deletes every entry older than `cutoff_ms`, returning how many were removed.
pub async fn purge_expired(pool: &Pool<Sqlite>, cutoff_ms: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM assistance_cache WHERE time < ?")
        .bind(cutoff_ms)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Lat/lon box `[min_lon, min_lat, max_lon, max_lat]` that contains every
/// point within `max_distance` meters. Longitude is left unbounded when the
/// box would reach a pole or wrap across the antimeridian.
fn search_window(point: Point, max_distance: f64) -> [f64; 4] {
    let d_lat = (max_distance / EARTH_RADIUS_METERS).to_degrees() * WINDOW_MARGIN;
    let min_lat = (point.lat() - d_lat).max(-90.0);
    let max_lat = (point.lat() + d_lat).min(90.0);

    let widest_lat = point.lat().abs() + d_lat;
    if widest_lat >= 90.0 {
        return [-180.0, min_lat, 180.0, max_lat];
    }
    let d_lon = d_lat / widest_lat.to_radians().cos();
    let (min_lon, max_lon) = (point.lon() - d_lon, point.lon() + d_lon);
    if min_lon < -180.0 || max_lon > 180.0 {
        return [-180.0, min_lat, 180.0, max_lat];
    }
    [min_lon, min_lat, max_lon, max_lat]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_helpers::create_test_pool;

    const HOUR: Duration = Duration::from_secs(3600);

    fn entry(profile: &str, lon: f64, lat: f64, data: &[u8], time: DateTime<Utc>) -> AssistanceCacheEntry {
        AssistanceCacheEntry {
            profile: profile.to_string(),
            point: Point::new(lon, lat).expect("in range"),
            data: data.to_vec(),
            time,
        }
    }

    #[tokio::test]
    async fn test_find_nearest_prefers_closest_entry() {
        let pool = create_test_pool().await;
        let now = Utc::now();
        insert_entry(&pool, &entry("p", 37.62, 55.75, b"far", now)).await.unwrap();
        insert_entry(&pool, &entry("p", 37.601, 55.751, b"near", now)).await.unwrap();

        let point = Point::new(37.6, 55.75).unwrap();
        let found = find_nearest(&pool, "p", point, 5_000.0, freshness_cutoff(now, HOUR))
            .await
            .unwrap();
        assert_eq!(found.as_deref(), Some(&b"near"[..]));
    }

    #[tokio::test]
    async fn test_find_nearest_respects_max_distance() {
        let pool = create_test_pool().await;
        let now = Utc::now();
        // ~11 km north of the query point
        insert_entry(&pool, &entry("p", 0.0, 0.1, b"x", now)).await.unwrap();

        let point = Point::new(0.0, 0.0).unwrap();
        let cutoff = freshness_cutoff(now, HOUR);
        assert!(find_nearest(&pool, "p", point, 10_000.0, cutoff).await.unwrap().is_none());
        assert!(find_nearest(&pool, "p", point, 12_000.0, cutoff).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_find_nearest_filters_by_profile() {
        let pool = create_test_pool().await;
        let now = Utc::now();
        insert_entry(&pool, &entry("a", 10.0, 10.0, b"a", now)).await.unwrap();

        let point = Point::new(10.0, 10.0).unwrap();
        let cutoff = freshness_cutoff(now, HOUR);
        assert!(find_nearest(&pool, "b", point, 1_000.0, cutoff).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_nearest_skips_expired_entries() {
        let pool = create_test_pool().await;
        let now = Utc::now();
        let stale = now - chrono::Duration::hours(2);
        insert_entry(&pool, &entry("p", 10.0, 10.0, b"old", stale)).await.unwrap();

        let point = Point::new(10.0, 10.0).unwrap();
        let found = find_nearest(&pool, "p", point, 1_000.0, freshness_cutoff(now, HOUR))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_find_nearest_across_antimeridian() {
        let pool = create_test_pool().await;
        let now = Utc::now();
        insert_entry(&pool, &entry("p", -179.999, 0.0, b"east", now)).await.unwrap();

        let point = Point::new(179.999, 0.0).unwrap();
        let found = find_nearest(&pool, "p", point, 1_000.0, freshness_cutoff(now, HOUR))
            .await
            .unwrap();
        assert_eq!(found.as_deref(), Some(&b"east"[..]));
    }

    #[tokio::test]
    async fn test_purge_expired_removes_only_old_entries() {
        let pool = create_test_pool().await;
        let now = Utc::now();
        insert_entry(&pool, &entry("p", 1.0, 1.0, b"old", now - chrono::Duration::hours(2)))
            .await
            .unwrap();
        insert_entry(&pool, &entry("p", 1.0, 1.0, b"new", now)).await.unwrap();

        let removed = purge_expired(&pool, freshness_cutoff(now, HOUR)).await.unwrap();
        assert_eq!(removed, 1);
        let left: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM assistance_cache")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(left, 1);
    }

    #[test]
    fn test_freshness_cutoff_saturates_for_huge_cache_time() {
        let now = Utc::now();
        for secs in [9_223_373_036_854_776, 10_000_000_000_000_000, u64::MAX] {
            let cutoff = freshness_cutoff(now, Duration::from_secs(secs));
            assert!(cutoff <= now.timestamp_millis(), "cutoff in the future for {secs}s");
        }
        assert_eq!(
            freshness_cutoff(now, Duration::MAX),
            now.timestamp_millis() - i64::MAX
        );
    }

    #[tokio::test]
    async fn test_huge_cache_time_keeps_fresh_entries_visible() {
        let pool = create_test_pool().await;
        let now = Utc::now();
        let point = Point::new(1.0, 1.0).unwrap();
        insert_entry(&pool, &entry("p", 1.0, 1.0, b"fresh", now)).await.unwrap();

        let cutoff = freshness_cutoff(now, Duration::from_secs(10_000_000_000_000_000));
        let found = find_nearest(&pool, "p", point, 1_000.0, cutoff).await.unwrap();
        assert_eq!(found.as_deref(), Some(&b"fresh"[..]));
        assert_eq!(purge_expired(&pool, cutoff).await.unwrap(), 0);
    }

    #[test]
    fn test_search_window_near_pole_is_unbounded_in_longitude() {
        let point = Point::new(10.0, 89.99).unwrap();
        let [min_lon, _, max_lon, max_lat] = search_window(point, 5_000.0);
        assert_eq!((min_lon, max_lon), (-180.0, 180.0));
        assert_eq!(max_lat, 90.0);
    }

    #[test]
    fn test_search_window_contains_point() {
        let point = Point::new(37.6, 55.75).unwrap();
        let [min_lon, min_lat, max_lon, max_lat] = search_window(point, 10_000.0);
        assert!(min_lon < 37.6 && 37.6 < max_lon);
        assert!(min_lat < 55.75 && 55.75 < max_lat);
    }
}
