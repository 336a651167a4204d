// storage/schema.rs
// Collection and index provisioning

use sqlx::{Pool, Sqlite};

/// Statements creating both collections and their indexes. All idempotent.
///
/// - `assistance_cache`: one row per cached origin answer. `profile` holds the
///   canonical JSON profile (equality key), `point` the GeoJSON point, and
///   `lon`/`lat` its coordinates as the proximity index projection. `time` is
///   the insertion time in epoch milliseconds and drives expiry.
/// - `places`: one row per geofence keyed by `(group_id, place_id)`. `body` is
///   the JSON `PlaceDocument`; the bbox columns are derived from its polygon
///   and exist only to index containment queries.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS assistance_cache (
        id INTEGER PRIMARY KEY,
        profile TEXT NOT NULL,
        point TEXT NOT NULL,
        lon REAL NOT NULL,
        lat REAL NOT NULL,
        data BLOB NOT NULL,
        time INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_assistance_cache_profile_point
        ON assistance_cache (profile, lat, lon)",
    "CREATE INDEX IF NOT EXISTS idx_assistance_cache_time
        ON assistance_cache (time)",
    "CREATE TABLE IF NOT EXISTS places (
        group_id TEXT NOT NULL,
        place_id TEXT NOT NULL,
        body TEXT NOT NULL,
        min_lon REAL NOT NULL,
        min_lat REAL NOT NULL,
        max_lon REAL NOT NULL,
        max_lat REAL NOT NULL,
        PRIMARY KEY (group_id, place_id)
    )",
    "CREATE INDEX IF NOT EXISTS idx_places_group_bbox
        ON places (group_id, min_lon, max_lon, min_lat, max_lat)",
];

/// Creates the collections and indexes used by the service if missing.
pub async fn ensure_schema(pool: &Pool<Sqlite>) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
