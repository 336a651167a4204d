//! Place documents in the `places` collection.

use sqlx::{Pool, Row, Sqlite};

use super::place::PlaceDocument;
use crate::error_handling::ServiceError;
use crate::geometry::Point;

/// Inserts or fully replaces the document stored under `(group, id)`.
pub async fn upsert(
    pool: &Pool<Sqlite>,
    group: &str,
    id: &str,
    document: &PlaceDocument,
) -> Result<(), ServiceError> {
    let [min_lon, min_lat, max_lon, max_lat] = document.polygon().bbox();
    sqlx::query(
        "INSERT INTO places (group_id, place_id, body, min_lon, min_lat, max_lon, max_lat)
         VALUES (?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT (group_id, place_id) DO UPDATE SET
            body = excluded.body,
            min_lon = excluded.min_lon,
            min_lat = excluded.min_lat,
            max_lon = excluded.max_lon,
            max_lat = excluded.max_lat",
    )
    .bind(group)
    .bind(id)
    .bind(serde_json::to_string(document)?)
    .bind(min_lon)
    .bind(min_lat)
    .bind(max_lon)
    .bind(max_lat)
    .execute(pool)
    .await?;
    Ok(())
}

/// Removes the document under `(group, id)`, returning whether one existed.
pub async fn delete(pool: &Pool<Sqlite>, group: &str, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM places WHERE group_id = ? AND place_id = ?")
        .bind(group)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// All documents of a group with their ids, in store order.
pub async fn list(
    pool: &Pool<Sqlite>,
    group: &str,
) -> Result<Vec<(String, PlaceDocument)>, ServiceError> {
    let rows = sqlx::query("SELECT place_id, body FROM places WHERE group_id = ?")
        .bind(group)
        .fetch_all(pool)
        .await?;
    rows.iter()
        .map(|row| -> Result<(String, PlaceDocument), ServiceError> {
            let document = serde_json::from_str(row.get::<&str, _>("body"))?;
            Ok((row.get("place_id"), document))
        })
        .collect()
}

/// Distinct ids of the group's places whose polygon intersects `point`.
///
/// The bounding-box columns narrow the candidates; the polygon test decides.
/// Boxes of rings that reach past ±180 are matched against the point's ±360°
/// longitude as well.
pub async fn containing(
    pool: &Pool<Sqlite>,
    group: &str,
    point: Point,
) -> Result<Vec<String>, ServiceError> {
    let (lon, east, west) = (point.lon(), point.lon() + 360.0, point.lon() - 360.0);
    let rows = sqlx::query(
        "SELECT place_id, body FROM places
         WHERE group_id = ?
           AND min_lat <= ? AND max_lat >= ?
           AND ((min_lon <= ? AND max_lon >= ?)
             OR (min_lon <= ? AND max_lon >= ?)
             OR (min_lon <= ? AND max_lon >= ?))",
    )
    .bind(group)
    .bind(point.lat())
    .bind(point.lat())
    .bind(lon)
    .bind(lon)
    .bind(east)
    .bind(east)
    .bind(west)
    .bind(west)
    .fetch_all(pool)
    .await?;

    let mut ids: Vec<String> = Vec::new();
    for row in &rows {
        let document: PlaceDocument = serde_json::from_str(row.get::<&str, _>("body"))?;
        let id: String = row.get("place_id");
        if document.polygon().intersects_point(&point) && !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}
