//! Named circular geofences grouped by owner.
//!
//! Each place is stored under its `(group, id)` key together with a polygon
//! approximating its circle, regenerated on every save. Containment queries
//! only ever read that polygon.

mod place;
mod store;

use std::sync::Arc;

use log::debug;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

pub use place::{Place, PlaceDocument, PLACE_DOCUMENT_VERSION};

use crate::error_handling::ServiceError;
use crate::geometry::Point;

/// Geofence CRUD and containment queries over the `places` collection.
pub struct GeofenceIndex {
    pool: Arc<Pool<Sqlite>>,
}

impl GeofenceIndex {
    /// Creates an index over the `places` collection of `pool`.
    pub fn new(pool: Arc<Pool<Sqlite>>) -> Self {
        Self { pool }
    }

    /// Saves `place`, replacing any place stored under the same `(group, id)`.
    ///
    /// An empty id is replaced by a freshly generated one. The polygon is
    /// recomputed from center and radius before the write; the last writer
    /// wins, nothing is merged.
    ///
    /// # Returns
    ///
    /// The id the place was stored under.
    ///
    /// # Errors
    ///
    /// - `ServiceError::MissingGroup` if `place.group` is empty
    /// - `ServiceError::InvalidArgument` for a bad radius or a pole-centered circle
    /// - `ServiceError::StoreFailure` if the write fails
    pub async fn save_fence(&self, mut place: Place) -> Result<String, ServiceError> {
        require_group(&place.group)?;
        if place.id.is_empty() {
            place.id = Uuid::new_v4().simple().to_string();
        }
        let document = PlaceDocument::from_place(&place)?;
        store::upsert(&self.pool, &place.group, &place.id, &document).await?;
        debug!("Saved place {}/{}", place.group, place.id);
        Ok(place.id)
    }

    /// Deletes the place under `(group, id)` and echoes its id.
    ///
    /// Deleting a place that does not exist succeeds.
    pub async fn delete_fence(&self, group: &str, id: &str) -> Result<String, ServiceError> {
        require_group(group)?;
        if id.is_empty() {
            return Err(ServiceError::InvalidArgument("empty place id".to_string()));
        }
        if !store::delete(&self.pool, group, id).await? {
            debug!("Place {group}/{id} was already absent");
        }
        Ok(id.to_string())
    }

    /// Lists every place of `group` in store order, without polygons.
    pub async fn list_fences(&self, group: &str) -> Result<Vec<Place>, ServiceError> {
        require_group(group)?;
        let places = store::list(&self.pool, group)
            .await?
            .into_iter()
            .map(|(id, document)| document.into_place(group.to_string(), id))
            .collect();
        Ok(places)
    }

    /// Returns the distinct ids of places in `group` that contain `point`.
    pub async fn find_containing(
        &self,
        group: &str,
        point: Point,
    ) -> Result<Vec<String>, ServiceError> {
        require_group(group)?;
        store::containing(&self.pool, group, point).await
    }
}

fn require_group(group: &str) -> Result<(), ServiceError> {
    if group.is_empty() {
        return Err(ServiceError::MissingGroup);
    }
    Ok(())
}
