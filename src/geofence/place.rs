//! Place types: the public record and its stored document.

use serde::{Deserialize, Serialize};

use crate::error_handling::ServiceError;
use crate::geometry::{as_coordinates, circle_to_polygon, Point, Polygon};

/// Current layout version of [`PlaceDocument`].
pub const PLACE_DOCUMENT_VERSION: u32 = 1;

/// A named circular region, identified by `(group, id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Owning group; mandatory
    pub group: String,
    /// Identifier within the group; generated on save when empty
    #[serde(default)]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Center as `[lon, lat]`
    #[serde(with = "as_coordinates")]
    pub center: Point,
    /// Radius in meters
    pub radius: f64,
    /// Free-form postal address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

/// Stored body of a place, keyed by `(group, id)` outside the document.
///
/// `center` and `radius` are authoritative. `polygon` is derived from them by
/// [`PlaceDocument::from_place`] on every write and is never edited directly;
/// it exists only so the containment index has a geometry to work with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDocument {
    version: u32,
    name: String,
    #[serde(with = "as_coordinates")]
    center: Point,
    radius: f64,
    polygon: Polygon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    comments: Option<String>,
}

impl PlaceDocument {
    /// Builds the stored body for `place`, computing its polygon.
    pub fn from_place(place: &Place) -> Result<Self, ServiceError> {
        Ok(Self {
            version: PLACE_DOCUMENT_VERSION,
            name: place.name.clone(),
            center: place.center,
            radius: place.radius,
            polygon: circle_to_polygon(place.center, place.radius)?,
            address: place.address.clone(),
            comments: place.comments.clone(),
        })
    }

    /// Polygon derived from center and radius at save time.
    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    /// Converts back to the public record, dropping the derived polygon.
    pub fn into_place(self, group: String, id: String) -> Place {
        Place {
            group,
            id,
            name: self.name,
            center: self.center,
            radius: self.radius,
            address: self.address,
            comments: self.comments,
        }
    }
}
