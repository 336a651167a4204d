//! Geometry primitives and their GeoJSON wire format.
//!
//! Coordinates are always ordered longitude first, latitude second, in every
//! in-memory, stored and transmitted representation.

mod circle;
mod point;
mod polygon;

use serde::{Deserialize, Serialize};

pub use circle::{circle_to_polygon, circle_to_polygon_with_segments};
pub use point::{as_coordinates, Point};
pub use polygon::{Polygon, Position};

/// GeoJSON geometry object: `{"type": ..., "coordinates": ...}`.
#[derive(Serialize, Deserialize)]
struct GeoJson<C> {
    #[serde(rename = "type")]
    kind: String,
    coordinates: C,
}
