//! Polygon made of closed linear rings.

use geo::Intersects;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{GeoJson, Point};
use crate::error_handling::ServiceError;

const POLYGON_TYPE: &str = "Polygon";

/// A `[lon, lat]` vertex. Unlike [`Point`] it is not range-checked, so rings
/// around a center near the antimeridian may step slightly past ±180.
pub type Position = [f64; 2];

/// Ordered list of closed rings; the first ring is the outer boundary, any
/// further rings are holes.
///
/// Serializes as a GeoJSON polygon,
/// `{"type":"Polygon","coordinates":[[[lon,lat], ...]]}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    rings: Vec<Vec<Position>>,
}

impl Polygon {
    /// Builds a simple polygon (one outer ring, no holes) from its vertices,
    /// repeating the first vertex at the end if the ring is not already closed.
    pub fn new(mut points: Vec<Position>) -> Result<Self, ServiceError> {
        let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
            return Err(ServiceError::InvalidArgument(
                "polygon needs at least one point".to_string(),
            ));
        };
        if first != last {
            points.push(first);
        }
        Ok(Self {
            rings: vec![points],
        })
    }

    /// All rings, outer boundary first.
    pub fn rings(&self) -> &[Vec<Position>] {
        &self.rings
    }

    /// The outer boundary ring.
    pub fn exterior(&self) -> &[Position] {
        &self.rings[0]
    }

    /// True when every ring ends on its first vertex.
    pub fn is_closed(&self) -> bool {
        self.rings
            .iter()
            .all(|ring| ring.first().is_some() && ring.first() == ring.last())
    }

    /// Bounding box of the outer ring as `[min_lon, min_lat, max_lon, max_lat]`.
    pub fn bbox(&self) -> [f64; 4] {
        self.exterior().iter().fold(
            [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY],
            |[min_lon, min_lat, max_lon, max_lat], &[lon, lat]| {
                [
                    min_lon.min(lon),
                    min_lat.min(lat),
                    max_lon.max(lon),
                    max_lat.max(lat),
                ]
            },
        )
    }

    /// Point-in-polygon test; a point on the boundary intersects.
    ///
    /// Rings around a center near the antimeridian step past ±180, so the
    /// point is also tried at its ±360° equivalent when the ring reaches over.
    pub fn intersects_point(&self, point: &Point) -> bool {
        let polygon = self.to_geo();
        let [min_lon, _, max_lon, _] = self.bbox();
        let mut longitudes = vec![point.lon()];
        if max_lon > 180.0 {
            longitudes.push(point.lon() + 360.0);
        }
        if min_lon < -180.0 {
            longitudes.push(point.lon() - 360.0);
        }
        longitudes
            .into_iter()
            .any(|lon| polygon.intersects(&geo::Point::new(lon, point.lat())))
    }

    fn to_geo(&self) -> geo::Polygon<f64> {
        let mut rings = self
            .rings
            .iter()
            .map(|ring| geo::LineString::from(ring.clone()));
        let exterior = rings.next().unwrap_or_else(|| geo::LineString::new(vec![]));
        geo::Polygon::new(exterior, rings.collect())
    }
}

impl Serialize for Polygon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        GeoJson {
            kind: POLYGON_TYPE.to_string(),
            coordinates: &self.rings,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Polygon {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let shape = GeoJson::<Vec<Vec<Position>>>::deserialize(deserializer)?;
        if shape.kind != POLYGON_TYPE {
            return Err(D::Error::custom(format!(
                "bad GeoJSON Polygon type: {}",
                shape.kind
            )));
        }
        if shape.coordinates.is_empty() || shape.coordinates.iter().any(Vec::is_empty) {
            return Err(D::Error::custom("GeoJSON Polygon has an empty ring"));
        }
        if shape.coordinates.iter().any(|ring| ring.first() != ring.last()) {
            return Err(D::Error::custom("GeoJSON Polygon has an open ring"));
        }
        Ok(Self {
            rings: shape.coordinates,
        })
    }
}
