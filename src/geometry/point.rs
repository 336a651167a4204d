//! Geographic point.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::GeoJson;
use crate::error_handling::ServiceError;

const POINT_TYPE: &str = "Point";

/// A validated (longitude, latitude) pair in degrees.
///
/// Serializes as a GeoJSON point, `{"type":"Point","coordinates":[lon,lat]}`.
/// Use [`as_coordinates`] where the bare `[lon, lat]` array is wanted instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    lon: f64,
    lat: f64,
}

impl Point {
    /// Creates a point, rejecting coordinates outside [-180, 180] x [-90, 90].
    ///
    /// NaN is rejected as well, since it is outside every range.
    pub fn new(lon: f64, lat: f64) -> Result<Self, ServiceError> {
        if !(-180.0..=180.0).contains(&lon) {
            return Err(ServiceError::InvalidArgument(format!("bad longitude: {lon}")));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ServiceError::InvalidArgument(format!("bad latitude: {lat}")));
        }
        Ok(Self { lon, lat })
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Returns `[lon, lat]`.
    pub fn coordinates(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

impl TryFrom<[f64; 2]> for Point {
    type Error = ServiceError;

    fn try_from([lon, lat]: [f64; 2]) -> Result<Self, Self::Error> {
        Point::new(lon, lat)
    }
}

impl From<Point> for geo::Point<f64> {
    fn from(point: Point) -> Self {
        geo::Point::new(point.lon, point.lat)
    }
}

impl Serialize for Point {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        GeoJson {
            kind: POINT_TYPE.to_string(),
            coordinates: self.coordinates(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Point {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let shape = GeoJson::<[f64; 2]>::deserialize(deserializer)?;
        if shape.kind != POINT_TYPE {
            return Err(D::Error::custom(format!(
                "bad GeoJSON Point type: {}",
                shape.kind
            )));
        }
        Point::try_from(shape.coordinates).map_err(D::Error::custom)
    }
}

/// Serde adapter storing a [`Point`] as a bare `[lon, lat]` array.
///
/// ```
/// use location_service::{as_coordinates, Point};
///
/// #[derive(serde::Serialize)]
/// struct Center {
///     #[serde(with = "as_coordinates")]
///     center: Point,
/// }
///
/// let center = Center { center: Point::new(37.6, 55.7).unwrap() };
/// assert_eq!(serde_json::to_string(&center).unwrap(), r#"{"center":[37.6,55.7]}"#);
/// ```
pub mod as_coordinates {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Point;

    /// Writes `point` as `[lon, lat]`.
    pub fn serialize<S: Serializer>(point: &Point, serializer: S) -> Result<S::Ok, S::Error> {
        point.coordinates().serialize(serializer)
    }

    /// Reads a range-checked point from `[lon, lat]`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Point, D::Error> {
        let coordinates = <[f64; 2]>::deserialize(deserializer)?;
        Point::try_from(coordinates).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::ErrorKind;

    #[test]
    fn test_point_accepts_range_bounds() {
        for (lon, lat) in [(-180.0, -90.0), (180.0, 90.0), (0.0, 0.0), (37.61, 55.75)] {
            let point = Point::new(lon, lat).expect("in range");
            assert_eq!(point.coordinates(), [lon, lat]);
        }
    }

    #[test]
    fn test_point_rejects_out_of_range() {
        for (lon, lat) in [
            (180.0001, 0.0),
            (-181.0, 0.0),
            (0.0, 90.5),
            (0.0, -91.0),
            (f64::NAN, 0.0),
        ] {
            let err = Point::new(lon, lat).expect_err("out of range");
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
    }

    #[test]
    fn test_point_serializes_as_geojson_lon_first() {
        let point = Point::new(38.67451, 55.715084).expect("in range");
        let json = serde_json::to_string(&point).expect("serialize");
        assert_eq!(json, r#"{"type":"Point","coordinates":[38.67451,55.715084]}"#);
    }

    #[test]
    fn test_point_deserializes_geojson() {
        let point: Point =
            serde_json::from_str(r#"{"type":"Point","coordinates":[10.5,-20.25]}"#)
                .expect("valid point");
        assert_eq!(point.lon(), 10.5);
        assert_eq!(point.lat(), -20.25);
    }

    #[test]
    fn test_point_rejects_wrong_geojson_type() {
        let result: Result<Point, _> =
            serde_json::from_str(r#"{"type":"Polygon","coordinates":[10.5,20.0]}"#);
        let err = result.expect_err("type mismatch");
        assert!(err.to_string().contains("bad GeoJSON Point type"));
    }

    #[test]
    fn test_point_rejects_out_of_range_geojson() {
        let result: Result<Point, _> =
            serde_json::from_str(r#"{"type":"Point","coordinates":[200.0,20.0]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_geo_conversion_keeps_axis_order() {
        let point: geo::Point<f64> = Point::new(12.0, 34.0).expect("in range").into();
        assert_eq!(point.x(), 12.0);
        assert_eq!(point.y(), 34.0);
    }
}
