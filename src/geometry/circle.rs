//! Circle to polygon approximation.
//!
//! GeoJSON has no circle type, so a circular geofence is indexed through a
//! polygon sampled on its boundary.

use std::f64::consts::PI;

use super::{Point, Polygon, Position};
use crate::config::{CIRCLE_SEGMENTS, CIRCLE_SNAP_EPSILON, EARTH_RADIUS_METERS};
use crate::error_handling::ServiceError;

/// Approximates a circle as a closed polygon with [`CIRCLE_SEGMENTS`] segments.
///
/// The output is deterministic: the same center and radius always yield the
/// same vertices, bit for bit.
///
/// # Errors
///
/// Returns `ServiceError::InvalidArgument` if the radius is negative or not
/// finite, or if the center sits on a pole, where the longitude correction
/// divides by zero.
pub fn circle_to_polygon(center: Point, radius: f64) -> Result<Polygon, ServiceError> {
    circle_to_polygon_with_segments(center, radius, CIRCLE_SEGMENTS)
}

/// Same as [`circle_to_polygon`] with an explicit segment count.
///
/// More segments follow the circle more closely at the cost of a larger
/// index entry; fewer segments make containment less accurate near the edge.
pub fn circle_to_polygon_with_segments(
    center: Point,
    radius: f64,
    segments: usize,
) -> Result<Polygon, ServiceError> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(ServiceError::InvalidArgument(format!(
            "radius must be a non-negative number of meters, got {radius}"
        )));
    }
    if center.lat().abs() == 90.0 {
        return Err(ServiceError::InvalidArgument(
            "circles centered on a pole are not supported".to_string(),
        ));
    }
    if segments < 3 {
        return Err(ServiceError::InvalidArgument(format!(
            "a circle needs at least 3 segments, got {segments}"
        )));
    }

    let r_lat = radius / EARTH_RADIUS_METERS * 180.0 / PI;
    let r_lon = r_lat / (center.lat() * PI / 180.0).cos();
    let step = 2.0 * PI / segments as f64;

    let points: Vec<Position> = (0..=segments)
        .map(|i| {
            let theta = step * i as f64;
            let x = snap(theta.cos());
            let y = snap(theta.sin());
            [center.lon() + y * r_lon, center.lat() + x * r_lat]
        })
        .collect();

    Polygon::new(points)
}

fn snap(value: f64) -> f64 {
    if value.abs() < CIRCLE_SNAP_EPSILON {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::ErrorKind;

    /// Distance in meters under a flat-earth approximation around `center`.
    fn flat_distance(center: Point, [lon, lat]: Position) -> f64 {
        let meters_per_degree = EARTH_RADIUS_METERS * PI / 180.0;
        let dx = (lon - center.lon()) * (center.lat() * PI / 180.0).cos() * meters_per_degree;
        let dy = (lat - center.lat()) * meters_per_degree;
        (dx * dx + dy * dy).sqrt()
    }

    #[test]
    fn test_ring_is_closed_with_segments_plus_one_vertices() {
        let center = Point::new(37.6173, 55.7558).expect("in range");
        let polygon = circle_to_polygon(center, 500.0).expect("valid circle");
        let ring = polygon.exterior();
        assert_eq!(ring.len(), CIRCLE_SEGMENTS + 1);
        assert_eq!(ring.first(), ring.last());
        assert_eq!(polygon.rings().len(), 1);
    }

    #[test]
    fn test_vertices_lie_on_radius_near_equator() {
        let center = Point::new(10.0, 0.5).expect("in range");
        let radius = 1_000.0;
        let polygon = circle_to_polygon(center, radius).expect("valid circle");
        for &vertex in polygon.exterior() {
            let d = flat_distance(center, vertex);
            assert!(
                (d - radius).abs() <= radius * 1e-3,
                "vertex {:?} at {d} m, expected {radius} m",
                vertex
            );
        }
    }

    #[test]
    fn test_first_vertex_is_due_north() {
        let center = Point::new(0.0, 0.0).expect("in range");
        let polygon = circle_to_polygon(center, 6_378_137.0 * PI / 180.0).expect("valid circle");
        // one degree of latitude north, no longitude offset
        let [lon, lat] = polygon.exterior()[0];
        assert_eq!(lon, 0.0);
        assert!((lat - 1.0).abs() < 1e-12);
        // a quarter turn later: due east, latitude snapped to exactly the center
        assert_eq!(polygon.exterior()[4][1], 0.0);
    }

    #[test]
    fn test_longitude_delta_widens_with_latitude() {
        let equator = circle_to_polygon(Point::new(0.0, 0.0).expect("ok"), 1_000.0).expect("ok");
        let north = circle_to_polygon(Point::new(0.0, 60.0).expect("ok"), 1_000.0).expect("ok");
        let width = |p: &Polygon| {
            let [min_lon, _, max_lon, _] = p.bbox();
            max_lon - min_lon
        };
        // cos(60°) = 0.5, so the ring is twice as wide in degrees
        assert!((width(&north) / width(&equator) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_output_is_deterministic() {
        let center = Point::new(-73.9857, 40.7484).expect("in range");
        let a = circle_to_polygon(center, 250.0).expect("valid circle");
        let b = circle_to_polygon(center, 250.0).expect("valid circle");
        let bits = |p: &Polygon| -> Vec<u64> {
            p.exterior()
                .iter()
                .flat_map(|[lon, lat]| [lon.to_bits(), lat.to_bits()])
                .collect()
        };
        assert_eq!(bits(&a), bits(&b));
    }

    #[test]
    fn test_zero_radius_degenerates_to_center() {
        let center = Point::new(5.0, 5.0).expect("in range");
        let polygon = circle_to_polygon(center, 0.0).expect("zero radius is accepted");
        assert_eq!(polygon.exterior().len(), CIRCLE_SEGMENTS + 1);
        assert!(polygon.exterior().iter().all(|&v| v == [5.0, 5.0]));
    }

    #[test]
    fn test_pole_center_is_rejected() {
        for lat in [90.0, -90.0] {
            let center = Point::new(0.0, lat).expect("in range");
            let err = circle_to_polygon(center, 100.0).expect_err("pole");
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
    }

    #[test]
    fn test_bad_radius_is_rejected() {
        let center = Point::new(0.0, 0.0).expect("in range");
        for radius in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(circle_to_polygon(center, radius).is_err());
        }
    }

    #[test]
    fn test_custom_segment_count() {
        let center = Point::new(0.0, 0.0).expect("in range");
        let polygon = circle_to_polygon_with_segments(center, 100.0, 32).expect("valid circle");
        assert_eq!(polygon.exterior().len(), 33);
        assert!(circle_to_polygon_with_segments(center, 100.0, 2).is_err());
    }

    #[test]
    fn test_center_is_contained() {
        let center = Point::new(30.3, 59.9).expect("in range");
        let polygon = circle_to_polygon(center, 200.0).expect("valid circle");
        assert!(polygon.intersects_point(&center));
    }
}
