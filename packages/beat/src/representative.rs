//! Interior representative point for a consolidated beat.
//!
//! Centroids of concave beats can land outside the beat, so the point used
//! for station distances is an interior point of the beat's largest
//! component polygon instead.

use geo::{Area, InteriorPoint, Point, Polygon};

use crate::BeatStationError;
use crate::merge::BeatGeometry;

/// Picks a point guaranteed to lie inside the beat.
///
/// For a `MultiPolygon` the component with the largest area is used; on an
/// exact area tie the earlier component wins.
///
/// # Errors
///
/// Returns [`BeatStationError::Geometry`] if the selected polygon is
/// degenerate and has no interior point.
pub fn representative_point(
    beat: i64,
    geometry: &BeatGeometry,
) -> Result<Point<f64>, BeatStationError> {
    largest_polygon(geometry.polygons())
        .and_then(InteriorPoint::interior_point)
        .ok_or_else(|| BeatStationError::Geometry {
            beat,
            message: "geometry has no interior point".to_string(),
        })
}

fn largest_polygon(polygons: &[Polygon<f64>]) -> Option<&Polygon<f64>> {
    let mut best: Option<(&Polygon<f64>, f64)> = None;
    for polygon in polygons {
        let area = polygon.unsigned_area();
        match best {
            Some((_, best_area)) if area <= best_area => {}
            _ => best = Some((polygon, area)),
        }
    }
    best.map(|(polygon, _)| polygon)
}

/// Rounds a coordinate to 6 decimal places (about 0.1 m).
#[must_use]
pub fn round_coordinate(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}
