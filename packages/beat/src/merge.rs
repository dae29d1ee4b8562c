//! Polygon union for beats split across several source records.
//!
//! Overlapping or identical duplicates collapse into a single polygon;
//! duplicates drawn at different locations for the same beat id become a
//! `MultiPolygon`.

use beat_station_models::GeometryType;
use geo::{BooleanOps, MultiPolygon, Polygon};

use crate::BeatStationError;

/// The merged, strictly polygonal geometry of one beat.
#[derive(Debug, Clone, PartialEq)]
pub enum BeatGeometry {
    /// The union is a single polygon.
    Polygon(Polygon<f64>),
    /// The union has two or more disjoint parts.
    MultiPolygon(MultiPolygon<f64>),
}

impl BeatGeometry {
    /// Returns the `GeoJSON` type name of this geometry.
    #[must_use]
    pub const fn geometry_type(&self) -> GeometryType {
        match self {
            Self::Polygon(_) => GeometryType::Polygon,
            Self::MultiPolygon(_) => GeometryType::MultiPolygon,
        }
    }

    /// Returns the component polygons.
    #[must_use]
    pub fn polygons(&self) -> &[Polygon<f64>] {
        match self {
            Self::Polygon(polygon) => std::slice::from_ref(polygon),
            Self::MultiPolygon(multi) => &multi.0,
        }
    }
}

/// Unions the geometries of one beat into a single polygonal geometry.
///
/// Non-polygonal members of a geometry collection are discarded before the
/// union. The geometries are unioned in the order given.
///
/// # Errors
///
/// Returns [`BeatStationError::Geometry`] if no polygonal parts are found
/// or the union is empty (e.g. only zero-area rings).
pub fn merge_beat_geometry(
    beat: i64,
    geometries: &[&geo::Geometry<f64>],
) -> Result<BeatGeometry, BeatStationError> {
    let mut parts = Vec::new();
    let mut discarded = 0usize;
    for geometry in geometries {
        discarded += collect_polygonal_parts(geometry, &mut parts);
    }

    if discarded > 0 {
        log::debug!("Beat {beat}: discarded {discarded} non-polygonal geometry parts");
    }

    if parts.is_empty() {
        return Err(BeatStationError::Geometry {
            beat,
            message: "merged into GeometryCollection without polygonal parts".to_string(),
        });
    }

    let merged = parts
        .iter()
        .fold(MultiPolygon::new(Vec::new()), |acc, part| acc.union(part));

    from_union(beat, merged)
}

/// Pushes every polygon found in `geometry` onto `parts`, recursing into
/// collections. Returns the number of non-polygonal parts skipped.
fn collect_polygonal_parts(
    geometry: &geo::Geometry<f64>,
    parts: &mut Vec<MultiPolygon<f64>>,
) -> usize {
    match geometry {
        geo::Geometry::Polygon(polygon) => {
            parts.push(MultiPolygon::new(vec![polygon.clone()]));
            0
        }
        geo::Geometry::MultiPolygon(multi) => {
            parts.push(multi.clone());
            0
        }
        geo::Geometry::GeometryCollection(collection) => collection
            .0
            .iter()
            .map(|member| collect_polygonal_parts(member, parts))
            .sum(),
        _ => 1,
    }
}

fn from_union(beat: i64, merged: MultiPolygon<f64>) -> Result<BeatGeometry, BeatStationError> {
    let mut polygons = merged.0;
    match polygons.len() {
        0 => Err(BeatStationError::Geometry {
            beat,
            message: "merged to an empty geometry".to_string(),
        }),
        1 => Ok(BeatGeometry::Polygon(polygons.remove(0))),
        _ => Ok(BeatGeometry::MultiPolygon(MultiPolygon::new(polygons))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, Point, polygon};

    fn square(x: f64, y: f64, size: f64) -> geo::Geometry<f64> {
        geo::Geometry::Polygon(polygon![
            (x: x, y: y),
            (x: x + size, y: y),
            (x: x + size, y: y + size),
            (x: x, y: y + size),
        ])
    }

    fn area(geometry: &BeatGeometry) -> f64 {
        geometry.polygons().iter().map(|p| p.unsigned_area()).sum()
    }

    #[test]
    fn identical_duplicates_collapse_to_one_polygon() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(0.0, 0.0, 1.0);

        let merged = merge_beat_geometry(1, &[&a, &b]).unwrap();
        assert_eq!(merged.geometry_type(), GeometryType::Polygon);
        assert!((area(&merged) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn overlapping_duplicates_union_into_one_polygon() {
        let a = square(0.0, 0.0, 2.0);
        let b = square(1.0, 1.0, 2.0);

        let merged = merge_beat_geometry(1, &[&a, &b]).unwrap();
        assert_eq!(merged.geometry_type(), GeometryType::Polygon);
        assert!((area(&merged) - 7.0).abs() < 1e-9);
    }

    #[test]
    fn edge_sharing_duplicates_union_into_one_polygon() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(1.0, 0.0, 1.0);

        let merged = merge_beat_geometry(1, &[&a, &b]).unwrap();
        assert_eq!(merged.geometry_type(), GeometryType::Polygon);
        assert!((area(&merged) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn disjoint_duplicates_become_multipolygon() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(5.0, 5.0, 1.0);

        let merged = merge_beat_geometry(1, &[&a, &b]).unwrap();
        assert_eq!(merged.geometry_type(), GeometryType::MultiPolygon);
        assert_eq!(merged.polygons().len(), 2);
    }

    #[test]
    fn single_geometry_passes_through_as_polygon() {
        let a = square(0.0, 0.0, 1.0);
        let merged = merge_beat_geometry(1, &[&a]).unwrap();
        assert_eq!(merged.geometry_type(), GeometryType::Polygon);
    }

    #[test]
    fn collection_keeps_only_polygonal_parts() {
        let collection = geo::Geometry::GeometryCollection(geo::GeometryCollection(
            vec![
                geo::Geometry::Point(Point::new(10.0, 10.0)),
                square(0.0, 0.0, 1.0),
            ],
        ));

        let merged = merge_beat_geometry(1, &[&collection]).unwrap();
        assert_eq!(merged.geometry_type(), GeometryType::Polygon);
        assert!((area(&merged) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn collection_without_polygons_is_a_geometry_error() {
        let collection = geo::Geometry::GeometryCollection(geo::GeometryCollection(
            vec![geo::Geometry::Point(Point::new(10.0, 10.0))],
        ));

        let err = merge_beat_geometry(42, &[&collection]).unwrap_err();
        match err {
            BeatStationError::Geometry { beat, message } => {
                assert_eq!(beat, 42);
                assert!(message.contains("without polygonal parts"));
            }
            other => panic!("expected Geometry error, got {other:?}"),
        }
    }

    #[test]
    fn zero_area_ring_is_a_geometry_error() {
        let flat = geo::Geometry::Polygon(polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 2.0, y: 0.0),
        ]);

        assert!(matches!(
            merge_beat_geometry(7, &[&flat]),
            Err(BeatStationError::Geometry { beat: 7, .. })
        ));
    }
}
