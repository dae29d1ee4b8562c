//! Nearest weather station lookup.
//!
//! Linear scan over the configured stations using ellipsoidal geodesic
//! distances. Ties go to the station listed first in the configuration.

use std::collections::BTreeSet;

use beat_station_models::WeatherStation;
use geo::{Distance, Geodesic, Point};

use crate::BeatStationError;

/// The station closest to a beat's representative point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestStation<'a> {
    /// The winning station.
    pub station: &'a WeatherStation,
    /// Geodesic distance in kilometers, rounded to 2 decimal places.
    pub distance_km: f64,
}

/// Validates the station table once per run.
///
/// # Errors
///
/// Returns [`BeatStationError::Config`] if the table is empty, a station id
/// is empty or repeated, or a coordinate is out of range.
pub fn validate_stations(stations: &[WeatherStation]) -> Result<(), BeatStationError> {
    if stations.is_empty() {
        return Err(config_error("No weather stations configured."));
    }

    let mut seen = BTreeSet::new();
    for station in stations {
        if station.station_id.trim().is_empty() {
            return Err(config_error(format!(
                "Invalid station_id in station config: {station:?}"
            )));
        }
        if !seen.insert(station.station_id.as_str()) {
            return Err(config_error(format!(
                "Duplicate station_id in station config: {}",
                station.station_id
            )));
        }
        if !station.lat.is_finite()
            || !station.lon.is_finite()
            || !(-90.0..=90.0).contains(&station.lat)
            || !(-180.0..=180.0).contains(&station.lon)
        {
            return Err(config_error(format!(
                "Station {} has invalid coordinates: lat={}, lon={}",
                station.station_id, station.lat, station.lon
            )));
        }
    }

    Ok(())
}

/// Finds the geodesically nearest station to `point` (x = lon, y = lat) of
/// `beat`.
///
/// Uses a strict less-than against the running best, so among exactly
/// equidistant stations the earliest in `stations` wins.
///
/// # Errors
///
/// Returns [`BeatStationError::Config`] if `stations` is empty, or
/// [`BeatStationError::Geometry`] if the distance to a station is not a
/// finite number (e.g. the point lies off the globe).
pub fn find_nearest_station(
    beat: i64,
    point: Point<f64>,
    stations: &[WeatherStation],
) -> Result<NearestStation<'_>, BeatStationError> {
    let mut nearest: Option<(&WeatherStation, f64)> = None;

    for station in stations {
        let distance_km = geodesic_distance_km(point, station);
        if !distance_km.is_finite() {
            return Err(BeatStationError::Geometry {
                beat,
                message: format!(
                    "distance from ({}, {}) to station {} is not finite",
                    point.y(),
                    point.x(),
                    station.station_id
                ),
            });
        }
        match nearest {
            Some((_, best)) if distance_km >= best => {}
            _ => nearest = Some((station, distance_km)),
        }
    }

    nearest
        .map(|(station, distance_km)| NearestStation {
            station,
            distance_km: round_distance(distance_km),
        })
        .ok_or_else(|| config_error("No weather station candidates were provided."))
}

/// Ellipsoidal (WGS84) surface distance between a point and a station.
#[must_use]
pub fn geodesic_distance_km(point: Point<f64>, station: &WeatherStation) -> f64 {
    Geodesic.distance(point, Point::new(station.lon, station.lat)) / 1000.0
}

fn round_distance(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}

fn config_error(message: impl Into<String>) -> BeatStationError {
    BeatStationError::Config {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(id: &str, lat: f64, lon: f64) -> WeatherStation {
        WeatherStation {
            station_id: id.to_string(),
            name: format!("{id} Airport"),
            lat,
            lon,
            location: "Test".to_string(),
        }
    }

    #[test]
    fn picks_the_closest_station() {
        let stations = vec![
            station("FAR", 33.5, -116.0),
            station("NEAR", 32.72, -117.16),
            station("MID", 32.9, -117.0),
        ];

        let nearest = find_nearest_station(1, Point::new(-117.15, 32.71), &stations).unwrap();
        assert_eq!(nearest.station.station_id, "NEAR");
        assert!(nearest.distance_km > 0.0 && nearest.distance_km < 2.0);
    }

    #[test]
    fn equidistant_stations_resolve_to_the_first_listed() {
        let stations = vec![
            station("FIRST", 32.8, -117.1),
            station("SECOND", 32.8, -117.1),
        ];

        let nearest = find_nearest_station(1, Point::new(-117.2, 32.7), &stations).unwrap();
        assert_eq!(nearest.station.station_id, "FIRST");

        let reordered = vec![stations[1].clone(), stations[0].clone()];
        let nearest = find_nearest_station(1, Point::new(-117.2, 32.7), &reordered).unwrap();
        assert_eq!(nearest.station.station_id, "SECOND");
    }

    #[test]
    fn distance_is_geodesic_and_rounded() {
        // One degree of latitude at the equator is ~110.57 km on WGS84.
        let stations = vec![station("NORTH", 1.0, 0.0)];
        let nearest = find_nearest_station(1, Point::new(0.0, 0.0), &stations).unwrap();
        assert!((nearest.distance_km - 110.57).abs() < 1e-9);
    }

    #[test]
    fn co_located_point_has_zero_distance() {
        let stations = vec![station("HERE", 32.7338, -117.1933)];
        let nearest = find_nearest_station(1, Point::new(-117.1933, 32.7338), &stations).unwrap();
        assert!(nearest.distance_km.abs() < f64::EPSILON);
    }

    #[test]
    fn off_globe_point_is_a_geometry_error() {
        let stations = vec![station("A", 32.7, -117.1), station("B", 32.8, -117.2)];
        let err = find_nearest_station(77, Point::new(-117.1, 95.05), &stations).unwrap_err();
        assert!(
            matches!(err, BeatStationError::Geometry { beat: 77, .. }),
            "{err:?}"
        );
    }

    #[test]
    fn empty_station_list_is_a_config_error() {
        assert!(matches!(
            find_nearest_station(1, Point::new(0.0, 0.0), &[]),
            Err(BeatStationError::Config { .. })
        ));
        assert!(matches!(
            validate_stations(&[]),
            Err(BeatStationError::Config { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_station_ids() {
        let stations = vec![station("KSAN", 32.7, -117.1), station("KSAN", 32.8, -117.2)];
        let err = validate_stations(&stations).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Station configuration error: Duplicate station_id in station config: KSAN"
        );
    }

    #[test]
    fn rejects_empty_station_id() {
        let stations = vec![station("", 32.7, -117.1)];
        assert!(matches!(
            validate_stations(&stations),
            Err(BeatStationError::Config { .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let stations = vec![station("BAD", 95.0, -117.1)];
        assert!(validate_stations(&stations).is_err());

        let stations = vec![station("NAN", f64::NAN, -117.1)];
        assert!(validate_stations(&stations).is_err());
    }

    #[test]
    fn accepts_a_valid_table() {
        let stations = vec![station("A", 32.7, -117.1), station("B", 32.8, -117.2)];
        assert!(validate_stations(&stations).is_ok());
    }
}
