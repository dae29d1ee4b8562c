//! Extracts raw beat records from a `GeoJSON` `FeatureCollection`.
//!
//! Every feature must carry the beat properties and a polygonal geometry.
//! The first structural problem aborts extraction with the offending
//! feature index.

use beat_station_models::GeometryType;
use geo::CoordsIter;

use crate::BeatStationError;

/// Properties that must be present on every feature. `div` and `serv` may
/// be null, but the keys must exist.
const REQUIRED_PROPERTIES: &[&str] = &["objectid", "beat", "div", "serv"];

/// One polygon record from the source collection.
///
/// Several records may share the same `beat`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBeatFeature {
    /// Source record identifier.
    pub objectid: i64,
    /// Beat identifier.
    pub beat: i64,
    /// Division number.
    pub div: Option<i64>,
    /// Service area number.
    pub serv: Option<i64>,
    /// Beat name.
    pub name: Option<String>,
    /// Declared `GeoJSON` geometry type.
    pub geometry_type: GeometryType,
    /// Parsed polygonal geometry (lon/lat).
    pub geometry: geo::Geometry<f64>,
}

/// Extracts all beat features, in input order.
///
/// # Errors
///
/// Returns [`BeatStationError::MalformedInput`] if the document is not a
/// `FeatureCollection`, its `features` member is not a list, or any feature
/// is missing required properties or a polygonal geometry.
pub fn extract_beats(
    collection: &serde_json::Value,
) -> Result<Vec<RawBeatFeature>, BeatStationError> {
    if collection.get("type").and_then(serde_json::Value::as_str) != Some("FeatureCollection") {
        return Err(malformed("Input GeoJSON must be a FeatureCollection."));
    }

    let features = collection
        .get("features")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| malformed("Input GeoJSON features must be a list."))?;

    features
        .iter()
        .enumerate()
        .map(|(index, feature)| extract_feature(index, feature))
        .collect()
}

fn extract_feature(
    index: usize,
    feature: &serde_json::Value,
) -> Result<RawBeatFeature, BeatStationError> {
    let (Some(properties), Some(geometry)) = (
        feature.get("properties").and_then(serde_json::Value::as_object),
        feature.get("geometry").and_then(serde_json::Value::as_object),
    ) else {
        return Err(malformed(format!(
            "Feature index {index} missing properties or geometry."
        )));
    };

    let missing: Vec<&str> = REQUIRED_PROPERTIES
        .iter()
        .copied()
        .filter(|key| !properties.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(malformed(format!(
            "Feature index {index} missing required properties: {missing:?}"
        )));
    }

    let geometry_type = geometry
        .get("type")
        .and_then(serde_json::Value::as_str)
        .and_then(|t| t.parse::<GeometryType>().ok())
        .ok_or_else(|| {
            malformed(format!(
                "Feature index {index} has unsupported geometry type: {}",
                geometry.get("type").unwrap_or(&serde_json::Value::Null)
            ))
        })?;

    if !geometry.contains_key("coordinates") {
        return Err(malformed(format!(
            "Feature index {index} missing geometry coordinates."
        )));
    }

    let objectid = required_int(index, "objectid", &properties["objectid"])?;
    let beat = required_int(index, "beat", &properties["beat"])?;
    let div = optional_int(index, "div", &properties["div"])?;
    let serv = optional_int(index, "serv", &properties["serv"])?;

    let name = match properties.get("name") {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(name)) => Some(name.clone()),
        Some(other) => {
            return Err(malformed(format!(
                "Feature index {index} has non-string name: {other}"
            )));
        }
    };

    let geojson_geometry: geojson::Geometry =
        serde_json::from_value(serde_json::Value::Object(geometry.clone())).map_err(|e| {
            malformed(format!(
                "Feature index {index} has invalid geometry coordinates: {e}"
            ))
        })?;
    let geometry: geo::Geometry<f64> = geojson_geometry.try_into().map_err(|e| {
        malformed(format!(
            "Feature index {index} geometry could not be converted: {e}"
        ))
    })?;

    if let Some(coord) = geometry
        .coords_iter()
        .find(|c| !(-180.0..=180.0).contains(&c.x) || !(-90.0..=90.0).contains(&c.y))
    {
        return Err(malformed(format!(
            "Feature index {index} has coordinate out of range: lon={}, lat={}",
            coord.x, coord.y
        )));
    }

    Ok(RawBeatFeature {
        objectid,
        beat,
        div,
        serv,
        name,
        geometry_type,
        geometry,
    })
}

fn required_int(
    index: usize,
    key: &str,
    value: &serde_json::Value,
) -> Result<i64, BeatStationError> {
    optional_int(index, key, value)?
        .ok_or_else(|| malformed(format!("Feature index {index} has null {key}.")))
}

/// Reads an integer property. Accepts JSON integers, integral floats, and
/// numeric strings.
#[allow(clippy::cast_possible_truncation)]
fn optional_int(
    index: usize,
    key: &str,
    value: &serde_json::Value,
) -> Result<Option<i64>, BeatStationError> {
    let parsed = match value {
        serde_json::Value::Null => return Ok(None),
        serde_json::Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                .map(|f| f as i64)
        }),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    parsed.map(Some).ok_or_else(|| {
        malformed(format!(
            "Feature index {index} has non-integer {key}: {value}"
        ))
    })
}

fn malformed(message: impl Into<String>) -> BeatStationError {
    BeatStationError::MalformedInput {
        message: message.into(),
    }
}
