#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Police beat and weather station mapping types.
//!
//! These types describe the published beat-to-station mapping consumed by
//! the weather capture job, along with the fixed station table and the
//! conflict policy used while consolidating duplicated beat polygons.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Polygonal geometry type of a beat, as named in `GeoJSON`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum GeometryType {
    /// A single polygon (one exterior ring, optional holes).
    Polygon,
    /// Two or more disjoint polygons.
    MultiPolygon,
}

/// How disagreements between duplicated records of one beat are handled.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConflictMode {
    /// Abort the run on the first conflicting `div`, `serv`, or `name`.
    #[default]
    Strict,
    /// Pick the lexicographically smallest value and log a warning.
    Lenient,
}

impl ConflictMode {
    /// Returns `true` for [`ConflictMode::Strict`].
    #[must_use]
    pub const fn is_strict(self) -> bool {
        matches!(self, Self::Strict)
    }
}

/// A weather observation station, as configured in the station table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherStation {
    /// ICAO station identifier (e.g. `"KSAN"`).
    pub station_id: String,
    /// Human-readable station name.
    pub name: String,
    /// Station latitude in decimal degrees.
    pub lat: f64,
    /// Station longitude in decimal degrees.
    pub lon: f64,
    /// Short description of the area the station covers.
    pub location: String,
}

/// One row of the published beat-to-station mapping.
///
/// Field order matches the JSON output document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRecord {
    /// Smallest `objectid` among the source features of this beat.
    pub objectid: i64,
    /// Every source `objectid`, ascending.
    pub source_objectids: Vec<i64>,
    /// Number of source features merged into this beat.
    pub source_feature_count: usize,
    /// Number of source features that had no name.
    pub source_null_name_count: usize,
    /// Beat identifier. Unique across the mapping.
    pub beat: i64,
    /// Division number.
    pub div: Option<i64>,
    /// Service area number.
    pub serv: Option<i64>,
    /// Beat name, if any source feature carried one.
    pub name: Option<String>,
    /// Geometry type after merging.
    pub geometry_type: GeometryType,
    /// Latitude of the interior representative point (6 decimal places).
    pub representative_lat: f64,
    /// Longitude of the interior representative point (6 decimal places).
    pub representative_lon: f64,
    /// Nearest station identifier.
    pub station_id: String,
    /// Nearest station name.
    pub station_name: String,
    /// Nearest station coverage description.
    pub station_location: String,
    /// Geodesic distance to the station in kilometers (2 decimal places).
    pub distance_to_station_km: f64,
}

/// Diagnostics computed while validating a finished mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingSummary {
    /// Number of mapping records.
    pub total_beats: usize,
    /// Records whose beat id was already seen.
    pub duplicate_beat_ids: usize,
    /// Source features folded into another feature of the same beat.
    pub source_duplicates_collapsed: usize,
    /// Source features without a name.
    pub source_null_name_count: usize,
    /// Largest station distance, in kilometers.
    pub max_distance_km: f64,
    /// Mean station distance, in kilometers.
    pub avg_distance_km: f64,
    /// Beats whose merged geometry is a `MultiPolygon`.
    pub multipolygon_beats: usize,
    /// Station id -> number of beats assigned to it.
    pub beats_per_station: BTreeMap<String, usize>,
}
