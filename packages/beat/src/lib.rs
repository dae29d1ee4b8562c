#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Police beat consolidation and nearest weather station assignment.
//!
//! Reads the police beat polygon collection, merges duplicated records
//! that share a beat id into one canonical geometry, picks an interior
//! representative point for every beat, and assigns each beat to the
//! geodesically nearest configured weather station. The output is a
//! deterministic, beat-sorted mapping consumed by the weather capture job.

pub mod consolidate;
pub mod extract;
pub mod io;
pub mod mapping;
pub mod merge;
pub mod nearest;
pub mod representative;
pub mod stations;

use beat_station_models::{ConflictMode, MappingRecord, MappingSummary, WeatherStation};
use thiserror::Error;

pub use consolidate::ConflictWarning;

/// Errors that can occur while building the beat-to-station mapping.
///
/// Every variant is fatal to the run. Retrying is left to whatever
/// schedules the job.
#[derive(Debug, Error)]
pub enum BeatStationError {
    /// The input document is not a usable beat feature collection.
    #[error("Malformed input: {message}")]
    MalformedInput {
        /// Description of what went wrong, including the feature index.
        message: String,
    },

    /// Duplicated records of one beat disagree in strict mode.
    #[error("Beat {beat} has conflicting {field} values: [{}]", .values.join(", "))]
    Conflict {
        /// Beat identifier.
        beat: i64,
        /// Conflicting field (`div`, `serv`, or `name`).
        field: &'static str,
        /// Sorted, rendered distinct values.
        values: Vec<String>,
    },

    /// Merging a beat's polygons produced no usable polygonal result.
    #[error("Geometry error for beat {beat}: {message}")]
    Geometry {
        /// Beat identifier.
        beat: i64,
        /// Description of what went wrong.
        message: String,
    },

    /// The weather station configuration is invalid.
    #[error("Station configuration error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },

    /// The finished mapping has no records.
    #[error("Generated mapping is empty")]
    EmptyResult,

    /// The finished mapping repeats a beat id.
    #[error("Output contains duplicate beat IDs: {count}")]
    DuplicateBeat {
        /// Number of records whose beat id was already seen.
        count: usize,
    },

    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A validated beat-to-station mapping plus its diagnostics.
#[derive(Debug, Clone)]
pub struct BeatStationMapping {
    /// One record per beat, sorted by beat id.
    pub records: Vec<MappingRecord>,
    /// Validation summary.
    pub summary: MappingSummary,
    /// Conflicts resolved in lenient mode. Always empty in strict mode.
    pub warnings: Vec<ConflictWarning>,
}

/// Runs the full pipeline over a parsed feature collection.
///
/// Stations are validated before the input is looked at, so a bad
/// station table fails the run without doing any geometry work.
///
/// # Errors
///
/// Returns [`BeatStationError`] if the stations are invalid, the input is
/// malformed, a strict-mode conflict is found, a geometry cannot be
/// merged, or the resulting mapping fails validation.
pub fn build_beat_station_mapping(
    collection: &serde_json::Value,
    stations: &[WeatherStation],
    mode: ConflictMode,
) -> Result<BeatStationMapping, BeatStationError> {
    nearest::validate_stations(stations)?;

    let features = extract::extract_beats(collection)?;
    log::info!("Extracted {} beat features", features.len());

    let consolidation = consolidate::consolidate_beats(&features, mode)?;
    log::info!(
        "Consolidated {} features into {} beats ({} conflicts resolved)",
        features.len(),
        consolidation.beats.len(),
        consolidation.warnings.len()
    );

    let records = mapping::build_mapping(&consolidation.beats, stations)?;
    let summary = mapping::validate_mapping(&records)?;

    Ok(BeatStationMapping {
        records,
        summary,
        warnings: consolidation.warnings,
    })
}
