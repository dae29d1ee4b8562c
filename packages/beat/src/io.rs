//! Reading the beat `GeoJSON` and writing the mapping document.

use std::path::Path;

use beat_station_models::MappingRecord;

use crate::BeatStationError;

/// Reads and parses a `GeoJSON` file.
///
/// Only JSON syntax is checked here; [`crate::extract::extract_beats`]
/// validates the collection structure.
///
/// # Errors
///
/// Returns [`BeatStationError::Io`] if the file cannot be read or
/// [`BeatStationError::Json`] if it is not valid JSON.
pub fn load_feature_collection(path: &Path) -> Result<serde_json::Value, BeatStationError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Writes the mapping as a pretty-printed JSON array, creating parent
/// directories as needed.
///
/// # Errors
///
/// Returns [`BeatStationError::Io`] if the directory or file cannot be
/// written.
pub fn save_mapping(path: &Path, mapping: &[MappingRecord]) -> Result<(), BeatStationError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut json = serde_json::to_string_pretty(mapping)?;
    json.push('\n');
    std::fs::write(path, json)?;

    log::info!("Saved beat-to-station mapping: {}", path.display());
    Ok(())
}
