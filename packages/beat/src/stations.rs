//! Weather station table.
//!
//! The default San Diego table is a TOML file embedded at compile time.
//! Operators can point the CLI at another TOML file with the same shape to
//! remap beats against a different station set. Station order is part of
//! the configuration: it breaks distance ties.

use std::path::Path;

use beat_station_models::WeatherStation;
use serde::Deserialize;

use crate::BeatStationError;

/// Number of stations in the embedded table. Enforced by a test.
#[cfg(test)]
const EXPECTED_STATION_COUNT: usize = 7;

/// Embedded default station table.
const DEFAULT_STATIONS_TOML: &str = include_str!("../stations/san_diego.toml");

#[derive(Debug, Deserialize)]
struct StationConfig {
    stations: Vec<WeatherStation>,
}

/// Returns the embedded San Diego station table, in configured order.
///
/// # Errors
///
/// Returns [`BeatStationError::Config`] if the embedded TOML fails to
/// parse.
pub fn default_stations() -> Result<Vec<WeatherStation>, BeatStationError> {
    parse_stations("san_diego", DEFAULT_STATIONS_TOML)
}

/// Loads a station table from a TOML file.
///
/// # Errors
///
/// Returns [`BeatStationError::Io`] if the file cannot be read, or
/// [`BeatStationError::Config`] if it is not a valid station table.
pub fn load_stations(path: &Path) -> Result<Vec<WeatherStation>, BeatStationError> {
    let content = std::fs::read_to_string(path)?;
    parse_stations(&path.display().to_string(), &content)
}

/// Parses a `[[stations]]` TOML document.
///
/// # Errors
///
/// Returns [`BeatStationError::Config`] if the document does not parse.
pub fn parse_stations(name: &str, toml_str: &str) -> Result<Vec<WeatherStation>, BeatStationError> {
    let config: StationConfig =
        toml::from_str(toml_str).map_err(|e| BeatStationError::Config {
            message: format!("Failed to parse station table '{name}': {e}"),
        })?;
    Ok(config.stations)
}
