#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the beat-to-weather-station mapping tool.

use std::path::{Path, PathBuf};

use beat_station::{BeatStationError, build_beat_station_mapping, io, mapping, nearest, stations};
use beat_station_models::{ConflictMode, WeatherStation};
use clap::{Parser, ValueEnum};

const DEFAULT_INPUT_PATH: &str = "pd_beats_datasd.geojson";
const DEFAULT_OUTPUT_PATH: &str = "beat_station_mapping.json";

#[derive(Parser)]
#[command(
    name = "beat_station_map",
    about = "Map police beats to their nearest weather station"
)]
struct Cli {
    /// Path to the beat `GeoJSON` `FeatureCollection`
    #[arg(long, default_value = DEFAULT_INPUT_PATH)]
    input: PathBuf,
    /// Path to write the mapping JSON to
    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,
    /// TOML station table to use instead of the built-in San Diego stations
    #[arg(long)]
    stations: Option<PathBuf>,
    /// Fail on metadata conflicts inside duplicated beats (default)
    #[arg(long, overrides_with = "no_strict")]
    strict: bool,
    /// Resolve metadata conflicts with the smallest value and log a warning
    #[arg(long, overrides_with = "strict")]
    no_strict: bool,
    /// Logging verbosity (overrides `RUST_LOG`; default: info)
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,
}

impl Cli {
    const fn conflict_mode(&self) -> ConflictMode {
        if self.no_strict {
            ConflictMode::Lenient
        } else {
            ConflictMode::Strict
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Debug => Self::Debug,
            LogLevel::Info => Self::Info,
            LogLevel::Warning => Self::Warn,
            LogLevel::Error => Self::Error,
        }
    }
}

fn init_logger(level: Option<LogLevel>) {
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(log::LevelFilter::Info);
    builder.parse_env("RUST_LOG");
    if let Some(level) = level {
        builder.filter_level(level.into());
    }
    builder.try_init().ok();
}

/// Loads and validates the station table before any beat data is read.
fn load_station_table(path: Option<&Path>) -> Result<Vec<WeatherStation>, BeatStationError> {
    let station_table = match path {
        Some(path) => {
            log::info!("Loading station table from: {}", path.display());
            stations::load_stations(path)?
        }
        None => stations::default_stations()?,
    };
    nearest::validate_stations(&station_table)?;
    log::info!("Using {} weather stations", station_table.len());

    Ok(station_table)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logger(cli.log_level);

    let station_table = load_station_table(cli.stations.as_deref())?;

    let input_path = std::path::absolute(&cli.input)?;
    let output_path = std::path::absolute(&cli.output)?;
    let mode = cli.conflict_mode();

    log::info!("Loading beat data from: {}", input_path.display());
    log::info!("Conflict mode: {mode}");
    let collection = io::load_feature_collection(&input_path)?;

    let result = build_beat_station_mapping(&collection, &station_table, mode)?;
    if !result.warnings.is_empty() {
        log::warn!(
            "{} metadata conflicts were resolved leniently",
            result.warnings.len()
        );
    }

    io::save_mapping(&output_path, &result.records)?;
    mapping::log_summary(&result.summary);
    log::info!("Mapping complete.");

    Ok(())
}
