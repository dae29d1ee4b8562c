//! Assembles and validates the published beat-to-station mapping.

use std::collections::{BTreeMap, BTreeSet};

use beat_station_models::{GeometryType, MappingRecord, MappingSummary, WeatherStation};

use crate::BeatStationError;
use crate::consolidate::ConsolidatedBeat;
use crate::nearest::find_nearest_station;
use crate::representative::{representative_point, round_coordinate};

/// Builds one mapping record per consolidated beat, in the given order.
///
/// # Errors
///
/// Returns [`BeatStationError::Geometry`] if a beat has no interior point,
/// or [`BeatStationError::Config`] if `stations` is empty.
pub fn build_mapping(
    beats: &[ConsolidatedBeat],
    stations: &[WeatherStation],
) -> Result<Vec<MappingRecord>, BeatStationError> {
    beats
        .iter()
        .map(|beat| {
            let point = representative_point(beat.beat, &beat.geometry)?;
            let nearest = find_nearest_station(beat.beat, point, stations)?;

            log::debug!(
                "Beat {} -> {} ({:.2} km)",
                beat.beat,
                nearest.station.station_id,
                nearest.distance_km
            );

            Ok(MappingRecord {
                objectid: beat.objectid,
                source_objectids: beat.source_objectids.clone(),
                source_feature_count: beat.source_feature_count,
                source_null_name_count: beat.source_null_name_count,
                beat: beat.beat,
                div: beat.div,
                serv: beat.serv,
                name: beat.name.clone(),
                geometry_type: beat.geometry_type(),
                representative_lat: round_coordinate(point.y()),
                representative_lon: round_coordinate(point.x()),
                station_id: nearest.station.station_id.clone(),
                station_name: nearest.station.name.clone(),
                station_location: nearest.station.location.clone(),
                distance_to_station_km: nearest.distance_km,
            })
        })
        .collect()
}

/// Sanity-checks a finished mapping and computes its summary.
///
/// # Errors
///
/// Returns [`BeatStationError::EmptyResult`] for an empty mapping, or
/// [`BeatStationError::DuplicateBeat`] if any beat id repeats.
#[allow(clippy::cast_precision_loss)]
pub fn validate_mapping(mapping: &[MappingRecord]) -> Result<MappingSummary, BeatStationError> {
    if mapping.is_empty() {
        return Err(BeatStationError::EmptyResult);
    }

    let unique_beats: BTreeSet<i64> = mapping.iter().map(|r| r.beat).collect();
    let duplicate_beat_ids = mapping.len() - unique_beats.len();
    if duplicate_beat_ids > 0 {
        return Err(BeatStationError::DuplicateBeat {
            count: duplicate_beat_ids,
        });
    }

    let mut beats_per_station: BTreeMap<String, usize> = BTreeMap::new();
    for record in mapping {
        *beats_per_station
            .entry(record.station_id.clone())
            .or_default() += 1;
    }

    let distances = mapping.iter().map(|r| r.distance_to_station_km);
    let max_distance_km = distances.clone().fold(f64::MIN, f64::max);
    let avg_distance_km = distances.sum::<f64>() / mapping.len() as f64;

    Ok(MappingSummary {
        total_beats: mapping.len(),
        duplicate_beat_ids,
        source_duplicates_collapsed: mapping
            .iter()
            .map(|r| r.source_feature_count.saturating_sub(1))
            .sum(),
        source_null_name_count: mapping.iter().map(|r| r.source_null_name_count).sum(),
        max_distance_km,
        avg_distance_km,
        multipolygon_beats: mapping
            .iter()
            .filter(|r| r.geometry_type == GeometryType::MultiPolygon)
            .count(),
        beats_per_station,
    })
}

/// Logs a validation summary.
pub fn log_summary(summary: &MappingSummary) {
    log::info!("Validation summary:");
    log::info!("  Total beats: {}", summary.total_beats);
    log::info!("  Duplicate beat IDs in output: {}", summary.duplicate_beat_ids);
    log::info!(
        "  Source duplicate feature count collapsed: {}",
        summary.source_duplicates_collapsed
    );
    log::info!(
        "  Source null-name feature count: {}",
        summary.source_null_name_count
    );
    log::info!("  Max distance: {:.2} km", summary.max_distance_km);
    log::info!("  Avg distance: {:.2} km", summary.avg_distance_km);
    log::info!("  MultiPolygon beats: {}", summary.multipolygon_beats);
    log::info!("  Beats per station:");
    for (station_id, count) in &summary.beats_per_station {
        log::info!("    {station_id}: {count} beats");
    }
}
