//! Consolidates duplicated beat records into one canonical beat each.
//!
//! The source layer can carry several polygons for a single beat id (split
//! shapes, re-digitized copies, stale duplicates). Records are grouped by
//! beat id, their geometries are unioned, and their metadata must agree.
//! In strict mode any disagreement aborts the run; in lenient mode the
//! lexicographically smallest value wins and the conflict is logged and
//! reported back to the caller.
//!
//! Nothing here depends on the order of the input records: groups are keyed
//! by beat id, conflicts resolve by value, and geometries are unioned in
//! `objectid` order.

use std::collections::{BTreeMap, BTreeSet};

use beat_station_models::{ConflictMode, GeometryType};

use crate::BeatStationError;
use crate::extract::RawBeatFeature;
use crate::merge::{BeatGeometry, merge_beat_geometry};

/// All source records of one beat, merged.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidatedBeat {
    /// Beat identifier. Unique across a consolidation.
    pub beat: i64,
    /// Smallest source `objectid`.
    pub objectid: i64,
    /// Every source `objectid`, ascending.
    pub source_objectids: Vec<i64>,
    /// Number of source records in the group.
    pub source_feature_count: usize,
    /// Number of source records with a null name.
    pub source_null_name_count: usize,
    /// Resolved division number.
    pub div: Option<i64>,
    /// Resolved service area number.
    pub serv: Option<i64>,
    /// Resolved name, or `None` when no record had one.
    pub name: Option<String>,
    /// Union of the source geometries.
    pub geometry: BeatGeometry,
}

impl ConsolidatedBeat {
    /// Returns the merged geometry type.
    #[must_use]
    pub const fn geometry_type(&self) -> GeometryType {
        self.geometry.geometry_type()
    }
}

/// A metadata conflict that was resolved in lenient mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictWarning {
    /// Beat identifier.
    pub beat: i64,
    /// Conflicting field (`div`, `serv`, or `name`).
    pub field: &'static str,
    /// Distinct values seen, sorted and rendered.
    pub values: Vec<String>,
    /// Rendered value that was kept.
    pub chosen: String,
}

/// Consolidated beats, sorted by beat id, plus any resolved conflicts.
#[derive(Debug, Clone)]
pub struct Consolidation {
    /// One entry per distinct beat id, ascending.
    pub beats: Vec<ConsolidatedBeat>,
    /// Conflicts resolved in lenient mode.
    pub warnings: Vec<ConflictWarning>,
}

/// Groups features by beat id and merges each group.
///
/// # Errors
///
/// Returns [`BeatStationError::Conflict`] for a metadata disagreement in
/// strict mode, or [`BeatStationError::Geometry`] if a group's polygons
/// cannot be merged.
pub fn consolidate_beats(
    features: &[RawBeatFeature],
    mode: ConflictMode,
) -> Result<Consolidation, BeatStationError> {
    let mut grouped: BTreeMap<i64, Vec<&RawBeatFeature>> = BTreeMap::new();
    for feature in features {
        grouped.entry(feature.beat).or_default().push(feature);
    }

    let mut warnings = Vec::new();
    let mut beats = Vec::with_capacity(grouped.len());

    for (beat, mut group) in grouped {
        group.sort_by_key(|feature| feature.objectid);
        beats.push(consolidate_group(beat, &group, mode, &mut warnings)?);
    }

    Ok(Consolidation { beats, warnings })
}

fn consolidate_group(
    beat: i64,
    group: &[&RawBeatFeature],
    mode: ConflictMode,
    warnings: &mut Vec<ConflictWarning>,
) -> Result<ConsolidatedBeat, BeatStationError> {
    let geometries: Vec<&geo::Geometry<f64>> = group.iter().map(|f| &f.geometry).collect();
    let geometry = merge_beat_geometry(beat, &geometries)?;

    let div = resolve_int(
        beat,
        "div",
        group.iter().map(|f| f.div).collect(),
        mode,
        warnings,
    )?;
    let serv = resolve_int(
        beat,
        "serv",
        group.iter().map(|f| f.serv).collect(),
        mode,
        warnings,
    )?;
    let name = resolve_name(beat, group, mode, warnings)?;

    let source_objectids: Vec<i64> = group.iter().map(|f| f.objectid).collect();
    let source_null_name_count = group.iter().filter(|f| f.name.is_none()).count();

    if group.len() > 1 {
        log::debug!(
            "Beat {beat}: merged {} features into {}",
            group.len(),
            geometry.geometry_type()
        );
    }

    Ok(ConsolidatedBeat {
        beat,
        objectid: source_objectids[0],
        source_feature_count: group.len(),
        source_objectids,
        source_null_name_count,
        div,
        serv,
        name,
        geometry,
    })
}

/// Resolves an integer field that may legitimately be null.
///
/// A null alongside a value counts as a conflict. Lenient resolution
/// compares rendered strings, so `10` beats `9` and any number beats null.
fn resolve_int(
    beat: i64,
    field: &'static str,
    values: BTreeSet<Option<i64>>,
    mode: ConflictMode,
    warnings: &mut Vec<ConflictWarning>,
) -> Result<Option<i64>, BeatStationError> {
    if values.len() == 1 {
        return Ok(values.into_iter().next().flatten());
    }

    let rendered: Vec<String> = values.iter().map(|v| render_int(*v)).collect();
    let chosen = values
        .iter()
        .copied()
        .min_by_key(|v| render_int(*v))
        .flatten();

    report_conflict(beat, field, rendered, render_int(chosen), mode, warnings)?;
    Ok(chosen)
}

/// Resolves the beat name. Nulls are absences, not conflicting values.
fn resolve_name(
    beat: i64,
    group: &[&RawBeatFeature],
    mode: ConflictMode,
    warnings: &mut Vec<ConflictWarning>,
) -> Result<Option<String>, BeatStationError> {
    let names: BTreeSet<&str> = group.iter().filter_map(|f| f.name.as_deref()).collect();

    let Some(first) = names.first().copied() else {
        return Ok(None);
    };

    if names.len() > 1 {
        let rendered = names.iter().map(|name| format!("{name:?}")).collect();
        report_conflict(beat, "name", rendered, format!("{first:?}"), mode, warnings)?;
    }

    Ok(Some(first.to_string()))
}

fn report_conflict(
    beat: i64,
    field: &'static str,
    values: Vec<String>,
    chosen: String,
    mode: ConflictMode,
    warnings: &mut Vec<ConflictWarning>,
) -> Result<(), BeatStationError> {
    let conflict = BeatStationError::Conflict {
        beat,
        field,
        values: values.clone(),
    };
    if mode.is_strict() {
        return Err(conflict);
    }

    log::warn!("{conflict}; using {chosen}");
    warnings.push(ConflictWarning {
        beat,
        field,
        values,
        chosen,
    });
    Ok(())
}

fn render_int(value: Option<i64>) -> String {
    value.map_or_else(|| "null".to_string(), |v| v.to_string())
}
