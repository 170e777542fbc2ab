//! Summaries and favorite counts.
//!
//! A summary is a listing projection of its blueprint and is always rebuilt
//! on export. Its descriptive fields (title, image id, image type) must still
//! agree with the blueprint, since a disagreement means one of the two was
//! edited behind the other's back.
//!
//! Favorite counts are handled asymmetrically: the blueprint's own
//! `numberOfFavorites` persists, so it is corrected in place; the summary's
//! count is only reported, because the regenerated summary carries the true
//! count anyway.

use indexmap::IndexMap;

use crate::config::ReconcileConfig;
use crate::errors::{BpdbResult, Inconsistency};
use crate::ids::BlueprintId;
use crate::model::{Blueprint, BlueprintSummary, Graph};
use crate::stats::{Anomaly, Statistics};
use crate::wire::{SummaryRecord, Timestamp};

fn check_field(
    blueprint: &BlueprintId,
    field: &'static str,
    summary: Option<&str>,
    blueprint_value: Option<&str>,
) -> Result<(), Inconsistency> {
    if summary == blueprint_value {
        return Ok(());
    }
    Err(Inconsistency::SummaryMismatch {
        blueprint: blueprint.clone(),
        field,
        summary: summary.map(str::to_string),
        blueprint_value: blueprint_value.map(str::to_string),
    })
}

/// Overwrite the blueprint's stored count with the true one.
fn sync_favorite_count(bp: &mut Blueprint, stats: &mut Statistics) -> u64 {
    let actual = bp.favorites().len() as u64;
    if bp.number_of_favorites != actual {
        stats.record(
            Anomaly::BlueprintFavoriteCountMismatch,
            format_args!(
                "blueprint {} has {} favorites but numberOfFavorites was {}",
                bp.id, actual, bp.number_of_favorites
            ),
        );
        bp.number_of_favorites = actual;
    }
    actual
}

fn project(bp: &Blueprint, last_updated_date: Timestamp) -> BlueprintSummary {
    BlueprintSummary {
        blueprint: bp.id.clone(),
        title: bp.title.clone(),
        image_id: bp.image.id.clone(),
        image_type: bp.image.kind.clone(),
        number_of_favorites: bp.favorites().len() as u64,
        last_updated_date,
    }
}

/// Verify every source summary against its blueprint, correct blueprint
/// favorite counts, and return one regenerated summary per blueprint.
///
/// Output order: source summaries in document order, then synthesised ones in
/// blueprint order.
pub fn reconcile_summaries(
    records: &IndexMap<BlueprintId, SummaryRecord>,
    graph: &mut Graph,
    config: &ReconcileConfig,
    stats: &mut Statistics,
) -> BpdbResult<Vec<BlueprintSummary>> {
    let fallback = Timestamp::new(config.fallback_last_updated);
    let mut summaries = Vec::with_capacity(graph.blueprint_count());

    for (id, record) in records {
        let Some(bp) = graph.blueprint_mut(id.as_str()) else {
            return Err(Inconsistency::SummaryWithoutBlueprint { blueprint: id.clone() }.into());
        };

        check_field(id, "title", record.title.as_deref(), bp.title.as_deref())?;
        check_field(id, "imgurId", record.imgur_id.as_deref(), bp.image.id.as_deref())?;
        check_field(id, "imgurType", record.imgur_type.as_deref(), bp.image.kind.as_deref())?;

        let actual = sync_favorite_count(bp, stats);
        if record.number_of_favorites != actual {
            stats.record(
                Anomaly::SummaryFavoriteCountMismatch,
                format_args!(
                    "summary {id} has numberOfFavorites {} but blueprint has {actual} favorites",
                    record.number_of_favorites
                ),
            );
        }

        summaries.push(project(bp, record.last_updated_date.unwrap_or(fallback)));
    }

    for bp in graph.blueprints_mut() {
        if records.contains_key(&bp.id) {
            continue;
        }
        sync_favorite_count(bp, stats);
        if !config.synthesize_missing_summaries {
            continue;
        }
        stats.record(
            Anomaly::SummaryMissing,
            format_args!("blueprint {} has no summary", bp.id),
        );
        summaries.push(project(bp, bp.last_updated_date.unwrap_or(fallback)));
    }

    Ok(summaries)
}
