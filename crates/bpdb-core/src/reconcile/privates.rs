//! Blueprint privates.
//!
//! Operator-only fields come from two places: the explicit
//! `blueprintPrivates` collection, and the blueprint itself (file name, image
//! URL, delete hash) together with the top-level `thumbnails` collection.
//! Where both exist they must match field for field.

use indexmap::IndexMap;

use crate::errors::{BpdbResult, Inconsistency};
use crate::ids::BlueprintId;
use crate::model::{Blueprint, BlueprintPrivates, Graph};
use crate::stats::Statistics;
use crate::wire::PrivatesRecord;

impl From<&PrivatesRecord> for BlueprintPrivates {
    fn from(r: &PrivatesRecord) -> Self {
        Self {
            file_name: r.file_name.clone(),
            image_url: r.image_url.clone(),
            thumbnail: r.thumbnail.clone(),
            deletehash: r.deletehash.clone(),
        }
    }
}

/// Privates implied by the blueprint's own fields.
pub fn derive_privates(bp: &Blueprint, thumbnails: &IndexMap<BlueprintId, String>) -> BlueprintPrivates {
    BlueprintPrivates {
        file_name: bp.file_name.clone(),
        image_url: bp.image_url.clone(),
        thumbnail: thumbnails.get(&bp.id).cloned(),
        deletehash: bp.image.deletehash.clone(),
    }
}

/// Merge explicit privates with those derived from each blueprint.
///
/// Explicit entries keep their document order; derived entries for
/// blueprints without one follow in blueprint order.
pub fn reconcile_privates(
    explicit: &IndexMap<BlueprintId, PrivatesRecord>,
    thumbnails: &IndexMap<BlueprintId, String>,
    graph: &Graph,
    stats: &mut Statistics,
) -> BpdbResult<IndexMap<BlueprintId, BlueprintPrivates>> {
    let mut out: IndexMap<BlueprintId, BlueprintPrivates> = explicit
        .iter()
        .map(|(id, r)| (id.clone(), BlueprintPrivates::from(r)))
        .collect();

    for id in out.keys().filter(|id| !graph.contains_blueprint(id.as_str())) {
        tracing::debug!(blueprint = %id, "privates entry has no blueprint, copied through");
    }

    for bp in graph.blueprints() {
        let derived = derive_privates(bp, thumbnails);
        match out.get(&bp.id) {
            Some(existing) if *existing == derived => {}
            Some(_) => {
                return Err(Inconsistency::PrivatesMismatch {
                    blueprint: bp.id.clone(),
                }
                .into());
            }
            None => {
                out.insert(bp.id.clone(), derived);
                stats.census.privates_derived += 1;
            }
        }
    }

    Ok(out)
}
