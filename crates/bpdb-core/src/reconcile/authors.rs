//! Author relationship.
//!
//! The author of a blueprint is recorded three times: `author.userId` and
//! `authorId` on the blueprint record, and the `blueprints` map on the user.
//! Users are processed first ([`attach_authored`], during assembly), which
//! binds most authors; [`reconcile_authors`] then walks every blueprint record,
//! verifies the binding, and backfills blueprints no user claimed.

use indexmap::IndexMap;

use crate::errors::{BpdbResult, Inconsistency};
use crate::ids::{BlueprintId, UserId};
use crate::model::Graph;
use crate::stats::{Anomaly, Statistics};
use crate::wire::BlueprintRecord;

/// Author named by a blueprint record.
///
/// Both copies must agree when both are present; a record with neither is
/// corrupt.
pub fn record_author<'r>(
    blueprint: &BlueprintId,
    record: &'r BlueprintRecord,
) -> Result<&'r UserId, Inconsistency> {
    let embedded = record.author.as_ref().and_then(|a| a.user_id.as_ref());
    match (embedded, record.author_id.as_ref()) {
        (Some(embedded), Some(top_level)) if embedded != top_level => {
            Err(Inconsistency::AuthorIdMismatch {
                blueprint: blueprint.clone(),
                embedded: embedded.clone(),
                top_level: top_level.clone(),
            })
        }
        (Some(author), _) | (None, Some(author)) => Ok(author),
        (None, None) => Err(Inconsistency::MissingAuthorReference {
            blueprint: blueprint.clone(),
        }),
    }
}

/// Process one user's authored map.
///
/// Every flag must be `true`. Entries naming a missing blueprint are counted
/// and skipped; entries naming a blueprint whose record credits someone else
/// abort the run.
pub fn attach_authored(
    user: &UserId,
    authored: &IndexMap<BlueprintId, bool>,
    records: &IndexMap<BlueprintId, BlueprintRecord>,
    graph: &mut Graph,
    stats: &mut Statistics,
) -> BpdbResult<()> {
    if let Some((blueprint, _)) = authored.iter().find(|(_, flag)| !**flag) {
        return Err(Inconsistency::AuthoredFlagFalse {
            user: user.clone(),
            blueprint: blueprint.clone(),
        }
        .into());
    }

    for blueprint in authored.keys() {
        let Some(record) = records.get(blueprint) else {
            stats.record(
                Anomaly::UserMissingAuthoredBlueprint,
                format_args!("user {user} is missing authored blueprint {blueprint}"),
            );
            continue;
        };

        let author = record_author(blueprint, record)?;
        if author != user {
            return Err(Inconsistency::AuthoredByOtherUser {
                user: user.clone(),
                blueprint: blueprint.clone(),
                author: author.clone(),
            }
            .into());
        }

        graph.bind_author(blueprint, user);
    }

    Ok(())
}

/// Verify every blueprint's author binding, backfilling unbound ones.
pub fn reconcile_authors(
    records: &IndexMap<BlueprintId, BlueprintRecord>,
    graph: &mut Graph,
    stats: &mut Statistics,
) -> BpdbResult<()> {
    for (id, record) in records {
        let author = record_author(id, record)?;
        if !graph.contains_user(author.as_str()) {
            return Err(Inconsistency::UnknownAuthor {
                blueprint: id.clone(),
                author: author.clone(),
            }
            .into());
        }

        let bound = graph.blueprint(id.as_str()).and_then(|bp| bp.author()).cloned();
        match bound {
            Some(bound) if &bound == author => {}
            Some(bound) => {
                return Err(Inconsistency::AuthorAlreadyBound {
                    blueprint: id.clone(),
                    bound,
                    claimed: author.clone(),
                }
                .into());
            }
            None => {
                let title = record.title.as_deref().unwrap_or_default();
                stats.record(
                    Anomaly::BlueprintMissingAuthor,
                    format_args!("blueprint {id} ({title:?}) missing author {author}"),
                );
                graph.bind_author(id, author);
            }
        }
    }

    Ok(())
}
