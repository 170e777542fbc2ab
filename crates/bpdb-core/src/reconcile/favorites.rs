//! Favorites relationship.
//!
//! Favorites are stored on both sides: the user's `favorites` map and the
//! blueprint's deprecated `favorites` map. The user side is authoritative.
//! Edges are attached from the user side during assembly
//! ([`attach_user_favorites`]) and then cross-checked against the blueprint
//! side ([`reconcile_favorites`]):
//! - user side only: fatal, authoritative data disagrees with the copy
//! - blueprint side only: edge added in both directions
//! - author favoriting their own blueprint: never materialised
//!
//! A blueprint record without a `favorites` map at all has had its copy
//! retired and is not cross-checked.

use indexmap::{IndexMap, IndexSet};

use crate::errors::{BpdbResult, Inconsistency};
use crate::ids::{BlueprintId, UserId};
use crate::model::Graph;
use crate::reconcile::authors::record_author;
use crate::stats::{Anomaly, Statistics};
use crate::wire::{BlueprintRecord, UserRecord};

/// Attach one user's favorites to the graph.
pub fn attach_user_favorites(
    user: &UserId,
    favorites: &IndexMap<BlueprintId, bool>,
    records: &IndexMap<BlueprintId, BlueprintRecord>,
    graph: &mut Graph,
    stats: &mut Statistics,
) -> BpdbResult<()> {
    for (blueprint, flag) in favorites {
        let Some(record) = records.get(blueprint) else {
            stats.record(
                Anomaly::UserFavoriteMissingBlueprint,
                format_args!("could not find user {user}'s favorite {blueprint}"),
            );
            continue;
        };

        if !flag {
            tracing::info!(%user, %blueprint, "user set blueprint to favorite=false");
            continue;
        }

        if record_author(blueprint, record)? == user {
            stats.record(
                Anomaly::FavoritedOwnBlueprint,
                format_args!("user {user} favorited their own blueprint {blueprint}"),
            );
            continue;
        }

        graph.add_favorite(blueprint, user);
    }

    Ok(())
}

/// Cross-check attached favorites against every blueprint-side map.
pub fn reconcile_favorites(
    records: &IndexMap<BlueprintId, BlueprintRecord>,
    users: &IndexMap<UserId, UserRecord>,
    graph: &mut Graph,
    stats: &mut Statistics,
) -> BpdbResult<()> {
    for (id, record) in records {
        let Some(blueprint_side) = record.favorites.as_ref() else {
            tracing::debug!(blueprint = %id, "no blueprint-side favorites to cross-check");
            continue;
        };
        let Some(bp) = graph.blueprint(id.as_str()) else {
            continue;
        };
        let author = bp.author().cloned();
        let from_users: IndexSet<UserId> = bp.favorites().iter().cloned().collect();

        let mut from_blueprint = IndexSet::new();
        for (user, flag) in blueprint_side {
            if !flag {
                tracing::info!(blueprint = %id, %user, "blueprint lists user with favorite=false");
                continue;
            }
            if !graph.contains_user(user.as_str()) {
                stats.record(
                    Anomaly::BlueprintFavoriteUnknownUser,
                    format_args!("blueprint {id} favorited by unknown user {user}"),
                );
                continue;
            }
            if author.as_ref() == Some(user) {
                // Already counted if the user side listed it too.
                let seen_on_user_side = users
                    .get(user)
                    .and_then(|u| u.favorites.get(id))
                    .copied()
                    .unwrap_or(false);
                if !seen_on_user_side {
                    stats.record(
                        Anomaly::FavoritedOwnBlueprint,
                        format_args!("user {user} favorited their own blueprint {id}"),
                    );
                }
                continue;
            }
            from_blueprint.insert(user.clone());
        }

        let only_in_user: Vec<UserId> = from_users.difference(&from_blueprint).cloned().collect();
        if !only_in_user.is_empty() {
            return Err(Inconsistency::FavoriteOnlyInUser {
                blueprint: id.clone(),
                users: only_in_user,
            }
            .into());
        }

        let only_in_blueprint: Vec<UserId> = from_blueprint.difference(&from_users).cloned().collect();
        for user in only_in_blueprint {
            stats.record(
                Anomaly::FavoriteOnlyInBlueprint,
                format_args!("user {user} favorite {id} info only embedded in blueprint"),
            );
            graph.add_favorite(id, &user);
        }
    }

    Ok(())
}
