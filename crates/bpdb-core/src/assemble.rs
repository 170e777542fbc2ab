//! Database assembler.
//!
//! Build phase: wire records → canonical [`Graph`].
//! Export phase: reconciled context → wire [`Database`], every denormalized
//! collection re-derived from the graph.
//!
//! Export rules:
//! - blueprint `author` is reduced to `{ userId }`; `authorId` is kept
//! - the deprecated blueprint-side `favorites` map and `thumbnail` are dropped
//! - user `blueprints`/`favorites` become identifier → `true` maps
//! - `byTag` is rebuilt from the authoritative tag index
//! - `moderators`, `tags` and `thumbnails` are copied through

use indexmap::IndexMap;

use crate::errors::{BpdbResult, Inconsistency};
use crate::ids::{BlueprintId, UserId};
use crate::model::{Blueprint, BlueprintPrivates, BlueprintSummary, Graph, Image, User};
use crate::pipeline::ReconcileContext;
use crate::reconcile::{authors, favorites};
use crate::stats::Statistics;
use crate::wire::{
    AuthorRecord, BlueprintRecord, Database, ImageRecord, PrivatesRecord, SummaryRecord, UserRecord,
};

fn blueprint_from_record(id: &BlueprintId, r: &BlueprintRecord) -> Blueprint {
    let mut bp = Blueprint::new(id.clone());
    bp.title = r.title.clone();
    bp.blueprint_string = r.blueprint_string.clone();
    bp.description_markdown = r.description_markdown.clone();
    bp.tags = r.tags.clone();
    bp.image = Image {
        id: r.image.id.clone(),
        kind: r.image.kind.clone(),
        deletehash: r.image.deletehash.clone(),
        height: r.image.height,
        width: r.image.width,
    };
    bp.image_url = r.image_url.clone();
    bp.created_date = r.created_date;
    bp.last_updated_date = r.last_updated_date;
    bp.number_of_favorites = r.number_of_favorites;
    bp.file_name = r.file_name.clone();
    bp
}

fn user_from_record(id: &UserId, r: &UserRecord) -> User {
    let mut user = User::new(id.clone());
    user.display_name = r.display_name.clone();
    user.provider_display_name = r.provider_display_name.clone();
    user.email = r.email.clone();
    user.email_verified = r.email_verified;
    user.photo_url = r.photo_url.clone();
    user.provider_id = r.provider_id.clone();
    user
}

/// Insert one canonical blueprint per blueprint record, author and favorites
/// left unset.
pub fn build_blueprints(source: &Database, graph: &mut Graph, stats: &mut Statistics) {
    for (id, record) in &source.blueprints {
        if record.file_name.as_deref().is_some_and(|f| !f.is_empty()) {
            stats.census.blueprints_with_filename += 1;
        }
        graph.insert_blueprint(blueprint_from_record(id, record));
    }
    stats.census.total_blueprints = graph.blueprint_count() as u64;
    tracing::debug!(blueprints = graph.blueprint_count(), "blueprints built");
}

/// Insert one canonical user per user record, then attach that user's
/// authored blueprints and user-side favorites.
pub fn build_users(source: &Database, graph: &mut Graph, stats: &mut Statistics) -> BpdbResult<()> {
    for (id, record) in &source.users {
        graph.insert_user(user_from_record(id, record));
        authors::attach_authored(id, &record.blueprints, &source.blueprints, graph, stats)?;
        favorites::attach_user_favorites(id, &record.favorites, &source.blueprints, graph, stats)?;
    }
    tracing::debug!(users = graph.user_count(), "users built");
    Ok(())
}

fn export_blueprint(bp: &Blueprint) -> BpdbResult<BlueprintRecord> {
    let author = bp
        .author()
        .cloned()
        .ok_or_else(|| Inconsistency::UnresolvedAuthor {
            blueprint: bp.id.clone(),
        })?;

    Ok(BlueprintRecord {
        author: Some(AuthorRecord {
            user_id: Some(author.clone()),
        }),
        author_id: Some(author),
        blueprint_string: bp.blueprint_string.clone(),
        created_date: bp.created_date,
        description_markdown: bp.description_markdown.clone(),
        favorites: None,
        file_name: bp.file_name.clone(),
        image: ImageRecord {
            deletehash: bp.image.deletehash.clone(),
            height: bp.image.height,
            id: bp.image.id.clone(),
            kind: bp.image.kind.clone(),
            width: bp.image.width,
        },
        image_url: bp.image_url.clone(),
        last_updated_date: bp.last_updated_date,
        number_of_favorites: bp.number_of_favorites,
        tags: bp.tags.clone(),
        thumbnail: None,
        title: bp.title.clone(),
    })
}

fn flag_map<K: Clone + std::hash::Hash + Eq>(ids: &[K]) -> IndexMap<K, bool> {
    ids.iter().map(|id| (id.clone(), true)).collect()
}

fn export_user(user: &User) -> UserRecord {
    UserRecord {
        blueprints: flag_map(user.authored()),
        display_name: user.display_name.clone(),
        email: user.email.clone(),
        email_verified: user.email_verified,
        favorites: flag_map(user.favorites()),
        photo_url: user.photo_url.clone(),
        provider_display_name: user.provider_display_name.clone(),
        provider_id: user.provider_id.clone(),
    }
}

fn export_summary(s: &BlueprintSummary) -> SummaryRecord {
    SummaryRecord {
        imgur_id: s.image_id.clone(),
        imgur_type: s.image_type.clone(),
        last_updated_date: Some(s.last_updated_date),
        number_of_favorites: s.number_of_favorites,
        title: s.title.clone(),
    }
}

fn export_privates(p: &BlueprintPrivates) -> PrivatesRecord {
    PrivatesRecord {
        deletehash: p.deletehash.clone(),
        file_name: p.file_name.clone(),
        image_url: p.image_url.clone(),
        thumbnail: p.thumbnail.clone(),
    }
}

/// Re-derive the whole document from a fully reconciled context.
pub fn export(ctx: &ReconcileContext<'_>) -> BpdbResult<Database> {
    let blueprints = ctx
        .graph
        .blueprints()
        .map(|bp| Ok((bp.id.clone(), export_blueprint(bp)?)))
        .collect::<BpdbResult<IndexMap<_, _>>>()?;

    let users = ctx
        .graph
        .users()
        .map(|u| (u.id.clone(), export_user(u)))
        .collect();

    let blueprint_summaries = ctx
        .summaries
        .iter()
        .map(|s| (s.blueprint.clone(), export_summary(s)))
        .collect();

    let blueprint_privates = ctx
        .privates
        .iter()
        .map(|(id, p)| (id.clone(), export_privates(p)))
        .collect();

    Ok(Database {
        blueprint_privates,
        blueprint_summaries,
        blueprints,
        by_tag: ctx.tag_index.to_record()?,
        moderators: ctx.source.moderators.clone(),
        tags: ctx.source.tags.clone(),
        thumbnails: ctx.source.thumbnails.clone(),
        users,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconcileConfig;
    use crate::stats::Anomaly;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn db(v: serde_json::Value) -> Database {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn build_counts_file_names() {
        let source = db(json!({
            "blueprints": {
                "bp1": { "authorId": "u1", "fileName": "a.txt" },
                "bp2": { "authorId": "u1", "fileName": "" },
                "bp3": { "authorId": "u1" }
            }
        }));
        let mut g = Graph::new();
        let mut stats = Statistics::new();
        build_blueprints(&source, &mut g, &mut stats);

        assert_eq!(stats.census.total_blueprints, 3);
        assert_eq!(stats.census.blueprints_with_filename, 1);
        assert!(g.blueprint("bp1").unwrap().author().is_none());
    }

    #[test]
    fn build_users_attaches_authored_and_favorites() {
        let source = db(json!({
            "blueprints": {
                "bp1": { "authorId": "u1" },
                "bp2": { "authorId": "u2" }
            },
            "users": {
                "u1": { "displayName": "Alice", "blueprints": { "bp1": true }, "favorites": { "bp2": true } },
                "u2": { "blueprints": { "bp2": true } }
            }
        }));
        let mut g = Graph::new();
        let mut stats = Statistics::new();
        build_blueprints(&source, &mut g, &mut stats);
        build_users(&source, &mut g, &mut stats).unwrap();

        assert_eq!(g.user("u1").unwrap().authored(), &[BlueprintId::from("bp1")]);
        assert_eq!(g.blueprint("bp2").unwrap().favorites(), &[UserId::from("u1")]);
        assert_eq!(g.user("u1").unwrap().display_name.as_deref(), Some("Alice"));
        assert!(stats.is_clean());
    }

    #[test]
    fn export_reduces_author_and_drops_deprecated_fields() {
        let source = db(json!({
            "blueprints": {
                "bp1": {
                    "title": "Smelter",
                    "author": { "userId": "u1", "displayName": "Alice" },
                    "favorites": { "u2": true },
                    "thumbnail": "t.png",
                    "numberOfFavorites": 1
                }
            },
            "users": {
                "u1": { "blueprints": { "bp1": true } },
                "u2": { "favorites": { "bp1": true } }
            },
            "moderators": { "u1": true }
        }));
        let cfg = ReconcileConfig::default();
        let mut ctx = ReconcileContext::new(&source, &cfg);
        crate::pipeline::stages::standard_pipeline().run(&mut ctx).unwrap();
        let out = export(&ctx).unwrap();

        let bp = &out.blueprints["bp1"];
        assert_eq!(bp.author.as_ref().and_then(|a| a.user_id.as_ref()).map(UserId::as_str), Some("u1"));
        assert!(bp.favorites.is_none());
        assert!(bp.thumbnail.is_none());
        assert_eq!(out.users["u2"].favorites["bp1"], true);
        assert_eq!(out.moderators.len(), 1);
        assert_eq!(out.blueprint_summaries["bp1"].number_of_favorites, 1);
        assert_eq!(ctx.stats.count(Anomaly::SummaryMissing), 1);
    }

    #[test]
    fn export_requires_every_author() {
        let source = Database::default();
        let cfg = ReconcileConfig::default();
        let mut ctx = ReconcileContext::new(&source, &cfg);
        ctx.graph.insert_blueprint(Blueprint::new(BlueprintId::from("orphan")));

        let err = export(&ctx).unwrap_err();
        assert_matches!(err.inconsistency(), Some(Inconsistency::UnresolvedAuthor { .. }));
    }
}
