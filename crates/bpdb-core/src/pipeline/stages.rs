//! Built-in stages, in the order a run executes them.
//!
//! Each stage is a thin adapter from [`ReconcileContext`] to one assembler or
//! reconciler function, which keeps the passes callable (and testable) on
//! their own.

use crate::assemble;
use crate::errors::BpdbResult;
use crate::pipeline::{Pipeline, ReconcileContext, Stage};
use crate::reconcile::{authors, favorites, privates, summaries, tags};

/// Stage: canonical blueprints from the blueprint collection.
pub struct BuildBlueprintsStage;

impl Stage for BuildBlueprintsStage {
    fn id(&self) -> &'static str {
        "build.blueprints"
    }

    fn run(&self, ctx: &mut ReconcileContext<'_>) -> BpdbResult<()> {
        assemble::build_blueprints(ctx.source, &mut ctx.graph, &mut ctx.stats);
        Ok(())
    }
}

/// Stage: canonical users, their authored maps and user-side favorites.
pub struct BuildUsersStage;

impl Stage for BuildUsersStage {
    fn id(&self) -> &'static str {
        "build.users"
    }

    fn run(&self, ctx: &mut ReconcileContext<'_>) -> BpdbResult<()> {
        assemble::build_users(ctx.source, &mut ctx.graph, &mut ctx.stats)
    }
}

/// Stage: author cross-check and backfill.
pub struct AuthorStage;

impl Stage for AuthorStage {
    fn id(&self) -> &'static str {
        "reconcile.authors"
    }

    fn run(&self, ctx: &mut ReconcileContext<'_>) -> BpdbResult<()> {
        authors::reconcile_authors(&ctx.source.blueprints, &mut ctx.graph, &mut ctx.stats)
    }
}

/// Stage: favorites cross-check against the blueprint-side maps.
pub struct FavoritesStage;

impl Stage for FavoritesStage {
    fn id(&self) -> &'static str {
        "reconcile.favorites"
    }

    fn run(&self, ctx: &mut ReconcileContext<'_>) -> BpdbResult<()> {
        favorites::reconcile_favorites(
            &ctx.source.blueprints,
            &ctx.source.users,
            &mut ctx.graph,
            &mut ctx.stats,
        )
    }
}

/// Stage: summary checks, favorite count repair, summary regeneration.
pub struct SummaryStage;

impl Stage for SummaryStage {
    fn id(&self) -> &'static str {
        "reconcile.summaries"
    }

    fn run(&self, ctx: &mut ReconcileContext<'_>) -> BpdbResult<()> {
        ctx.summaries = summaries::reconcile_summaries(
            &ctx.source.blueprint_summaries,
            &mut ctx.graph,
            ctx.config,
            &mut ctx.stats,
        )?;
        Ok(())
    }
}

/// Stage: inverted tag index merge.
pub struct TagStage;

impl Stage for TagStage {
    fn id(&self) -> &'static str {
        "reconcile.tags"
    }

    fn run(&self, ctx: &mut ReconcileContext<'_>) -> BpdbResult<()> {
        ctx.tag_index = tags::reconcile_tags(&ctx.source.by_tag, &mut ctx.graph, &mut ctx.stats);
        Ok(())
    }
}

/// Stage: explicit vs blueprint-derived privates.
pub struct PrivatesStage;

impl Stage for PrivatesStage {
    fn id(&self) -> &'static str {
        "reconcile.privates"
    }

    fn run(&self, ctx: &mut ReconcileContext<'_>) -> BpdbResult<()> {
        ctx.privates = privates::reconcile_privates(
            &ctx.source.blueprint_privates,
            &ctx.source.thumbnails,
            &ctx.graph,
            &mut ctx.stats,
        )?;
        Ok(())
    }
}

/// Stage: user census over the reconciled graph.
pub struct CensusStage;

impl Stage for CensusStage {
    fn id(&self) -> &'static str {
        "stats.census"
    }

    fn run(&self, ctx: &mut ReconcileContext<'_>) -> BpdbResult<()> {
        ctx.stats.take_user_census(&ctx.graph);
        Ok(())
    }
}

/// The full reconciliation run.
pub fn standard_pipeline() -> Pipeline {
    let mut p = Pipeline::new();
    p.push_stage(BuildBlueprintsStage)
        .push_stage(BuildUsersStage)
        .push_stage(AuthorStage)
        .push_stage(FavoritesStage)
        .push_stage(SummaryStage)
        .push_stage(TagStage)
        .push_stage(PrivatesStage)
        .push_stage(CensusStage);
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_order_is_fixed() {
        let p = standard_pipeline();
        assert_eq!(
            p.stage_ids(),
            vec![
                "build.blueprints",
                "build.users",
                "reconcile.authors",
                "reconcile.favorites",
                "reconcile.summaries",
                "reconcile.tags",
                "reconcile.privates",
                "stats.census",
            ]
        );
    }
}
