//! Reconciliation pipeline.
//!
//! A run is an ordered list of stages over one shared [`ReconcileContext`]:
//! - the source snapshot (read-only, borrowed for the whole run)
//! - the canonical graph being built and repaired
//! - the statistics accumulator
//! - the derived collections produced by later passes (tag index, summaries,
//!   privates) that the exporter consumes
//!
//! Stages run strictly in order and the first `Err` aborts the run. There is
//! no I/O, no clock read, and no shared state outside the context.

use indexmap::IndexMap;

use crate::config::ReconcileConfig;
use crate::errors::BpdbResult;
use crate::ids::BlueprintId;
use crate::model::{BlueprintPrivates, BlueprintSummary, Graph};
use crate::reconcile::tags::TagIndex;
use crate::stats::Statistics;
use crate::wire::Database;

pub mod stages;

/// State shared by all stages of one run.
#[derive(Debug)]
pub struct ReconcileContext<'a> {
    pub source: &'a Database,
    pub config: &'a ReconcileConfig,
    pub graph: Graph,
    pub stats: Statistics,
    /// Authoritative tag → blueprints multimap, filled by the tag pass.
    pub tag_index: TagIndex,
    /// Regenerated summaries, filled by the summary pass.
    pub summaries: Vec<BlueprintSummary>,
    /// Reconciled privates, filled by the privates pass.
    pub privates: IndexMap<BlueprintId, BlueprintPrivates>,
}

impl<'a> ReconcileContext<'a> {
    pub fn new(source: &'a Database, config: &'a ReconcileConfig) -> Self {
        Self {
            source,
            config,
            graph: Graph::new(),
            stats: Statistics::new(),
            tag_index: TagIndex::default(),
            summaries: Vec::new(),
            privates: IndexMap::new(),
        }
    }
}

/// A pipeline stage.
///
/// Stages must be deterministic: identical context in, identical context out.
pub trait Stage {
    fn id(&self) -> &'static str;
    fn run(&self, ctx: &mut ReconcileContext<'_>) -> BpdbResult<()>;
}

/// An ordered list of stages.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    pub fn push_stage<S: Stage + 'static>(&mut self, s: S) -> &mut Self {
        self.stages.push(Box::new(s));
        self
    }

    pub fn stages(&self) -> usize {
        self.stages.len()
    }

    pub fn stage_ids(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.id()).collect()
    }

    /// Run every stage in order, stopping at the first fatal error.
    pub fn run(&self, ctx: &mut ReconcileContext<'_>) -> BpdbResult<()> {
        for st in &self.stages {
            let _span = tracing::debug_span!("stage", id = st.id()).entered();
            tracing::debug!("starting stage {}", st.id());

            if let Err(e) = st.run(ctx) {
                tracing::warn!(stage = st.id(), "aborting run: {e}");
                return Err(e);
            }

            tracing::debug!(
                anomalies = ctx.stats.total_anomalies(),
                "completed stage {}",
                st.id()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{BpdbError, Inconsistency};
    use crate::stats::Anomaly;

    struct CountingStage;
    impl Stage for CountingStage {
        fn id(&self) -> &'static str {
            "test.count"
        }
        fn run(&self, ctx: &mut ReconcileContext<'_>) -> BpdbResult<()> {
            ctx.stats.record(Anomaly::SummaryMissing, "counted");
            Ok(())
        }
    }

    struct FailingStage;
    impl Stage for FailingStage {
        fn id(&self) -> &'static str {
            "test.fail"
        }
        fn run(&self, _ctx: &mut ReconcileContext<'_>) -> BpdbResult<()> {
            Err(BpdbError::from(Inconsistency::MalformedTag {
                tag: "x".to_string(),
            }))
        }
    }

    #[test]
    fn pipeline_runs_stages_in_order() {
        let db = Database::default();
        let cfg = ReconcileConfig::default();
        let mut ctx = ReconcileContext::new(&db, &cfg);

        let mut p = Pipeline::new();
        p.push_stage(CountingStage).push_stage(CountingStage);
        p.run(&mut ctx).unwrap();

        assert_eq!(p.stages(), 2);
        assert_eq!(ctx.stats.count(Anomaly::SummaryMissing), 2);
    }

    #[test]
    fn pipeline_stops_at_first_error() {
        let db = Database::default();
        let cfg = ReconcileConfig::default();
        let mut ctx = ReconcileContext::new(&db, &cfg);

        let mut p = Pipeline::new();
        p.push_stage(FailingStage).push_stage(CountingStage);
        assert!(p.run(&mut ctx).is_err());
        assert!(ctx.stats.is_clean());
    }
}
