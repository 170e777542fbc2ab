//! bpdb-core
//!
//! Core of bpdb, the blueprint database reconciler:
//! - identifier types and wire records for the store snapshot
//! - the canonical blueprint/user graph
//! - relationship reconcilers (authors, favorites, summaries, tags, privates)
//! - the pass pipeline and run statistics
//! - deterministic export and the canonical JSON codec
//!
//! The crate performs no I/O. A run is a pure function of the input document
//! and a [`config::ReconcileConfig`].

pub mod assemble;
pub mod codec;
pub mod config;
pub mod errors;
pub mod ids;
pub mod model;
pub mod pipeline;
pub mod reconcile;
pub mod stats;
pub mod wire;

pub use crate::errors::{BpdbError, BpdbResult, Inconsistency};

use crate::config::{validate_config, ReconcileConfig};
use crate::pipeline::stages::standard_pipeline;
use crate::pipeline::ReconcileContext;
use crate::stats::Statistics;
use crate::wire::Database;

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub database: Database,
    pub stats: Statistics,
}

/// Outcome of [`cleanse_bytes`]: the reconciled run plus its encoded form.
#[derive(Debug, Clone)]
pub struct Cleansed {
    pub reconciled: Reconciled,
    pub output: Vec<u8>,
}

/// Reconcile a decoded snapshot and re-derive its denormalized collections.
///
/// Any fatal inconsistency aborts the run; nothing partial is returned.
pub fn reconcile(source: &Database, config: &ReconcileConfig) -> BpdbResult<Reconciled> {
    validate_config(config)?;

    let mut ctx = ReconcileContext::new(source, config);
    standard_pipeline().run(&mut ctx)?;
    let database = assemble::export(&ctx)?;

    ctx.stats.log_statistics();
    Ok(Reconciled {
        database,
        stats: ctx.stats,
    })
}

/// Decode, reconcile and encode in one step.
pub fn cleanse_bytes(input: &[u8], config: &ReconcileConfig) -> BpdbResult<Cleansed> {
    validate_config(config)?;
    let source = codec::decode_database(input, config.limits.max_input_bytes)?;
    let reconciled = reconcile(&source, config)?;
    let output = codec::encode_database(&reconciled.database)?;
    Ok(Cleansed { reconciled, output })
}

/// Convenience re-exports.
pub mod prelude {
    pub use crate::codec::{decode_database, encode_database};
    pub use crate::config::{ReconcileConfig, FALLBACK_LAST_UPDATED};
    pub use crate::ids::{BlueprintId, UserId};
    pub use crate::model::Graph;
    pub use crate::stats::{Anomaly, Census, Statistics};
    pub use crate::wire::{Database, Timestamp};
    pub use crate::{cleanse_bytes, reconcile, BpdbError, BpdbResult, Cleansed, Inconsistency, Reconciled};
}
