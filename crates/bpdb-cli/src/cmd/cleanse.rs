use std::path::Path;

use anyhow::Result;
use bpdb_core::config::ReconcileConfig;

use crate::io::export;
use crate::output;
use crate::report::RunReport;

pub fn run(config: &ReconcileConfig, input: &Path, out: &Path) -> Result<()> {
    let cleansed = super::reconcile_file(config, input)?;

    export::write_snapshot(out, &cleansed.output)?;
    tracing::info!(path = %out.display(), bytes = cleansed.output.len(), "wrote cleansed snapshot");

    let report = RunReport::new(
        "cleanse",
        input,
        Some(out),
        &cleansed.reconciled,
        export::sha256_hex(&cleansed.output),
    );
    output::print_report(&report)
}
