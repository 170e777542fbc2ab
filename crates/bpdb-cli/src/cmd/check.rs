use std::path::Path;

use anyhow::Result;
use bpdb_core::config::ReconcileConfig;

use crate::io::export;
use crate::output;
use crate::report::RunReport;

pub fn run(config: &ReconcileConfig, input: &Path) -> Result<()> {
    let checked = super::reconcile_file(config, input)?;

    let report = RunReport::new(
        "check",
        input,
        None,
        &checked.reconciled,
        export::sha256_hex(&checked.output),
    );
    output::print_report(&report)
}
