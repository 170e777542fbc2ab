use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use bpdb_core::config::ReconcileConfig;
use bpdb_core::Cleansed;
use indicatif::{ProgressBar, ProgressStyle};

use crate::args::{Cli, Command};
use crate::io::input;

mod check;
mod cleanse;

pub fn dispatch(cli: Cli) -> Result<()> {
    let config = build_config(&cli);
    match &cli.command {
        Command::Cleanse { input, out } => cleanse::run(&config, input, out),
        Command::Check { input } => check::run(&config, input),
    }
}

fn build_config(cli: &Cli) -> ReconcileConfig {
    let mut config = ReconcileConfig::default();
    if let Some(max) = cli.max_input_bytes {
        config.limits.max_input_bytes = max;
    }
    if let Some(date) = cli.fallback_date {
        config.fallback_last_updated = date.to_offset(time::UtcOffset::UTC);
    }
    config
}

fn spinner() -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(80));
    Ok(pb)
}

/// Read, reconcile and encode one snapshot.
fn reconcile_file(config: &ReconcileConfig, path: &Path) -> Result<Cleansed> {
    let pb = spinner()?;

    pb.set_message("reading snapshot");
    let bytes = input::read_snapshot(path, config.limits.max_input_bytes)?;

    pb.set_message("reconciling");
    let result = pb.suspend(|| bpdb_core::cleanse_bytes(&bytes, config));
    pb.finish_and_clear();

    result.with_context(|| format!("cannot reconcile {}", path.display()))
}
