//! Run report printed by `cleanse` and `check`.

use std::collections::BTreeMap;
use std::path::Path;

use bpdb_core::stats::Census;
use bpdb_core::Reconciled;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub command: &'static str,
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    pub blueprints: usize,
    pub users: usize,
    /// Distinct tags in the exported inverted index.
    pub tags: usize,
    pub census: Census,
    pub anomalies: BTreeMap<&'static str, u64>,
    pub total_anomalies: u64,
    pub output_sha256: String,
}

impl RunReport {
    pub fn new(
        command: &'static str,
        input: &Path,
        output: Option<&Path>,
        reconciled: &Reconciled,
        output_sha256: String,
    ) -> Self {
        let db = &reconciled.database;
        let stats = &reconciled.stats;
        Self {
            command,
            input: input.display().to_string(),
            output: output.map(|p| p.display().to_string()),
            blueprints: db.blueprints.len(),
            users: db.users.len(),
            tags: db.by_tag.values().map(|suffixes| suffixes.len()).sum(),
            census: stats.census.clone(),
            anomalies: stats.anomalies().map(|(a, n)| (a.as_str(), n)).collect(),
            total_anomalies: stats.total_anomalies(),
            output_sha256,
        }
    }
}
