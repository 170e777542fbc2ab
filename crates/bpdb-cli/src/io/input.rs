use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

/// Read a snapshot file, refusing anything larger than `max_bytes` before
/// loading it.
pub fn read_snapshot(path: &Path, max_bytes: usize) -> Result<Vec<u8>> {
    let meta = fs::metadata(path).with_context(|| format!("cannot stat {}", path.display()))?;
    if !meta.is_file() {
        bail!("{} is not a file", path.display());
    }
    if meta.len() > max_bytes as u64 {
        bail!(
            "{} is too large ({} bytes > limit {})",
            path.display(),
            meta.len(),
            max_bytes
        );
    }
    fs::read(path).with_context(|| format!("cannot read {}", path.display()))
}
