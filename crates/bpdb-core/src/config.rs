//! Configuration structures for bpdb-core.
//!
//! Configuration is explicit and serializable-friendly. The core crate itself
//! does not read environment variables or files: the CLI (or any other host)
//! builds a [`ReconcileConfig`] and passes it in, which keeps a run a pure
//! function of its input document plus this value.

use time::macros::datetime;
use time::OffsetDateTime;

use crate::errors::{BpdbError, BpdbResult};

/// Instant used wherever a last-updated timestamp is required but absent.
pub const FALLBACK_LAST_UPDATED: OffsetDateTime = datetime!(2017-01-01 00:00:00 UTC);

/// Global configuration container.
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// Substituted for a missing summary `lastUpdatedDate` on export.
    pub fallback_last_updated: OffsetDateTime,

    /// Give every blueprint a summary, deriving one when the input lacks it.
    /// When false only the input's summaries are exported.
    pub synthesize_missing_summaries: bool,

    pub limits: LimitsConfig,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            fallback_last_updated: FALLBACK_LAST_UPDATED,
            synthesize_missing_summaries: true,
            limits: LimitsConfig::default(),
        }
    }
}

/// Resource limits.
#[derive(Debug, Clone)]
pub struct LimitsConfig {
    /// Largest input document accepted by [`crate::codec::decode_database`].
    pub max_input_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: 1024 * 1024 * 1024,
        }
    }
}

/// Validate a full configuration object.
pub fn validate_config(cfg: &ReconcileConfig) -> BpdbResult<()> {
    if cfg.limits.max_input_bytes == 0 {
        return Err(BpdbError::invalid_argument(
            "max_input_bytes must be greater than zero",
        ));
    }

    if cfg.fallback_last_updated.offset() != time::UtcOffset::UTC {
        return Err(BpdbError::invalid_argument(
            "fallback_last_updated must be expressed in UTC",
        ));
    }

    Ok(())
}
