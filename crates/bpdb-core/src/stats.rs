//! Run statistics.
//!
//! A single [`Statistics`] value is threaded through every pass. It holds:
//! - anomaly counters, one per recoverable drift category
//! - a census of the final graph (totals, profile completeness)
//!
//! Recording an anomaly also emits a `tracing` event carrying the counter
//! name, so the log sink sees the same stream the counters summarise.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::model::Graph;

/// Recoverable drift categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Anomaly {
    /// Author backfilled from the author pass rather than the user's authored map.
    BlueprintMissingAuthor,
    /// A user's authored map names a blueprint that does not exist.
    UserMissingAuthoredBlueprint,
    /// Favorite edge present only in the blueprint's own map; added.
    FavoriteOnlyInBlueprint,
    /// Author listed as a favoriter of their own blueprint; dropped.
    FavoritedOwnBlueprint,
    /// A user's favorites map names a blueprint that does not exist.
    UserFavoriteMissingBlueprint,
    /// A blueprint's favorites map names a user that does not exist.
    BlueprintFavoriteUnknownUser,
    /// Tag present in the inverted index but not on the blueprint; appended.
    TagMissingFromBlueprint,
    /// Inverted index names a blueprint that does not exist; dropped.
    TagIndexMissingBlueprint,
    /// Blueprint's `numberOfFavorites` disagreed with its favorites; corrected.
    BlueprintFavoriteCountMismatch,
    /// Summary's `numberOfFavorites` disagreed; summary is regenerated anyway.
    SummaryFavoriteCountMismatch,
    /// Blueprint had no summary; one was derived.
    SummaryMissing,
}

impl Anomaly {
    pub const ALL: [Anomaly; 11] = [
        Anomaly::BlueprintMissingAuthor,
        Anomaly::UserMissingAuthoredBlueprint,
        Anomaly::FavoriteOnlyInBlueprint,
        Anomaly::FavoritedOwnBlueprint,
        Anomaly::UserFavoriteMissingBlueprint,
        Anomaly::BlueprintFavoriteUnknownUser,
        Anomaly::TagMissingFromBlueprint,
        Anomaly::TagIndexMissingBlueprint,
        Anomaly::BlueprintFavoriteCountMismatch,
        Anomaly::SummaryFavoriteCountMismatch,
        Anomaly::SummaryMissing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlueprintMissingAuthor => "blueprint_missing_author",
            Self::UserMissingAuthoredBlueprint => "user_missing_authored_blueprint",
            Self::FavoriteOnlyInBlueprint => "favorite_only_in_blueprint",
            Self::FavoritedOwnBlueprint => "favorited_own_blueprint",
            Self::UserFavoriteMissingBlueprint => "user_favorite_missing_blueprint",
            Self::BlueprintFavoriteUnknownUser => "blueprint_favorite_unknown_user",
            Self::TagMissingFromBlueprint => "tag_missing_from_blueprint",
            Self::TagIndexMissingBlueprint => "tag_index_missing_blueprint",
            Self::BlueprintFavoriteCountMismatch => "blueprint_favorite_count_mismatch",
            Self::SummaryFavoriteCountMismatch => "summary_favorite_count_mismatch",
            Self::SummaryMissing => "summary_missing",
        }
    }

    /// Phrase used in the end-of-run report, after the count.
    pub fn description(&self) -> &'static str {
        match self {
            Self::BlueprintMissingAuthor => "blueprints were missing their author",
            Self::UserMissingAuthoredBlueprint => "times a user was missing an authored blueprint",
            Self::FavoriteOnlyInBlueprint => "favorites were only recorded on the blueprint",
            Self::FavoritedOwnBlueprint => "times people favorited their own blueprint",
            Self::UserFavoriteMissingBlueprint => "user favorites named a missing blueprint",
            Self::BlueprintFavoriteUnknownUser => "blueprint favorites named an unknown user",
            Self::TagMissingFromBlueprint => "tags were missing from their blueprint",
            Self::TagIndexMissingBlueprint => "tag index entries named a missing blueprint",
            Self::BlueprintFavoriteCountMismatch => "blueprint favorite counts were corrected",
            Self::SummaryFavoriteCountMismatch => "summary favorite counts were stale",
            Self::SummaryMissing => "blueprints had no summary",
        }
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Totals describing the reconciled graph. Not anomalies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Census {
    pub total_blueprints: u64,
    pub blueprints_with_filename: u64,
    pub total_users: u64,
    pub users_with_no_display_name: u64,
    pub users_with_provider_display_name: u64,
    pub users_with_no_email: u64,
    pub users_with_nothing: u64,
    pub privates_derived: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub census: Census,
    anomalies: BTreeMap<Anomaly, u64>,
}

impl Default for Statistics {
    fn default() -> Self {
        Self {
            census: Census::default(),
            anomalies: Anomaly::ALL.iter().map(|a| (*a, 0)).collect(),
        }
    }
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `anomaly` and log it with `detail`.
    pub fn record(&mut self, anomaly: Anomaly, detail: impl fmt::Display) {
        tracing::info!(counter = anomaly.as_str(), "{detail}");
        *self.anomalies.entry(anomaly).or_insert(0) += 1;
    }

    pub fn count(&self, anomaly: Anomaly) -> u64 {
        self.anomalies.get(&anomaly).copied().unwrap_or(0)
    }

    pub fn anomalies(&self) -> impl Iterator<Item = (Anomaly, u64)> + '_ {
        self.anomalies.iter().map(|(a, n)| (*a, *n))
    }

    pub fn total_anomalies(&self) -> u64 {
        self.anomalies.values().sum()
    }

    /// True when no recoverable drift was seen.
    pub fn is_clean(&self) -> bool {
        self.total_anomalies() == 0
    }

    /// Fill the user census from the reconciled graph.
    pub fn take_user_census(&mut self, graph: &Graph) {
        let c = &mut self.census;
        c.total_users = graph.user_count() as u64;
        for user in graph.users() {
            let no_name = user.display_name.is_none();
            if no_name && user.provider_display_name.is_none() {
                c.users_with_no_display_name += 1;
            }
            if no_name && user.provider_display_name.is_some() {
                c.users_with_provider_display_name += 1;
            }
            if user.email.is_none() {
                c.users_with_no_email += 1;
            }
            if no_name
                && user.provider_display_name.is_none()
                && user.email.is_none()
                && user.authored().is_empty()
                && user.favorites().is_empty()
            {
                tracing::debug!(user = user.label(), "user has no profile and no blueprints");
                c.users_with_nothing += 1;
            }
        }
    }

    /// Emit the end-of-run summary, one line per counter.
    pub fn log_statistics(&self) {
        let c = &self.census;
        tracing::info!("{} total blueprints", c.total_blueprints);
        tracing::info!("{} blueprints have a filename", c.blueprints_with_filename);
        tracing::info!("{} total users", c.total_users);
        tracing::info!("{} users with no displayName", c.users_with_no_display_name);
        tracing::info!(
            "{} users with no displayName but do have a provider display name",
            c.users_with_provider_display_name
        );
        tracing::info!("{} users with no email address", c.users_with_no_email);
        tracing::info!("{} users with nothing", c.users_with_nothing);
        tracing::info!("{} blueprint privates derived from blueprints", c.privates_derived);
        for (anomaly, n) in self.anomalies() {
            tracing::info!(counter = anomaly.as_str(), "{n} {}", anomaly.description());
        }
    }
}
