//! Tags and the inverted tag index.
//!
//! Tags live in two places: the ordered list embedded in each blueprint, and
//! the `byTag` index (prefix → suffix → blueprint → flag). The index is the
//! source of truth going forward: every indexed pair missing from its
//! blueprint's list is appended, and only the index is exported. Tags that are
//! only embedded stay on the blueprint but never enter the exported index.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::errors::{BpdbResult, Inconsistency};
use crate::ids::BlueprintId;
use crate::model::Graph;
use crate::stats::{Anomaly, Statistics};
use crate::wire::TagIndexRecord;

/// A canonical tag string, `/prefix/suffix/`.
///
/// Neither segment contains `/` and the suffix is non-empty, so
/// `TagPath::from_str(&tag.to_string())` always yields `tag` back. The prefix
/// may be empty (`//suffix/`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TagPath {
    prefix: String,
    suffix: String,
}

impl TagPath {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Result<Self, Inconsistency> {
        let prefix = prefix.into();
        let suffix = suffix.into();
        if !valid_prefix(&prefix) || !valid_suffix(&suffix) {
            return Err(Inconsistency::MalformedTag {
                tag: format!("/{prefix}/{suffix}/"),
            });
        }
        Ok(Self { prefix, suffix })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

fn valid_prefix(s: &str) -> bool {
    !s.contains('/')
}

fn valid_suffix(s: &str) -> bool {
    !s.is_empty() && valid_prefix(s)
}

impl FromStr for TagPath {
    type Err = Inconsistency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || Inconsistency::MalformedTag { tag: s.to_string() };
        let inner = s
            .strip_prefix('/')
            .and_then(|rest| rest.strip_suffix('/'))
            .ok_or_else(malformed)?;
        let (prefix, suffix) = inner.split_once('/').ok_or_else(malformed)?;
        if !valid_prefix(prefix) || !valid_suffix(suffix) {
            return Err(malformed());
        }
        Ok(Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        })
    }
}

impl fmt::Display for TagPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}/", self.prefix, self.suffix)
    }
}

/// Multimap tag → blueprints, in discovery order, without duplicate pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagIndex {
    entries: IndexMap<String, Vec<BlueprintId>>,
}

impl TagIndex {
    /// Returns false if the pair was already present.
    pub fn insert(&mut self, tag: impl Into<String>, blueprint: BlueprintId) -> bool {
        let bps = self.entries.entry(tag.into()).or_default();
        if bps.contains(&blueprint) {
            return false;
        }
        bps.push(blueprint);
        true
    }

    pub fn blueprints(&self, tag: &str) -> &[BlueprintId] {
        self.entries.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[BlueprintId])> {
        self.entries.iter().map(|(t, bps)| (t.as_str(), bps.as_slice()))
    }

    /// Number of distinct tags.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flatten the three-level `byTag` record, keeping `true` entries only.
    pub fn from_record(record: &TagIndexRecord) -> Self {
        let mut index = Self::default();
        for (prefix, suffixes) in record {
            for (suffix, blueprints) in suffixes {
                let tag = format!("/{prefix}/{suffix}/");
                for (blueprint, flag) in blueprints {
                    if *flag {
                        index.insert(tag.as_str(), blueprint.clone());
                    }
                }
            }
        }
        index
    }

    /// Rebuild the three-level `byTag` record. Every tag must decompose.
    pub fn to_record(&self) -> BpdbResult<TagIndexRecord> {
        let mut record = TagIndexRecord::new();
        for (tag, blueprints) in self.iter() {
            let path: TagPath = tag.parse()?;
            let leaf = record
                .entry(path.prefix)
                .or_default()
                .entry(path.suffix)
                .or_default();
            for bp in blueprints {
                leaf.insert(bp.clone(), true);
            }
        }
        Ok(record)
    }
}

/// Merge the inverted index into the graph and return it as the
/// authoritative tag multimap.
pub fn reconcile_tags(by_tag: &TagIndexRecord, graph: &mut Graph, stats: &mut Statistics) -> TagIndex {
    let mut index = TagIndex::default();
    for (tag, blueprints) in TagIndex::from_record(by_tag).iter() {
        for bp in blueprints {
            if graph.contains_blueprint(bp.as_str()) {
                index.insert(tag, bp.clone());
            } else {
                stats.record(
                    Anomaly::TagIndexMissingBlueprint,
                    format_args!("cannot find blueprint {bp} with tag {tag}"),
                );
            }
        }
    }

    for (tag, blueprints) in index.iter() {
        for id in blueprints {
            let Some(bp) = graph.blueprint_mut(id.as_str()) else {
                continue;
            };
            if !bp.has_tag(tag) {
                stats.record(
                    Anomaly::TagMissingFromBlueprint,
                    format_args!("blueprint {id} missing tag {tag}"),
                );
                bp.tags.push(tag.to_string());
            }
        }
    }

    tracing::debug!(indexed = index.len(), "tag index merged");

    index
}
