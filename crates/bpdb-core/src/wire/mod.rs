//! Wire records: the denormalized document shape, field for field.
//!
//! These types are "dumb" data mirroring one exported snapshot of the store.
//! They are read once, reconciled into [`crate::model::Graph`], and rebuilt from
//! the graph on export. Members are declared in lexicographic order, every
//! collection is optional on read, and absent optional fields are omitted on
//! write.
//!
//! Maps are `IndexMap` so iteration follows document order, which keeps abort
//! behaviour and log ordering reproducible for identical input. Output key
//! order is fixed separately by [`crate::codec::encode_database`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ids::{BlueprintId, UserId};

pub mod timestamp;

pub use timestamp::Timestamp;

/// `byTag`: prefix → suffix → blueprint → flag.
pub type TagIndexRecord = IndexMap<String, IndexMap<String, IndexMap<BlueprintId, bool>>>;

/// Whole snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub blueprint_privates: IndexMap<BlueprintId, PrivatesRecord>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub blueprint_summaries: IndexMap<BlueprintId, SummaryRecord>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub blueprints: IndexMap<BlueprintId, BlueprintRecord>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub by_tag: TagIndexRecord,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub moderators: IndexMap<UserId, bool>,

    /// Canonical tag list (category → tag names), copied through.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub tags: IndexMap<String, Vec<String>>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub thumbnails: IndexMap<BlueprintId, String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub users: IndexMap<UserId, UserRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<UserId>,

    /// Opaque payload; never inspected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blueprint_string: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_markdown: Option<String>,

    /// Deprecated blueprint-side copy of the favorites relation. Read for the
    /// cross-check, never written back. `None` and `Some(empty)` differ: the
    /// former means the copy has been retired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorites: Option<IndexMap<UserId, bool>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    #[serde(default)]
    pub image: ImageRecord,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_date: Option<Timestamp>,

    #[serde(default)]
    pub number_of_favorites: u64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Deprecated; superseded by the top-level `thumbnails` collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl BlueprintRecord {
    /// Author identifier from the embedded reference, falling back to `authorId`.
    pub fn author_user_id(&self) -> Option<&UserId> {
        self.author
            .as_ref()
            .and_then(|a| a.user_id.as_ref())
            .or(self.author_id.as_ref())
    }
}

/// Embedded author reference. Older records embed a full copy of the
/// author's profile here; only `userId` is modelled, so the redundant profile
/// fields are dropped on read and never written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletehash: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Authored blueprints; every value must be `true`.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub blueprints: IndexMap<BlueprintId, bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub favorites: IndexMap<BlueprintId, bool>,

    #[serde(default, rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imgur_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imgur_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_date: Option<Timestamp>,

    #[serde(default)]
    pub number_of_favorites: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivatesRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletehash: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}
