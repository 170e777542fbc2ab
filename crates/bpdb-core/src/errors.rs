//! Error types for bpdb-core.
//!
//! Two classes of anomaly exist during a run:
//! - recoverable drift, which is repaired in place and tallied by
//!   [`crate::stats::Statistics`] (never an `Err`)
//! - fatal inconsistencies, which abort the whole run and surface here as
//!   [`BpdbError::Inconsistency`]
//!
//! Nothing partial is ever produced once a pass returns `Err`.

use thiserror::Error;

use crate::ids::{BlueprintId, UserId};

pub type BpdbResult<T> = Result<T, BpdbError>;

#[derive(Debug, Error)]
pub enum BpdbError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("corrupted input: {0}")]
    Inconsistency(#[from] Inconsistency),
}

impl BpdbError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// The fatal inconsistency behind this error, if any.
    pub fn inconsistency(&self) -> Option<&Inconsistency> {
        match self {
            Self::Inconsistency(i) => Some(i),
            _ => None,
        }
    }
}

/// Two redundant copies of the same fact disagree and no repair policy applies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Inconsistency {
    #[error("blueprint {blueprint}: author.userId {embedded} disagrees with authorId {top_level}")]
    AuthorIdMismatch {
        blueprint: BlueprintId,
        embedded: UserId,
        top_level: UserId,
    },

    #[error("blueprint {blueprint} carries no author reference")]
    MissingAuthorReference { blueprint: BlueprintId },

    #[error("blueprint {blueprint} names author {author}, who is not a known user")]
    UnknownAuthor { blueprint: BlueprintId, author: UserId },

    #[error("blueprint {blueprint} is bound to author {bound} but its record names {claimed}")]
    AuthorAlreadyBound {
        blueprint: BlueprintId,
        bound: UserId,
        claimed: UserId,
    },

    #[error("user {user} claims to have authored blueprint {blueprint}, whose author is {author}")]
    AuthoredByOtherUser {
        user: UserId,
        blueprint: BlueprintId,
        author: UserId,
    },

    #[error("user {user} lists authored blueprint {blueprint} with value false")]
    AuthoredFlagFalse { user: UserId, blueprint: BlueprintId },

    #[error("users {users:?} favorite blueprint {blueprint}, but the blueprint does not list them")]
    FavoriteOnlyInUser {
        blueprint: BlueprintId,
        users: Vec<UserId>,
    },

    #[error("summary for blueprint {blueprint} has no matching blueprint")]
    SummaryWithoutBlueprint { blueprint: BlueprintId },

    #[error("summary for blueprint {blueprint}: {field} {summary:?} disagrees with blueprint value {blueprint_value:?}")]
    SummaryMismatch {
        blueprint: BlueprintId,
        field: &'static str,
        summary: Option<String>,
        blueprint_value: Option<String>,
    },

    #[error("blueprint {blueprint}: explicit privates disagree with privates derived from the blueprint")]
    PrivatesMismatch { blueprint: BlueprintId },

    #[error("tag {tag:?} is not of the form /prefix/suffix/")]
    MalformedTag { tag: String },

    #[error("blueprint {blueprint} has no author after reconciliation")]
    UnresolvedAuthor { blueprint: BlueprintId },
}
