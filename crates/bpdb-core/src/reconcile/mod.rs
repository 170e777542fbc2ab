//! Relationship reconcilers.
//!
//! One module per duplicated relationship. Each pass reads the source
//! collections plus the canonical graph, repairs recoverable drift in place
//! (recording it into [`crate::stats::Statistics`]), and returns
//! [`crate::errors::Inconsistency`] for anything it has no policy to repair.

pub mod authors;
pub mod favorites;
pub mod privates;
pub mod summaries;
pub mod tags;
