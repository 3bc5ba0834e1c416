//! Merge strategies for the Reconcile conflict engine.
//!
//! This crate provides the [`MergeStrategy`] trait, the [`StrategyCatalog`]
//! registry, and the built-in strategies:
//!
//! - [`TimestampWins`] — whole-record last-writer-wins
//! - [`FieldLevelMerge`] — per-field merge with recursive objects and
//!   array union
//! - [`PriorityMerge`] — ordinal comparison for priority-like fields
//! - [`ConcatenationMerge`] — union arrays / concatenate strings for
//!   accumulating fields
//! - [`UnionMerge`] — keep both sides' collection contents
//! - [`SmartMerge`] — heuristic dispatch between textual concatenation and
//!   field-level merge
//!
//! Every strategy's `merge` is a pure function of `(local, server,
//! conflict)` — no I/O, no mutation of inputs — so the paired confidence
//! estimate remains valid for the exact output produced, and recorded
//! resolutions can be reproduced bit-for-bit.

mod catalog;
mod concatenation;
mod field_level;
mod priority;
mod smart;
mod strategy;
mod timestamp_wins;
mod union;
mod values;

pub use catalog::StrategyCatalog;
pub use concatenation::{CONCAT_FIELDS, ConcatenationMerge};
pub use field_level::{FieldLevelMerge, merge_fields};
pub use priority::{PriorityMerge, RANKED_FIELDS};
pub use smart::{LOCAL_CHANGES_SEPARATOR, SmartMerge, TEXT_FIELDS};
pub use strategy::MergeStrategy;
pub use timestamp_wins::TimestampWins;
pub use union::UnionMerge;
pub use values::{array_union, shallow_merge};
