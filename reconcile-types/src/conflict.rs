//! Conflicts, suggestions, and resolutions.
//!
//! A [`Conflict`] is a detected disagreement between a local and server
//! version of the same entity. It lives in the engine's open set until a
//! [`Resolution`] settles it; the two states are mutually exclusive.

use crate::{ConflictId, Operation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How impactful a conflict's differing fields are.
///
/// Ordered: `Low < Medium < High < Critical`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Field names whose disagreement always makes a conflict critical.
    pub const CRITICAL_FIELDS: &'static [&'static str] = &["id", "type", "status", "priority"];

    /// Derives severity from the set of differing field names.
    ///
    /// Critical-field membership forces `Critical`; four or more differing
    /// fields force at least `High`; two or more at least `Medium`.
    #[must_use]
    pub fn for_fields(fields: &[String]) -> Self {
        if fields
            .iter()
            .any(|f| Self::CRITICAL_FIELDS.contains(&f.as_str()))
        {
            Self::Critical
        } else if fields.len() >= 4 {
            Self::High
        } else if fields.len() >= 2 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// How likely a suggested strategy is to lose or corrupt data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Risk {
    Low,
    Medium,
    High,
}

/// The shape of the disagreement, derived from the local operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// The entity was created locally but already exists on the server.
    Create,
    /// Both sides updated the entity.
    Update,
    /// The entity was deleted locally but modified on the server.
    Delete,
}

/// A ranked resolution recommendation attached to a conflict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Strategy name, resolvable by the executor.
    pub strategy: String,
    /// Human-readable summary of what the strategy would do.
    pub description: String,
    /// Estimated probability the strategy produces the intended result.
    pub confidence: f64,
    /// Data-loss risk of applying the strategy.
    pub risk: Risk,
}

/// A detected disagreement between local and server versions of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    /// Unique per detection event.
    pub id: ConflictId,
    /// The local mutation that raced the server.
    pub operation: Operation,
    /// The local version of the record.
    pub local_data: Value,
    /// The server version of the record.
    pub server_data: Value,
    /// The shape of the disagreement.
    pub kind: ConflictKind,
    /// How impactful the disagreement is.
    pub severity: Severity,
    /// Human-readable description of the disagreement.
    pub description: String,
    /// Sorted names of the fields that differ between the two versions.
    pub fields: Vec<String>,
    /// Resolution suggestions, sorted descending by confidence.
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
    /// When the conflict was detected (epoch milliseconds).
    pub detected_at: i64,
}

impl Conflict {
    /// Returns the highest-confidence suggestion, if any.
    #[must_use]
    pub fn top_suggestion(&self) -> Option<&Suggestion> {
        self.suggestions.first()
    }
}

/// Whether a resolution was applied unattended or chosen by a human.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedBy {
    Auto,
    User,
}

/// The immutable record of how a conflict was settled.
///
/// Exactly one resolution exists per resolved conflict; resolving removes
/// the conflict from the open set and appends this record to history in
/// one logical step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// The conflict this resolution settled.
    pub conflict_id: ConflictId,
    /// The strategy that produced the resolved value.
    pub strategy: String,
    /// The authoritative merged record.
    pub resolved_data: Value,
    /// When the resolution was applied (epoch milliseconds).
    pub resolved_at: i64,
    /// Whether resolution was automatic or human-chosen.
    pub resolved_by: ResolvedBy,
    /// Recorded confidence of the applied strategy.
    pub confidence: f64,
}
