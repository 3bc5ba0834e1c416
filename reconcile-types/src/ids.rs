//! Identifier types for the conflict engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a detected conflict.
///
/// Derived from the entity id plus the detection wall-clock time, so ids
/// are unique per detection event without coordination. Two detections of
/// the same entity at different times are different conflicts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConflictId(String);

impl ConflictId {
    /// Derives a conflict id from an entity id and the detection time
    /// (epoch milliseconds).
    #[must_use]
    pub fn derive(entity_id: &str, detected_at_ms: i64) -> Self {
        Self(format!("{entity_id}-{detected_at_ms}"))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ConflictId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ConflictId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for ConflictId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
