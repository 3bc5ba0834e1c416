//! Local mutations awaiting reconciliation.
//!
//! An [`Operation`] records a change a disconnected client made to an
//! entity. Operations are immutable once submitted — the engine only reads
//! them to decide whether they race a newer server version.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The kind of local mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Create,
    Update,
    Delete,
}

/// A local mutation to an entity, queued while offline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// The application-defined entity type (e.g. "task", "note").
    pub entity_type: String,
    /// The entity this operation applies to.
    pub entity_id: String,
    /// What the client did.
    pub kind: OperationKind,
    /// Full record value at the time of the mutation. For deletes this is
    /// the last known local copy (possibly empty).
    pub data: Value,
    /// Wall-clock time of the local mutation (epoch milliseconds).
    pub timestamp: i64,
    /// The user who made the change, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// The client session the change originated from, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl Operation {
    /// Creates a new operation.
    #[must_use]
    pub fn new(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        kind: OperationKind,
        data: Value,
        timestamp: i64,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            kind,
            data,
            timestamp,
            user_id: None,
            session_id: None,
        }
    }

    /// Creates a create operation.
    #[must_use]
    pub fn create(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        data: Value,
        timestamp: i64,
    ) -> Self {
        Self::new(entity_type, entity_id, OperationKind::Create, data, timestamp)
    }

    /// Creates an update operation.
    #[must_use]
    pub fn update(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        data: Value,
        timestamp: i64,
    ) -> Self {
        Self::new(entity_type, entity_id, OperationKind::Update, data, timestamp)
    }

    /// Creates a delete operation carrying the last known local copy.
    #[must_use]
    pub fn delete(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        data: Value,
        timestamp: i64,
    ) -> Self {
        Self::new(entity_type, entity_id, OperationKind::Delete, data, timestamp)
    }

    /// Attaches the originating user.
    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Attaches the originating session.
    #[must_use]
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}
