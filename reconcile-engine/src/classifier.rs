//! Conflict detection and classification.
//!
//! Pure decision logic, no I/O: given a local operation and the fetched
//! server baseline, decide whether the two genuinely disagree and
//! characterize the disagreement. The engine handles fetching and the
//! per-operation error recovery around this.

use reconcile_types::{
    Conflict, ConflictId, ConflictKind, Operation, OperationKind, Severity, record,
};
use serde_json::Value;
use tracing::debug;

/// Decides whether local and server versions genuinely disagree.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictClassifier;

impl ConflictClassifier {
    /// Creates a classifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Detects a conflict between a local operation and the server
    /// baseline.
    ///
    /// Returns `None` when there is nothing to reconcile: no server
    /// baseline, the server version is not newer than the local write, or
    /// the two copies are identical once volatile fields are excluded.
    /// Suggestions are attached by the ranker, not here.
    #[must_use]
    pub fn detect(&self, operation: &Operation, server_data: Option<&Value>) -> Option<Conflict> {
        let server = server_data?;

        let local_ts = record::timestamp_of(&operation.data).unwrap_or(operation.timestamp);
        // A server record with no readable timestamp cannot be proven newer.
        let server_ts = record::timestamp_of(server)?;

        if server_ts <= local_ts {
            return None;
        }
        if !record::meaningful_changes(&operation.data, server) {
            return None;
        }

        let fields = record::differing_fields(&operation.data, server);
        let severity = Severity::for_fields(&fields);
        let kind = match operation.kind {
            OperationKind::Create => ConflictKind::Create,
            OperationKind::Update => ConflictKind::Update,
            OperationKind::Delete => ConflictKind::Delete,
        };
        let description = describe(kind, &fields);
        let detected_at = record::wall_clock_ms();
        let id = ConflictId::derive(&operation.entity_id, detected_at);

        debug!(
            "Detected {:?} conflict {} ({} differing fields)",
            kind,
            id,
            fields.len()
        );

        Some(Conflict {
            id,
            operation: operation.clone(),
            local_data: operation.data.clone(),
            server_data: server.clone(),
            kind,
            severity,
            description,
            fields,
            suggestions: Vec::new(),
            detected_at,
        })
    }
}

fn describe(kind: ConflictKind, fields: &[String]) -> String {
    match kind {
        ConflictKind::Delete => {
            "Record was deleted locally but modified on the server".to_string()
        }
        _ => match fields {
            [] => "Local and server versions diverged".to_string(),
            [field] => format!("Field '{field}' differs between local and server versions"),
            _ => format!(
                "{} fields differ between local and server versions: {}",
                fields.len(),
                fields.join(", ")
            ),
        },
    }
}
