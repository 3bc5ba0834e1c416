//! Typed engine events.
//!
//! Events are an observability side-channel for UI wiring and logging,
//! not part of the data contract. The set of kinds is closed — there is
//! no dynamic event-name dispatch.

use reconcile_types::{Conflict, ConflictId, Resolution};
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Everything the engine reports as it works.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A detection batch found conflicts.
    ConflictsDetected { conflicts: Vec<Conflict> },
    /// A conflict was resolved and removed from the open set.
    ConflictResolved { resolution: Resolution },
    /// A resolution attempt failed; the conflict remains open.
    ConflictResolutionError {
        conflict_id: ConflictId,
        strategy: String,
        message: String,
    },
    /// The top suggestion did not clear the auto-resolve confidence bar.
    ConflictRequiresManualResolution { conflict_id: ConflictId },
    /// A batch auto-resolve item failed; the batch continued.
    AutoResolveError {
        conflict_id: ConflictId,
        message: String,
    },
    /// Classification of one operation failed; the operation was skipped.
    DetectionError { entity_id: String, message: String },
    /// A persisted collection failed to load; the engine started empty.
    StateLoadFailed {
        key: &'static str,
        message: String,
    },
    /// A persisted collection failed to save; in-memory state remains
    /// authoritative but is not durable until the next successful save.
    StateSaveFailed {
        key: &'static str,
        message: String,
    },
}

/// Broadcast bus for engine events.
///
/// Multiple subscribers are supported; slow subscribers may miss events
/// (broadcast semantics). Emitting with no subscribers is not an error.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EngineEvent>,
}

impl EventBus {
    /// Creates a new bus.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Subscribes to events emitted after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.tx.subscribe()
    }

    /// Emits an event to all current subscribers.
    pub fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
