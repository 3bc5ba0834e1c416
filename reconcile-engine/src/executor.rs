//! Strategy application.
//!
//! The pure step of resolution: given a conflict and a strategy name,
//! produce the resolved value and the confidence recorded with it. The
//! engine owns the stateful finalize (history append, open-set removal,
//! persistence, events).

use crate::error::{EngineError, EngineResult};
use reconcile_merge::{FieldLevelMerge, MergeStrategy, StrategyCatalog, TimestampWins};
use reconcile_types::Conflict;
use serde_json::Value;

/// Baseline strategy: keep the local version.
pub const LOCAL_WINS: &str = "local_wins";
/// Baseline strategy: keep the server version.
pub const SERVER_WINS: &str = "server_wins";
/// Pseudo-strategy: resolution data must come from the caller.
pub const MANUAL: &str = "manual";

/// Historic alias of `field_level_merge`, kept so recorded resolutions
/// stay replayable.
pub const MERGE_ALIAS: &str = "merge";

/// Output of a successful strategy application.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionOutcome {
    /// The authoritative merged record.
    pub resolved_data: Value,
    /// Confidence recorded with the resolution.
    pub confidence: f64,
}

/// Applies `strategy` to the conflict's two sides.
///
/// Recorded confidences are fixed per strategy class: picking a side is
/// the most predictable (0.9), timestamp comparison close behind (0.8),
/// field-level merging (0.7), catalog heuristics (0.6).
pub fn apply_strategy(
    conflict: &Conflict,
    strategy: &str,
    catalog: &StrategyCatalog,
) -> EngineResult<ResolutionOutcome> {
    let local = &conflict.local_data;
    let server = &conflict.server_data;

    match strategy {
        LOCAL_WINS => Ok(ResolutionOutcome {
            resolved_data: local.clone(),
            confidence: 0.9,
        }),
        SERVER_WINS => Ok(ResolutionOutcome {
            resolved_data: server.clone(),
            confidence: 0.9,
        }),
        "timestamp_wins" => Ok(ResolutionOutcome {
            resolved_data: TimestampWins.merge(local, server, conflict),
            confidence: 0.8,
        }),
        MERGE_ALIAS | "field_level_merge" => Ok(ResolutionOutcome {
            resolved_data: FieldLevelMerge.merge(local, server, conflict),
            confidence: 0.7,
        }),
        MANUAL => Err(EngineError::ManualResolutionRequired),
        other => match catalog.get(other) {
            Some(registered) => Ok(ResolutionOutcome {
                resolved_data: registered.merge(local, server, conflict),
                confidence: 0.6,
            }),
            None => Err(EngineError::UnknownStrategy(other.to_string())),
        },
    }
}
