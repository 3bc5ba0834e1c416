//! Whole-record last-writer-wins.
//!
//! Takes whichever side was written last, wholesale. The simplest strategy
//! and the baseline the others are judged against: high confidence when
//! the writes are clearly separated in time, low when they raced.

use crate::strategy::MergeStrategy;
use crate::values::side_timestamps;
use reconcile_types::Conflict;
use serde_json::Value;

/// Gap beyond which the later write is considered clearly decisive.
const DECISIVE_GAP_MS: i64 = 60_000;

/// Keeps whichever of local/server has the larger timestamp.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampWins;

impl MergeStrategy for TimestampWins {
    fn name(&self) -> &'static str {
        "timestamp_wins"
    }

    fn description(&self) -> &'static str {
        "Keep whichever version was written last"
    }

    fn merge(&self, local: &Value, server: &Value, conflict: &Conflict) -> Value {
        let (local_ts, server_ts) = side_timestamps(local, server, conflict);
        if local_ts > server_ts {
            local.clone()
        } else {
            server.clone()
        }
    }

    fn confidence(&self, local: &Value, server: &Value, conflict: &Conflict) -> f64 {
        let (local_ts, server_ts) = side_timestamps(local, server, conflict);
        if (local_ts - server_ts).abs() > DECISIVE_GAP_MS {
            0.9
        } else {
            0.6
        }
    }
}
