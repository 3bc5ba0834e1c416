//! Shared value-merge helpers.

use reconcile_types::{Conflict, record};
use serde_json::{Map, Value};

/// Set-union of two JSON arrays.
///
/// Keeps `base` order and appends elements of `extra` not already present.
/// Membership compares by value equality; ordering of the result is not
/// part of the contract.
#[must_use]
pub fn array_union(base: &[Value], extra: &[Value]) -> Vec<Value> {
    let mut out: Vec<Value> = base.to_vec();
    for item in extra {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out
}

/// Shallow merge of two JSON objects; `overlay` wins per key.
#[must_use]
pub fn shallow_merge(
    base: &Map<String, Value>,
    overlay: &Map<String, Value>,
) -> Map<String, Value> {
    let mut out = base.clone();
    for (key, value) in overlay {
        out.insert(key.clone(), value.clone());
    }
    out
}

/// Effective modification timestamps for the two sides of a conflict.
///
/// The local side falls back to the operation timestamp when the record
/// carries none; a server record with no readable timestamp reads as 0 and
/// loses any comparison.
pub(crate) fn side_timestamps(local: &Value, server: &Value, conflict: &Conflict) -> (i64, i64) {
    let local_ts = record::timestamp_of(local).unwrap_or(conflict.operation.timestamp);
    let server_ts = record::timestamp_of(server).unwrap_or(0);
    (local_ts, server_ts)
}
