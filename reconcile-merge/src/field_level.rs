//! Field-level merge.
//!
//! Starts from the server record and reconciles each differing field:
//! nested objects merge recursively, arrays take set-union, and scalar
//! disagreements go to whichever side wrote later. Fields present on only
//! one side keep the present side's value.

use crate::strategy::MergeStrategy;
use crate::values::{array_union, side_timestamps};
use reconcile_types::Conflict;
use serde_json::Value;

/// Merges two records field by field.
///
/// Exposed standalone because the executor's `merge` alias and the smart
/// strategy's fallback both route here.
#[must_use]
pub fn merge_fields(local: &Value, server: &Value, local_ts: i64, server_ts: i64) -> Value {
    let (Some(local_obj), Some(server_obj)) = (local.as_object(), server.as_object()) else {
        // Not field-addressable — whole-value last-writer-wins.
        return if local_ts > server_ts {
            local.clone()
        } else {
            server.clone()
        };
    };

    let mut out = server_obj.clone();
    for (key, local_value) in local_obj {
        match server_obj.get(key) {
            None => {
                out.insert(key.clone(), local_value.clone());
            }
            Some(server_value) if server_value == local_value => {}
            Some(server_value) => {
                let merged = match (local_value, server_value) {
                    (Value::Object(_), Value::Object(_)) => {
                        merge_fields(local_value, server_value, local_ts, server_ts)
                    }
                    (Value::Array(local_items), Value::Array(server_items)) => {
                        Value::Array(array_union(server_items, local_items))
                    }
                    _ if local_ts > server_ts => local_value.clone(),
                    _ => server_value.clone(),
                };
                out.insert(key.clone(), merged);
            }
        }
    }
    Value::Object(out)
}

/// Per-field merge with recursive objects and array union.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldLevelMerge;

impl MergeStrategy for FieldLevelMerge {
    fn name(&self) -> &'static str {
        "field_level_merge"
    }

    fn description(&self) -> &'static str {
        "Merge field by field, preferring the later write per field"
    }

    fn merge(&self, local: &Value, server: &Value, conflict: &Conflict) -> Value {
        let (local_ts, server_ts) = side_timestamps(local, server, conflict);
        merge_fields(local, server, local_ts, server_ts)
    }

    fn confidence(&self, _local: &Value, _server: &Value, conflict: &Conflict) -> f64 {
        if conflict.fields.is_empty() { 0.9 } else { 0.5 }
    }
}
