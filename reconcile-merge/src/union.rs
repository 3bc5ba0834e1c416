//! Union merge.
//!
//! Keeps both sides' collection contents: for every key on the local
//! record, arrays union with the server's array and objects shallow-merge
//! with local winning per key. Primitive fields the server already has
//! keep the server value; local-only fields are added.

use crate::strategy::MergeStrategy;
use crate::values::{array_union, shallow_merge};
use reconcile_types::Conflict;
use serde_json::Value;

fn has_array_field(record: &Value) -> bool {
    record
        .as_object()
        .is_some_and(|obj| obj.values().any(Value::is_array))
}

/// Unions collections and shallow-merges nested objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnionMerge;

impl MergeStrategy for UnionMerge {
    fn name(&self) -> &'static str {
        "union_merge"
    }

    fn description(&self) -> &'static str {
        "Keep both sides' collection contents"
    }

    fn merge(&self, local: &Value, server: &Value, _conflict: &Conflict) -> Value {
        let Some(server_obj) = server.as_object() else {
            return server.clone();
        };

        let mut out = server_obj.clone();
        if let Some(local_obj) = local.as_object() {
            for (key, local_value) in local_obj {
                let replacement = match (local_value, server_obj.get(key)) {
                    (Value::Array(local_items), Some(Value::Array(server_items))) => {
                        Some(Value::Array(array_union(server_items, local_items)))
                    }
                    (Value::Object(local_map), Some(Value::Object(server_map))) => {
                        Some(Value::Object(shallow_merge(server_map, local_map)))
                    }
                    (_, None) => Some(local_value.clone()),
                    // Primitives the server already has keep the server copy.
                    _ => None,
                };
                if let Some(value) = replacement {
                    out.insert(key.clone(), value);
                }
            }
        }
        Value::Object(out)
    }

    fn confidence(&self, local: &Value, server: &Value, _conflict: &Conflict) -> f64 {
        if has_array_field(local) || has_array_field(server) {
            0.8
        } else {
            0.3
        }
    }
}
