//! Concatenation merge for accumulating fields.
//!
//! Fields that accumulate content rather than replace it (`tags`,
//! `comments`, `notes`, `description`) lose nothing when both sides are
//! kept: arrays take set-union, strings concatenate server-then-local.
//! Everything else comes from the server.

use crate::strategy::MergeStrategy;
use crate::values::array_union;
use reconcile_types::Conflict;
use serde_json::Value;

/// Fields merged by accumulation instead of replacement.
pub const CONCAT_FIELDS: &[&str] = &["tags", "comments", "notes", "description"];

fn concatenable_on_both(local: &Value, server: &Value) -> bool {
    match (local.as_object(), server.as_object()) {
        (Some(local_obj), Some(server_obj)) => CONCAT_FIELDS
            .iter()
            .any(|field| local_obj.contains_key(*field) && server_obj.contains_key(*field)),
        _ => false,
    }
}

/// Unions arrays and concatenates strings for accumulating fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatenationMerge;

impl MergeStrategy for ConcatenationMerge {
    fn name(&self) -> &'static str {
        "concatenation_merge"
    }

    fn description(&self) -> &'static str {
        "Combine both sides of accumulating fields like tags and notes"
    }

    fn merge(&self, local: &Value, server: &Value, _conflict: &Conflict) -> Value {
        let Some(server_obj) = server.as_object() else {
            return server.clone();
        };

        let mut out = server_obj.clone();
        if let Some(local_obj) = local.as_object() {
            for field in CONCAT_FIELDS {
                let replacement = match (local_obj.get(*field), server_obj.get(*field)) {
                    (Some(Value::Array(local_items)), Some(Value::Array(server_items))) => {
                        Some(Value::Array(array_union(server_items, local_items)))
                    }
                    (Some(Value::String(local_text)), Some(Value::String(server_text)))
                        if local_text != server_text =>
                    {
                        Some(Value::String(format!("{server_text}\n\n{local_text}")))
                    }
                    (Some(local_value), None) => Some(local_value.clone()),
                    _ => None,
                };
                if let Some(value) = replacement {
                    out.insert((*field).to_string(), value);
                }
            }
        }
        Value::Object(out)
    }

    fn confidence(&self, local: &Value, server: &Value, _conflict: &Conflict) -> f64 {
        if concatenable_on_both(local, server) {
            0.7
        } else {
            0.2
        }
    }
}
