//! Ordinal merge for priority-like fields.
//!
//! Workflow fields (`priority`, `status`, `importance`) carry values with
//! a natural order; when both sides disagree on one, the higher-ranked
//! value is kept. Everything else comes from the server.

use crate::strategy::MergeStrategy;
use reconcile_types::Conflict;
use serde_json::Value;

/// Fields resolved by ordinal comparison.
pub const RANKED_FIELDS: &[&str] = &["priority", "status", "importance"];

/// Fixed ordinal table covering priority levels and workflow statuses.
/// Unknown values rank 0, which keeps the server value on comparison.
fn rank_of(value: &Value) -> u8 {
    let Some(s) = value.as_str() else { return 0 };
    match s {
        "low" | "todo" => 1,
        "normal" | "pending" => 2,
        "medium" | "in_progress" => 3,
        "high" | "review" => 4,
        "urgent" | "done" => 5,
        "critical" | "archived" => 6,
        _ => 0,
    }
}

fn has_ranked_field(record: &Value) -> bool {
    record.as_object().is_some_and(|obj| {
        RANKED_FIELDS
            .iter()
            .any(|field| obj.get(*field).is_some_and(|v| !v.is_null()))
    })
}

/// Keeps the higher-ranked value for known priority-like fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityMerge;

impl MergeStrategy for PriorityMerge {
    fn name(&self) -> &'static str {
        "priority_merge"
    }

    fn description(&self) -> &'static str {
        "Keep the higher-ranked value for priority and status fields"
    }

    fn merge(&self, local: &Value, server: &Value, _conflict: &Conflict) -> Value {
        let Some(server_obj) = server.as_object() else {
            return server.clone();
        };

        let mut out = server_obj.clone();
        if let Some(local_obj) = local.as_object() {
            for field in RANKED_FIELDS {
                if let Some(local_value) = local_obj.get(*field) {
                    let keep_local = match server_obj.get(*field) {
                        Some(server_value) => rank_of(local_value) > rank_of(server_value),
                        None => true,
                    };
                    if keep_local {
                        out.insert((*field).to_string(), local_value.clone());
                    }
                }
            }
        }
        Value::Object(out)
    }

    fn confidence(&self, local: &Value, server: &Value, _conflict: &Conflict) -> f64 {
        if has_ranked_field(local) || has_ranked_field(server) {
            0.8
        } else {
            0.3
        }
    }
}
