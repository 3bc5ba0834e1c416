//! Heuristic merge dispatch.
//!
//! Looks at the shape of the records to pick an approach: when the
//! content is textual and the two serializations barely overlap, the
//! versions have diverged enough that concatenating the textual fields
//! (with a visible separator) preserves more intent than picking a side.
//! Hierarchical or low-signal content falls back to field-level merge.

use crate::field_level::merge_fields;
use crate::strategy::MergeStrategy;
use crate::values::side_timestamps;
use reconcile_types::{Conflict, record};
use serde_json::Value;
use std::collections::BTreeSet;

/// Fields treated as free text by the textual heuristic.
pub const TEXT_FIELDS: &[&str] = &["description", "notes", "content", "body"];

/// Separator inserted between the server and local text on concatenation.
pub const LOCAL_CHANGES_SEPARATOR: &str = "--- Local Changes ---";

/// Serialized-overlap ratio below which textual versions are considered
/// divergent enough to concatenate.
const OVERLAP_THRESHOLD: f32 = 0.8;

fn looks_textual(record: &Value) -> bool {
    record.as_object().is_some_and(|obj| {
        TEXT_FIELDS
            .iter()
            .any(|field| obj.get(*field).is_some_and(Value::is_string))
    })
}

fn overlap_ratio(local: &Value, server: &Value) -> f32 {
    let local_text = record::canonical(local);
    let server_text = record::canonical(server);
    similar::TextDiff::from_words(server_text.as_str(), local_text.as_str()).ratio()
}

fn total_field_count(local: &Value, server: &Value) -> usize {
    let mut keys: BTreeSet<String> = BTreeSet::new();
    for side in [local, server] {
        let stripped = record::stripped(side);
        if let Some(map) = stripped.as_object() {
            keys.extend(map.keys().cloned());
        }
    }
    keys.len()
}

/// Dispatches between textual concatenation and field-level merge based on
/// record shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmartMerge;

impl MergeStrategy for SmartMerge {
    fn name(&self) -> &'static str {
        "smart_merge"
    }

    fn description(&self) -> &'static str {
        "Pick a merge approach from the shape of the content"
    }

    fn merge(&self, local: &Value, server: &Value, conflict: &Conflict) -> Value {
        let textual = looks_textual(local) || looks_textual(server);
        if textual && overlap_ratio(local, server) < OVERLAP_THRESHOLD {
            if let (Some(local_obj), Some(server_obj)) = (local.as_object(), server.as_object()) {
                let mut out = server_obj.clone();
                for field in TEXT_FIELDS {
                    if let (Some(Value::String(local_text)), Some(Value::String(server_text))) =
                        (local_obj.get(*field), server_obj.get(*field))
                    {
                        if local_text != server_text {
                            out.insert(
                                (*field).to_string(),
                                Value::String(format!(
                                    "{server_text}\n\n{LOCAL_CHANGES_SEPARATOR}\n\n{local_text}"
                                )),
                            );
                        }
                    }
                }
                return Value::Object(out);
            }
        }

        // Hierarchical or low-signal content: field-level merge covers both.
        let (local_ts, server_ts) = side_timestamps(local, server, conflict);
        merge_fields(local, server, local_ts, server_ts)
    }

    fn confidence(&self, local: &Value, server: &Value, conflict: &Conflict) -> f64 {
        let total = total_field_count(local, server);
        if total == 0 {
            return 0.0;
        }
        let conflicting = conflict.fields.len();
        ((total as f64 - conflicting as f64) / total as f64).max(0.0)
    }
}
