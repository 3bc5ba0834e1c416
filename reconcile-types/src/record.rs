//! Generic helpers over opaque JSON records.
//!
//! The engine treats record contents as a mapping of field name to value.
//! The only assumed structure is an optional timestamp-like field
//! (`timestamp` or `updatedAt`) holding either an epoch-millisecond number
//! or an RFC 3339 string.
//!
//! Comparison works on *stripped* records: volatile fields that vary
//! between copies without representing user-visible differences are
//! removed first. With serde_json's default `BTreeMap`-backed maps,
//! serialization is key-sorted, so the stripped serialization is canonical.

use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

/// Fields excluded from change comparison.
pub const VOLATILE_FIELDS: &[&str] = &["id", "timestamp", "updatedAt", "version"];

/// Keys checked, in order, when reading a record's modification time.
const TIMESTAMP_FIELDS: &[&str] = &["timestamp", "updatedAt"];

/// Current wall-clock time in epoch milliseconds.
#[must_use]
pub fn wall_clock_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Reads the modification timestamp from a record, if present.
///
/// Checks `timestamp` then `updatedAt`; accepts epoch-millisecond numbers
/// (integer or float) and RFC 3339 strings. Anything else reads as absent.
#[must_use]
pub fn timestamp_of(record: &Value) -> Option<i64> {
    let obj = record.as_object()?;
    TIMESTAMP_FIELDS
        .iter()
        .find_map(|key| obj.get(*key).and_then(parse_timestamp))
}

fn parse_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => chrono::DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.timestamp_millis()),
        _ => None,
    }
}

/// Returns a copy of the record with volatile fields removed.
///
/// Only top-level fields are stripped; nested objects are compared as-is.
#[must_use]
pub fn stripped(record: &Value) -> Value {
    match record {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| !VOLATILE_FIELDS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Canonical serialization of a record with volatile fields stripped.
#[must_use]
pub fn canonical(record: &Value) -> String {
    serde_json::to_string(&stripped(record)).unwrap_or_default()
}

/// Whether two records differ once volatile fields are excluded.
#[must_use]
pub fn meaningful_changes(local: &Value, server: &Value) -> bool {
    canonical(local) != canonical(server)
}

/// Sorted names of non-volatile fields whose values differ between the two
/// records. A field present on only one side counts as differing.
///
/// Returns an empty list when either side is not an object — there are no
/// field-level differences to name, even if the values disagree.
#[must_use]
pub fn differing_fields(local: &Value, server: &Value) -> Vec<String> {
    let (Some(l), Some(s)) = (local.as_object(), server.as_object()) else {
        return Vec::new();
    };

    let mut fields: Vec<String> = l
        .keys()
        .chain(s.keys())
        .filter(|key| !VOLATILE_FIELDS.contains(&key.as_str()))
        .filter(|key| l.get(*key) != s.get(*key))
        .cloned()
        .collect();
    fields.sort();
    fields.dedup();
    fields
}
