//! Markup stripping before chart rendering.

use serde_json::Value;

use crate::record::Record;

const STRIPPED: [char; 4] = ['<', '>', '"', '\''];

/// Strips `< > " '` from every string value of every record.
///
/// Nested arrays and objects are sanitized too; keys are left untouched.
///
/// # Example
///
/// ```
/// use lumen_core::{Record, sanitize_for_chart};
/// use serde_json::json;
///
/// let record: Record = serde_json::from_value(json!({"label": "<b>\"hi\"</b>", "n": 1})).unwrap();
/// let clean = sanitize_for_chart(&[record]);
/// assert_eq!(clean[0]["label"], "bhi/b");
/// assert_eq!(clean[0]["n"], 1);
/// ```
pub fn sanitize_for_chart(records: &[Record]) -> Vec<Record> {
    records
        .iter()
        .map(|record| {
            record
                .iter()
                .map(|(k, v)| (k.clone(), sanitize_value(v)))
                .collect()
        })
        .collect()
}

/// Sanitizes a single JSON value.
pub fn sanitize_value(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.chars().filter(|c| !STRIPPED.contains(c)).collect()),
        Value::Array(items) => Value::Array(items.iter().map(sanitize_value).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), sanitize_value(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}
