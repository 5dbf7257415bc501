//! Record model.

use serde_json::{Map, Value};

/// A single document as returned by the store: a JSON object.
pub type Record = Map<String, Value>;

/// Returns the `id` field of a record as a string.
///
/// Numeric ids are rendered with their JSON representation.
///
/// # Example
///
/// ```
/// use lumen_core::{Record, record_id};
/// use serde_json::json;
///
/// let record: Record = serde_json::from_value(json!({"id": "evt-1"})).unwrap();
/// assert_eq!(record_id(&record).as_deref(), Some("evt-1"));
/// ```
pub fn record_id(record: &Record) -> Option<String> {
    match record.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
