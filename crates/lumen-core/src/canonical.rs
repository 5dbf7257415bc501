//! Canonical JSON serialization.
//!
//! `serde_json` keeps object keys in insertion order when the
//! `preserve_order` feature is enabled anywhere in the dependency graph, so
//! two structurally equal filters can serialize differently. Cache keys are
//! built from the canonical form instead: object keys sorted recursively.

use serde::Serialize;
use serde_json::{Map, Value};

/// Returns a copy of `value` with every object's keys sorted.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            let mut sorted = Map::with_capacity(map.len());
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        },
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Serializes any value to canonical JSON text.
///
/// Values that fail to serialize render as `null`.
///
/// # Example
///
/// ```
/// use lumen_core::canonical_json;
/// use serde_json::json;
///
/// let a = canonical_json(&json!({"b": 1, "a": {"d": 2, "c": 3}}));
/// let b = canonical_json(&json!({"a": {"c": 3, "d": 2}, "b": 1}));
/// assert_eq!(a, b);
/// assert_eq!(a, r#"{"a":{"c":3,"d":2},"b":1}"#);
/// ```
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> String {
    let value = serde_json::to_value(value).unwrap_or(Value::Null);
    write_canonical(&value)
}

fn write_canonical(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            let body: Vec<String> = entries
                .into_iter()
                .map(|(k, v)| format!("{}:{}", Value::String(k.clone()), write_canonical(v)))
                .collect();
            format!("{{{}}}", body.join(","))
        },
        Value::Array(items) => {
            let body: Vec<String> = items.iter().map(write_canonical).collect();
            format!("[{}]", body.join(","))
        },
        other => other.to_string(),
    }
}
