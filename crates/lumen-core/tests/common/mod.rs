#![allow(dead_code)]
use lumen_core::Record;
use serde_json::{Value, json};

/// Builds records from a JSON array literal.
/// Panics if the JSON is not an array of objects (intended for tests).
pub fn records(value: Value) -> Vec<Record> {
    serde_json::from_value(value).expect("Failed to build test records from JSON")
}

/// A small user collection with one broken record of each kind.
pub fn user_fixture() -> Vec<Record> {
    records(json!([
        {"id": "u1", "role": "admin", "email": "ana@example.com", "created_at": "2024-01-05"},
        {"id": "u2", "role": "user", "email": "ben@example", "created_at": 1704067200000_i64},
        {"id": "u3", "role": "root", "email": "cy@example.com"},
        {"role": "guest", "email": "dee@example.com"},
        {"id": "u5", "role": "guest", "created_at": "someday"}
    ]))
}
