//! In-memory document store.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::Duration;

use async_trait::async_trait;
use lumen_core::{Cursor, Direction, OrderBy, Record, compare_values, record_id};
use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use crate::error::SourceError;
use crate::source::{QueryExecutor, QueryPage, StoreQuery};

/// A document store held in memory.
///
/// Cursors are record ids: `start_after` resumes after the record with that
/// id in the filtered, ordered result set. Used by the inspect binary and as a
/// fixture in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Record>>>,
    latency: Duration,
    executions: AtomicU64,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that waits `latency` before answering each query.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// Builds a store from a JSON object mapping collection → array of records.
    pub fn from_json(value: Value) -> Result<Self, SourceError> {
        let Value::Object(map) = value else {
            return Err(SourceError::InvalidData(
                "dataset must be an object of collections".to_string(),
            ));
        };

        let store = Self::new();
        for (name, records) in map {
            store.insert_json(&name, records)?;
        }
        Ok(store)
    }

    /// Replaces a collection with the given records.
    pub fn insert(&self, resource: impl Into<String>, records: Vec<Record>) {
        self.collections.write().insert(resource.into(), records);
    }

    /// Replaces a collection from a JSON array of objects.
    pub fn insert_json(&self, resource: &str, records: Value) -> Result<(), SourceError> {
        let records: Vec<Record> = serde_json::from_value(records).map_err(|e| {
            SourceError::InvalidData(format!("collection '{}': {}", resource, e))
        })?;
        self.insert(resource, records);
        Ok(())
    }

    /// Appends one record to a collection, creating it if needed.
    pub fn push(&self, resource: &str, record: Record) {
        self.collections
            .write()
            .entry(resource.to_string())
            .or_default()
            .push(record);
    }

    /// Returns the number of records in a collection.
    pub fn len(&self, resource: &str) -> usize {
        self.collections.read().get(resource).map_or(0, Vec::len)
    }

    /// Returns the number of queries executed so far.
    pub fn executions(&self) -> u64 {
        self.executions.load(AtomicOrdering::SeqCst)
    }

    fn run_query(&self, query: &StoreQuery) -> Result<QueryPage, SourceError> {
        let collections = self.collections.read();
        let Some(collection) = collections.get(query.resource()) else {
            return Ok(QueryPage::empty());
        };

        let mut matched: Vec<&Record> = collection
            .iter()
            .filter(|r| query.filters().iter().all(|f| f.matches(r)))
            .collect();

        if let Some(order) = query.ordering() {
            matched.sort_by(|a, b| compare_by(a, b, order));
        }

        let start = match query.cursor() {
            Some(cursor) => position_after(&matched, cursor)?,
            None => 0,
        };

        let limit = query.limit_value().unwrap_or(usize::MAX);
        let records: Vec<Record> = matched
            .into_iter()
            .skip(start)
            .take(limit)
            .cloned()
            .collect();

        let next_cursor = records.last().and_then(record_id).map(Cursor::new);
        Ok(QueryPage::new(records, next_cursor))
    }
}

/// Orders records by one field; records missing the field sort last.
fn compare_by(a: &Record, b: &Record, order: &OrderBy) -> Ordering {
    let (x, y) = (a.get(&order.field), b.get(&order.field));
    match (x.filter(|v| !v.is_null()), y.filter(|v| !v.is_null())) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => {
            let ord = compare_values(x, y).unwrap_or(Ordering::Equal);
            match order.direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            }
        },
    }
}

fn position_after(records: &[&Record], cursor: &Cursor) -> Result<usize, SourceError> {
    records
        .iter()
        .position(|r| record_id(r).as_deref() == Some(cursor.as_str()))
        .map(|i| i + 1)
        .ok_or_else(|| SourceError::InvalidQuery(format!("unknown cursor '{}'", cursor)))
}

#[async_trait]
impl QueryExecutor for MemoryStore {
    async fn execute(&self, query: &StoreQuery) -> Result<QueryPage, SourceError> {
        self.executions.fetch_add(1, AtomicOrdering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let page = self.run_query(query)?;
        debug!(query = %query, returned = page.len(), "Memory query executed");
        Ok(page)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::{Filter, FilterOp};
    use serde_json::json;

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert_json(
                "events",
                json!([
                    {"id": "e1", "kind": "click", "score": 5},
                    {"id": "e2", "kind": "view", "score": 1},
                    {"id": "e3", "kind": "click", "score": 9},
                    {"id": "e4", "kind": "click"},
                    {"id": "e5", "kind": "view", "score": 7},
                ]),
            )
            .unwrap();
        store
    }

    fn ids(page: &QueryPage) -> Vec<&str> {
        page.records
            .iter()
            .map(|r| r["id"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_filters_are_and_combined() {
        let store = store();
        let query = StoreQuery::new("events")
            .filter(Filter::eq("kind", "click"))
            .filter(Filter::new("score", FilterOp::Gt, 4));

        let page = store.execute(&query).await.unwrap();
        assert_eq!(ids(&page), vec!["e1", "e3"]);
    }

    #[tokio::test]
    async fn test_ordering_puts_missing_fields_last() {
        let store = store();

        let desc = store
            .execute(&StoreQuery::new("events").order_by(OrderBy::desc("score")))
            .await
            .unwrap();
        assert_eq!(ids(&desc), vec!["e3", "e5", "e1", "e2", "e4"]);

        let asc = store
            .execute(&StoreQuery::new("events").order_by(OrderBy::asc("score")))
            .await
            .unwrap();
        assert_eq!(ids(&asc), vec!["e2", "e1", "e5", "e3", "e4"]);
    }

    #[tokio::test]
    async fn test_cursor_pagination() {
        let store = store();
        let base = StoreQuery::new("events").order_by(OrderBy::desc("score")).limit(2);

        let first = store.execute(&base).await.unwrap();
        assert_eq!(ids(&first), vec!["e3", "e5"]);
        assert_eq!(first.next_cursor, Some(Cursor::new("e5")));

        let second = store
            .execute(&base.clone().maybe_start_after(first.next_cursor))
            .await
            .unwrap();
        assert_eq!(ids(&second), vec!["e1", "e2"]);
    }

    #[tokio::test]
    async fn test_unknown_cursor_is_invalid() {
        let store = store();
        let err = store
            .execute(&StoreQuery::new("events").start_after("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::InvalidQuery(_)));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_unknown_collection_is_empty() {
        let page = store().execute(&StoreQuery::new("missing")).await.unwrap();
        assert!(page.is_empty());
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_execution_counter() {
        let store = store();
        assert_eq!(store.executions(), 0);
        store.execute(&StoreQuery::new("events")).await.unwrap();
        store.execute(&StoreQuery::new("events")).await.unwrap();
        assert_eq!(store.executions(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_simulated() {
        let store = MemoryStore::with_latency(Duration::from_millis(250));
        store.push("events", serde_json::from_value(json!({"id": "x"})).unwrap());

        let start = tokio::time::Instant::now();
        store.execute(&StoreQuery::new("events")).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(250));
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(MemoryStore::from_json(json!([1, 2])).is_err());
        assert!(MemoryStore::from_json(json!({"events": [1]})).is_err());

        let store = MemoryStore::from_json(json!({"events": [{"id": 1}], "users": []})).unwrap();
        assert_eq!(store.len("events"), 1);
        assert_eq!(store.len("users"), 0);
    }
}
