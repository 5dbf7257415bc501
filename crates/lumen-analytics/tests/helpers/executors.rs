//! Query executors con fallas controladas.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use lumen_source::{MemoryStore, QueryExecutor, QueryPage, SourceError, StoreQuery};

/// Executor que siempre falla.
#[derive(Debug, Default)]
pub struct FailingExecutor {
    attempts: AtomicU32,
}

impl FailingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryExecutor for FailingExecutor {
    async fn execute(&self, _query: &StoreQuery) -> Result<QueryPage, SourceError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(SourceError::unavailable("connection refused"))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Executor que falla las primeras `failures` llamadas y luego delega al store.
#[derive(Debug)]
pub struct FlakyExecutor {
    store: MemoryStore,
    failures: u32,
    attempts: AtomicU32,
}

impl FlakyExecutor {
    pub fn new(store: MemoryStore, failures: u32) -> Self {
        Self {
            store,
            failures,
            attempts: AtomicU32::new(0),
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryExecutor for FlakyExecutor {
    async fn execute(&self, query: &StoreQuery) -> Result<QueryPage, SourceError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.failures {
            return Err(SourceError::query(format!("transient failure {}", attempt)));
        }
        self.store.execute(query).await
    }

    fn name(&self) -> &str {
        "flaky"
    }
}
