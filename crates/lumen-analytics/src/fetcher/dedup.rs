//! In-flight request coalescing.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::debug;

use super::options::FetchResult;
use crate::error::FetchError;

type Outcome = Result<FetchResult, FetchError>;
type Shared = Arc<OnceCell<Outcome>>;

/// Requests currently executing, keyed by cache key.
///
/// The lookup-or-insert runs under a single lock before any await, so two
/// concurrent callers for one key can never both become the executor.
#[derive(Debug, Default)]
pub struct PendingRequests {
    inner: Mutex<HashMap<String, Shared>>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `init` for `key`, or joins the execution already in flight.
    ///
    /// Every caller receives a clone of the same outcome. The entry is
    /// removed once the outcome is known, so later calls execute again.
    pub async fn run<F, Fut>(&self, key: &str, init: F) -> Outcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Outcome>,
    {
        let cell = {
            let mut pending = self.inner.lock();
            match pending.get(key) {
                Some(cell) => {
                    debug!(key = %key, "Joining in-flight request");
                    Arc::clone(cell)
                },
                None => {
                    let cell = Arc::new(OnceCell::new());
                    pending.insert(key.to_string(), Arc::clone(&cell));
                    cell
                },
            }
        };

        let outcome = cell.get_or_init(init).await.clone();

        let mut pending = self.inner.lock();
        if pending.get(key).is_some_and(|current| Arc::ptr_eq(current, &cell)) {
            pending.remove(key);
        }
        outcome
    }

    /// Number of keys currently in flight.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
