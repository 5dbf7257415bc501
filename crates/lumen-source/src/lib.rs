//! # Lumen Source
//!
//! Store and permission abstractions consumed by the Lumen Analytics
//! fetcher.
//!
//! ## Features
//!
//! - Async trait-based query executor abstraction over document stores
//! - Permission oracle trait for read checks, redaction and audit events
//! - In-memory document store with filters, ordering and cursors
//! - Background sweep scheduling with cancellation handles
//!
//! ## Example
//!
//! ```
//! use lumen_core::{Filter, OrderBy};
//! use lumen_source::{MemoryStore, QueryExecutor, StoreQuery};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), lumen_source::SourceError> {
//! let store = MemoryStore::new();
//! store.insert_json("events", json!([
//!     {"id": "e1", "kind": "login", "score": 3},
//!     {"id": "e2", "kind": "login", "score": 9},
//!     {"id": "e3", "kind": "logout", "score": 1},
//! ]))?;
//!
//! let query = StoreQuery::new("events")
//!     .filter(Filter::eq("kind", "login"))
//!     .order_by(OrderBy::desc("score"))
//!     .limit(1);
//! let page = store.execute(&query).await?;
//! assert_eq!(page.records[0]["id"], "e2");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod memory;
pub mod oracle;
pub mod source;
pub mod sync;

// Re-exports
pub use error::SourceError;
pub use memory::MemoryStore;
pub use oracle::{AuditEvent, StaticPermissions};
pub use source::{AuthState, Identity, PermissionOracle, QueryExecutor, QueryPage, StoreQuery};
pub use sync::{Sweep, SweepConfig, SweepHandle, SweepScheduler, SweepState};

// Re-export lumen_core for consumers
pub use lumen_core;
