//! Query executor and permission oracle traits.

use async_trait::async_trait;
use lumen_core::Record;
use serde_json::Value;

use super::{AuthState, Identity, QueryPage, StoreQuery};
use crate::error::SourceError;

/// A document store the fetcher can query.
///
/// This trait abstracts over different stores (Firestore, Supabase,
/// in-memory fixtures) so the fetcher never knows the underlying client.
/// Implementations must tolerate being abandoned mid-query: the fetcher
/// drops the future when its timeout fires.
///
/// # Example
///
/// ```ignore
/// use lumen_source::{QueryExecutor, QueryPage, SourceError, StoreQuery};
///
/// struct MyStore;
///
/// #[async_trait]
/// impl QueryExecutor for MyStore {
///     async fn execute(&self, query: &StoreQuery) -> Result<QueryPage, SourceError> {
///         // Implementation here
///     }
///
///     fn name(&self) -> &str {
///         "my-store"
///     }
/// }
/// ```
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Executes a query and returns one page of records.
    ///
    /// # Errors
    ///
    /// - `SourceError::Unavailable` if the store is not reachable
    /// - `SourceError::InvalidQuery` if the query cannot be run on this store
    /// - `SourceError::Query` for any other store-side failure
    async fn execute(&self, query: &StoreQuery) -> Result<QueryPage, SourceError>;

    /// Returns the name of this store, for logging.
    fn name(&self) -> &str;

    /// Performs a health check on the store.
    ///
    /// The default implementation always succeeds.
    async fn health_check(&self) -> Result<(), SourceError> {
        Ok(())
    }
}

/// Security collaborator: identity, read checks, redaction and audit.
#[async_trait]
pub trait PermissionOracle: Send + Sync {
    /// Returns the current authentication state.
    fn auth_state(&self) -> AuthState;

    /// Returns true if `identity` may read `resource`.
    async fn can_read(&self, identity: &Identity, resource: &str) -> bool;

    /// Redacts fields the caller may not see.
    ///
    /// Called before anything is cached, so the output must be safe to
    /// serve to any caller with the same permission level.
    async fn sanitize(
        &self,
        records: Vec<Record>,
        resource: &str,
        identity: Option<&Identity>,
    ) -> Vec<Record>;

    /// Names the redaction level `sanitize` applies for `identity`.
    ///
    /// Callers that share a scope must receive identical sanitized output,
    /// since cached and coalesced results are shared within a scope. The
    /// default scopes by role.
    fn scope(&self, identity: Option<&Identity>) -> String {
        identity.map_or_else(|| "anonymous".to_string(), |i| format!("role:{}", i.role))
    }

    /// Records a security/audit event.
    fn log_event(&self, event: &str, details: Value);
}
