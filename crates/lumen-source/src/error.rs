//! Error types for query sources.

/// Errors that can occur when querying a document store.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The store is not reachable.
    #[error("source unavailable: {reason}")]
    Unavailable { reason: String },

    /// The store rejected or failed the query.
    #[error("query failed: {0}")]
    Query(String),

    /// The query is malformed for this store.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A timeout occurred while waiting for the store.
    #[error("query timed out after {millis}ms")]
    Timeout { millis: u64 },

    /// Input data could not be decoded.
    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl SourceError {
    /// Creates a new source unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Creates a new query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Unavailable { .. } | Self::Timeout { .. } | Self::Query(_)
        )
    }
}
