//! Error types for the data fetcher.

use std::time::Duration;

use lumen_source::SourceError;
use thiserror::Error;

use crate::ratelimit::RateLimitReason;

/// Errors returned by [`DataFetcher`](crate::fetcher::DataFetcher).
///
/// `Clone` so every caller coalesced onto one in-flight request receives
/// the same outcome.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The permission oracle refused read access.
    #[error("access denied to '{resource}'")]
    AccessDenied { resource: String },

    /// The rate limiter rejected the request.
    #[error("rate limit exceeded ({reason}), retry after {}ms", retry_after.as_millis())]
    RateLimited {
        reason: RateLimitReason,
        retry_after: Duration,
    },

    /// The store did not answer within the query timeout.
    #[error("query timed out after {millis}ms")]
    Timeout { millis: u64 },

    /// The store failed the query.
    #[error("query failed: {0}")]
    Query(String),

    /// Every attempt failed.
    #[error("failed to load '{resource}' after {attempts} attempts: {cause}")]
    RetriesExhausted {
        resource: String,
        attempts: u32,
        cause: Box<FetchError>,
    },
}

impl FetchError {
    /// Creates an access denied error.
    pub fn access_denied(resource: impl Into<String>) -> Self {
        Self::AccessDenied {
            resource: resource.into(),
        }
    }

    /// Returns true for failures surfaced immediately without retrying.
    pub fn is_immediate(&self) -> bool {
        matches!(self, Self::AccessDenied { .. } | Self::RateLimited { .. })
    }

    /// Returns the suggested back-off for rate-limit rejections.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }

    /// Returns the number of attempts made before giving up.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::RetriesExhausted { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }
}

impl From<SourceError> for FetchError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Timeout { millis } => Self::Timeout { millis },
            other => Self::Query(other.to_string()),
        }
    }
}
