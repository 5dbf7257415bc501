//! Rate-limited function wrapper.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use super::limiter::{RateLimitReason, RateLimiter};

/// Error returned by [`LimitedFn::call`].
#[derive(Debug, Error)]
pub enum LimitedError<E> {
    /// The call was rejected before `f` ran.
    #[error("rate limited ({reason}), retry after {}ms", retry_after.as_millis())]
    RateLimited {
        reason: RateLimitReason,
        retry_after: Duration,
    },

    /// `f` ran and failed.
    #[error(transparent)]
    Inner(E),
}

impl<E> LimitedError<E> {
    /// Returns true when the call never ran.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => Some(*retry_after),
            Self::Inner(_) => None,
        }
    }
}

/// An async operation gated by a [`RateLimiter`].
///
/// Each call consumes one admission under `(key, resource)`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use lumen_analytics::ratelimit::{RateLimitConfig, RateLimiter};
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut config = RateLimitConfig::default();
/// config.per_resource.insert("reports".to_string(), 1);
/// let limiter = Arc::new(RateLimiter::new(config).unwrap());
///
/// let export = limiter.limited(
///     |name: &'static str| async move { Ok::<_, std::io::Error>(format!("{}.csv", name)) },
///     "u-1",
///     "reports",
/// );
///
/// assert_eq!(export.call("weekly").await.unwrap(), "weekly.csv");
/// assert!(export.call("monthly").await.unwrap_err().is_rate_limited());
/// # }
/// ```
pub struct LimitedFn<F> {
    limiter: Arc<RateLimiter>,
    f: F,
    key: String,
    resource: String,
}

impl<F> LimitedFn<F> {
    /// Checks the limiter, then runs `f` only when admitted.
    pub async fn call<A, Fut, T, E>(&self, args: A) -> Result<T, LimitedError<E>>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let decision = self.limiter.check_limit(&self.key, &self.resource);
        if let Some(reason) = decision.reason {
            return Err(LimitedError::RateLimited {
                reason,
                retry_after: decision.retry_after.unwrap_or_default(),
            });
        }

        (self.f)(args).await.map_err(LimitedError::Inner)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }
}

impl RateLimiter {
    /// Wraps `f` so each call is admitted under `(key, resource)` first.
    pub fn limited<F>(
        self: &Arc<Self>,
        f: F,
        key: impl Into<String>,
        resource: impl Into<String>,
    ) -> LimitedFn<F> {
        LimitedFn {
            limiter: Arc::clone(self),
            f,
            key: key.into(),
            resource: resource.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::RateLimitConfig;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, Error)]
    #[error("boom")]
    struct Boom;

    #[tokio::test(start_paused = true)]
    async fn test_rejected_call_never_runs() {
        let mut config = RateLimitConfig::default();
        config.burst_per_second = 2;
        let limiter = Arc::new(RateLimiter::new(config).unwrap());
        let calls = Arc::new(AtomicU32::new(0));

        let counted = Arc::clone(&calls);
        let wrapped = limiter.limited(
            move |n: u32| {
                let counted = Arc::clone(&counted);
                async move {
                    counted.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, Boom>(n * 2)
                }
            },
            "u-1",
            "events",
        );

        assert_eq!(wrapped.call(1).await.unwrap(), 2);
        assert_eq!(wrapped.call(2).await.unwrap(), 4);

        let err = wrapped.call(3).await.unwrap_err();
        assert!(err.is_rate_limited());
        assert_eq!(err.retry_after(), Some(Duration::from_secs(1)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(err.to_string().contains("burst limit"));
    }

    #[tokio::test]
    async fn test_inner_error_is_passed_through() {
        let limiter = Arc::new(RateLimiter::new(RateLimitConfig::default()).unwrap());
        let wrapped = limiter.limited(|_: ()| async { Err::<(), _>(Boom) }, "u-1", "events");

        let err = wrapped.call(()).await.unwrap_err();
        assert!(!err.is_rate_limited());
        assert_eq!(err.to_string(), "boom");
        assert_eq!(wrapped.key(), "u-1");
        assert_eq!(wrapped.resource(), "events");
    }
}
