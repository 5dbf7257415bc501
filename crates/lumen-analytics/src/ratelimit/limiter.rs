//! Multi-tier sliding-window rate limiter.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

use lumen_core::Result;
use lumen_source::Sweep;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info};

use super::config::{RateLimitConfig, RateLimitUpdate};
use super::window::SlidingWindow;
use crate::metrics::record_rate_limit_rejection;

const SECOND: Duration = Duration::from_secs(1);
const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(3600);

/// Back-off used by [`RateLimiter::wait_for_reset`] when none is known.
pub const DEFAULT_RESET_WAIT: Duration = MINUTE;

/// The tier that rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitReason {
    Burst,
    GlobalPerMinute,
    GlobalPerHour,
    Resource,
}

impl RateLimitReason {
    /// Metric label of the tier.
    pub fn tier(&self) -> &'static str {
        match self {
            Self::Burst => "burst",
            Self::GlobalPerMinute => "global_minute",
            Self::GlobalPerHour => "global_hour",
            Self::Resource => "resource",
        }
    }
}

impl fmt::Display for RateLimitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Burst => "burst limit",
            Self::GlobalPerMinute => "global per-minute limit",
            Self::GlobalPerHour => "global per-hour limit",
            Self::Resource => "resource limit",
        };
        f.write_str(text)
    }
}

/// Outcome of an admission check. Rejection is a normal value, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub retry_after: Option<Duration>,
    pub reason: Option<RateLimitReason>,
}

impl RateLimitDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            retry_after: None,
            reason: None,
        }
    }

    pub fn reject(reason: RateLimitReason, retry_after: Duration) -> Self {
        Self {
            allowed: false,
            retry_after: Some(retry_after),
            reason: Some(reason),
        }
    }
}

/// Count and ceiling of one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierUsage {
    pub count: usize,
    pub limit: u32,
}

/// Usage of one `(key, resource)` window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyUsage {
    /// Requests in the last minute.
    pub recent: usize,
    /// Retained requests (up to one hour old).
    pub total: usize,
    pub limit: u32,
}

/// Snapshot returned by [`RateLimiter::usage_stats`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageStats {
    pub burst: TierUsage,
    pub global_minute: TierUsage,
    pub global_hour: TierUsage,
    /// Keyed by `"<key>:<resource>"`.
    pub resources: BTreeMap<String, KeyUsage>,
}

#[derive(Debug, Default)]
struct LimiterState {
    global: SlidingWindow,
    /// key -> resource type -> window
    keys: HashMap<String, HashMap<String, SlidingWindow>>,
}

/// Sliding-window admission control.
///
/// A request passes when, in order, the global burst (1 s), global
/// per-minute, global per-hour and `(key, resource)` per-minute windows
/// are all below their ceilings. Only admitted requests are recorded.
///
/// # Examples
///
/// ```
/// use lumen_analytics::ratelimit::{RateLimitConfig, RateLimitReason, RateLimiter};
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut config = RateLimitConfig::default();
/// config.burst_per_second = 2;
/// let limiter = RateLimiter::new(config).unwrap();
///
/// assert!(limiter.check_limit("u-1", "events").allowed);
/// assert!(limiter.check_limit("u-1", "events").allowed);
///
/// let decision = limiter.check_limit("u-1", "events");
/// assert!(!decision.allowed);
/// assert_eq!(decision.reason, Some(RateLimitReason::Burst));
/// # }
/// ```
#[derive(Debug)]
pub struct RateLimiter {
    state: Mutex<LimiterState>,
    config: RwLock<RateLimitConfig>,
}

impl RateLimiter {
    /// Creates a limiter, rejecting zero ceilings.
    pub fn new(config: RateLimitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state: Mutex::new(LimiterState::default()),
            config: RwLock::new(config),
        })
    }

    /// Returns a copy of the current configuration.
    pub fn config(&self) -> RateLimitConfig {
        self.config.read().clone()
    }

    /// Checks all tiers and records the request when admitted.
    pub fn check_limit(&self, key: &str, resource: &str) -> RateLimitDecision {
        let decision = self.evaluate(key, resource, true);
        if let Some(reason) = decision.reason {
            record_rate_limit_rejection(reason.tier());
            debug!(
                key = %key,
                resource = %resource,
                reason = %reason,
                retry_after_ms = decision.retry_after.map_or(0, |d| d.as_millis() as u64),
                "Request rate limited"
            );
        }
        decision
    }

    /// Checks all tiers without recording anything.
    pub fn peek(&self, key: &str, resource: &str) -> RateLimitDecision {
        self.evaluate(key, resource, false)
    }

    fn evaluate(&self, key: &str, resource: &str, record: bool) -> RateLimitDecision {
        let now = Instant::now();
        let config = self.config.read();
        let mut state = self.state.lock();
        state.global.prune(now, HOUR);

        let global_tiers = [
            (RateLimitReason::Burst, SECOND, config.burst_per_second),
            (RateLimitReason::GlobalPerMinute, MINUTE, config.global_per_minute),
            (RateLimitReason::GlobalPerHour, HOUR, config.global_per_hour),
        ];
        for (reason, horizon, ceiling) in global_tiers {
            let ceiling = ceiling as usize;
            if state.global.count_within(now, horizon) >= ceiling {
                let retry_after = state.global.retry_after(now, horizon, ceiling);
                return RateLimitDecision::reject(reason, retry_after);
            }
        }

        let ceiling = config.ceiling(resource) as usize;
        if let Some(window) = state.keys.get(key).and_then(|m| m.get(resource)) {
            if window.count_within(now, MINUTE) >= ceiling {
                let retry_after = window.retry_after(now, MINUTE, ceiling);
                return RateLimitDecision::reject(RateLimitReason::Resource, retry_after);
            }
        }

        if record {
            state.global.record(now);
            state
                .keys
                .entry(key.to_string())
                .or_default()
                .entry(resource.to_string())
                .or_default()
                .record(now);
        }
        RateLimitDecision::allow()
    }

    /// Returns per-tier counts and per-key usage.
    pub fn usage_stats(&self) -> UsageStats {
        let now = Instant::now();
        let config = self.config.read();
        let state = self.state.lock();

        let tier = |horizon: Duration, limit: u32| TierUsage {
            count: state.global.count_within(now, horizon),
            limit,
        };

        let mut resources = BTreeMap::new();
        for (key, windows) in &state.keys {
            for (resource, window) in windows {
                resources.insert(
                    format!("{}:{}", key, resource),
                    KeyUsage {
                        recent: window.count_within(now, MINUTE),
                        total: window.len(),
                        limit: config.ceiling(resource),
                    },
                );
            }
        }

        UsageStats {
            burst: tier(SECOND, config.burst_per_second),
            global_minute: tier(MINUTE, config.global_per_minute),
            global_hour: tier(HOUR, config.global_per_hour),
            resources,
        }
    }

    /// Drops every window recorded under `key`. Returns true if any existed.
    pub fn reset_key(&self, key: &str) -> bool {
        self.state.lock().keys.remove(key).is_some()
    }

    /// Drops all recorded requests.
    pub fn reset_all(&self) {
        let mut state = self.state.lock();
        state.global = SlidingWindow::new();
        state.keys.clear();
    }

    /// Merges a partial update into the ceilings.
    ///
    /// The merged configuration is validated before it replaces the current
    /// one; on error nothing changes.
    pub fn update_config(&self, update: RateLimitUpdate) -> Result<()> {
        let mut merged = self.config();
        merged.merge(update);
        merged.validate()?;

        info!(
            burst_per_second = merged.burst_per_second,
            global_per_minute = merged.global_per_minute,
            global_per_hour = merged.global_per_hour,
            "Rate limit configuration updated"
        );
        *self.config.write() = merged;
        Ok(())
    }

    /// Prunes timestamps older than one hour and drops empty windows.
    ///
    /// Returns the number of timestamps removed.
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut state = self.state.lock();
        let mut removed = state.global.prune(now, HOUR);

        state.keys.retain(|_, windows| {
            windows.retain(|_, window| {
                removed += window.prune(now, HOUR);
                !window.is_empty()
            });
            !windows.is_empty()
        });

        removed
    }

    /// Sleeps until the current limit is expected to reset.
    ///
    /// Returns immediately when not limited. Does not re-check after
    /// waking; returns the time slept.
    pub async fn wait_for_reset(&self, key: &str, resource: &str) -> Duration {
        let decision = self.peek(key, resource);
        if decision.allowed {
            return Duration::ZERO;
        }

        let wait = decision
            .retry_after
            .filter(|d| !d.is_zero())
            .unwrap_or(DEFAULT_RESET_WAIT);
        debug!(key = %key, resource = %resource, wait_ms = wait.as_millis() as u64, "Waiting for rate limit reset");
        tokio::time::sleep(wait).await;
        wait
    }
}

impl Sweep for RateLimiter {
    fn sweep_name(&self) -> &str {
        "ratelimit-cleanup"
    }

    fn sweep(&self) -> usize {
        self.cleanup()
    }
}
