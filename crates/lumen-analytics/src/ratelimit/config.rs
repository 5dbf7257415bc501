//! Rate limiter configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use lumen_core::{ConfigError, Result};
use serde::{Deserialize, Serialize};

/// Per-tier ceilings of the rate limiter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Per-minute ceiling for each resource type.
    pub per_resource: BTreeMap<String, u32>,
    /// Ceiling for resource types missing from `per_resource`.
    pub default_per_resource: u32,
    pub global_per_minute: u32,
    pub global_per_hour: u32,
    pub burst_per_second: u32,
    /// Interval between cleanup sweeps.
    pub cleanup_interval_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        let per_resource = [("users", 30), ("events", 30), ("analytics", 50), ("reports", 10)]
            .into_iter()
            .map(|(name, ceiling)| (name.to_string(), ceiling))
            .collect();

        Self {
            per_resource,
            default_per_resource: 20,
            global_per_minute: 100,
            global_per_hour: 1000,
            burst_per_second: 10,
            cleanup_interval_ms: 60_000,
        }
    }
}

impl RateLimitConfig {
    /// Rejects zero ceilings and intervals.
    pub fn validate(&self) -> Result<()> {
        for (resource, ceiling) in &self.per_resource {
            ConfigError::ensure_positive(
                &format!("rate_limit.per_resource.{}", resource),
                u64::from(*ceiling),
            )?;
        }
        ConfigError::ensure_positive(
            "rate_limit.default_per_resource",
            u64::from(self.default_per_resource),
        )?;
        ConfigError::ensure_positive(
            "rate_limit.global_per_minute",
            u64::from(self.global_per_minute),
        )?;
        ConfigError::ensure_positive("rate_limit.global_per_hour", u64::from(self.global_per_hour))?;
        ConfigError::ensure_positive(
            "rate_limit.burst_per_second",
            u64::from(self.burst_per_second),
        )?;
        ConfigError::ensure_positive("rate_limit.cleanup_interval_ms", self.cleanup_interval_ms)
    }

    /// Returns the per-minute ceiling of a resource type.
    pub fn ceiling(&self, resource: &str) -> u32 {
        self.per_resource
            .get(resource)
            .copied()
            .unwrap_or(self.default_per_resource)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval_ms)
    }

    /// Applies a partial update. Unspecified ceilings are kept.
    pub fn merge(&mut self, update: RateLimitUpdate) {
        if let Some(per_resource) = update.per_resource {
            self.per_resource.extend(per_resource);
        }
        if let Some(value) = update.default_per_resource {
            self.default_per_resource = value;
        }
        if let Some(value) = update.global_per_minute {
            self.global_per_minute = value;
        }
        if let Some(value) = update.global_per_hour {
            self.global_per_hour = value;
        }
        if let Some(value) = update.burst_per_second {
            self.burst_per_second = value;
        }
        if let Some(value) = update.cleanup_interval_ms {
            self.cleanup_interval_ms = value;
        }
    }
}

/// A partial [`RateLimitConfig`].
///
/// `per_resource` entries are merged key by key into the existing map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitUpdate {
    pub per_resource: Option<BTreeMap<String, u32>>,
    pub default_per_resource: Option<u32>,
    pub global_per_minute: Option<u32>,
    pub global_per_hour: Option<u32>,
    pub burst_per_second: Option<u32>,
    pub cleanup_interval_ms: Option<u64>,
}

impl RateLimitUpdate {
    /// Sets the ceiling of one resource type.
    pub fn resource(mut self, resource: impl Into<String>, ceiling: u32) -> Self {
        self.per_resource
            .get_or_insert_with(BTreeMap::new)
            .insert(resource.into(), ceiling);
        self
    }

    pub fn burst_per_second(mut self, value: u32) -> Self {
        self.burst_per_second = Some(value);
        self
    }

    pub fn global_per_minute(mut self, value: u32) -> Self {
        self.global_per_minute = Some(value);
        self
    }
}
