//! Rate limiting for Lumen Analytics.
//!
//! Sliding-window admission control with a global burst tier, global
//! per-minute and per-hour tiers and per-resource ceilings.

pub mod config;
pub mod limited;
pub mod limiter;
pub mod window;

// Re-exports
pub use config::{RateLimitConfig, RateLimitUpdate};
pub use limited::{LimitedError, LimitedFn};
pub use limiter::{
    DEFAULT_RESET_WAIT, KeyUsage, RateLimitDecision, RateLimitReason, RateLimiter, TierUsage,
    UsageStats,
};
pub use window::SlidingWindow;
