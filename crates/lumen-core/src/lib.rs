//! Lumen Core - Domain types and validation
//!
//! This crate provides the foundational types for Lumen Analytics: the
//! record model, the store-agnostic query model (filters, ordering and
//! cursors), canonical JSON serialization for cache keys, and the record
//! validator used before data reaches charts and reports.

pub mod canonical;
pub mod error;
pub mod query;
pub mod record;
pub mod validation;

pub use canonical::{canonical_json, canonicalize};
pub use error::{ConfigError, Result};
pub use query::{Cursor, Direction, Filter, FilterOp, OrderBy, compare_values};
pub use record::{Record, record_id};
pub use validation::{
    DataValidator, DateInput, DateValidation, ResourceKind, ValidationResult, ValidatorConfig,
    is_valid_email, sanitize_for_chart, validate_date,
};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
