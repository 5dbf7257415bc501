//! Structural validation and normalization of fetched records.
//!
//! Validation is advisory: problems are reported as errors (record dropped)
//! or warnings (record kept) in a [`ValidationResult`], never as `Err`.

mod config;
mod date;
mod email;
mod kind;
mod sanitize;
mod validator;

pub use config::ValidatorConfig;
pub use date::{DateInput, DateValidation, parse_date, validate_date};
pub use email::is_valid_email;
pub use kind::ResourceKind;
pub use sanitize::{sanitize_for_chart, sanitize_value};
pub use validator::{DataValidator, RecordCheck, ValidationResult};
