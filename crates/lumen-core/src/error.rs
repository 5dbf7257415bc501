//! Error types for Lumen Analytics configuration.
//!
//! Misconfiguration is detected when a component is constructed and is
//! never recoverable by retrying. Runtime failures of the data path live
//! next to the code that produces them (`lumen_source::SourceError`,
//! `lumen_analytics::FetchError`).
//!
//! # Example
//!
//! ```
//! use lumen_core::{ConfigError, Result};
//!
//! fn check_capacity(max_entries: usize) -> Result<usize> {
//!     if max_entries == 0 {
//!         return Err(ConfigError::invalid_value(
//!             "cache.max_entries",
//!             "must be greater than zero",
//!         ));
//!     }
//!     Ok(max_entries)
//! }
//!
//! assert!(check_capacity(0).is_err());
//! assert_eq!(check_capacity(50).unwrap(), 50);
//! ```

use thiserror::Error;

/// Construction-time configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration value is out of its allowed range.
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Dotted path of the offending field
        field: String,
        /// Why it's invalid
        reason: String,
    },

    /// A regular expression in the configuration failed to compile.
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The pattern as given
        pattern: String,
        /// Compiler message
        message: String,
    },

    /// Settings could not be loaded from their source.
    #[error("Failed to load settings from '{source_name}': {message}")]
    Load {
        /// File name or other origin of the settings
        source_name: String,
        /// Description of the failure
        message: String,
        /// Underlying error, if any
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ConfigError {
    /// Creates an InvalidValue error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates an InvalidPattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Creates a Load error with a cause.
    pub fn load_with_cause<E>(
        source_name: impl Into<String>,
        message: impl Into<String>,
        cause: E,
    ) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Load {
            source_name: source_name.into(),
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Returns the field name for value errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidValue { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Fails with InvalidValue when `value` is zero.
    pub fn ensure_positive(field: &str, value: u64) -> Result<()> {
        if value == 0 {
            return Err(Self::invalid_value(field, "must be greater than zero"));
        }
        Ok(())
    }
}

/// Type alias for Results with ConfigError.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_display() {
        let error = ConfigError::invalid_value("cache.max_entries", "must be greater than zero");
        let msg = error.to_string();

        assert!(msg.contains("cache.max_entries"));
        assert!(msg.contains("greater than zero"));
        assert_eq!(error.field(), Some("cache.max_entries"));
    }

    #[test]
    fn test_ensure_positive() {
        assert!(ConfigError::ensure_positive("x", 1).is_ok());

        let err = ConfigError::ensure_positive("rate_limit.burst_per_second", 0).unwrap_err();
        assert_eq!(err.field(), Some("rate_limit.burst_per_second"));
    }

    #[test]
    fn test_load_error_source_chain() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error = ConfigError::load_with_cause("lumen.yaml", "could not read", io_error);

        use std::error::Error;
        assert!(error.source().is_some());
        assert!(error.field().is_none());
    }
}
