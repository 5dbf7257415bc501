//! Validator configuration.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Configuration for the [`DataValidator`](super::DataValidator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Fields every record must carry (null or empty string counts as missing).
    pub required_fields: Vec<String>,
    /// Inputs longer than this are truncated before validation.
    pub max_records: usize,
    /// Creation timestamp field, normalized to ISO-8601 when present.
    pub created_at_field: String,
    /// Roles accepted without a warning on user-like resources.
    pub known_roles: Vec<String>,
    pub role_field: String,
    pub email_field: String,
    pub start_date_field: String,
    pub end_date_field: String,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            required_fields: vec!["id".to_string()],
            max_records: 10_000,
            created_at_field: "created_at".to_string(),
            known_roles: ["admin", "moderator", "user", "guest"]
                .into_iter()
                .map(String::from)
                .collect(),
            role_field: "role".to_string(),
            email_field: "email".to_string(),
            start_date_field: "start_date".to_string(),
            end_date_field: "end_date".to_string(),
        }
    }
}

impl ValidatorConfig {
    /// Checks the configuration for values the validator cannot work with.
    pub fn validate(&self) -> Result<()> {
        ConfigError::ensure_positive("validator.max_records", self.max_records as u64)?;

        if self.required_fields.iter().any(|f| f.trim().is_empty()) {
            return Err(ConfigError::invalid_value(
                "validator.required_fields",
                "field names cannot be empty",
            ));
        }
        if self.created_at_field.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "validator.created_at_field",
                "cannot be empty",
            ));
        }
        Ok(())
    }
}
