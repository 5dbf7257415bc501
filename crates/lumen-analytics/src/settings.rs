//! Settings loading.
//!
//! Settings come from an optional file (format inferred from the
//! extension) overlaid with `LUMEN__*` environment variables, where `__`
//! separates nesting levels: `LUMEN__CACHE__MAX_ENTRIES=200`,
//! `LUMEN__RATE_LIMIT__PER_RESOURCE__EVENTS=60`.

use std::path::Path;

use config::{Config, Environment, File};
use lumen_core::{ConfigError, Result, ValidatorConfig};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::CacheConfig;
use crate::fetcher::FetcherConfig;
use crate::ratelimit::RateLimitConfig;

/// Prefix of the environment variables read by [`Settings::load`].
pub const ENV_PREFIX: &str = "LUMEN";

/// Complete configuration of an [`AnalyticsService`](crate::AnalyticsService).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub cache: CacheConfig,
    pub rate_limit: RateLimitConfig,
    pub validator: ValidatorConfig,
    pub fetcher: FetcherConfig,
}

impl Settings {
    /// Loads settings from `path` (if any) and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, Self::environment())
    }

    /// Loads settings from `path` (if any) and the given environment source.
    pub fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self> {
        let source_name = path.map_or_else(|| "environment".to_string(), |p| p.display().to_string());

        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings: Settings = builder
            .add_source(env)
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| ConfigError::load_with_cause(&source_name, e.to_string(), e))?;

        settings.validate()?;
        info!(source = %source_name, "Settings loaded");
        Ok(settings)
    }

    /// The `LUMEN__*` environment source.
    pub fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("validator.required_fields")
            .with_list_parse_key("validator.known_roles")
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<()> {
        self.cache.validate()?;
        self.rate_limit.validate()?;
        self.validator.validate()?;
        self.fetcher.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::PreAuthPolicy;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::environment().source(Some(source))
    }

    fn toml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_sources() {
        let settings = Settings::load_with_env(None, env(&[])).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_file_values() {
        let file = toml_file(
            r#"
            [cache]
            max_entries = 50

            [rate_limit]
            burst_per_second = 5

            [rate_limit.per_resource]
            events = 60

            [fetcher]
            pre_auth_policy = "deny"
            "#,
        );

        let settings = Settings::load_with_env(Some(file.path()), env(&[])).unwrap();

        assert_eq!(settings.cache.max_entries, 50);
        assert_eq!(settings.cache.default_ttl_ms, 300_000);
        assert_eq!(settings.rate_limit.burst_per_second, 5);
        assert_eq!(settings.rate_limit.ceiling("events"), 60);
        assert_eq!(settings.fetcher.pre_auth_policy, PreAuthPolicy::Deny);
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = toml_file("[cache]\nmax_entries = 50\n");

        let settings = Settings::load_with_env(
            Some(file.path()),
            env(&[
                ("LUMEN__CACHE__MAX_ENTRIES", "75"),
                ("LUMEN__FETCHER__MAX_RETRIES", "5"),
                ("LUMEN__VALIDATOR__REQUIRED_FIELDS", "id,created_at"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.cache.max_entries, 75);
        assert_eq!(settings.fetcher.max_retries, 5);
        assert_eq!(settings.validator.required_fields, vec!["id", "created_at"]);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = Settings::load_with_env(None, env(&[("LUMEN__CACHE__MAX_ENTRIES", "0")]))
            .unwrap_err();
        assert_eq!(err.field(), Some("cache.max_entries"));
    }

    #[test]
    fn test_missing_file_is_a_load_error() {
        let err = Settings::load_with_env(Some(Path::new("/nonexistent/lumen.toml")), env(&[]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Load { .. }));
    }
}
