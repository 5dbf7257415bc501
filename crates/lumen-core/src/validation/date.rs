//! Date parsing and normalization.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

/// A candidate date value.
///
/// Naive dates and date-times are interpreted as UTC.
#[derive(Debug, Clone, PartialEq)]
pub enum DateInput {
    /// ISO-8601 text (RFC 3339, naive date-time, or date only).
    Text(String),
    /// Milliseconds since the Unix epoch.
    EpochMillis(f64),
    /// An already-parsed instant.
    Timestamp(DateTime<Utc>),
    /// Anything else; never valid.
    Unsupported,
}

impl From<&str> for DateInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for DateInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for DateInput {
    fn from(value: i64) -> Self {
        Self::EpochMillis(value as f64)
    }
}

impl From<f64> for DateInput {
    fn from(value: f64) -> Self {
        Self::EpochMillis(value)
    }
}

impl From<DateTime<Utc>> for DateInput {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<DateTime<FixedOffset>> for DateInput {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::Timestamp(value.with_timezone(&Utc))
    }
}

impl From<NaiveDateTime> for DateInput {
    fn from(value: NaiveDateTime) -> Self {
        Self::Timestamp(value.and_utc())
    }
}

impl From<NaiveDate> for DateInput {
    fn from(value: NaiveDate) -> Self {
        Self::Timestamp(value.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())
    }
}

impl From<&Value> for DateInput {
    fn from(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::Text(s.clone()),
            Value::Number(n) => n.as_f64().map_or(Self::Unsupported, Self::EpochMillis),
            _ => Self::Unsupported,
        }
    }
}

/// Outcome of [`validate_date`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateValidation {
    pub is_valid: bool,
    /// Canonical `YYYY-MM-DDTHH:MM:SS.sssZ` form when valid.
    pub standardized_date: Option<String>,
}

/// Parses a candidate date into a UTC instant.
pub fn parse_date(input: impl Into<DateInput>) -> Option<DateTime<Utc>> {
    match input.into() {
        DateInput::Timestamp(ts) => Some(ts),
        DateInput::EpochMillis(ms) if ms.is_finite() => DateTime::from_timestamp_millis(ms as i64),
        DateInput::EpochMillis(_) | DateInput::Unsupported => None,
        DateInput::Text(text) => parse_text(text.trim()),
    }
}

fn parse_text(text: &str) -> Option<DateTime<Utc>> {
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Validates a date and returns its canonical ISO-8601 form.
///
/// # Example
///
/// ```
/// use lumen_core::validate_date;
///
/// let result = validate_date("2024-01-01");
/// assert!(result.is_valid);
/// assert_eq!(result.standardized_date.as_deref(), Some("2024-01-01T00:00:00.000Z"));
///
/// assert!(!validate_date("not-a-date").is_valid);
/// ```
pub fn validate_date(input: impl Into<DateInput>) -> DateValidation {
    match parse_date(input) {
        Some(dt) => DateValidation {
            is_valid: true,
            standardized_date: Some(dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
        },
        None => DateValidation {
            is_valid: false,
            standardized_date: None,
        },
    }
}
