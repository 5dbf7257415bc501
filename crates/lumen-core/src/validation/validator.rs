//! Record validator.

use serde::Serialize;
use serde_json::Value;

use super::config::ValidatorConfig;
use super::date::{parse_date, validate_date};
use super::email::is_valid_email;
use super::kind::ResourceKind;
use crate::error::Result;
use crate::record::Record;

/// Outcome of validating a batch of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// True iff no record produced a hard error.
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Records that passed, with normalized dates.
    pub cleaned_data: Vec<Record>,
}

/// Outcome of validating a single record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordCheck {
    /// The cleaned record, `None` when a hard error dropped it.
    pub cleaned: Option<Record>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Stateless validator for fetched records.
#[derive(Debug, Clone, Default)]
pub struct DataValidator {
    config: ValidatorConfig,
}

impl DataValidator {
    /// Creates a validator, rejecting unusable configuration.
    pub fn new(config: ValidatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validates untyped JSON input.
    ///
    /// Non-array input is a hard error with no cleaned data. Array elements
    /// that are not objects fail individually.
    ///
    /// # Example
    ///
    /// ```
    /// use lumen_core::DataValidator;
    /// use serde_json::json;
    ///
    /// let validator = DataValidator::default();
    ///
    /// let result = validator.validate_json(&json!({"id": 1}), "events");
    /// assert!(!result.is_valid);
    /// assert!(result.cleaned_data.is_empty());
    ///
    /// let result = validator.validate_json(&json!([{"id": 1}, {"name": "x"}]), "events");
    /// assert!(!result.is_valid);
    /// assert_eq!(result.cleaned_data.len(), 1);
    /// ```
    pub fn validate_json(&self, value: &Value, resource: &str) -> ValidationResult {
        let Some(items) = value.as_array() else {
            return ValidationResult {
                is_valid: false,
                errors: vec!["Data must be an array of records".to_string()],
                ..Default::default()
            };
        };

        self.run(
            items.len(),
            items.iter().map(Value::as_object).enumerate(),
            resource,
        )
    }

    /// Validates a batch of records.
    pub fn validate_data(&self, records: &[Record], resource: &str) -> ValidationResult {
        self.run(records.len(), records.iter().map(Some).enumerate(), resource)
    }

    fn run<'a, I>(&self, total: usize, items: I, resource: &str) -> ValidationResult
    where
        I: Iterator<Item = (usize, Option<&'a Record>)>,
    {
        let mut result = ValidationResult {
            is_valid: true,
            ..Default::default()
        };

        if total == 0 {
            result.warnings.push("No records to validate".to_string());
            return result;
        }

        let max = self.config.max_records;
        if total > max {
            result.warnings.push(format!(
                "Input has {} records, truncated to the first {}",
                total, max
            ));
        }

        let kind = ResourceKind::classify(resource);
        for (index, item) in items.take(max) {
            let check = match item {
                Some(record) => self.validate_record(record, kind, index),
                None => RecordCheck {
                    cleaned: None,
                    errors: vec![format!("Record {}: not an object", index)],
                    warnings: Vec::new(),
                },
            };

            if !check.errors.is_empty() {
                result.is_valid = false;
            }
            result.errors.extend(check.errors);
            result.warnings.extend(check.warnings);
            if let Some(cleaned) = check.cleaned {
                result.cleaned_data.push(cleaned);
            }
        }

        result
    }

    /// Validates one record.
    ///
    /// Hard errors (missing required field, unparseable creation date) drop
    /// the record; type-specific soft checks only warn.
    pub fn validate_record(&self, record: &Record, kind: ResourceKind, index: usize) -> RecordCheck {
        let mut check = RecordCheck::default();

        for field in &self.config.required_fields {
            if is_missing(record.get(field)) {
                check
                    .errors
                    .push(format!("Record {}: missing required field '{}'", index, field));
            }
        }

        let mut cleaned = record.clone();
        let created_field = &self.config.created_at_field;
        if let Some(raw) = record.get(created_field).filter(|v| !v.is_null()) {
            let date = validate_date(raw);
            match date.standardized_date {
                Some(iso) if date.is_valid => {
                    cleaned.insert(created_field.clone(), Value::String(iso));
                },
                _ => check.errors.push(format!(
                    "Record {}: invalid date in '{}'",
                    index, created_field
                )),
            }
        }

        match kind {
            ResourceKind::User => self.check_user(record, index, &mut check.warnings),
            ResourceKind::Event => self.check_event(record, index, &mut check.warnings),
            ResourceKind::Other => {},
        }

        if check.errors.is_empty() {
            check.cleaned = Some(cleaned);
        }
        check
    }

    fn check_user(&self, record: &Record, index: usize, warnings: &mut Vec<String>) {
        if let Some(role) = record.get(&self.config.role_field).filter(|v| !v.is_null()) {
            let known = role
                .as_str()
                .is_some_and(|r| self.config.known_roles.iter().any(|k| k == r));
            if !known {
                warnings.push(format!("Record {}: unknown role {}", index, role));
            }
        }

        if let Some(email) = record.get(&self.config.email_field).filter(|v| !v.is_null()) {
            if !email.as_str().is_some_and(is_valid_email) {
                warnings.push(format!("Record {}: invalid email {}", index, email));
            }
        }
    }

    fn check_event(&self, record: &Record, index: usize, warnings: &mut Vec<String>) {
        let start = record.get(&self.config.start_date_field).and_then(parse_date);
        let end = record.get(&self.config.end_date_field).and_then(parse_date);

        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                warnings.push(format!("Record {}: start date is after end date", index));
            }
        }
    }
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: Value) -> Vec<Record> {
        serde_json::from_value(value).unwrap()
    }

    fn validator_with_required(fields: &[&str]) -> DataValidator {
        DataValidator::new(ValidatorConfig {
            required_fields: fields.iter().map(|f| f.to_string()).collect(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_missing_required_fields_are_dropped() {
        let validator = validator_with_required(&["id", "created_at"]);
        let input = records(json!([
            {"id": "1", "created_at": "2024-01-01"},
            {"id": "2"},
            {"created_at": "2024-01-02"},
            {"id": "", "created_at": "2024-01-03"},
        ]));

        let result = validator.validate_data(&input, "reports");

        assert!(!result.is_valid);
        assert_eq!(result.cleaned_data.len(), 1);
        assert_eq!(result.cleaned_data[0]["id"], "1");
        assert!(result.errors.len() >= 3);
    }

    #[test]
    fn test_created_at_is_normalized() {
        let validator = DataValidator::default();
        let input = records(json!([{"id": 1, "created_at": "2024-02-29T10:00:00+01:00"}]));

        let result = validator.validate_data(&input, "events");

        assert!(result.is_valid);
        assert_eq!(
            result.cleaned_data[0]["created_at"],
            "2024-02-29T09:00:00.000Z"
        );
    }

    #[test]
    fn test_unparseable_created_at_is_an_error() {
        let validator = DataValidator::default();
        let input = records(json!([{"id": 1, "created_at": "yesterday"}]));

        let result = validator.validate_data(&input, "events");

        assert!(!result.is_valid);
        assert!(result.cleaned_data.is_empty());
        assert!(result.errors[0].contains("created_at"));
    }

    #[test]
    fn test_user_soft_checks_only_warn() {
        let validator = DataValidator::default();
        let input = records(json!([
            {"id": 1, "role": "superhero", "email": "not-an-email"},
            {"id": 2, "role": "admin", "email": "ok@example.com"},
        ]));

        let result = validator.validate_data(&input, "users");

        assert!(result.is_valid);
        assert_eq!(result.cleaned_data.len(), 2);
        assert_eq!(result.warnings.len(), 2);
        assert!(result.warnings.iter().any(|w| w.contains("role")));
        assert!(result.warnings.iter().any(|w| w.contains("email")));
    }

    #[test]
    fn test_event_date_ordering_warns() {
        let validator = DataValidator::default();
        let input = records(json!([
            {"id": 1, "start_date": "2024-05-02", "end_date": "2024-05-01"},
            {"id": 2, "start_date": "2024-05-01", "end_date": "2024-05-02"},
        ]));

        let result = validator.validate_data(&input, "events");

        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].starts_with("Record 0"));
    }

    #[test]
    fn test_empty_input_is_valid_with_warning() {
        let result = DataValidator::default().validate_data(&[], "events");
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_oversized_input_is_truncated() {
        let validator = DataValidator::new(ValidatorConfig {
            max_records: 2,
            ..Default::default()
        })
        .unwrap();
        let input = records(json!([{"id": 1}, {"id": 2}, {"id": 3}]));

        let result = validator.validate_data(&input, "events");

        assert!(result.is_valid);
        assert_eq!(result.cleaned_data.len(), 2);
        assert!(result.warnings[0].contains("truncated"));
    }

    #[test]
    fn test_non_object_elements_fail_individually() {
        let result = DataValidator::default().validate_json(&json!([{"id": 1}, 7, "x"]), "events");

        assert!(!result.is_valid);
        assert_eq!(result.cleaned_data.len(), 1);
        assert_eq!(result.errors.len(), 2);
    }
}
