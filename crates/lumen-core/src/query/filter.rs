//! Filter predicates.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::Record;

/// Comparison operator of a filter predicate.
///
/// Serialized with the operator spellings document stores use
/// (`==`, `array-contains`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "array-contains")]
    ArrayContains,
    #[serde(rename = "array-contains-any")]
    ArrayContainsAny,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "not-in")]
    NotIn,
}

impl FilterOp {
    /// Returns the wire spelling of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::ArrayContains => "array-contains",
            Self::ArrayContainsAny => "array-contains-any",
            Self::In => "in",
            Self::NotIn => "not-in",
        }
    }

    /// Returns true if the operator expects an array operand.
    pub fn takes_array(&self) -> bool {
        matches!(self, Self::In | Self::NotIn | Self::ArrayContainsAny)
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `{field, operator, value}` predicate.
///
/// Multiple filters on one query are AND-combined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub operator: FilterOp,
    pub value: Value,
}

impl Filter {
    /// Creates a new filter.
    pub fn new(field: impl Into<String>, operator: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Shorthand for an equality filter.
    ///
    /// # Example
    ///
    /// ```
    /// use lumen_core::{Filter, Record};
    /// use serde_json::json;
    ///
    /// let filter = Filter::eq("status", "active");
    /// let record: Record = serde_json::from_value(json!({"status": "active"})).unwrap();
    /// assert!(filter.matches(&record));
    /// ```
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    /// Evaluates the predicate against a record.
    ///
    /// A missing field never matches, including for `!=` and `not-in`.
    pub fn matches(&self, record: &Record) -> bool {
        let Some(actual) = record.get(&self.field) else {
            return false;
        };

        match self.operator {
            FilterOp::Eq => actual == &self.value,
            FilterOp::Ne => actual != &self.value,
            FilterOp::Lt => compare_values(actual, &self.value) == Some(Ordering::Less),
            FilterOp::Le => matches!(
                compare_values(actual, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOp::Gt => compare_values(actual, &self.value) == Some(Ordering::Greater),
            FilterOp::Ge => matches!(
                compare_values(actual, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::ArrayContains => actual
                .as_array()
                .is_some_and(|items| items.contains(&self.value)),
            FilterOp::ArrayContainsAny => match (actual.as_array(), self.value.as_array()) {
                (Some(items), Some(wanted)) => wanted.iter().any(|w| items.contains(w)),
                _ => false,
            },
            FilterOp::In => self
                .value
                .as_array()
                .is_some_and(|allowed| allowed.contains(actual)),
            FilterOp::NotIn => self
                .value
                .as_array()
                .is_some_and(|denied| !denied.contains(actual)),
        }
    }
}

/// Orders two JSON scalars of the same kind.
///
/// Numbers compare numerically, strings lexicographically (which also
/// orders ISO-8601 timestamps), booleans false-first. Mixed kinds, nulls and
/// containers are unordered.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_comparison_operators() {
        let r = record(json!({"count": 5, "name": "beta"}));

        assert!(Filter::new("count", FilterOp::Gt, 4).matches(&r));
        assert!(Filter::new("count", FilterOp::Ge, 5).matches(&r));
        assert!(!Filter::new("count", FilterOp::Lt, 5).matches(&r));
        assert!(Filter::new("count", FilterOp::Le, 5.0).matches(&r));
        assert!(Filter::new("name", FilterOp::Lt, "gamma").matches(&r));
        assert!(Filter::new("name", FilterOp::Ne, "alpha").matches(&r));
    }

    #[test]
    fn test_mixed_kinds_never_match_ordering() {
        let r = record(json!({"count": "5"}));
        assert!(!Filter::new("count", FilterOp::Gt, 1).matches(&r));
        assert!(!Filter::new("count", FilterOp::Le, 10).matches(&r));
    }

    #[test]
    fn test_missing_field_never_matches() {
        let r = record(json!({"other": 1}));
        assert!(!Filter::new("status", FilterOp::Ne, "x").matches(&r));
        assert!(!Filter::new("status", FilterOp::NotIn, json!(["x"])).matches(&r));
    }

    #[test]
    fn test_array_operators() {
        let r = record(json!({"tags": ["a", "b"], "role": "admin"}));

        assert!(Filter::new("tags", FilterOp::ArrayContains, "a").matches(&r));
        assert!(!Filter::new("tags", FilterOp::ArrayContains, "z").matches(&r));
        assert!(Filter::new("tags", FilterOp::ArrayContainsAny, json!(["z", "b"])).matches(&r));
        assert!(Filter::new("role", FilterOp::In, json!(["admin", "user"])).matches(&r));
        assert!(!Filter::new("role", FilterOp::NotIn, json!(["admin"])).matches(&r));
    }

    #[test]
    fn test_operator_wire_format() {
        let filter: Filter =
            serde_json::from_value(json!({"field": "tags", "operator": "array-contains", "value": "x"}))
                .unwrap();
        assert_eq!(filter.operator, FilterOp::ArrayContains);
        assert_eq!(filter.operator.to_string(), "array-contains");
        assert!(FilterOp::NotIn.takes_array());
        assert!(!FilterOp::Eq.takes_array());
    }
}
