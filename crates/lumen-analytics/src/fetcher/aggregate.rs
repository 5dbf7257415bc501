//! Client-side aggregations over fetched records.

use std::collections::BTreeMap;

use lumen_core::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Group label for records whose group field is missing or null.
pub const UNKNOWN_GROUP: &str = "unknown";

/// An aggregation over one resource.
///
/// Serialized with an `op` tag: `{"op": "sum", "field": "amount"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Aggregation {
    /// Number of records.
    Count,
    /// Sum of the numeric values of `field`.
    Sum { field: String },
    /// Mean of the numeric values of `field`; 0 when there are none.
    Avg { field: String },
    /// Number of records per distinct value of `field`.
    GroupBy { field: String },
}

impl Aggregation {
    pub fn sum(field: impl Into<String>) -> Self {
        Self::Sum {
            field: field.into(),
        }
    }

    pub fn avg(field: impl Into<String>) -> Self {
        Self::Avg {
            field: field.into(),
        }
    }

    pub fn group_by(field: impl Into<String>) -> Self {
        Self::GroupBy {
            field: field.into(),
        }
    }

    /// Name of this aggregation in an [`AggregateResult`].
    pub fn label(&self) -> String {
        match self {
            Self::Count => "count".to_string(),
            Self::Sum { field } => format!("sum_{}", field),
            Self::Avg { field } => format!("avg_{}", field),
            Self::GroupBy { field } => format!("group_by_{}", field),
        }
    }

    fn compute(&self, records: &[Record]) -> AggregateValue {
        match self {
            Self::Count => AggregateValue::Count(records.len() as u64),
            Self::Sum { field } => AggregateValue::Number(numbers(records, field).sum()),
            Self::Avg { field } => {
                let (sum, n) = numbers(records, field).fold((0.0, 0u64), |(s, n), v| (s + v, n + 1));
                AggregateValue::Number(if n == 0 { 0.0 } else { sum / n as f64 })
            },
            Self::GroupBy { field } => {
                let mut groups = BTreeMap::new();
                for record in records {
                    *groups.entry(group_label(record.get(field))).or_insert(0) += 1;
                }
                AggregateValue::Groups(groups)
            },
        }
    }
}

/// Value of one aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AggregateValue {
    Count(u64),
    Number(f64),
    Groups(BTreeMap<String, u64>),
}

impl AggregateValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Count(n) => Some(*n as f64),
            Self::Number(x) => Some(*x),
            Self::Groups(_) => None,
        }
    }

    pub fn as_groups(&self) -> Option<&BTreeMap<String, u64>> {
        match self {
            Self::Groups(groups) => Some(groups),
            _ => None,
        }
    }
}

/// Results of a set of aggregations, keyed by [`Aggregation::label`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub values: BTreeMap<String, AggregateValue>,
    /// Number of records aggregated.
    pub record_count: usize,
}

impl AggregateResult {
    /// Computes every aggregation over `records`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lumen_analytics::fetcher::{AggregateResult, Aggregation};
    /// use lumen_core::Record;
    /// use serde_json::json;
    ///
    /// let records: Vec<Record> = serde_json::from_value(json!([
    ///     {"kind": "click", "ms": 10},
    ///     {"kind": "view", "ms": 30},
    ///     {"kind": "click"},
    /// ])).unwrap();
    ///
    /// let result = AggregateResult::compute(
    ///     &records,
    ///     &[Aggregation::Count, Aggregation::avg("ms"), Aggregation::group_by("kind")],
    /// );
    /// assert_eq!(result.get("count").and_then(|v| v.as_f64()), Some(3.0));
    /// assert_eq!(result.get("avg_ms").and_then(|v| v.as_f64()), Some(20.0));
    /// assert_eq!(result.get("group_by_kind").and_then(|v| v.as_groups()).unwrap()["click"], 2);
    /// ```
    pub fn compute(records: &[Record], aggregations: &[Aggregation]) -> Self {
        let values = aggregations
            .iter()
            .map(|aggregation| (aggregation.label(), aggregation.compute(records)))
            .collect();

        Self {
            values,
            record_count: records.len(),
        }
    }

    pub fn get(&self, label: &str) -> Option<&AggregateValue> {
        self.values.get(label)
    }
}

/// Numeric values of `field`; numeric strings count, everything else is skipped.
fn numbers<'a>(records: &'a [Record], field: &'a str) -> impl Iterator<Item = f64> + 'a {
    records.iter().filter_map(move |record| match record.get(field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|x| x.is_finite()),
        _ => None,
    })
}

fn group_label(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => UNKNOWN_GROUP.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
