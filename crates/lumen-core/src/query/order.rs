//! Result ordering.

use serde::{Deserialize, Serialize};

/// Sort direction. Queries default to descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    #[default]
    Desc,
}

/// Ordering clause of a query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderBy {
    /// Field to sort on.
    pub field: String,
    /// Sort direction.
    #[serde(default)]
    pub direction: Direction,
}

impl OrderBy {
    /// Orders by `field` descending.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }

    /// Orders by `field` ascending.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    /// Orders by `field` descending.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field)
    }
}
