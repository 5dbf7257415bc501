//! Query result types.

use lumen_core::{Cursor, Record};
use serde::{Deserialize, Serialize};

/// One page of records returned by a store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryPage {
    /// Records in query order.
    pub records: Vec<Record>,
    /// Cursor positioned after the last record of this page, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Cursor>,
}

impl QueryPage {
    /// Creates a page.
    pub fn new(records: Vec<Record>, next_cursor: Option<Cursor>) -> Self {
        Self {
            records,
            next_cursor,
        }
    }

    /// Creates an empty page.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the page has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
