//! Store query types.

use std::fmt;

use lumen_core::{Cursor, Filter, OrderBy};
use serde::{Deserialize, Serialize};

/// A query against one collection of a document store.
///
/// Filters are AND-combined; ordering defaults to descending when a
/// field is given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreQuery {
    /// Collection name.
    resource: String,
    #[serde(default)]
    filters: Vec<Filter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    order_by: Option<OrderBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start_after: Option<Cursor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    limit: Option<usize>,
}

impl StoreQuery {
    /// Creates an unfiltered query for a collection.
    ///
    /// # Example
    ///
    /// ```
    /// use lumen_core::{Filter, FilterOp};
    /// use lumen_source::StoreQuery;
    ///
    /// let query = StoreQuery::new("events")
    ///     .filter(Filter::new("score", FilterOp::Gt, 10))
    ///     .limit(25);
    /// assert_eq!(query.resource(), "events");
    /// assert_eq!(query.filters().len(), 1);
    /// assert_eq!(query.limit_value(), Some(25));
    /// ```
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            filters: Vec::new(),
            order_by: None,
            start_after: None,
            limit: None,
        }
    }

    /// Adds a filter predicate.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Adds several filter predicates.
    pub fn filters_from(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Sets the ordering.
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by = Some(order);
        self
    }

    /// Sets the ordering if present.
    pub fn maybe_order_by(mut self, order: Option<OrderBy>) -> Self {
        self.order_by = order;
        self
    }

    /// Resumes after the given cursor.
    pub fn start_after(mut self, cursor: impl Into<Cursor>) -> Self {
        self.start_after = Some(cursor.into());
        self
    }

    /// Resumes after the given cursor if present.
    pub fn maybe_start_after(mut self, cursor: Option<Cursor>) -> Self {
        self.start_after = cursor;
        self
    }

    /// Caps the number of records returned.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Caps the number of records returned if present.
    pub fn maybe_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Returns the collection name.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Returns the filter predicates.
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Returns the ordering.
    pub fn ordering(&self) -> Option<&OrderBy> {
        self.order_by.as_ref()
    }

    /// Returns the resume cursor.
    pub fn cursor(&self) -> Option<&Cursor> {
        self.start_after.as_ref()
    }

    /// Returns the record cap.
    pub fn limit_value(&self) -> Option<usize> {
        self.limit
    }
}

impl fmt::Display for StoreQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resource)?;
        for filter in &self.filters {
            write!(f, " where {} {} {}", filter.field, filter.operator, filter.value)?;
        }
        if let Some(order) = &self.order_by {
            write!(f, " order by {} {:?}", order.field, order.direction)?;
        }
        if let Some(cursor) = &self.start_after {
            write!(f, " after {}", cursor)?;
        }
        if let Some(limit) = self.limit {
            write!(f, " limit {}", limit)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::FilterOp;

    #[test]
    fn test_new_query() {
        let query = StoreQuery::new("users");
        assert_eq!(query.resource(), "users");
        assert!(query.filters().is_empty());
        assert!(query.ordering().is_none());
        assert!(query.cursor().is_none());
        assert_eq!(query.limit_value(), None);
    }

    #[test]
    fn test_display() {
        let query = StoreQuery::new("events")
            .filter(Filter::new("score", FilterOp::Ge, 3))
            .order_by(OrderBy::asc("created_at"))
            .start_after("e9")
            .limit(10);
        assert_eq!(
            query.to_string(),
            "events where score >= 3 order by created_at Asc after e9 limit 10"
        );
    }

    #[test]
    fn test_maybe_setters_clear_values() {
        let query = StoreQuery::new("events")
            .limit(5)
            .maybe_limit(None)
            .maybe_start_after(Some(Cursor::new("x")));
        assert_eq!(query.limit_value(), None);
        assert_eq!(query.cursor().map(Cursor::as_str), Some("x"));
    }
}
