//! Pagination cursor.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque pagination token marking where the next page resumes.
///
/// Only the store that produced a cursor knows how to interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wraps a store-specific token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Cursor {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for Cursor {
    fn from(token: String) -> Self {
        Self(token)
    }
}
