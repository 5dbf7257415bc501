//! Resource classification for type-specific checks.

use serde::Serialize;

/// Family of a resource, derived from its collection name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Users, profiles and similar people-like collections.
    User,
    /// Time-bounded events with start/end dates.
    Event,
    Other,
}

impl ResourceKind {
    /// Classifies a resource name (case-insensitive substring match).
    ///
    /// # Example
    ///
    /// ```
    /// use lumen_core::ResourceKind;
    ///
    /// assert_eq!(ResourceKind::classify("user_profiles"), ResourceKind::User);
    /// assert_eq!(ResourceKind::classify("Events"), ResourceKind::Event);
    /// assert_eq!(ResourceKind::classify("payments"), ResourceKind::Other);
    /// ```
    pub fn classify(resource: &str) -> Self {
        let name = resource.to_lowercase();
        if name.contains("user") || name.contains("profile") {
            Self::User
        } else if name.contains("event") {
            Self::Event
        } else {
            Self::Other
        }
    }
}
