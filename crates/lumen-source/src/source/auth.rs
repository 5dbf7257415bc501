//! Caller identity.

use serde::{Deserialize, Serialize};

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user id; also the rate-limit bucket.
    pub id: String,
    /// Role used for redaction decisions.
    pub role: String,
}

impl Identity {
    /// Creates a new identity.
    pub fn new(id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
        }
    }
}

/// Authentication state reported by a permission oracle.
///
/// `Unauthenticated` is an explicit state rather than an absent identity:
/// whether it may read is a policy decision of the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Authenticated(Identity),
    Unauthenticated,
}

impl AuthState {
    /// Returns the identity when authenticated.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            Self::Unauthenticated => None,
        }
    }

    /// Returns the rate-limit bucket for this caller.
    pub fn bucket(&self) -> &str {
        self.identity().map_or("anonymous", |i| i.id.as_str())
    }
}
