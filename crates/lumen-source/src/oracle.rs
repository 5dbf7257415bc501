//! Static permission oracle.

use std::collections::HashSet;

use async_trait::async_trait;
use lumen_core::Record;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::source::{AuthState, Identity, PermissionOracle};

/// An audit event recorded by [`StaticPermissions`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEvent {
    pub name: String,
    pub details: Value,
}

/// A permission oracle driven by in-process state.
///
/// Every identity may read unless explicitly denied. Callers whose role is
/// not privileged get the configured fields stripped from every record.
/// Audit events are logged through `tracing` and kept for inspection.
#[derive(Debug)]
pub struct StaticPermissions {
    state: RwLock<AuthState>,
    denied: RwLock<HashSet<String>>,
    redacted_fields: Vec<String>,
    privileged_roles: Vec<String>,
    events: Mutex<Vec<AuditEvent>>,
}

impl StaticPermissions {
    /// Creates an oracle reporting the given state.
    pub fn new(state: AuthState) -> Self {
        Self {
            state: RwLock::new(state),
            denied: RwLock::new(HashSet::new()),
            redacted_fields: Vec::new(),
            privileged_roles: vec!["admin".to_string()],
            events: Mutex::new(Vec::new()),
        }
    }

    /// Creates an oracle with no authenticated caller.
    pub fn unauthenticated() -> Self {
        Self::new(AuthState::Unauthenticated)
    }

    /// Creates an oracle for an authenticated caller.
    pub fn authenticated(identity: Identity) -> Self {
        Self::new(AuthState::Authenticated(identity))
    }

    /// Strips `fields` for callers without a privileged role.
    pub fn with_redacted_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.redacted_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the set of roles that see unredacted data.
    pub fn with_privileged_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.privileged_roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Changes the reported authentication state.
    pub fn set_auth_state(&self, state: AuthState) {
        *self.state.write() = state;
    }

    /// Revokes read access for an identity id.
    pub fn deny(&self, identity_id: impl Into<String>) {
        self.denied.write().insert(identity_id.into());
    }

    /// Restores read access for an identity id.
    pub fn allow(&self, identity_id: &str) {
        self.denied.write().remove(identity_id);
    }

    /// Returns every audit event recorded so far.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }

    /// Returns the audit events with the given name.
    pub fn events_named(&self, name: &str) -> Vec<AuditEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.name == name)
            .cloned()
            .collect()
    }

    fn is_privileged(&self, identity: Option<&Identity>) -> bool {
        identity.is_some_and(|i| self.privileged_roles.iter().any(|r| r == &i.role))
    }
}

impl Default for StaticPermissions {
    fn default() -> Self {
        Self::unauthenticated()
    }
}

#[async_trait]
impl PermissionOracle for StaticPermissions {
    fn auth_state(&self) -> AuthState {
        self.state.read().clone()
    }

    async fn can_read(&self, identity: &Identity, _resource: &str) -> bool {
        !self.denied.read().contains(&identity.id)
    }

    async fn sanitize(
        &self,
        mut records: Vec<Record>,
        _resource: &str,
        identity: Option<&Identity>,
    ) -> Vec<Record> {
        if self.redacted_fields.is_empty() || self.is_privileged(identity) {
            return records;
        }

        for record in &mut records {
            for field in &self.redacted_fields {
                record.remove(field);
            }
        }
        records
    }

    fn scope(&self, identity: Option<&Identity>) -> String {
        if self.redacted_fields.is_empty() || self.is_privileged(identity) {
            "full".to_string()
        } else {
            "redacted".to_string()
        }
    }

    fn log_event(&self, event: &str, details: Value) {
        info!(target: "lumen::audit", event = %event, details = %details, "Audit event");
        self.events.lock().push(AuditEvent {
            name: event.to_string(),
            details,
        });
    }
}
