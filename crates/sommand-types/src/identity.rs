//! The identity abstraction: who is issuing a command.

use std::collections::BTreeSet;

use crate::config::IdentityConfig;

/// Whoever issues a command.
///
/// The engine only ever asks for permissions. Message delivery is used by
/// the reporting layer and defaults to logging.
pub trait Identity {
    /// Whether this identity holds `permission`.
    fn has_permission(&self, permission: &str) -> bool;

    /// Display name used in logs.
    fn name(&self) -> &str {
        "anonymous"
    }

    /// Deliver a user-facing message.
    fn send_message(&self, message: &str) {
        log::info!("[{}] {message}", self.name());
    }
}

impl<I: Identity + ?Sized> Identity for &I {
    fn has_permission(&self, permission: &str) -> bool {
        (**self).has_permission(permission)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn send_message(&self, message: &str) {
        (**self).send_message(message)
    }
}

/// An identity backed by an explicit set of granted permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    name: String,
    granted: BTreeSet<String>,
    operator: bool,
}

impl PermissionSet {
    /// Create an identity with no permissions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            granted: BTreeSet::new(),
            operator: false,
        }
    }

    /// Create an identity that holds every permission.
    pub fn operator(name: impl Into<String>) -> Self {
        Self {
            operator: true,
            ..Self::new(name)
        }
    }

    /// Build an identity from its config table.
    pub fn from_config(config: &IdentityConfig) -> Self {
        let mut set = Self::new(config.name.clone());
        set.operator = config.operator;
        set.granted.extend(config.permissions.iter().cloned());
        set
    }

    /// Grant a permission, returning `self` for chaining.
    pub fn with(mut self, permission: impl Into<String>) -> Self {
        self.grant(permission);
        self
    }

    /// Grant a permission.
    pub fn grant(&mut self, permission: impl Into<String>) {
        self.granted.insert(permission.into());
    }

    /// Revoke a permission. Has no effect on operators.
    pub fn revoke(&mut self, permission: &str) {
        self.granted.remove(permission);
    }

    /// Whether this identity bypasses permission checks.
    pub fn is_operator(&self) -> bool {
        self.operator
    }

    /// Explicitly granted permissions, sorted.
    pub fn granted(&self) -> impl Iterator<Item = &str> {
        self.granted.iter().map(String::as_str)
    }
}

impl Identity for PermissionSet {
    fn has_permission(&self, permission: &str) -> bool {
        self.operator || self.granted.contains(permission)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
