//! Request identity and the per-request security context.
//!
//! The [`SecurityContext`] is the ambient authentication state that
//! middleware establishes while a request travels through a chain. It is
//! never stored in a global: it lives inside the per-request middleware
//! context and is cleared when dispatch completes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it ideal for request tracking
/// and log correlation.
///
/// # Example
///
/// ```
/// use bastion_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// The result of authenticating a caller.
///
/// Bastion does not authenticate anyone itself; authentication middleware
/// supplied by the application produces this value and stores it in the
/// [`SecurityContext`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authentication {
    /// Name of the authenticated principal.
    pub principal: String,
    /// Granted authorities (roles, scopes).
    pub authorities: Vec<String>,
}

impl Authentication {
    /// Creates an authentication for a principal without authorities.
    #[must_use]
    pub fn new(principal: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            authorities: Vec::new(),
        }
    }

    /// Adds a granted authority.
    #[must_use]
    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authorities.push(authority.into());
        self
    }

    /// Returns `true` if the authority was granted.
    #[must_use]
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }
}

/// Per-request security state.
///
/// # Example
///
/// ```
/// use bastion_core::{Authentication, SecurityContext};
///
/// let mut ctx = SecurityContext::default();
/// assert!(!ctx.is_authenticated());
///
/// ctx.set_authentication(Authentication::new("alice").with_authority("ROLE_ADMIN"));
/// assert_eq!(ctx.authentication().unwrap().principal, "alice");
///
/// ctx.clear();
/// assert!(ctx.authentication().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityContext {
    authentication: Option<Authentication>,
}

impl SecurityContext {
    /// Creates a context holding the given authentication.
    #[must_use]
    pub fn with_authentication(authentication: Authentication) -> Self {
        Self {
            authentication: Some(authentication),
        }
    }

    /// Returns the current authentication, if any.
    #[must_use]
    pub fn authentication(&self) -> Option<&Authentication> {
        self.authentication.as_ref()
    }

    /// Replaces the current authentication.
    pub fn set_authentication(&mut self, authentication: Authentication) {
        self.authentication = Some(authentication);
    }

    /// Returns `true` if an authentication has been established.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authentication.is_some()
    }

    /// Removes any established authentication.
    pub fn clear(&mut self) {
        self.authentication = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique() {
        let a = RequestId::new();
        let b = RequestId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_request_id_roundtrips_uuid() {
        let uuid = Uuid::now_v7();
        let id = RequestId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), &uuid);
        assert_eq!(id.to_string(), uuid.to_string());
    }

    #[test]
    fn test_authentication_authorities() {
        let auth = Authentication::new("bob")
            .with_authority("ROLE_USER")
            .with_authority("SCOPE_read");
        assert!(auth.has_authority("ROLE_USER"));
        assert!(auth.has_authority("SCOPE_read"));
        assert!(!auth.has_authority("ROLE_ADMIN"));
    }

    #[test]
    fn test_security_context_clear() {
        let mut ctx = SecurityContext::with_authentication(Authentication::new("carol"));
        assert!(ctx.is_authenticated());

        ctx.clear();
        assert!(!ctx.is_authenticated());
        assert_eq!(ctx, SecurityContext::default());
    }
}
