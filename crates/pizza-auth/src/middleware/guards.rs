//! Authorization guards
//!
//! A guard admits an authenticated identity whose role is in its allowed
//! [`RoleSet`]. Guards must run after authentication; a guard that sees no
//! identity rejects the request as unauthenticated instead of letting it
//! through.

use crate::{
    rbac::{RoleSet, RoleType},
    traits::Identity,
    AuthError, AuthResult,
};

pub const NOT_AUTHENTICATED: &str = "Not authenticated";

/// Role-based authorization guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizationGate {
    allowed: RoleSet,
}

impl AuthorizationGate {
    pub fn new(allowed: RoleSet) -> Self {
        Self { allowed }
    }

    /// Build a guard from a list of roles
    pub fn for_roles<I>(roles: I) -> Self
    where
        I: IntoIterator<Item = RoleType>,
    {
        Self::new(RoleSet::of(roles))
    }

    /// Administrators only
    pub fn admin_only() -> Self {
        Self::new(RoleSet::admin_only())
    }

    /// Customers and administrators
    pub fn customer_or_admin() -> Self {
        Self::new(RoleSet::customer_or_admin())
    }

    pub fn allowed(&self) -> RoleSet {
        self.allowed
    }

    /// Check the identity attached by authentication
    pub fn authorize(&self, identity: Option<&Identity>) -> AuthResult<()> {
        let identity = identity.ok_or_else(|| AuthError::unauthorized(NOT_AUTHENTICATED))?;

        if !identity.has_any_role(&self.allowed) {
            tracing::debug!(
                user_id = identity.user_id,
                role = %identity.role,
                allowed = %self.allowed,
                "role not permitted"
            );
            return Err(AuthError::forbidden(format!(
                "role {} is not in {}",
                identity.role, self.allowed
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: RoleType) -> Identity {
        Identity {
            user_id: 1,
            email: "user@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn test_missing_identity_is_unauthorized() {
        let gate = AuthorizationGate::customer_or_admin();
        let err = gate.authorize(None).unwrap_err();
        assert_eq!(err, AuthError::unauthorized(NOT_AUTHENTICATED));
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn test_admin_only() {
        let gate = AuthorizationGate::admin_only();
        assert!(gate.authorize(Some(&identity(RoleType::Admin))).is_ok());

        let err = gate.authorize(Some(&identity(RoleType::Customer))).unwrap_err();
        assert!(matches!(err, AuthError::Forbidden { .. }));
        assert_eq!(err.status_code(), 403);

        assert!(gate.authorize(Some(&identity(RoleType::Staff))).is_err());
    }

    #[test]
    fn test_customer_or_admin() {
        let gate = AuthorizationGate::customer_or_admin();
        assert!(gate.authorize(Some(&identity(RoleType::Customer))).is_ok());
        assert!(gate.authorize(Some(&identity(RoleType::Admin))).is_ok());
        assert!(matches!(
            gate.authorize(Some(&identity(RoleType::Staff))),
            Err(AuthError::Forbidden { .. })
        ));
    }

    #[test]
    fn test_empty_set_never_passes() {
        let gate = AuthorizationGate::new(RoleSet::empty());
        for role in RoleType::ALL {
            assert!(matches!(
                gate.authorize(Some(&identity(role))),
                Err(AuthError::Forbidden { .. })
            ));
        }
    }

    #[test]
    fn test_custom_roles() {
        let gate = AuthorizationGate::for_roles([RoleType::Staff, RoleType::Admin]);
        assert!(gate.authorize(Some(&identity(RoleType::Staff))).is_ok());
        assert!(gate.authorize(Some(&identity(RoleType::Customer))).is_err());
        assert!(gate.allowed().contains(RoleType::Admin));
    }
}
