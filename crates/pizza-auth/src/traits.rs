//! Core authentication and authorization traits

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{NewUser, Role, User, UserUpdate};
use crate::providers::jwt::Claims;
use crate::rbac::{RoleSet, RoleType};
use crate::AuthResult;

/// User persistence.
///
/// Lookups report a missing record as `Ok(None)`. Implementations own email
/// uniqueness and must fail `create` with `AuthError::EmailTaken` on a
/// conflicting write.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>>;

    async fn find_by_id(&self, id: i64) -> AuthResult<Option<User>>;

    /// Insert a user and return it with its role attached
    async fn create(&self, user: NewUser) -> AuthResult<User>;

    async fn update(&self, id: i64, update: UserUpdate) -> AuthResult<User>;

    /// Soft delete: stamps the deletion time, the row stays
    async fn delete(&self, id: i64) -> AuthResult<()>;
}

/// Role persistence (read-only; roles are seeded once)
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn find_by_name(&self, name: RoleType) -> AuthResult<Option<Role>>;

    async fn find_by_id(&self, id: i64) -> AuthResult<Option<Role>>;

    async fn find_all(&self) -> AuthResult<Vec<Role>>;
}

/// Password hasher trait for different hashing algorithms
pub trait PasswordHasher: Send + Sync {
    /// Hash a password
    fn hash_password(&self, password: &str) -> AuthResult<String>;

    /// Verify a password against its hash
    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<bool>;

    /// Get the hasher name
    fn hasher_name(&self) -> &str;
}

/// Identity attached to a request once its access token has been verified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i64,
    pub email: String,
    pub role: RoleType,
}

impl Identity {
    /// Check if the identity's role belongs to the given set
    pub fn has_any_role(&self, roles: &RoleSet) -> bool {
        roles.contains(self.role)
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
            role: claims.role,
        }
    }
}
