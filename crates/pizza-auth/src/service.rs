//! Authentication use cases
//!
//! Orchestrates repositories, the credential hasher and the token service for
//! login, registration, token refresh, current-user lookup and logout.

use std::sync::Arc;

use crate::{
    config::{AuthConfig, PasswordConfig},
    dto::{AuthResponse, LoginRequest, RefreshTokenRequest, RegisterRequest, UserResponse},
    models::{NewUser, User},
    providers::jwt::TokenService,
    rbac::RoleType,
    traits::{Identity, RoleRepository, UserRepository},
    utils::CredentialHasher,
    AuthError, AuthResult,
};

/// Auth use cases over pluggable repositories
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
    tokens: Arc<TokenService>,
    hasher: CredentialHasher,
    password: PasswordConfig,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleRepository>,
        config: &AuthConfig,
    ) -> AuthResult<Self> {
        config.validate()?;
        Ok(Self {
            users,
            roles,
            tokens: Arc::new(TokenService::new(&config.jwt)),
            hasher: CredentialHasher::from_config(&config.password)?,
            password: config.password.clone(),
        })
    }

    /// Token service shared with the authentication gate
    pub fn tokens(&self) -> Arc<TokenService> {
        self.tokens.clone()
    }

    pub fn hasher(&self) -> &CredentialHasher {
        &self.hasher
    }

    /// Swap the credential hasher built from the password config
    pub fn with_hasher(mut self, hasher: CredentialHasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Sign in with email and password.
    ///
    /// Checks run in a fixed order: the account must exist, then be active,
    /// then the password must match. An inactive account is reported as such
    /// whatever password was supplied.
    pub async fn login(&self, request: LoginRequest) -> AuthResult<AuthResponse> {
        request.validate()?;

        let user = match self.users.find_by_email(&request.email).await? {
            Some(user) => user,
            None => {
                self.hasher.verify_decoy(&request.password).await?;
                tracing::warn!(email = %request.email, "login failed: unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !user.is_active() {
            tracing::warn!(user_id = user.id, status = %user.status, "login refused: inactive user");
            return Err(AuthError::InactiveUser);
        }

        if !self.hasher.verify(&request.password, &user.password_hash).await? {
            tracing::warn!(user_id = user.id, "login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let response = self.respond_with_tokens(&user)?;
        tracing::info!(user_id = user.id, role = %user.role_type(), "user logged in");
        Ok(response)
    }

    /// Create a customer account (or one with an explicit role) and sign it in
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<AuthResponse> {
        request.validate(self.password.min_length)?;

        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        // A zero role id counts as absent
        let role_id = match request.role_id.filter(|id| *id > 0) {
            Some(id) => {
                self.roles
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| AuthError::role_not_found(id.to_string()))?
                    .id
            }
            None => {
                self.roles
                    .find_by_name(RoleType::Customer)
                    .await?
                    .ok_or_else(|| AuthError::role_not_found(RoleType::Customer.as_str()))?
                    .id
            }
        };

        let password_hash = self.hasher.hash(&request.password).await?;

        let user = self
            .users
            .create(NewUser {
                role_id,
                first_name: request.first_name,
                last_name: request.last_name,
                email: request.email,
                password_hash,
                phone: request.phone.filter(|p| !p.trim().is_empty()),
            })
            .await?;

        let response = self.respond_with_tokens(&user)?;
        tracing::info!(user_id = user.id, role = %user.role_type(), "user registered");
        Ok(response)
    }

    /// Exchange a refresh token for a fresh token pair.
    ///
    /// The user is re-read so the new tokens carry its current role, and an
    /// account deactivated since the refresh token was issued is refused.
    pub async fn refresh_token(&self, request: RefreshTokenRequest) -> AuthResult<AuthResponse> {
        request.validate()?;

        let claims = self.tokens.verify_refresh_token(request.refresh_token.trim())?;

        let user = self
            .users
            .find_by_id(claims.user_id)
            .await?
            .filter(User::is_active)
            .ok_or(AuthError::UserNotFound)?;

        let response = self.respond_with_tokens(&user)?;
        tracing::info!(user_id = user.id, "tokens refreshed");
        Ok(response)
    }

    /// Public view of the user behind an identity
    pub async fn current_user(&self, user_id: i64) -> AuthResult<UserResponse> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        Ok(UserResponse::from(&user))
    }

    /// Tokens are stateless, so there is nothing to revoke; the client drops
    /// its copies.
    pub async fn logout(&self, identity: &Identity) -> AuthResult<()> {
        tracing::debug!(user_id = identity.user_id, "logout requested");
        Ok(())
    }

    fn respond_with_tokens(&self, user: &User) -> AuthResult<AuthResponse> {
        let pair = self.tokens.issue_pair(user)?;
        Ok(AuthResponse {
            user: UserResponse::from(user),
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        })
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("hasher", &self.hasher)
            .field("password_min_length", &self.password.min_length)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryAuthStore;

    fn create_test_service() -> (AuthService, Arc<InMemoryAuthStore>) {
        let store = Arc::new(InMemoryAuthStore::new());
        let service = AuthService::new(store.clone(), store.clone(), &AuthConfig::testing()).unwrap();
        (service, store)
    }

    #[tokio::test]
    async fn test_register_defaults_to_customer() {
        let (service, _) = create_test_service();
        let response = service
            .register(RegisterRequest::new("Ana", "Gomez", "ana@test.com", "secret1"))
            .await
            .unwrap();

        let role = response.user.role.unwrap();
        assert_eq!(role.name, RoleType::Customer);
        assert_eq!(response.user.full_name, "Ana Gomez");
    }

    #[tokio::test]
    async fn test_register_with_unknown_role() {
        let (service, store) = create_test_service();
        let err = service
            .register(RegisterRequest::new("Ana", "Gomez", "ana@test.com", "secret1").with_role_id(99))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::RoleNotFound { .. }));
        assert_eq!(store.user_writes(), 0);
    }

    #[tokio::test]
    async fn test_register_with_zero_role_id_falls_back_to_customer() {
        let (service, _) = create_test_service();
        let response = service
            .register(RegisterRequest::new("Ana", "Gomez", "ana@test.com", "secret1").with_role_id(0))
            .await
            .unwrap();

        assert_eq!(response.user.role.map(|r| r.name), Some(RoleType::Customer));
    }

    #[tokio::test]
    async fn test_register_without_seeded_customer_role() {
        let store = Arc::new(InMemoryAuthStore::with_roles(Vec::new()));
        let service = AuthService::new(store.clone(), store, &AuthConfig::testing()).unwrap();

        let err = service
            .register(RegisterRequest::new("Ana", "Gomez", "ana@test.com", "secret1"))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::role_not_found("CUSTOMER"));
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_input_before_any_write() {
        let (service, store) = create_test_service();
        let err = service
            .register(RegisterRequest::new("Ana", "Gomez", "ana@test.com", "123"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::ValidationError { .. }));
        assert_eq!(store.user_writes(), 0);
    }

    #[tokio::test]
    async fn test_current_user_unknown_id() {
        let (service, _) = create_test_service();
        assert_eq!(service.current_user(404).await.unwrap_err(), AuthError::UserNotFound);
    }

    #[tokio::test]
    async fn test_logout_is_a_no_op() {
        let (service, _) = create_test_service();
        let identity = Identity {
            user_id: 1,
            email: "ana@test.com".to_string(),
            role: RoleType::Customer,
        };
        assert!(service.logout(&identity).await.is_ok());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let store = Arc::new(InMemoryAuthStore::new());
        let mut config = AuthConfig::testing();
        config.jwt.refresh.secret = config.jwt.access.secret.clone();

        assert!(matches!(
            AuthService::new(store.clone(), store, &config),
            Err(AuthError::ConfigurationError { .. })
        ));
    }
}
