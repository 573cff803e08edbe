//! JWT authentication gate
//!
//! Turns an `Authorization` header into an [`Identity`]. Framework adapters
//! call [`AuthenticationGate::authenticate`] and store the result in the
//! request context.

use std::sync::Arc;

use crate::{providers::jwt::TokenService, traits::Identity, AuthError, AuthResult};

pub const MISSING_TOKEN: &str = "Access token required";
pub const INVALID_TOKEN: &str = "Invalid or expired token";

/// Bearer-token authentication against the access secret
#[derive(Clone)]
pub struct AuthenticationGate {
    tokens: Arc<TokenService>,
}

impl AuthenticationGate {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    /// Authenticate a request from its raw `Authorization` header value.
    ///
    /// A missing or malformed header fails with the missing-token reason.
    /// Any verification failure fails with the invalid-token reason, so an
    /// expired token looks the same as a forged one.
    pub fn authenticate(&self, auth_header: Option<&str>) -> AuthResult<Identity> {
        let token = TokenService::extract_bearer(auth_header)
            .ok_or_else(|| AuthError::unauthorized(MISSING_TOKEN))?;

        let claims = self
            .tokens
            .verify_access_token(token)
            .map_err(|_| AuthError::unauthorized(INVALID_TOKEN))?;

        Ok(Identity::from(claims))
    }
}
