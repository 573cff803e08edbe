//! JWT (JSON Web Token) provider
//!
//! Access and refresh tokens carry the same claims but are signed with
//! different secrets, so a token of one kind never verifies as the other.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{JwtConfig, TokenConfig};
use crate::models::User;
use crate::rbac::RoleType;
use crate::AuthResult;

const BEARER_PREFIX: &str = "Bearer ";

/// Which secret and lifetime a token uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// Decoded token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub email: String,
    pub role: RoleType,
    /// Issued at (seconds since epoch)
    pub iat: i64,
    /// Expires at (seconds since epoch)
    pub exp: i64,
}

impl Claims {
    /// Build the claims for a user. Both token kinds go through here so the
    /// payload cannot drift between them.
    pub fn for_user(user: &User, lifetime: Duration, issued_at: DateTime<Utc>) -> Self {
        let iat = issued_at.timestamp();
        Self {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role_type(),
            iat,
            exp: iat.saturating_add(i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX)),
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Freshly issued access and refresh tokens
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl SigningKeys {
    fn new(config: &TokenConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            lifetime: config.lifetime,
        }
    }
}

/// Issues and verifies signed, time-limited tokens
pub struct TokenService {
    access: SigningKeys,
    refresh: SigningKeys,
    validation: Validation,
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact; a token is dead the second after `exp`.
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            access: SigningKeys::new(&config.access),
            refresh: SigningKeys::new(&config.refresh),
            validation,
        }
    }

    fn keys(&self, kind: TokenKind) -> &SigningKeys {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Lifetime of tokens of the given kind
    pub fn lifetime(&self, kind: TokenKind) -> Duration {
        self.keys(kind).lifetime
    }

    /// Sign a token of the given kind as if issued at `issued_at`
    pub fn issue_at(&self, user: &User, kind: TokenKind, issued_at: DateTime<Utc>) -> AuthResult<String> {
        let keys = self.keys(kind);
        let claims = Claims::for_user(user, keys.lifetime, issued_at);
        let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)?;

        tracing::debug!(user_id = user.id, kind = kind.as_str(), exp = claims.exp, "issued token");
        Ok(token)
    }

    pub fn issue(&self, user: &User, kind: TokenKind) -> AuthResult<String> {
        self.issue_at(user, kind, Utc::now())
    }

    pub fn issue_access_token(&self, user: &User) -> AuthResult<String> {
        self.issue(user, TokenKind::Access)
    }

    pub fn issue_refresh_token(&self, user: &User) -> AuthResult<String> {
        self.issue(user, TokenKind::Refresh)
    }

    /// Issue both tokens for a user
    pub fn issue_pair(&self, user: &User) -> AuthResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue_access_token(user)?,
            refresh_token: self.issue_refresh_token(user)?,
        })
    }

    /// Verify signature and expiry against the secret of `kind`.
    ///
    /// Every failure, whether bad signature, malformed token or expiry, is
    /// reported as `AuthError::InvalidToken`.
    pub fn verify(&self, token: &str, kind: TokenKind) -> AuthResult<Claims> {
        let data = decode::<Claims>(token, &self.keys(kind).decoding, &self.validation)?;
        Ok(data.claims)
    }

    pub fn verify_access_token(&self, token: &str) -> AuthResult<Claims> {
        self.verify(token, TokenKind::Access)
    }

    pub fn verify_refresh_token(&self, token: &str) -> AuthResult<Claims> {
        self.verify(token, TokenKind::Refresh)
    }

    /// Pull the token out of an `Authorization: Bearer <token>` header value.
    /// Missing header, other schemes and empty tokens all yield `None`.
    pub fn extract_bearer(header: Option<&str>) -> Option<&str> {
        let token = header?.strip_prefix(BEARER_PREFIX)?.trim();
        if token.is_empty() {
            None
        } else {
            Some(token)
        }
    }
}
