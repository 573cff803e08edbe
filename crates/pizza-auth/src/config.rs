//! Authentication configuration types and utilities

use std::env;
use std::time::Duration;

use crate::{AuthError, AuthResult};

const ACCESS_SECRET_ENV: &str = "JWT_ACCESS_SECRET";
const ACCESS_EXPIRES_ENV: &str = "JWT_ACCESS_EXPIRES_IN";
const REFRESH_SECRET_ENV: &str = "JWT_REFRESH_SECRET";
const REFRESH_EXPIRES_ENV: &str = "JWT_REFRESH_EXPIRES_IN";
const HASH_ALGORITHM_ENV: &str = "PASSWORD_HASH_ALGORITHM";
const BCRYPT_COST_ENV: &str = "PASSWORD_BCRYPT_COST";
const MIN_LENGTH_ENV: &str = "PASSWORD_MIN_LENGTH";

/// Main authentication configuration
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Access and refresh token settings
    pub jwt: JwtConfig,

    /// Password hashing and policy
    pub password: PasswordConfig,
}

/// Signing settings for one kind of token
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC secret used for signing and verification
    pub secret: String,

    /// How long an issued token stays valid
    pub lifetime: Duration,
}

/// JWT token configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Short-lived access tokens
    pub access: TokenConfig,

    /// Long-lived refresh tokens, signed with a distinct secret
    pub refresh: TokenConfig,
}

/// Password hashing configuration
#[derive(Debug, Clone)]
pub struct PasswordConfig {
    /// Password hashing algorithm (bcrypt, argon2)
    pub hash_algorithm: String,

    /// Bcrypt cost factor
    pub bcrypt_cost: u32,

    /// Minimum password length accepted at registration
    pub min_length: usize,
}

// Default value functions
fn default_access_secret() -> String {
    "access-secret-key".to_string()
}
fn default_access_lifetime() -> Duration {
    Duration::from_secs(15 * 60)
} // 15 minutes
fn default_refresh_secret() -> String {
    "refresh-secret-key".to_string()
}
fn default_refresh_lifetime() -> Duration {
    Duration::from_secs(7 * 24 * 60 * 60)
} // 7 days
fn default_hash_algorithm() -> String {
    "bcrypt".to_string()
}
fn default_bcrypt_cost() -> u32 {
    10
}
fn default_min_password_length() -> usize {
    6
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access: TokenConfig {
                secret: default_access_secret(),
                lifetime: default_access_lifetime(),
            },
            refresh: TokenConfig {
                secret: default_refresh_secret(),
                lifetime: default_refresh_lifetime(),
            },
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            hash_algorithm: default_hash_algorithm(),
            bcrypt_cost: default_bcrypt_cost(),
            min_length: default_min_password_length(),
        }
    }
}

impl AuthConfig {
    /// Load configuration from the environment, falling back to defaults for
    /// unset variables
    pub fn from_env() -> AuthResult<Self> {
        let access = TokenConfig {
            secret: env::var(ACCESS_SECRET_ENV).unwrap_or_else(|_| default_access_secret()),
            lifetime: lifetime_from_env(ACCESS_EXPIRES_ENV, default_access_lifetime())?,
        };

        let refresh = TokenConfig {
            secret: env::var(REFRESH_SECRET_ENV).unwrap_or_else(|_| default_refresh_secret()),
            lifetime: lifetime_from_env(REFRESH_EXPIRES_ENV, default_refresh_lifetime())?,
        };

        let password = PasswordConfig {
            hash_algorithm: env::var(HASH_ALGORITHM_ENV)
                .map(|v| v.to_lowercase())
                .unwrap_or_else(|_| default_hash_algorithm()),
            bcrypt_cost: parse_env(BCRYPT_COST_ENV, default_bcrypt_cost())?,
            min_length: parse_env(MIN_LENGTH_ENV, default_min_password_length())?,
        };

        let config = Self {
            jwt: JwtConfig { access, refresh },
            password,
        };
        config.validate()?;

        Ok(config)
    }

    /// Configuration for tests: cheap hashing, distinct fixed secrets
    pub fn testing() -> Self {
        let mut config = Self::default();
        config.jwt.access.secret = "test-access-secret".to_string();
        config.jwt.refresh.secret = "test-refresh-secret".to_string();
        config.password.bcrypt_cost = 4;
        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> AuthResult<()> {
        if self.jwt.access.secret.is_empty() || self.jwt.refresh.secret.is_empty() {
            return Err(AuthError::config_error("JWT secrets must not be empty"));
        }

        if self.jwt.access.secret == self.jwt.refresh.secret {
            return Err(AuthError::config_error(
                "Access and refresh tokens must be signed with different secrets",
            ));
        }

        if self.jwt.access.lifetime.is_zero() || self.jwt.refresh.lifetime.is_zero() {
            return Err(AuthError::config_error("Token lifetimes must be greater than 0"));
        }

        if self.jwt.refresh.lifetime < self.jwt.access.lifetime {
            return Err(AuthError::config_error(
                "Refresh token lifetime cannot be shorter than access token lifetime",
            ));
        }

        if !["bcrypt", "argon2"].contains(&self.password.hash_algorithm.as_str()) {
            return Err(AuthError::config_error(format!(
                "Invalid password hashing algorithm: {}",
                self.password.hash_algorithm
            )));
        }

        if !(4..=31).contains(&self.password.bcrypt_cost) {
            return Err(AuthError::config_error("Bcrypt cost must be between 4 and 31"));
        }

        if self.password.min_length < 1 {
            return Err(AuthError::config_error("Password min_length must be at least 1"));
        }

        Ok(())
    }
}

/// Parse a token lifetime such as `15m`, `7d`, `1h 30m` or a bare number of
/// seconds
pub fn parse_lifetime(value: &str) -> AuthResult<Duration> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(value)
        .map_err(|e| AuthError::config_error(format!("Invalid duration '{}': {}", value, e)))
}

fn lifetime_from_env(key: &str, default: Duration) -> AuthResult<Duration> {
    match env::var(key) {
        Ok(value) => parse_lifetime(&value),
        Err(_) => Ok(default),
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> AuthResult<T> {
    match env::var(key) {
        Ok(value) => value.trim().parse::<T>().map_err(|_| {
            AuthError::config_error(format!("Invalid value for {}: '{}'", key, value))
        }),
        Err(_) => Ok(default),
    }
}
