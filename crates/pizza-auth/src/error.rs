//! Authentication and authorization error types

use thiserror::Error;

/// Authentication and authorization errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email or wrong password. Both cases share this variant so the
    /// caller cannot tell which one happened.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// User exists but is inactive, suspended or soft-deleted
    #[error("User is inactive or suspended")]
    InactiveUser,

    /// Registration attempted with an email that is already taken
    #[error("Email is already registered")]
    EmailTaken,

    /// Role lookup failed
    #[error("Role not found: {role}")]
    RoleNotFound { role: String },

    /// Token signature, format or expiry check failed
    #[error("Invalid or expired token")]
    InvalidToken,

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Request carries no usable identity
    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: String },

    /// Identity present but its role is not allowed
    #[error("Access denied: {message}")]
    Forbidden { message: String },

    /// Malformed input rejected at the boundary
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    /// Configuration errors
    #[error("Authentication configuration error: {message}")]
    ConfigurationError { message: String },

    /// Cryptographic errors
    #[error("Cryptographic error: {message}")]
    CryptographicError { message: String },

    /// Database errors
    #[error("Database error during authentication: {message}")]
    DatabaseError { message: String },
}

impl AuthError {
    /// Get the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::InactiveUser => "INACTIVE_USER",
            AuthError::EmailTaken => "EMAIL_TAKEN",
            AuthError::RoleNotFound { .. } => "ROLE_NOT_FOUND",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::UserNotFound => "USER_NOT_FOUND",
            AuthError::Unauthorized { .. } => "UNAUTHORIZED",
            AuthError::Forbidden { .. } => "FORBIDDEN",
            AuthError::ValidationError { .. } => "VALIDATION_ERROR",
            AuthError::ConfigurationError { .. } => "CONFIGURATION_ERROR",
            AuthError::CryptographicError { .. } => "CRYPTOGRAPHIC_ERROR",
            AuthError::DatabaseError { .. } => "DATABASE_ERROR",
        }
    }

    /// Get HTTP status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::InvalidCredentials => 401,
            AuthError::InactiveUser => 401,
            AuthError::EmailTaken => 409,
            AuthError::RoleNotFound { .. } => 400,
            AuthError::InvalidToken => 401,
            AuthError::UserNotFound => 404,
            AuthError::Unauthorized { .. } => 401,
            AuthError::Forbidden { .. } => 403,
            AuthError::ValidationError { .. } => 400,
            AuthError::ConfigurationError { .. } => 500,
            AuthError::CryptographicError { .. } => 500,
            AuthError::DatabaseError { .. } => 500,
        }
    }

    /// Whether the error is an internal failure whose details must not reach
    /// the client
    pub fn is_internal(&self) -> bool {
        self.status_code() >= 500
    }

    /// Message safe to hand back to a client
    pub fn public_message(&self) -> String {
        match self {
            AuthError::RoleNotFound { .. } => "Role not found".to_string(),
            AuthError::Unauthorized { reason } => reason.clone(),
            AuthError::Forbidden { .. } => "Access denied - insufficient permissions".to_string(),
            AuthError::ValidationError { message } => message.clone(),
            err if err.is_internal() => "Internal server error".to_string(),
            err => err.to_string(),
        }
    }

    /// Create an unauthorized error
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized { reason: reason.into() }
    }

    /// Create a forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden { message: message.into() }
    }

    /// Create a role not found error
    pub fn role_not_found(role: impl Into<String>) -> Self {
        Self::RoleNotFound { role: role.into() }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError { message: message.into() }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigurationError { message: message.into() }
    }

    /// Create a cryptographic error
    pub fn crypto_error(message: impl Into<String>) -> Self {
        Self::CryptographicError { message: message.into() }
    }

    /// Create a database error
    pub fn database_error(message: impl Into<String>) -> Self {
        Self::DatabaseError { message: message.into() }
    }
}

// Any signing or verification failure collapses into InvalidToken; the inner
// cause is only visible in debug logs.
impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        tracing::debug!(error = %err, "token rejected");
        Self::InvalidToken
    }
}

#[cfg(feature = "argon2")]
impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        Self::crypto_error(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for AuthError {
    fn from(err: bcrypt::BcryptError) -> Self {
        Self::crypto_error(err.to_string())
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::EmailTaken;
            }
            if db_err.is_foreign_key_violation() {
                return Self::role_not_found("unknown role id");
            }
        }
        Self::database_error(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AuthError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::crypto_error(format!("hashing task failed: {}", err))
    }
}
