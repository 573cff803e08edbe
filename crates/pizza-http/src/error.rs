//! HTTP error types and response formatting

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pizza_auth::AuthError;
use serde_json::json;
use thiserror::Error;

/// Server bootstrap errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid configuration value for {field}: '{value}' (expected {expected})")]
    InvalidConfig {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Logging initialization failed: {message}")]
    Logging { message: String },

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    pub fn invalid_config(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }
}

/// Error returned by handlers and middleware
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Route not found: {path}")]
    RouteNotFound { path: String },
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn route_not_found(path: impl Into<String>) -> Self {
        Self::RouteNotFound { path: path.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Auth(AuthError::validation(message))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Auth(err) => {
                StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ApiError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Auth(err) => err.error_code(),
            ApiError::RouteNotFound { .. } => "ROUTE_NOT_FOUND",
        }
    }

    /// Message safe to show to the client
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Auth(err) => err.public_message(),
            ApiError::RouteNotFound { .. } => "Route not found".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            ApiError::Auth(err) if err.is_internal() => {
                tracing::error!(error = %err, code = err.error_code(), "request failed");
            }
            ApiError::Auth(err) => {
                tracing::debug!(error = %err, status = status.as_u16(), "request rejected");
            }
            ApiError::RouteNotFound { path } => {
                tracing::debug!(path = %path, "no route");
            }
        }

        let mut error = json!({
            "code": self.error_code(),
            "message": self.public_message(),
        });
        if let ApiError::RouteNotFound { path } = &self {
            error["path"] = json!(path);
        }

        (status, Json(json!({ "success": false, "error": error }))).into_response()
    }
}
