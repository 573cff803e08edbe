//! # pizza-http: HTTP boundary for the pizza ordering backend
//!
//! axum routes for the auth endpoints, gate middleware other modules can
//! reuse, error-to-response mapping and server bootstrap helpers.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod routes;
pub mod server;
pub mod state;

pub use auth::{admin_only, customer_or_admin, require_auth, require_roles, with_auth, CurrentUser, RequestAuthExt};
pub use config::ServerConfig;
pub use error::{ApiError, ApiResult, ServerError};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use routes::{app, build_router};
pub use server::serve;
pub use state::AppState;
