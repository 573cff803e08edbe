//! # pizza-auth: authentication and authorization core
//!
//! Registration, login, token refresh and current-user lookup for the pizza
//! ordering backend. Stateless JWT access/refresh tokens, bcrypt (or argon2)
//! password hashing, role-based gates and repository contracts with in-memory
//! and PostgreSQL adapters. Framework-agnostic; the HTTP crate wires it into
//! axum.

pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod providers;
pub mod rbac;
pub mod repository;
pub mod service;
pub mod traits;
pub mod utils;

// Error handling
pub use error::AuthError;

// Core traits and request identity
pub use traits::{Identity, PasswordHasher, RoleRepository, UserRepository};

// Configuration
pub use config::{AuthConfig, JwtConfig, PasswordConfig, TokenConfig};

// Domain model and wire shapes
pub use dto::{AuthResponse, LoginRequest, RefreshTokenRequest, RegisterRequest, UserResponse};
pub use models::{NewUser, Role, User, UserStatus, UserUpdate};
pub use rbac::{RoleSet, RoleType};

// Tokens, gates and use cases
pub use middleware::{AuthenticationGate, AuthorizationGate};
pub use providers::jwt::{Claims, TokenKind, TokenPair, TokenService};
pub use repository::{InMemoryAuthStore, PgAuthStore};
pub use service::AuthService;
pub use utils::{BcryptHasher, CredentialHasher};

/// Authentication result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication system version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
