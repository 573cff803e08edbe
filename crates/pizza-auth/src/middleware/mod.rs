//! Authentication logic for middleware integration
//!
//! Framework-agnostic gates; the HTTP crate wires them into its router.

pub mod guards;
pub mod jwt;

// Re-exports for convenient access
pub use guards::AuthorizationGate;
pub use jwt::AuthenticationGate;
