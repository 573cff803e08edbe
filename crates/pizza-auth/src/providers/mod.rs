//! Token providers
//!
//! Stateless JWT access and refresh tokens. There is no session provider:
//! nothing about an issued token is stored server-side.

pub mod jwt;

pub use jwt::{Claims, TokenKind, TokenPair, TokenService};
