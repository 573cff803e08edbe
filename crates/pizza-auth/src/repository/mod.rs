//! Persistence adapters for the user and role repositories

pub mod memory;
pub mod postgres;

pub use memory::InMemoryAuthStore;
pub use postgres::PgAuthStore;
