//! Shared application state

use std::sync::Arc;

use pizza_auth::{
    AuthConfig, AuthResult, AuthService, AuthenticationGate, InMemoryAuthStore, PgAuthStore,
    RoleRepository, UserRepository,
};

use crate::config::ServerConfig;

/// State handed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub gate: AuthenticationGate,
}

impl AppState {
    pub fn new(users: Arc<dyn UserRepository>, roles: Arc<dyn RoleRepository>, config: &AuthConfig) -> AuthResult<Self> {
        let auth = AuthService::new(users, roles, config)?;
        let gate = AuthenticationGate::new(auth.tokens());
        Ok(Self { auth, gate })
    }

    /// State over a fresh in-memory store
    pub fn in_memory(config: &AuthConfig) -> AuthResult<Self> {
        let store = Arc::new(InMemoryAuthStore::new());
        Self::new(store.clone(), store, config)
    }

    /// Pick the store from the server configuration: PostgreSQL when a
    /// database URL is set, otherwise in-memory.
    pub async fn from_config(server: &ServerConfig, auth: &AuthConfig) -> AuthResult<Self> {
        match &server.database_url {
            Some(url) => {
                let store = Arc::new(PgAuthStore::connect(url, server.database_max_connections).await?);
                store.migrate().await?;
                tracing::info!("using PostgreSQL store");
                Self::new(store.clone(), store, auth)
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory store; data is lost on restart");
                Self::in_memory(auth)
            }
        }
    }
}
