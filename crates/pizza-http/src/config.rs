//! HTTP server configuration
//!
//! Read from the environment (after `.env` has been loaded by the binary).

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::error::ServerError;
use crate::logging::LogFormat;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// HTTP server specific configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origin
    pub frontend_url: String,
    /// PostgreSQL connection string; the in-memory store is used when unset
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub max_body_bytes: usize,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            database_url: None,
            database_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            log_format: LogFormat::Pretty,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ServerError> {
        let config = Self {
            host: get_env_or_default("HOST", DEFAULT_HOST),
            port: parse_env("PORT", DEFAULT_PORT, "a port number")?,
            frontend_url: get_env_or_default("FRONTEND_URL", DEFAULT_FRONTEND_URL),
            database_url: env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty()),
            database_max_connections: parse_env(
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_DB_MAX_CONNECTIONS,
                "a number of connections",
            )?,
            max_body_bytes: parse_env("MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES, "a number of bytes")?,
            log_format: parse_env("LOG_FORMAT", LogFormat::Pretty, "pretty, json or compact")?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ServerError> {
        if self.database_max_connections == 0 {
            return Err(ServerError::invalid_config(
                "DATABASE_MAX_CONNECTIONS",
                "0",
                "at least 1",
            ));
        }
        if self.max_body_bytes == 0 {
            return Err(ServerError::invalid_config("MAX_BODY_BYTES", "0", "at least 1"));
        }
        self.socket_addr().map(|_| ())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|_| ServerError::invalid_config("HOST", addr, "an IP address"))
    }
}

// Helper function for environment variable handling
fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: FromStr>(key: &str, default: T, expected: &str) -> Result<T, ServerError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ServerError::invalid_config(key, value, expected)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3001);
        assert_eq!(config.frontend_url, "http://localhost:3000");
        assert!(config.database_url.is_none());
        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:3001");
    }

    #[test]
    fn test_invalid_host() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ServerError::InvalidConfig { .. })));
    }

    #[test]
    fn test_zero_pool_rejected() {
        let config = ServerConfig {
            database_max_connections: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
