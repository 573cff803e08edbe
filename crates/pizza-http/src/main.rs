use pizza_auth::AuthConfig;
use pizza_http::{init_logging, serve, AppState, LogFormat, LoggingConfig, ServerConfig, ServerError};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // A missing .env file is fine; the process environment still applies.
    let dotenv = dotenvy::dotenv();

    let server_config = ServerConfig::from_env()?;
    let logging = match server_config.log_format {
        LogFormat::Json => LoggingConfig::production(),
        format => LoggingConfig::development().with_format(format),
    };
    init_logging(logging.with_global_field("service", "pizza-server"))?;

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded environment file");
    }

    let auth_config = AuthConfig::from_env()?;
    if auth_config.jwt.access.secret == "access-secret-key" {
        tracing::warn!("JWT_ACCESS_SECRET is not set; using the built-in development secret");
    }

    let state = AppState::from_config(&server_config, &auth_config).await?;
    serve(server_config, state).await
}
