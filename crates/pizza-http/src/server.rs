//! Server startup and graceful shutdown

use tokio::net::TcpListener;
use tokio::signal;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::logging::{log_shutdown_info, log_startup_info};
use crate::routes::build_router;
use crate::state::AppState;

const SERVICE_NAME: &str = "pizza-server";

/// Bind and serve until Ctrl+C or SIGTERM
pub async fn serve(config: ServerConfig, state: AppState) -> Result<(), ServerError> {
    let addr = config.socket_addr()?;
    let router = build_router(state, &config);

    let listener = TcpListener::bind(addr).await?;
    log_startup_info(SERVICE_NAME, env!("CARGO_PKG_VERSION"), &addr.to_string());
    tracing::info!("auth endpoints under http://{}/api/auth", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log_shutdown_info(SERVICE_NAME);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
