//! Router assembly

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::auth::with_auth;
use crate::config::ServerConfig;
use crate::handlers;
use crate::state::AppState;

/// `/auth` routes: public sign-in endpoints plus the authenticated ones
pub fn auth_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/login", post(handlers::login))
        .route("/register", post(handlers::register))
        .route("/refresh-token", post(handlers::refresh_token));

    let protected = with_auth(
        Router::new()
            .route("/me", get(handlers::me))
            .route("/logout", post(handlers::logout)),
        state,
    );

    public.merge(protected)
}

/// `/api` routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes(state))
        .route("/health", get(handlers::api_health))
}

/// Full application router without transport layers; used by tests
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes(state.clone()))
        .route("/health", get(handlers::server_health))
        .fallback(handlers::not_found)
        .with_state(state)
}

/// Application router with CORS, body limit and request tracing
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    app(state)
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(cors_layer(&config.frontend_url))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(frontend_url: &str) -> CorsLayer {
    let origin = match HeaderValue::from_str(frontend_url) {
        Ok(origin) => AllowOrigin::exact(origin),
        Err(_) => {
            tracing::warn!(frontend_url, "invalid FRONTEND_URL, CORS will reject cross-origin requests");
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
