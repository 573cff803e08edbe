//! Authentication and authorization middleware for axum routers
//!
//! `require_auth` verifies the bearer token and stores the [`Identity`] in
//! the request extensions. `require_roles` checks that identity against an
//! [`AuthorizationGate`] and must be layered inside `require_auth`.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::{self, Next},
    response::Response,
    Router,
};
use pizza_auth::{AuthError, AuthorizationGate, Identity};

use crate::error::ApiError;
use crate::state::AppState;

/// Extension trait for reading the identity attached by `require_auth`
pub trait RequestAuthExt {
    fn identity(&self) -> Option<&Identity>;

    /// Get the identity, returning an error if not present
    fn require_identity(&self) -> Result<&Identity, ApiError> {
        self.identity()
            .ok_or_else(|| AuthError::unauthorized("Not authenticated").into())
    }
}

impl RequestAuthExt for Request {
    fn identity(&self) -> Option<&Identity> {
        self.extensions().get::<Identity>()
    }
}

impl RequestAuthExt for Parts {
    fn identity(&self) -> Option<&Identity> {
        self.extensions.get::<Identity>()
    }
}

/// Authentication middleware: rejects requests without a valid access token
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let identity = state.gate.authenticate(header)?;

    tracing::debug!(user_id = identity.user_id, role = %identity.role, "request authenticated");
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Authorization middleware: rejects identities outside the gate's role set
pub async fn authorize(
    State(gate): State<AuthorizationGate>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    gate.authorize(request.identity())?;
    Ok(next.run(request).await)
}

/// Guard every route of `router` with authentication
pub fn with_auth<S>(router: Router<S>, state: AppState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(middleware::from_fn_with_state(state, require_auth))
}

/// Guard every route of `router` with authentication followed by a role check
pub fn require_roles<S>(router: Router<S>, state: AppState, gate: AuthorizationGate) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    // The layer added last runs first, so authentication wraps the role check.
    let router = router.route_layer(middleware::from_fn_with_state(gate, authorize));
    with_auth(router, state)
}

/// Administrators only
pub fn admin_only<S>(router: Router<S>, state: AppState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    require_roles(router, state, AuthorizationGate::admin_only())
}

/// Customers and administrators
pub fn customer_or_admin<S>(router: Router<S>, state: AppState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    require_roles(router, state, AuthorizationGate::customer_or_admin())
}

/// Extractor for the authenticated identity
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.require_identity().cloned().map(CurrentUser)
    }
}
