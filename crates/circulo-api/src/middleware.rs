use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::AppState;
use crate::error::ApiError;

/// Id of the user the request's bearer token was issued to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub u64);

/// Resolve the bearer token and stash the caller in the request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user_id = state.tokens.resolve(req.headers()).map_err(|e| {
        warn!("rejected {} {}: {}", req.method(), req.uri().path(), e);
        e
    })?;

    req.extensions_mut().insert(AuthUser(user_id));
    Ok(next.run(req).await)
}
