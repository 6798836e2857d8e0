use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use tracing::{error, info};

use circulo_db::Database;
use circulo_types::api::{LoginRequest, LoginResponse};

use crate::credentials;
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::token::TokenService;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenService,
}

const INVALID_CREDENTIALS: &str = "e-mail ou senha incorretos";

pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = blocking(move || {
        // Unknown email and wrong password look the same to the client
        let creds = state
            .db
            .get_credentials_by_email(req.email.trim())?
            .ok_or(ApiError::Unauthorized(INVALID_CREDENTIALS))?;

        if !credentials::verify_password(&req.password, &creds.password)? {
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS));
        }

        let token = state.tokens.issue(creds.id)?;
        info!("user {} logged in", creds.id);
        Ok(LoginResponse { id: creds.id, token })
    })
    .await?;

    Ok(Json(response))
}

/// Run blocking DB and hashing work off the async runtime.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(anyhow::anyhow!("blocking task failed: {e}"))
    })?
}
