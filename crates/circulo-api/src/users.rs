use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use circulo_types::api::{ChangePasswordRequest, SearchQuery, UserPayload};
use circulo_types::models::User;

use crate::auth::{AppState, blocking};
use crate::credentials;
use crate::error::ApiError;
use crate::extract::{JsonBody, UserIdPath};
use crate::guard::{SelfAction, authorize_self};
use crate::middleware::AuthUser;
use crate::validation;

pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<UserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let (profile, password) = validation::registration(payload)?;

    let user = blocking(move || {
        let password_hash = credentials::hash_password(&password)?;
        let id = state
            .db
            .create_user(&profile.name, &profile.nick, &profile.email, &password_hash)?;
        info!("registered user {} ({})", id, profile.nick);

        let row = state.db.get_user_by_id(id)?.ok_or(ApiError::NotFound)?;
        Ok(row.into_model())
    })
    .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn search_users(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = blocking(move || {
        let rows = state.db.search_users(&query.filter)?;
        Ok(rows.into_iter().map(|r| r.into_model()).collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    UserIdPath(id): UserIdPath,
) -> Result<Json<User>, ApiError> {
    let user = blocking(move || {
        let row = state.db.get_user_by_id(id)?.ok_or(ApiError::NotFound)?;
        Ok(row.into_model())
    })
    .await?;

    Ok(Json(user))
}

pub async fn update_user(
    State(state): State<AppState>,
    UserIdPath(id): UserIdPath,
    Extension(caller): Extension<AuthUser>,
    body: Result<JsonBody<UserPayload>, ApiError>,
) -> Result<StatusCode, ApiError> {
    authorize_self(caller, id, SelfAction::UpdateProfile)?;
    let JsonBody(payload) = body?;
    let profile = validation::edit(payload)?;

    blocking(move || {
        if !state.db.update_user(id, &profile.name, &profile.nick, &profile.email)? {
            return Err(ApiError::NotFound);
        }
        Ok(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_user(
    State(state): State<AppState>,
    UserIdPath(id): UserIdPath,
    Extension(caller): Extension<AuthUser>,
) -> Result<StatusCode, ApiError> {
    authorize_self(caller, id, SelfAction::DeleteProfile)?;

    blocking(move || {
        if !state.db.delete_user(id)? {
            return Err(ApiError::NotFound);
        }
        info!("deleted user {}", id);
        Ok(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn change_password(
    State(state): State<AppState>,
    UserIdPath(id): UserIdPath,
    Extension(caller): Extension<AuthUser>,
    body: Result<JsonBody<ChangePasswordRequest>, ApiError>,
) -> Result<StatusCode, ApiError> {
    authorize_self(caller, id, SelfAction::ChangePassword)?;
    let JsonBody(req) = body?;
    if req.new.is_empty() {
        return Err(ApiError::Validation(
            "a nova senha é obrigatória e não pode estar em branco".into(),
        ));
    }

    blocking(move || {
        let stored = state.db.get_password_hash(id)?.ok_or(ApiError::NotFound)?;
        if !credentials::verify_password(&req.current, &stored)? {
            return Err(ApiError::Unauthorized("a senha atual não condiz com a que está salva no banco"));
        }

        let new_hash = credentials::hash_password(&req.new)?;
        if !state.db.set_password_hash(id, &new_hash)? {
            return Err(ApiError::NotFound);
        }
        info!("user {} changed password", id);
        Ok(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
