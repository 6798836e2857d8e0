use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};

use circulo_types::api::SearchQuery;
use circulo_types::models::User;

use crate::auth::{AppState, blocking};
use crate::error::ApiError;
use crate::extract::UserIdPath;
use crate::guard::{TargetAction, authorize_other};
use crate::middleware::AuthUser;

pub async fn follow(
    State(state): State<AppState>,
    UserIdPath(target_id): UserIdPath,
    Extension(caller): Extension<AuthUser>,
) -> Result<StatusCode, ApiError> {
    authorize_other(caller, target_id, TargetAction::Follow)?;

    blocking(move || {
        if state.db.get_user_by_id(target_id)?.is_none() {
            return Err(ApiError::NotFound);
        }
        state.db.follow(caller.0, target_id)?;
        Ok(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// No existence check on the target: edges left behind by a deleted user can
/// still be removed.
pub async fn unfollow(
    State(state): State<AppState>,
    UserIdPath(target_id): UserIdPath,
    Extension(caller): Extension<AuthUser>,
) -> Result<StatusCode, ApiError> {
    authorize_other(caller, target_id, TargetAction::Unfollow)?;

    blocking(move || Ok(state.db.unfollow(caller.0, target_id)?)).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn followers(
    State(state): State<AppState>,
    UserIdPath(id): UserIdPath,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = blocking(move || {
        let rows = state.db.get_followers(id, &query.filter)?;
        Ok(rows.into_iter().map(|r| r.into_model()).collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(users))
}

pub async fn following(
    State(state): State<AppState>,
    UserIdPath(id): UserIdPath,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = blocking(move || {
        let rows = state.db.get_following(id, &query.filter)?;
        Ok(rows.into_iter().map(|r| r.into_model()).collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(users))
}
