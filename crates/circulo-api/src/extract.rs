//! Extractors whose rejections use the `{"erro": ...}` envelope instead of
//! axum's plain-text defaults.

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// JSON request body. A body that cannot be read is 422; one that is not valid
/// JSON for `T` is 400. The content type is not checked.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::Unreadable(e.body_text()))?;

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| ApiError::Validation(format!("corpo da requisição inválido: {e}")))
    }
}

/// The `{usuarioId}` path segment as a user id. SQLite row ids are signed, so
/// anything above `i64::MAX` is rejected here rather than at the store.
#[derive(Debug, Clone, Copy)]
pub struct UserIdPath(pub u64);

impl<S> FromRequestParts<S> for UserIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<u64>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation("o id do usuário deve ser um inteiro positivo".into()))?;
        if i64::try_from(id).is_err() {
            return Err(ApiError::Validation("o id do usuário está fora do intervalo permitido".into()));
        }
        Ok(UserIdPath(id))
    }
}
