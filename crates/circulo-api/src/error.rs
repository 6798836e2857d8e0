use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use circulo_db::{GraphError, UserError};
use circulo_types::api::ErrorBody;

use crate::credentials::CredentialError;
use crate::token::TokenError;

const INTERNAL_MESSAGE: &str = "erro interno do servidor";
const IDENTITY_TAKEN: &str = "já existe um usuário com este nick ou e-mail";

/// Every failure a handler can return. Rendered as `{"erro": "..."}` with the
/// matching status; internal failures are logged and replaced by an opaque
/// message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unreadable(String),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("usuário não encontrado")]
    NotFound,
    #[error("{0}")]
    Conflict(&'static str),
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unreadable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Token(TokenError::SigningFailure(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Token(_) | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Credential(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<GraphError> for ApiError {
    fn from(e: GraphError) -> Self {
        match e {
            GraphError::Store(inner) => ApiError::Internal(inner),
            rule => ApiError::Validation(rule.to_string()),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::IdentityTaken => ApiError::Conflict(IDENTITY_TAKEN),
            UserError::Store(inner) => ApiError::Internal(inner),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("request failed: {:#}", self);
            INTERNAL_MESSAGE.to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody { erro: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(err: ApiError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_message_is_returned_verbatim() {
        let (status, body) = body_of(ApiError::Validation("o nome é obrigatório".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.erro, "o nome é obrigatório");
    }

    #[tokio::test]
    async fn internal_detail_is_hidden() {
        let (status, body) =
            body_of(ApiError::Internal(anyhow::anyhow!("disk I/O error at /var/db"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.erro, INTERNAL_MESSAGE);
    }

    #[test]
    fn token_errors_are_unauthorized() {
        for e in [TokenError::MissingToken, TokenError::InvalidToken, TokenError::Expired] {
            assert_eq!(ApiError::from(e).status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn graph_rule_violations_are_bad_requests() {
        for e in [GraphError::SelfFollow, GraphError::AlreadyFollowing, GraphError::NotFollowing] {
            assert_eq!(ApiError::from(e).status(), StatusCode::BAD_REQUEST);
        }
        let store = GraphError::Store(anyhow::anyhow!("locked"));
        assert_eq!(ApiError::from(store).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn taken_identity_is_a_conflict() {
        let (status, body) = body_of(ApiError::from(UserError::IdentityTaken)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.erro, IDENTITY_TAKEN);

        let store = UserError::Store(anyhow::anyhow!("disk full"));
        assert_eq!(ApiError::from(store).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
