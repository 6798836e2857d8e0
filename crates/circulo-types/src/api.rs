use serde::{Deserialize, Serialize};

// -- JWT Claims --

/// Claims carried by every bearer token. `sub` is the decimal user id; it is
/// kept as a string so foreign or hand-crafted tokens fail at parse time
/// instead of being silently truncated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

// -- Users --

/// Body of `POST /usuarios` and `PUT /usuarios/{id}`.
///
/// Every field defaults to empty so a missing field reaches the ordered
/// validation rules and gets a readable message instead of a decode error.
/// `senha` is only consulted at registration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPayload {
    #[serde(default, rename = "nome")]
    pub name: String,
    #[serde(default)]
    pub nick: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, rename = "senha")]
    pub password: Option<String>,
}

/// `?usuario=` filter shared by search and the follower listings.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default, rename = "usuario")]
    pub filter: String,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub id: u64,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangePasswordRequest {
    #[serde(rename = "atual")]
    pub current: String,
    #[serde(rename = "nova")]
    pub new: String,
}

// -- Errors --

/// Envelope for every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub erro: String,
}
