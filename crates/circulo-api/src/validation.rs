use regex::Regex;

use circulo_types::api::UserPayload;

use crate::error::ApiError;

/// Trimmed, validated profile fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub nick: String,
    pub email: String,
}

/// Validate a sign-up payload. Returns the profile and the plaintext password.
pub fn registration(payload: UserPayload) -> Result<(Profile, String), ApiError> {
    let profile = profile(&payload)?;
    match payload.password {
        Some(password) if !password.is_empty() => Ok((profile, password)),
        _ => Err(invalid("a senha é obrigatória e não pode estar em branco")),
    }
}

/// Validate a profile edit. Any `senha` in the payload is ignored.
pub fn edit(payload: UserPayload) -> Result<Profile, ApiError> {
    profile(&payload)
}

// Rules run in a fixed order and the first failure is reported.
fn profile(payload: &UserPayload) -> Result<Profile, ApiError> {
    let name = payload.name.trim();
    let nick = payload.nick.trim();
    let email = payload.email.trim();

    if name.is_empty() {
        return Err(invalid("o nome é obrigatório e não pode estar em branco"));
    }
    if email.is_empty() {
        return Err(invalid("o e-mail é obrigatório e não pode estar em branco"));
    }
    if !valid_email(email) {
        return Err(invalid("o e-mail está em um formato inválido"));
    }
    if nick.is_empty() {
        return Err(invalid("o nick é obrigatório e não pode estar em branco"));
    }

    Ok(Profile {
        name: name.to_string(),
        nick: nick.to_string(),
        email: email.to_string(),
    })
}

fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

fn invalid(message: &str) -> ApiError {
    ApiError::Validation(message.to_string())
}
