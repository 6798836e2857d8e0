use axum::http::{HeaderMap, header};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};

use circulo_types::api::Claims;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token de autenticação ausente ou malformado")]
    MissingToken,
    #[error("token de autenticação inválido")]
    InvalidToken,
    #[error("token de autenticação expirado")]
    Expired,
    #[error("failed to sign token: {0}")]
    SigningFailure(jsonwebtoken::errors::Error),
}

/// Issues and verifies HS256 bearer tokens. Built once at startup from the
/// configured secret and shared read-only afterwards.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn issue(&self, user_id: u64) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if it had been created at `issued_at`.
    pub fn issue_at(&self, user_id: u64, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::SigningFailure)
    }

    /// Check signature and expiry, then return the user id the token was issued for.
    pub fn verify(&self, token: &str) -> Result<u64, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::InvalidToken,
            }
        })?;

        data.claims.sub.parse().map_err(|_| TokenError::InvalidToken)
    }

    /// Resolve the caller of a request from its `Authorization` header.
    pub fn resolve(&self, headers: &HeaderMap) -> Result<u64, TokenError> {
        self.verify(bearer_token(headers)?)
    }
}

/// `Authorization: Bearer <token>`, exactly two whitespace-separated parts.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, TokenError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(TokenError::MissingToken)?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(TokenError::MissingToken),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn service() -> TokenService {
        TokenService::new(b"test-secret", Duration::hours(6))
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn issue_then_resolve() {
        let tokens = service();
        let token = tokens.issue(42).unwrap();
        let headers = headers_with(&format!("Bearer {token}"));
        assert_eq!(tokens.resolve(&headers).unwrap(), 42);
    }

    #[test]
    fn large_ids_survive() {
        let tokens = service();
        let token = tokens.issue(u64::MAX).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), u64::MAX);
    }

    #[test]
    fn expired_token() {
        let tokens = service();
        let issued = Utc::now() - Duration::hours(6) - Duration::seconds(5);
        let token = tokens.issue_at(7, issued).unwrap();
        assert!(matches!(tokens.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn token_just_inside_ttl_is_accepted() {
        let tokens = service();
        let issued = Utc::now() - Duration::hours(6) + Duration::minutes(1);
        let token = tokens.issue_at(7, issued).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), 7);
    }

    #[test]
    fn other_secret_is_rejected() {
        let token = TokenService::new(b"another-secret", Duration::hours(6))
            .issue(1)
            .unwrap();
        assert!(matches!(service().verify(&token), Err(TokenError::InvalidToken)));
    }

    #[test]
    fn garbage_token_is_invalid() {
        assert!(matches!(service().verify("abc.def.ghi"), Err(TokenError::InvalidToken)));
    }

    #[test]
    fn non_numeric_subject_is_invalid() {
        let claims = Claims {
            sub: "ana".into(),
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(matches!(service().verify(&token), Err(TokenError::InvalidToken)));
    }

    #[test]
    fn missing_header() {
        assert!(matches!(
            service().resolve(&HeaderMap::new()),
            Err(TokenError::MissingToken)
        ));
    }

    #[test]
    fn malformed_headers() {
        for value in ["Bearer", "tokenonly", "Bearer a b", "Basic abc", ""] {
            assert!(
                matches!(bearer_token(&headers_with(value)), Err(TokenError::MissingToken)),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn scheme_is_case_insensitive() {
        assert_eq!(bearer_token(&headers_with("bearer abc")).unwrap(), "abc");
        assert_eq!(bearer_token(&headers_with("BEARER   abc")).unwrap(), "abc");
    }
}
