use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::database::models::User;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Principal identifier (the user id for tokens issued by this service).
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// Longest token lifetime `Claims::for_user` will issue (ten years).
pub const MAX_EXPIRY_HOURS: u64 = 24 * 365 * 10;

impl Claims {
    /// Claims for `user`, valid for `expiry_hours` (capped at `MAX_EXPIRY_HOURS`).
    pub fn for_user(user: &User, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let hours = expiry_hours.min(MAX_EXPIRY_HOURS) as i64;
        let exp = (now + Duration::hours(hours)).timestamp();

        Self {
            sub: user.id.to_string(),
            email: Some(user.email.clone()),
            iat: now.timestamp(),
            exp,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Malformed token")]
    Malformed,

    #[error("Token signature does not verify")]
    InvalidSignature,

    #[error("Token has expired")]
    Expired,

    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
}

/// Sign `claims` with the shared HS256 secret.
pub fn issue(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::new(Algorithm::HS256), claims, &encoding_key)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Verify signature and expiry of `token` and return its claims.
///
/// Signature is checked before expiry, so an expired token signed with the
/// wrong secret reports `InvalidSignature`. No leeway is applied to `exp`.
pub fn verify(token: &str, secret: &str) -> Result<Claims, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::Malformed,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn claims_expiring_in(seconds: i64) -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            sub: "42".to_string(),
            email: Some("prueba@test.com".to_string()),
            iat: now,
            exp: now + seconds,
        }
    }

    #[test]
    fn verify_returns_issued_claims() {
        let claims = claims_expiring_in(3600);
        let token = issue(&claims, SECRET).unwrap();

        assert_eq!(verify(&token, SECRET).unwrap(), claims);
    }

    #[test]
    fn verify_rejects_garbage() {
        assert_eq!(verify("not-a-token", SECRET), Err(AuthError::Malformed));
        assert_eq!(verify("", SECRET), Err(AuthError::Malformed));
    }

    #[test]
    fn verify_rejects_foreign_signature() {
        let token = issue(&claims_expiring_in(3600), "other-secret").unwrap();
        assert_eq!(verify(&token, SECRET), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn verify_rejects_expired_token() {
        let token = issue(&claims_expiring_in(-30), SECRET).unwrap();
        assert_eq!(verify(&token, SECRET), Err(AuthError::Expired));
    }

    #[test]
    fn empty_secret_is_refused() {
        assert_eq!(issue(&claims_expiring_in(60), ""), Err(AuthError::MissingSecret));
        assert_eq!(verify("a.b.c", ""), Err(AuthError::MissingSecret));
    }

    #[test]
    fn claims_for_user_use_id_as_subject() {
        let user = User {
            id: 7,
            name: "Jane Doe".to_string(),
            email: "jane.doe@example.com".to_string(),
            password: "password123".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let claims = Claims::for_user(&user, 2);

        assert_eq!(claims.sub, "7");
        assert_eq!(claims.email.as_deref(), Some("jane.doe@example.com"));
        assert_eq!(claims.exp - claims.iat, 2 * 3600);

        let capped = Claims::for_user(&user, 100_000_000_000);
        assert_eq!(capped.exp - capped.iat, MAX_EXPIRY_HOURS as i64 * 3600);
    }
}
