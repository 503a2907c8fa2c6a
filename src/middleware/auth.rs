use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use crate::auth::{self, Claims};
use crate::error::ApiError;
use crate::state::AppState;

/// Principal decoded from a verified bearer token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub subject: String,
    pub email: Option<String>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
            email: claims.email,
        }
    }
}

/// Gate a request on its bearer token.
///
/// A missing token is rejected without touching the verifier. Every verifier
/// failure collapses into the same 401 so callers cannot probe which check
/// failed.
pub fn authorize(headers: &HeaderMap, secret: &str) -> Result<AuthUser, ApiError> {
    let token = extract_bearer(headers).ok_or_else(|| ApiError::unauthorized("No token in request"))?;

    match auth::verify(token, secret) {
        Ok(claims) => Ok(claims.into()),
        Err(e) => {
            tracing::debug!(reason = %e, "rejected bearer token");
            Err(ApiError::unauthorized("Invalid token"))
        }
    }
}

/// Extract JWT token from Authorization header
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;

    let mut parts = value.split_whitespace();
    let scheme = parts.next()?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }

    parts.next().filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = authorize(&parts.headers, &state.jwt.secret)?;
        tracing::debug!(subject = %user.subject, "request authorized");
        Ok(user)
    }
}
