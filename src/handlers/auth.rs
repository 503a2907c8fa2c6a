// handlers/auth.rs - POST /api/auth/login
//
// Issues the bearer tokens that the /usuarios mutation routes require.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{self, Claims};
use crate::database::models::User;
use crate::error::{ApiError, ErrorResponse};
use crate::state::AppState;
use crate::validation::{check_email, validate, FieldError, Rule};

#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({"email": "jane.doe@example.com", "password": "password123"}))]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

fn login_email(r: &LoginRequest) -> Result<(), FieldError> {
    check_email("email", &r.email)
}

fn login_password(r: &LoginRequest) -> Result<(), FieldError> {
    if r.password.is_empty() {
        return Err(FieldError::new("password", "Password is required"));
    }
    Ok(())
}

const LOGIN_RULES: &[Rule<LoginRequest>] = &[login_email, login_password];

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Store or signing failure", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;
    validate(&request, LOGIN_RULES)?;

    let found = state
        .store
        .find_by_email(&request.email)
        .await
        .map_err(|e| ApiError::from_store(e, "Error during login"))?;

    // Passwords are stored as supplied, so this is a plain comparison.
    let user = match found {
        Some(user) if user.password == request.password => user,
        _ => {
            tracing::info!(email = %request.email, "login rejected");
            return Err(ApiError::unauthorized("Invalid email or password"));
        }
    };

    let claims = Claims::for_user(&user, state.jwt.expiry_hours);
    let token = auth::issue(&claims, &state.jwt.secret).map_err(|e| {
        tracing::error!(error = %e, "failed to sign token");
        ApiError::internal_server_error("Error generating token")
    })?;

    tracing::info!(user_id = user.id, "token issued");
    Ok(Json(LoginResponse { token, user }))
}
