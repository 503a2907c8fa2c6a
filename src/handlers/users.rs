// handlers/users.rs - /usuarios resource
//
// List and create are public. Update and delete check the id segment first,
// then the bearer token, then the body, and only then touch the store.

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::database::models::{NewUser, User, UserChanges};
use crate::error::{ApiError, ErrorResponse};
use crate::middleware::{AuthUser, UserId};
use crate::state::AppState;
use crate::validation::{check_email, check_name, check_password, validate, FieldError, Rule};

#[derive(Debug, Default, Deserialize, ToSchema)]
#[schema(example = json!({"name": "Nuevo Usuario", "email": "nuevo@correo.com", "password": "passSeguro123"}))]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl From<CreateUserRequest> for NewUser {
    fn from(request: CreateUserRequest) -> Self {
        Self {
            name: request.name,
            email: request.email,
            password: request.password,
        }
    }
}

/// Partial update; absent fields are left as they are.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[schema(example = json!({"name": "Usuario Actualizado", "email": "actualizado@correo.com"}))]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(request: UpdateUserRequest) -> Self {
        Self {
            name: request.name,
            email: request.email,
            password: request.password,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

fn create_name(r: &CreateUserRequest) -> Result<(), FieldError> {
    check_name("name", &r.name)
}

fn create_email(r: &CreateUserRequest) -> Result<(), FieldError> {
    check_email("email", &r.email)
}

fn create_password(r: &CreateUserRequest) -> Result<(), FieldError> {
    check_password("password", &r.password)
}

fn update_name(r: &UpdateUserRequest) -> Result<(), FieldError> {
    r.name.as_deref().map_or(Ok(()), |v| check_name("name", v))
}

fn update_email(r: &UpdateUserRequest) -> Result<(), FieldError> {
    r.email.as_deref().map_or(Ok(()), |v| check_email("email", v))
}

fn update_password(r: &UpdateUserRequest) -> Result<(), FieldError> {
    r.password.as_deref().map_or(Ok(()), |v| check_password("password", v))
}

const CREATE_RULES: &[Rule<CreateUserRequest>] = &[create_name, create_email, create_password];
const UPDATE_RULES: &[Rule<UpdateUserRequest>] = &[update_name, update_email, update_password];

#[utoipa::path(
    get,
    path = "/usuarios",
    tag = "Users",
    responses(
        (status = 200, description = "All users, ordered by id", body = [User]),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state
        .store
        .find_all()
        .await
        .map_err(|e| ApiError::from_store(e, "Error listing users"))?;

    Ok(Json(users))
}

#[utoipa::path(
    post,
    path = "/usuarios",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Json(request) = payload?;
    validate(&request, CREATE_RULES)?;

    let user = state
        .store
        .create(request.into())
        .await
        .map_err(|e| ApiError::from_store(e, "Error creating user"))?;

    tracing::info!(user_id = user.id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    put,
    path = "/usuarios/{id}",
    tag = "Users",
    security(("bearerAuth" = [])),
    params(("id" = i32, Path, description = "Id of the user to update")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = MessageResponse),
        (status = 400, description = "Invalid id or body", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    UserId(id): UserId,
    caller: AuthUser,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    // No body is an empty change set; the row's updated_at still moves.
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        UpdateUserRequest::default()
    } else {
        Json::<UpdateUserRequest>::from_bytes(&body)?.0
    };
    validate(&request, UPDATE_RULES)?;

    let affected = state
        .store
        .update(id, request.into())
        .await
        .map_err(|e| ApiError::from_store(e, "Error updating user"))?;

    if affected == 0 {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!(user_id = id, by = %caller.subject, "user updated");
    Ok(MessageResponse::new("User updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/usuarios/{id}",
    tag = "Users",
    security(("bearerAuth" = [])),
    params(("id" = i32, Path, description = "Id of the user to delete")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, description = "Invalid id", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    UserId(id): UserId,
    caller: AuthUser,
) -> Result<Json<MessageResponse>, ApiError> {
    let affected = state
        .store
        .destroy(id)
        .await
        .map_err(|e| ApiError::from_store(e, "Error deleting user"))?;

    if affected == 0 {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!(user_id = id, by = %caller.subject, "user deleted");
    Ok(MessageResponse::new("User deleted successfully"))
}
