use axum::{extract::State, response::Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use utoipa::ToSchema;

use crate::error::{ApiError, ErrorResponse};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub database: String,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service and store are reachable", body = HealthResponse),
        (status = 503, description = "Store unreachable", body = ErrorResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    if let Err(e) = state.store.ping().await {
        tracing::warn!(error = %e, "health check failed");
        return Err(ApiError::service_unavailable("database unavailable"));
    }

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        database: "ok".to_string(),
    }))
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "usuarios-api",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "users": "/usuarios[/:id] (PUT/DELETE require a bearer token)",
            "login": "/api/auth/login",
            "health": "/health",
            "docs": "/api-docs",
            "openapi": "/openapi.json",
        }
    }))
}
