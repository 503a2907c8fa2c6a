use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::docs::ApiDoc;
use crate::handlers::{self, auth, users};
use crate::state::AppState;

/// Optional layers of the HTTP surface.
#[derive(Debug, Clone, Copy)]
pub struct HttpOptions {
    pub docs: bool,
    pub cors: bool,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self { docs: true, cors: true }
    }
}

impl From<&AppConfig> for HttpOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            docs: config.docs.enabled,
            cors: config.security.enable_cors,
        }
    }
}

pub fn build_router(state: AppState, options: HttpOptions) -> Router {
    let mut router = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/auth/login", post(auth::login))
        .route("/usuarios", get(users::list_users).post(users::create_user))
        .route("/usuarios/:id", put(users::update_user).delete(users::delete_user));

    if options.docs {
        router = router.merge(SwaggerUi::new("/api-docs").url("/openapi.json", ApiDoc::openapi()));
    }

    let router = router.with_state(state).layer(TraceLayer::new_for_http());

    if options.cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use chrono::Utc;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::auth::{self, Claims};
    use crate::database::MemoryUserStore;
    use crate::state::JwtSettings;

    const SECRET: &str = "router-secret";

    fn app() -> Router {
        let state = AppState::new(
            Arc::new(MemoryUserStore::new()),
            JwtSettings {
                secret: SECRET.to_string(),
                expiry_hours: 1,
            },
        );
        build_router(state, HttpOptions { docs: false, cors: false })
    }

    fn token_signed_with(secret: &str, ttl: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "1".to_string(),
            email: None,
            iat: now,
            exp: now + ttl,
        };
        auth::issue(&claims, secret).unwrap()
    }

    async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create_sample(app: &Router) -> i64 {
        let (status, body) = send(
            app,
            Method::POST,
            "/usuarios",
            None,
            Some(json!({"name": "Usuario de Prueba", "email": "prueba@test.com", "password": "123456"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn list_starts_empty() {
        let (status, body) = send(&app(), Method::GET, "/usuarios", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn create_then_list_round_trips() {
        let app = app();
        let id = create_sample(&app).await;
        assert!(id > 0);

        let (status, body) = send(&app, Method::GET, "/usuarios", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let users = body.as_array().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["id"], id);
        assert_eq!(users[0]["name"], "Usuario de Prueba");
        assert_eq!(users[0]["email"], "prueba@test.com");
        assert!(users[0].get("password").is_none());
    }

    #[tokio::test]
    async fn invalid_create_reports_every_violation() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/usuarios",
            None,
            Some(json!({"name": "Usuario Malo", "email": "esto-no-es-un-email", "password": "123"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let errors = body["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0]["field"], "email");
        assert_eq!(errors[1]["field"], "password");

        let (_, body) = send(&app, Method::POST, "/usuarios", None, Some(json!({}))).await;
        assert_eq!(body["errors"].as_array().unwrap().len(), 3);

        let (_, listed) = send(&app, Method::GET, "/usuarios", None, None).await;
        assert_eq!(listed, json!([]));
    }

    #[tokio::test]
    async fn duplicate_email_is_an_opaque_server_error() {
        let app = app();
        create_sample(&app).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/usuarios",
            None,
            Some(json!({"name": "Otro", "email": "prueba@test.com", "password": "654321"})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Error creating user");
    }

    #[tokio::test]
    async fn non_json_body_is_rejected() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/usuarios")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn mutations_without_token_are_unauthorized() {
        let app = app();
        let id = create_sample(&app).await;
        let uri = format!("/usuarios/{id}");

        let (status, body) = send(&app, Method::PUT, &uri, None, Some(json!({"name": "Hacked"}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "No token in request");

        let (status, _) = send(&app, Method::DELETE, &uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (_, listed) = send(&app, Method::GET, "/usuarios", None, None).await;
        assert_eq!(listed[0]["name"], "Usuario de Prueba");
    }

    #[tokio::test]
    async fn mutations_with_bad_tokens_are_unauthorized() {
        let app = app();
        let id = create_sample(&app).await;
        let uri = format!("/usuarios/{id}");

        for token in [token_signed_with("wrong", 3600), token_signed_with(SECRET, -60)] {
            let (status, body) = send(&app, Method::PUT, &uri, Some(token.as_str()), Some(json!({"name": "Hacked"}))).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["message"], "Invalid token");

            let (status, body) = send(&app, Method::DELETE, &uri, Some(token.as_str()), None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["message"], "Invalid token");
        }

        let (_, listed) = send(&app, Method::GET, "/usuarios", None, None).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["name"], "Usuario de Prueba");
    }

    #[tokio::test]
    async fn id_is_checked_before_token() {
        let (status, body) = send(&app(), Method::DELETE, "/usuarios/abc", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "id");
    }

    #[tokio::test]
    async fn authorized_update_and_delete() {
        let app = app();
        let id = create_sample(&app).await;
        let uri = format!("/usuarios/{id}");
        let token = token_signed_with(SECRET, 3600);

        let (status, body) = send(&app, Method::PUT, &uri, Some(token.as_str()), Some(json!({"name": "Renombrado"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User updated successfully");

        let (_, listed) = send(&app, Method::GET, "/usuarios", None, None).await;
        assert_eq!(listed[0]["name"], "Renombrado");
        assert_eq!(listed[0]["email"], "prueba@test.com");

        let (status, body) = send(&app, Method::PUT, &uri, Some(token.as_str()), Some(json!({"email": "bad"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "email");

        let (status, _) = send(&app, Method::DELETE, &uri, Some(token.as_str()), None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, listed) = send(&app, Method::GET, "/usuarios", None, None).await;
        assert_eq!(listed, json!([]));
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let app = app();
        let token = token_signed_with(SECRET, 3600);

        let (status, _) = send(&app, Method::PUT, "/usuarios/999", Some(token.as_str()), Some(json!({"name": "X"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, Method::DELETE, "/usuarios/999", Some(token.as_str()), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found");
    }

    #[tokio::test]
    async fn missing_id_with_taken_email_is_not_found() {
        let app = app();
        create_sample(&app).await;
        let token = token_signed_with(SECRET, 3600);

        let (status, body) = send(
            &app,
            Method::PUT,
            "/usuarios/999",
            Some(token.as_str()),
            Some(json!({"email": "prueba@test.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found");
    }

    #[tokio::test]
    async fn update_without_body_changes_nothing() {
        let app = app();
        let id = create_sample(&app).await;
        let token = token_signed_with(SECRET, 3600);

        let (status, body) = send(&app, Method::PUT, &format!("/usuarios/{id}"), Some(token.as_str()), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User updated successfully");

        let (_, listed) = send(&app, Method::GET, "/usuarios", None, None).await;
        assert_eq!(listed[0]["name"], "Usuario de Prueba");

        let request = Request::builder()
            .method(Method::PUT)
            .uri(format!("/usuarios/{id}"))
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn whitespace_name_is_accepted() {
        let (status, body) = send(
            &app(),
            Method::POST,
            "/usuarios",
            None,
            Some(json!({"name": "   ", "email": "blanco@test.com", "password": "123456"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], "   ");
    }

    #[tokio::test]
    async fn login_issues_a_usable_token() {
        let app = app();
        let id = create_sample(&app).await;

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "prueba@test.com", "password": "wrong-pass"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "prueba@test.com", "password": "123456"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["id"], id);
        let token = body["token"].as_str().unwrap().to_string();
        assert_eq!(auth::verify(&token, SECRET).unwrap().sub, id.to_string());

        let (status, _) = send(&app, Method::DELETE, &format!("/usuarios/{id}"), Some(token.as_str()), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, body) = send(&app(), Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
