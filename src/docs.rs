use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Users API",
        description = "Manage user records. Update and delete require a bearer token."
    ),
    paths(
        crate::handlers::health::health,
        crate::handlers::auth::login,
        crate::handlers::users::list_users,
        crate::handlers::users::create_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::validation::FieldError,
            crate::database::models::User,
            crate::handlers::health::HealthResponse,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::LoginResponse,
            crate::handlers::users::CreateUserRequest,
            crate::handlers::users::UpdateUserRequest,
            crate::handlers::users::MessageResponse
        )
    ),
    tags(
        (name = "Users", description = "User record management"),
        (name = "Auth", description = "Token issuance"),
        (name = "Health", description = "Service health endpoints")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);

        let mut scheme = SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer));
        if let SecurityScheme::Http(http) = &mut scheme {
            http.bearer_format = Some("JWT".to_string());
        }

        components.security_schemes.insert("bearerAuth".to_string(), scheme);
    }
}
