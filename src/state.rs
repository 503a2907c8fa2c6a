use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::UserStore;

/// Signing settings shared by the gate and the login handler.
#[derive(Clone, Debug)]
pub struct JwtSettings {
    pub secret: String,
    pub expiry_hours: u64,
}

/// Per-router state. The store is built once at startup and handed in here.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub jwt: Arc<JwtSettings>,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>, jwt: JwtSettings) -> Self {
        Self {
            store,
            jwt: Arc::new(jwt),
        }
    }

    pub fn from_config(store: Arc<dyn UserStore>, config: &AppConfig) -> Self {
        Self::new(
            store,
            JwtSettings {
                secret: config.security.jwt_secret.clone(),
                expiry_hours: config.security.jwt_expiry_hours,
            },
        )
    }
}
