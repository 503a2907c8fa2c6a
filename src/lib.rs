pub mod auth;
pub mod config;
pub mod database;
pub mod docs;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod validation;

pub use routes::{build_router, HttpOptions};
pub use state::{AppState, JwtSettings};
