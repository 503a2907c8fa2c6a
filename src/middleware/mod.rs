pub mod auth;
pub mod path;

pub use auth::{authorize, AuthUser};
pub use path::UserId;
