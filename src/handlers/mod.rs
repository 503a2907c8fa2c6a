// handlers/mod.rs
//
// Public: root, health, login, list and create users.
// Bearer token required: update and delete users.
pub mod auth;
pub mod health;
pub mod users;

pub use health::{health, root};
