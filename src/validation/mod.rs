//! Declarative field checks.
//!
//! Each route owns a static, ordered slice of [`Rule`]s. [`validate`] runs every
//! rule and collects all failures so a caller can fix its request in one pass.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use utoipa::ToSchema;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// A single check over a request value.
pub type Rule<T> = fn(&T) -> Result<(), FieldError>;

/// Run every rule in order; `Err` carries all failures in rule order.
pub fn validate<T>(value: &T, rules: &[Rule<T>]) -> Result<(), Vec<FieldError>> {
    let errors: Vec<FieldError> = rules.iter().filter_map(|rule| rule(value).err()).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)*\.[a-zA-Z]{2,}$")
            .expect("email pattern is valid")
    })
}

pub fn is_email(value: &str) -> bool {
    value.len() <= 254 && email_regex().is_match(value)
}

pub fn check_name(field: &str, value: &str) -> Result<(), FieldError> {
    if value.is_empty() {
        return Err(FieldError::new(field, "Name is required"));
    }
    Ok(())
}

pub fn check_email(field: &str, value: &str) -> Result<(), FieldError> {
    if !is_email(value) {
        return Err(FieldError::new(field, "Email is not valid"));
    }
    Ok(())
}

pub fn check_password(field: &str, value: &str) -> Result<(), FieldError> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(FieldError::new(field, "Password must be at least 6 characters"));
    }
    Ok(())
}

/// Parse an `id` path segment.
pub fn parse_id(raw: &str) -> Result<i32, FieldError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| FieldError::new("id", "Not a valid ID"))
}
