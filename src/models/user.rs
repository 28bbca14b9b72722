// src/models/user.rs

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::sync::LazyLock;
use validator::Validate;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique across all roles.
    pub username: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    /// 'tourist', 'guide' or 'admin'.
    pub user_type: String,

    pub full_name: String,
    pub phone: String,
    pub email: String,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9 \-]{5,14}$").expect("phone regex"));

/// DTO for registration. Admin accounts are seeded out-of-band and cannot be
/// created through this request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// 'tourist' or 'guide'.
    #[validate(custom(function = validate_registration_role))]
    pub role: String,

    #[validate(length(
        min = 3,
        max = 50,
        message = "Username length must be between 3 and 50 characters."
    ))]
    pub username: String,

    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "Full name is required."))]
    pub full_name: String,

    #[validate(custom(function = validate_phone))]
    pub phone: String,

    #[validate(email(message = "Invalid email address."))]
    pub email: String,

    // Guide-only attributes; ignored for tourists, defaulted when absent.
    pub specialization: Option<String>,
    pub experience_years: Option<i32>,
    pub languages_spoken: Option<String>,
    pub price_per_day: Option<f64>,
    pub location: Option<String>,
}

/// DTO for login. The role scopes the lookup so each login page only
/// authenticates accounts of its own kind.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(custom(function = validate_login_role))]
    pub role: String,
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

fn validate_registration_role(role: &str) -> Result<(), validator::ValidationError> {
    if role == "admin" {
        return Err(validator::ValidationError::new("admin_registration_forbidden"));
    }
    if role != "tourist" && role != "guide" {
        return Err(validator::ValidationError::new("invalid_role"));
    }
    Ok(())
}

fn validate_login_role(role: &str) -> Result<(), validator::ValidationError> {
    if role != "tourist" && role != "guide" && role != "admin" {
        return Err(validator::ValidationError::new("invalid_role"));
    }
    Ok(())
}

fn validate_phone(phone: &str) -> Result<(), validator::ValidationError> {
    if !PHONE_RE.is_match(phone) {
        return Err(validator::ValidationError::new("invalid_phone"));
    }
    Ok(())
}
