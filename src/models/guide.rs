// src/models/guide.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'guides' table: the 1:1 profile extension of a guide user.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct GuideProfile {
    pub id: i64,
    pub user_id: i64,
    pub specialization: String,
    pub experience_years: i32,
    pub languages_spoken: String,
    pub location: String,
    pub price_per_day: f64,
    pub availability_status: String,
    pub rating: f64,
}

/// Platform defaults applied when a guide registers without explicit
/// profile attributes.
pub mod defaults {
    pub const SPECIALIZATION: &str = "General Tourism";
    pub const EXPERIENCE_YEARS: i32 = 1;
    pub const LANGUAGES_SPOKEN: &str = "Hindi, English";
    pub const LOCATION: &str = "Ranchi District";
    pub const PRICE_PER_DAY: f64 = 2000.0;
    pub const AVAILABILITY: &str = "available";
}

/// Guide as shown to tourists: user identity joined with profile attributes.
#[derive(Debug, Serialize, FromRow)]
pub struct GuideListing {
    pub user_id: i64,
    pub guide_name: String,
    pub username: String,
    pub specialization: String,
    pub experience_years: i32,
    pub languages_spoken: String,
    pub location: String,
    pub price_per_day: f64,
    pub rating: f64,
    pub availability_status: String,
}

/// DTO for the profile upsert.
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertProfileRequest {
    #[validate(length(min = 1, max = 100, message = "Specialization is required."))]
    pub specialization: String,

    #[validate(range(min = 0, max = 60, message = "Experience must be between 0 and 60 years."))]
    pub experience_years: i32,

    #[validate(length(max = 200))]
    pub languages_spoken: String,

    #[validate(length(min = 1, max = 100, message = "Location is required."))]
    pub location: String,

    #[validate(range(min = 0.0, message = "Price must not be negative."))]
    pub price_per_day: f64,
}
