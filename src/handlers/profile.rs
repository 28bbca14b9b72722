// src/handlers/profile.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::guide::{GuideProfile, UpsertProfileRequest, defaults},
    utils::jwt::Claims,
};

/// The acting guide's own profile row.
pub async fn get_my_profile(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id();

    let profile = sqlx::query_as::<_, GuideProfile>(
        r#"
        SELECT id, user_id, specialization, experience_years, languages_spoken,
               location, price_per_day, availability_status, rating
        FROM guides
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Guide profile not found".to_string()))?;

    Ok(Json(json!({ "success": true, "content": profile })))
}

/// Creates or updates the acting guide's profile.
///
/// Single-statement upsert keyed on user_id: the insert path defaults
/// availability to 'available', the update path leaves availability and
/// rating untouched. Re-submitting identical fields is a no-op.
pub async fn upsert_profile(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpsertProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user_id = claims.user_id();

    sqlx::query(
        r#"
        INSERT INTO guides
        (user_id, specialization, experience_years, languages_spoken, location, price_per_day, availability_status)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (user_id) DO UPDATE SET
            specialization = EXCLUDED.specialization,
            experience_years = EXCLUDED.experience_years,
            languages_spoken = EXCLUDED.languages_spoken,
            location = EXCLUDED.location,
            price_per_day = EXCLUDED.price_per_day
        "#,
    )
    .bind(user_id)
    .bind(&payload.specialization)
    .bind(payload.experience_years)
    .bind(&payload.languages_spoken)
    .bind(&payload.location)
    .bind(payload.price_per_day)
    .bind(defaults::AVAILABILITY)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to upsert guide profile: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(json!({
        "success": true,
        "message": "Guide profile saved successfully!",
    })))
}
