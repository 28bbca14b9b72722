// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::{
        guide::defaults,
        user::{LoginRequest, RegisterRequest, User},
    },
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
    },
};

/// Registers a new tourist or guide account.
///
/// Username uniqueness is platform-wide. A guide registration also creates
/// the linked profile row; both inserts run in one transaction so a failure
/// leaves no partial state.
pub async fn register(
    State(pool): State<PgPool>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.role == "admin" {
        return Err(AppError::BadRequest(
            "Admin registration is not allowed".to_string(),
        ));
    }
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE username = $1")
        .bind(&payload.username)
        .fetch_optional(&pool)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(format!(
            "Username '{}' already exists",
            payload.username
        )));
    }

    let hashed_password = hash_password(&payload.password)?;

    let mut tx = pool.begin().await?;

    let user_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO users (username, password, user_type, full_name, phone, email)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(&payload.username)
    .bind(&hashed_password)
    .bind(&payload.role)
    .bind(&payload.full_name)
    .bind(&payload.phone)
    .bind(&payload.email)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        // Unique violation can still race past the pre-check.
        if e.to_string().contains("unique constraint") || e.to_string().contains("23505") {
            AppError::Conflict(format!("Username '{}' already exists", payload.username))
        } else {
            tracing::error!("Failed to register user: {:?}", e);
            AppError::from(e)
        }
    })?;

    if payload.role == "guide" {
        sqlx::query(
            r#"
            INSERT INTO guides
            (user_id, specialization, experience_years, languages_spoken, location, price_per_day, availability_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user_id)
        .bind(payload.specialization.as_deref().unwrap_or(defaults::SPECIALIZATION))
        .bind(payload.experience_years.unwrap_or(defaults::EXPERIENCE_YEARS))
        .bind(payload.languages_spoken.as_deref().unwrap_or(defaults::LANGUAGES_SPOKEN))
        .bind(payload.location.as_deref().unwrap_or(defaults::LOCATION))
        .bind(payload.price_per_day.unwrap_or(defaults::PRICE_PER_DAY))
        .bind(defaults::AVAILABILITY)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create guide profile: {:?}", e);
            AppError::from(e)
        })?;
    }

    tx.commit().await?;

    tracing::info!("Registered {} '{}' (id {})", payload.role, payload.username, user_id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Registration successful! Please login with your credentials.",
            "id": user_id,
        })),
    ))
}

/// Authenticates a user and returns a JWT token.
///
/// The lookup is scoped by username AND role. Unknown username and wrong
/// password produce the same generic message so usernames cannot be
/// enumerated.
pub async fn login(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, password, user_type, full_name, phone, email, created_at
        FROM users
        WHERE username = $1 AND user_type = $2
        "#,
    )
    .bind(&payload.username)
    .bind(&payload.role)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Login DB error: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let invalid = || AppError::AuthError("Invalid credentials".to_string());

    let user = user.ok_or_else(invalid)?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(invalid());
    }

    let token = sign_jwt(
        user.id,
        &user.user_type,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    Ok(Json(json!({
        "success": true,
        "token": token,
        "type": "Bearer",
        "user": {
            "id": user.id,
            "username": user.username,
            "full_name": user.full_name,
            "role": user.user_type,
        },
    })))
}
