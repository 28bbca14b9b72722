// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::{error::AppError, models::user::User, utils::jwt::Claims};

/// Lists all users in the system, newest first.
/// Admin only.
pub async fn list_users(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, password, user_type, full_name, phone, email, created_at
        FROM users
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list users: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(users))
}

/// Booking summary for the admin dashboard, with both parties' usernames.
/// The joined columns are aliased apart from the booking's own contact name.
#[derive(Debug, Serialize, FromRow)]
pub struct AdminBookingView {
    pub id: i64,
    pub tourist_id: i64,
    pub guide_id: i64,
    pub tourist_username: String,
    pub guide_username: String,
    pub tourist_name: String,
    pub native_place: String,
    pub arrival_date: chrono::NaiveDate,
    pub departure_date: chrono::NaiveDate,
    pub days_to_stay: i32,
    pub group_size: i32,
    pub booking_status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Lists all bookings platform-wide, newest first.
/// Admin only.
pub async fn list_bookings(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let bookings = sqlx::query_as::<_, AdminBookingView>(
        r#"
        SELECT b.id, b.tourist_id, b.guide_id,
               u1.username AS tourist_username, u2.username AS guide_username,
               b.tourist_name, b.native_place, b.arrival_date, b.departure_date,
               b.days_to_stay, b.group_size, b.booking_status, b.created_at
        FROM bookings b
        JOIN users u1 ON b.tourist_id = u1.id
        JOIN users u2 ON b.guide_id = u2.id
        ORDER BY b.created_at DESC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list bookings: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(bookings))
}

/// Content upload summary for the admin dashboard.
#[derive(Debug, Serialize, FromRow)]
pub struct AdminContentView {
    pub id: i64,
    pub guide_id: i64,
    pub guide_username: String,
    pub upload_type: String,
    pub title: String,
    pub image_path: String,
    pub location: String,
    pub upload_date: chrono::DateTime<chrono::Utc>,
}

/// Lists all guide uploads platform-wide, newest first.
/// Admin only.
pub async fn list_content(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let content = sqlx::query_as::<_, AdminContentView>(
        r#"
        SELECT gu.id, gu.guide_id, u.username AS guide_username,
               gu.upload_type, gu.title, gu.image_path, gu.location, gu.upload_date
        FROM guide_uploads gu
        JOIN users u ON gu.guide_id = u.id
        ORDER BY gu.upload_date DESC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list content: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(content))
}

/// Deletes a user by ID. Dependent guide profile, bookings and uploads are
/// removed by the schema's ON DELETE CASCADE.
/// Admin only. Prevents deleting self.
pub async fn delete_user(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if id == claims.user_id() {
        return Err(AppError::BadRequest("Cannot delete yourself".to_string()));
    }

    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete user: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!("Admin {} deleted user {}", claims.user_id(), id);

    Ok(StatusCode::NO_CONTENT)
}
