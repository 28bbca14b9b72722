// src/handlers/booking.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        booking::{
            BookingStatus, CreateBookingRequest, GuideBookingView, TouristBookingView,
            compute_departure,
        },
        guide::GuideListing,
    },
    utils::jwt::Claims,
};

/// Lists guides currently accepting bookings, for the tourist dashboard.
pub async fn list_available_guides(
    State(pool): State<PgPool>,
) -> Result<impl IntoResponse, AppError> {
    let guides = sqlx::query_as::<_, GuideListing>(
        r#"
        SELECT u.id AS user_id, u.full_name AS guide_name, u.username,
               g.specialization, g.experience_years, g.languages_spoken,
               g.location, g.price_per_day, g.rating, g.availability_status
        FROM users u
        JOIN guides g ON u.id = g.user_id
        WHERE g.availability_status = 'available' AND u.user_type = 'guide'
        ORDER BY u.id
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list guides: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(guides))
}

/// Single guide detail, shown on the booking form. Availability is not
/// filtered here; the form shows the guide's current status.
pub async fn get_guide(
    State(pool): State<PgPool>,
    Path(guide_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let guide = sqlx::query_as::<_, GuideListing>(
        r#"
        SELECT u.id AS user_id, u.full_name AS guide_name, u.username,
               g.specialization, g.experience_years, g.languages_spoken,
               g.location, g.price_per_day, g.rating, g.availability_status
        FROM users u
        JOIN guides g ON u.id = g.user_id
        WHERE u.id = $1 AND u.user_type = 'guide'
        "#,
    )
    .bind(guide_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Guide not found".to_string()))?;

    Ok(Json(json!({ "success": true, "content": guide })))
}

/// Creates a booking request against a guide.
///
/// The guide reference is re-checked against the users table before the
/// insert; departure_date is derived from arrival_date + days_to_stay.
pub async fn create_booking(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let tourist_id = claims.user_id();

    let guide: Option<i64> =
        sqlx::query_scalar("SELECT id FROM users WHERE id = $1 AND user_type = 'guide'")
            .bind(payload.guide_id)
            .fetch_optional(&pool)
            .await?;
    if guide.is_none() {
        return Err(AppError::BadRequest("Invalid guide selection".to_string()));
    }

    let departure_date = compute_departure(payload.arrival_date, payload.days_to_stay)
        .ok_or_else(|| AppError::BadRequest("Invalid arrival date".to_string()))?;

    let booking_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO bookings (
            tourist_id, guide_id, tourist_name, phone, email, native_place,
            arrival_date, departure_date, days_to_stay, group_size, tour_type,
            specific_places, accommodation, transport, dietary_preference,
            fitness_level, additional_requirements, booking_status
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
        RETURNING id
        "#,
    )
    .bind(tourist_id)
    .bind(payload.guide_id)
    .bind(&payload.tourist_name)
    .bind(&payload.phone)
    .bind(&payload.email)
    .bind(&payload.native_place)
    .bind(payload.arrival_date)
    .bind(departure_date)
    .bind(payload.days_to_stay)
    .bind(payload.group_size)
    .bind(&payload.tour_type)
    .bind(&payload.specific_places)
    .bind(&payload.accommodation)
    .bind(&payload.transport)
    .bind(&payload.dietary_preference)
    .bind(&payload.fitness_level)
    .bind(&payload.additional_requirements)
    .bind(BookingStatus::Pending.as_str())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create booking: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Booking request sent successfully! Your guide will contact you within 24 hours.",
            "id": booking_id,
        })),
    ))
}

/// The tourist's own bookings, newest first. The guide name is joined but may
/// be absent if the guide account was deleted.
pub async fn list_my_bookings(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let tourist_id = claims.user_id();

    let bookings = sqlx::query_as::<_, TouristBookingView>(
        r#"
        SELECT b.id, b.guide_id, u.full_name AS guide_name,
               b.native_place, b.arrival_date, b.departure_date, b.days_to_stay,
               b.group_size, b.tour_type, b.booking_status, b.created_at
        FROM bookings b
        LEFT JOIN users u ON b.guide_id = u.id
        WHERE b.tourist_id = $1
        ORDER BY b.created_at DESC
        "#,
    )
    .bind(tourist_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(bookings))
}

/// The guide's incoming bookings with the requesting tourist's identity,
/// newest first.
pub async fn list_guide_bookings(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let guide_id = claims.user_id();

    let bookings = sqlx::query_as::<_, GuideBookingView>(
        r#"
        SELECT b.id, b.tourist_id, u.username AS tourist_username,
               u.full_name AS tourist_full_name,
               b.tourist_name, b.phone, b.email, b.native_place,
               b.arrival_date, b.departure_date, b.days_to_stay, b.group_size,
               b.tour_type, b.specific_places, b.accommodation, b.transport,
               b.dietary_preference, b.fitness_level, b.additional_requirements,
               b.booking_status, b.created_at
        FROM bookings b
        JOIN users u ON b.tourist_id = u.id
        WHERE b.guide_id = $1
        ORDER BY b.created_at DESC
        "#,
    )
    .bind(guide_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(bookings))
}

/// Transitions a booking's status. Only the owning guide may do so, and only
/// along the allowed edges of the status machine.
pub async fn update_booking_status(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path((booking_id, status)): Path<(i64, String)>,
) -> Result<impl IntoResponse, AppError> {
    let guide_id = claims.user_id();

    let new_status: BookingStatus = status
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Unknown booking status '{}'", status)))?;

    let row: Option<(i64, String)> =
        sqlx::query_as("SELECT guide_id, booking_status FROM bookings WHERE id = $1")
            .bind(booking_id)
            .fetch_optional(&pool)
            .await?;

    let (owner_id, current) = row.ok_or(AppError::NotFound("Booking not found".to_string()))?;

    if owner_id != guide_id {
        return Err(AppError::Forbidden(
            "Access denied. This booking does not belong to you.".to_string(),
        ));
    }

    let current_status: BookingStatus = current
        .parse()
        .map_err(|_| AppError::InternalServerError(format!("Corrupt booking status '{}'", current)))?;

    if !current_status.can_transition_to(new_status) {
        return Err(AppError::BadRequest(format!(
            "Cannot change booking status from '{}' to '{}'",
            current_status, new_status
        )));
    }

    sqlx::query("UPDATE bookings SET booking_status = $1 WHERE id = $2 AND guide_id = $3")
        .bind(new_status.as_str())
        .bind(booking_id)
        .bind(guide_id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update booking status: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    let message = match new_status {
        BookingStatus::Confirmed => "Booking confirmed successfully! Tourist will be notified.",
        BookingStatus::Completed => "Tour marked as completed successfully!",
        BookingStatus::Cancelled => "Booking cancelled. Tourist will be notified.",
        BookingStatus::Pending => "Booking status updated successfully!",
    };

    Ok(Json(json!({ "success": true, "message": message })))
}
