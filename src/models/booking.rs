// src/models/booking.rs

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Lifecycle of a booking. Transitions are guide-initiated and follow
/// pending -> {confirmed, cancelled}, confirmed -> {completed, cancelled};
/// completed and cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
        )
    }
}

impl FromStr for BookingStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(()),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Departure is always derived, never supplied by the client. `None` when the
/// stay length is negative or the date would overflow the calendar range.
pub fn compute_departure(arrival: NaiveDate, days_to_stay: i32) -> Option<NaiveDate> {
    let days = u64::try_from(days_to_stay).ok()?;
    arrival.checked_add_days(Days::new(days))
}

/// Booking as listed on the tourist dashboard, with the guide's display name.
/// LEFT JOIN: the name is absent if the guide account was deleted.
#[derive(Debug, Serialize, FromRow)]
pub struct TouristBookingView {
    pub id: i64,
    pub guide_id: i64,
    pub guide_name: Option<String>,
    pub native_place: String,
    pub arrival_date: NaiveDate,
    pub departure_date: NaiveDate,
    pub days_to_stay: i32,
    pub group_size: i32,
    pub tour_type: String,
    pub booking_status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Booking as listed on the guide dashboard, with the tourist's identity.
#[derive(Debug, Serialize, FromRow)]
pub struct GuideBookingView {
    pub id: i64,
    pub tourist_id: i64,
    pub tourist_username: String,
    pub tourist_full_name: String,
    pub tourist_name: String,
    pub phone: String,
    pub email: String,
    pub native_place: String,
    pub arrival_date: NaiveDate,
    pub departure_date: NaiveDate,
    pub days_to_stay: i32,
    pub group_size: i32,
    pub tour_type: String,
    pub specific_places: String,
    pub accommodation: String,
    pub transport: String,
    pub dietary_preference: String,
    pub fitness_level: String,
    pub additional_requirements: String,
    pub booking_status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

fn default_group_size() -> i32 {
    1
}

/// DTO for creating a booking. Trip detail fields beyond the required core
/// are optional and default to empty, mirroring the booking form.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub guide_id: i64,

    #[validate(length(min = 1, max = 100, message = "Contact name is required."))]
    pub tourist_name: String,

    #[validate(length(min = 1, max = 20, message = "Phone number is required."))]
    pub phone: String,

    #[serde(default)]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "Native place is required."))]
    pub native_place: String,

    pub arrival_date: NaiveDate,

    #[validate(range(min = 1, max = 365, message = "Stay length must be between 1 and 365 days."))]
    pub days_to_stay: i32,

    #[serde(default = "default_group_size")]
    #[validate(range(min = 1, max = 100))]
    pub group_size: i32,

    #[serde(default)]
    pub tour_type: String,
    #[serde(default)]
    pub specific_places: String,
    #[serde(default)]
    pub accommodation: String,
    #[serde(default)]
    pub transport: String,
    #[serde(default)]
    pub dietary_preference: String,
    #[serde(default)]
    pub fitness_level: String,
    #[serde(default)]
    pub additional_requirements: String,
}
