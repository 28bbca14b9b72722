// src/models/content.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'guide_uploads' table: a published piece of tourism
/// content. `image_path` is relative to the upload root, or empty when the
/// item has no image.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContentItem {
    pub id: i64,
    pub guide_id: i64,
    pub upload_type: String,
    pub title: String,
    pub description: String,
    pub image_path: String,
    pub location: String,
    pub upload_date: chrono::DateTime<chrono::Utc>,
}

/// Content item joined with its owning guide's display identity, used on the
/// public homepage and the detail view.
#[derive(Debug, Serialize, FromRow)]
pub struct ContentWithGuide {
    pub id: i64,
    pub guide_id: i64,
    pub upload_type: String,
    pub title: String,
    pub description: String,
    pub image_path: String,
    pub location: String,
    pub upload_date: chrono::DateTime<chrono::Utc>,
    pub guide_name: String,
    pub guide_username: String,
}

/// Query parameters for the public recent-content listing.
#[derive(Debug, Deserialize)]
pub struct RecentContentParams {
    pub limit: Option<i64>,
}

/// Text fields of an upload or edit, collected from the multipart form.
#[derive(Debug, Default)]
pub struct ContentFields {
    pub upload_type: String,
    pub title: String,
    pub description: String,
    pub location: String,
}

impl ContentFields {
    /// The form requires type, title and description; location is optional.
    pub fn has_required_fields(&self) -> bool {
        !self.upload_type.trim().is_empty()
            && !self.title.trim().is_empty()
            && !self.description.trim().is_empty()
    }
}
