// src/handlers/content.rs

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    config::Config,
    error::AppError,
    models::content::{ContentFields, ContentItem, ContentWithGuide, RecentContentParams},
    utils::{html::clean_html, jwt::Claims, upload},
};

/// One parsed multipart form: the text fields plus an accepted image, if any.
/// Images failing the extension allow-list are silently dropped, like the
/// original upload form.
struct ContentForm {
    fields: ContentFields,
    image: Option<(String, Bytes)>,
}

async fn parse_content_form(mut multipart: Multipart) -> Result<ContentForm, AppError> {
    let mut fields = ContentFields::default();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if !filename.is_empty() && !data.is_empty() && upload::allowed_file(&filename) {
                    image = Some((filename, data));
                }
            }
            _ => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                match name.as_str() {
                    "upload_type" => fields.upload_type = value,
                    "title" => fields.title = clean_html(&value),
                    "description" => fields.description = clean_html(&value),
                    "location" => fields.location = value,
                    _ => {}
                }
            }
        }
    }

    Ok(ContentForm { fields, image })
}

/// Publishes a new content item for the acting guide.
///
/// Two-phase: the image (if any) is written to disk first, then the row is
/// inserted with the relative path, or an empty string when there is no image.
pub async fn upload_content(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let guide_id = claims.user_id();
    let form = parse_content_form(multipart).await?;

    if !form.fields.has_required_fields() {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    }

    let image_path = match &form.image {
        Some((filename, data)) => {
            let stored_name = upload::unique_filename(filename);
            upload::save_image(&config.upload_dir, &stored_name, data).await?
        }
        None => String::new(),
    };

    let content_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO guide_uploads (guide_id, upload_type, title, description, image_path, location)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(guide_id)
    .bind(&form.fields.upload_type)
    .bind(&form.fields.title)
    .bind(&form.fields.description)
    .bind(&image_path)
    .bind(&form.fields.location)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to insert content: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Content uploaded successfully! It will appear on the homepage.",
            "id": content_id,
        })),
    ))
}

/// Edits a content item owned by the acting guide.
///
/// A valid replacement image removes the previous file best-effort before the
/// new one is stored; without a replacement the existing path is preserved.
pub async fn edit_content(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    Path(content_id): Path<i64>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let guide_id = claims.user_id();

    let existing = sqlx::query_as::<_, ContentItem>(
        r#"
        SELECT id, guide_id, upload_type, title, description, image_path, location, upload_date
        FROM guide_uploads
        WHERE id = $1 AND guide_id = $2
        "#,
    )
    .bind(content_id)
    .bind(guide_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound(
        "Content not found or access denied".to_string(),
    ))?;

    let form = parse_content_form(multipart).await?;

    if !form.fields.has_required_fields() {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    }

    let image_path = match &form.image {
        Some((filename, data)) => {
            upload::delete_image_best_effort(&config.upload_dir, &existing.image_path).await;
            let stored_name = upload::unique_filename(filename);
            upload::save_image(&config.upload_dir, &stored_name, data).await?
        }
        None => existing.image_path,
    };

    sqlx::query(
        r#"
        UPDATE guide_uploads
        SET upload_type = $1, title = $2, description = $3, location = $4, image_path = $5
        WHERE id = $6 AND guide_id = $7
        "#,
    )
    .bind(&form.fields.upload_type)
    .bind(&form.fields.title)
    .bind(&form.fields.description)
    .bind(&form.fields.location)
    .bind(&image_path)
    .bind(content_id)
    .bind(guide_id)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update content: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(json!({
        "success": true,
        "message": "Content updated successfully!",
    })))
}

/// Deletes a content item owned by the acting guide. The image file removal
/// is best-effort; the row is deleted regardless, so an orphan file is
/// possible but an orphan row is not.
pub async fn delete_content(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    Path(content_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let guide_id = claims.user_id();

    let existing = sqlx::query_as::<_, ContentItem>(
        r#"
        SELECT id, guide_id, upload_type, title, description, image_path, location, upload_date
        FROM guide_uploads
        WHERE id = $1 AND guide_id = $2
        "#,
    )
    .bind(content_id)
    .bind(guide_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound(
        "Content not found or access denied".to_string(),
    ))?;

    upload::delete_image_best_effort(&config.upload_dir, &existing.image_path).await;

    sqlx::query("DELETE FROM guide_uploads WHERE id = $1 AND guide_id = $2")
        .bind(content_id)
        .bind(guide_id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete content: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    tracing::info!("Deleted content {} for guide {}", content_id, guide_id);

    Ok(Json(json!({
        "success": true,
        "message": "Content deleted successfully",
    })))
}

/// The acting guide's own content, newest first, for the management panel.
pub async fn list_my_content(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let guide_id = claims.user_id();

    let content = sqlx::query_as::<_, ContentItem>(
        r#"
        SELECT id, guide_id, upload_type, title, description, image_path, location, upload_date
        FROM guide_uploads
        WHERE guide_id = $1
        ORDER BY upload_date DESC
        "#,
    )
    .bind(guide_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "success": true, "content": content })))
}

/// Latest published content across all guides, for the public homepage.
pub async fn list_recent(
    State(pool): State<PgPool>,
    Query(params): Query<RecentContentParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params.limit.unwrap_or(12).clamp(1, 50);

    let content = sqlx::query_as::<_, ContentWithGuide>(
        r#"
        SELECT gu.id, gu.guide_id, gu.upload_type, gu.title, gu.description,
               gu.image_path, gu.location, gu.upload_date,
               u.full_name AS guide_name, u.username AS guide_username
        FROM guide_uploads gu
        JOIN users u ON gu.guide_id = u.id
        WHERE u.user_type = 'guide'
        ORDER BY gu.upload_date DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch recent content: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(json!({ "success": true, "content": content })))
}

/// Public detail view of a single content item.
pub async fn get_content(
    State(pool): State<PgPool>,
    Path(content_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let content = sqlx::query_as::<_, ContentWithGuide>(
        r#"
        SELECT gu.id, gu.guide_id, gu.upload_type, gu.title, gu.description,
               gu.image_path, gu.location, gu.upload_date,
               u.full_name AS guide_name, u.username AS guide_username
        FROM guide_uploads gu
        JOIN users u ON gu.guide_id = u.id
        WHERE gu.id = $1
        "#,
    )
    .bind(content_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Content not found".to_string()))?;

    Ok(Json(json!({ "success": true, "content": content })))
}
