// src/utils/upload.rs

use chrono::Local;
use std::path::Path;

use crate::error::AppError;

/// Image extensions accepted for guide uploads.
const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Returns true when the filename carries an allow-listed image extension.
pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        }
        _ => false,
    }
}

/// Reduces a client-supplied filename to a safe basename: path components are
/// dropped and anything outside [A-Za-z0-9._-] is replaced with '_'.
pub fn sanitize_filename(filename: &str) -> String {
    let basename = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    basename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Builds a collision-free storage name: local-timestamp prefix plus the
/// sanitized original name.
pub fn unique_filename(original: &str) -> String {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S_");
    format!("{}{}", timestamp, sanitize_filename(original))
}

/// Writes the uploaded bytes under the upload root, creating the directory on
/// first use. Returns the path stored in the database: `uploads/<filename>`.
pub async fn save_image(upload_dir: &str, filename: &str, data: &[u8]) -> Result<String, AppError> {
    tokio::fs::create_dir_all(upload_dir).await?;
    let path = Path::new(upload_dir).join(filename);
    tokio::fs::write(&path, data).await?;
    Ok(format!("uploads/{}", filename))
}

/// Best-effort removal of a previously stored image. `image_path` is the
/// database value (`uploads/<filename>`); only its basename is honored so a
/// corrupted row cannot point the delete outside the upload root. Failure is
/// logged and swallowed: the row operation proceeds regardless.
pub async fn delete_image_best_effort(upload_dir: &str, image_path: &str) {
    if image_path.is_empty() {
        return;
    }
    let Some(basename) = Path::new(image_path).file_name() else {
        return;
    };
    let path = Path::new(upload_dir).join(basename);
    if let Err(e) = tokio::fs::remove_file(&path).await {
        tracing::warn!("Could not delete image file {}: {}", path.display(), e);
    }
}
