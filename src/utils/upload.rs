// src/utils/upload.rs

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::AppError;

/// Subdirectory of the media root holding question images.
pub const QUESTION_IMAGE_DIR: &str = "questions";

/// Keeps the extension of an uploaded file name when it is short and alphanumeric.
pub fn safe_extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8)
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
}

/// Writes an uploaded question image under `media_dir/questions/` using the
/// current time in nanoseconds as the file name.
///
/// Returns the path relative to `media_dir`, as stored in `questions.image`.
pub async fn save_question_image(
    media_dir: &Path,
    original_name: &str,
    bytes: &[u8],
) -> Result<String, AppError> {
    let dir = media_dir.join(QUESTION_IMAGE_DIR);
    tokio::fs::create_dir_all(&dir).await?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_nanos();
    let file_name = match safe_extension(original_name) {
        Some(ext) => format!("{}.{}", nanos, ext),
        None => nanos.to_string(),
    };

    tokio::fs::write(dir.join(&file_name), bytes).await?;
    tracing::info!("Saved question image {}", file_name);

    Ok(format!("{}/{}", QUESTION_IMAGE_DIR, file_name))
}

/// Removes a stored question image. Only plain `questions/<file>` paths are
/// touched; failures are logged and otherwise ignored.
pub async fn remove_question_image(media_dir: &Path, relative: &str) {
    let Some(file_name) = relative.strip_prefix(&format!("{}/", QUESTION_IMAGE_DIR)) else {
        return;
    };
    if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name.starts_with('.') {
        return;
    }

    let path = media_dir.join(QUESTION_IMAGE_DIR).join(file_name);
    if let Err(e) = tokio::fs::remove_file(&path).await {
        tracing::warn!("Could not remove question image {}: {}", path.display(), e);
    }
}
