use std::path::Path;

use infer::Infer;
use tokio::fs;

use crate::errors::ImageError;

const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];

/// Checks the original file name of an upload against the allowed image extensions.
pub fn validate_extension(original_filename: Option<&str>) -> Result<(), ImageError> {
    let ext = original_filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase());

    match ext {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(ImageError::InvalidExtension),
    }
}

/// Sniffs the content type. Unknown content passes through; the decoder has
/// the final word.
pub fn validate_content(bytes: &[u8]) -> Result<(), ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::EmptyFile);
    }

    match Infer::new().get(bytes) {
        Some(kind) if !kind.mime_type().starts_with("image/") => {
            Err(ImageError::InvalidType(kind.mime_type().to_string()))
        }
        _ => Ok(()),
    }
}

/// Validates an uploaded file and reads it fully into memory.
///
/// - `original_filename`: the filename from `TempFile::file_name`
/// - `file_path`: the path from `TempFile::file.path()`
/// - `max_size`: max size in bytes
pub async fn read_image_upload(
    original_filename: Option<&str>,
    file_path: &Path,
    max_size: usize,
) -> Result<Vec<u8>, ImageError> {
    validate_extension(original_filename)?;

    let metadata = fs::metadata(file_path).await?;
    if metadata.len() > max_size as u64 {
        return Err(ImageError::TooLarge(max_size));
    }

    let bytes = fs::read(file_path).await?;
    validate_content(&bytes)?;

    Ok(bytes)
}
