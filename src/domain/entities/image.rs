use std::fmt;

use actix_multipart::form::{tempfile::TempFile, MultipartForm};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::errors::ImageError;

pub const IMAGE_EXTENSION: &str = "webp";

/// Opaque name shared by every size derivative of one uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ImageName(String);

impl ImageName {
    pub fn generate() -> Self {
        ImageName(format!("{}.{}", Uuid::new_v4().simple(), IMAGE_EXTENSION))
    }

    /// Accepts a name received from a caller. Anything that could escape the
    /// images directory is rejected.
    pub fn parse(raw: &str) -> Result<Self, ImageError> {
        let name = raw.trim();

        if name.is_empty() {
            return Err(ImageError::InvalidName("name is empty".into()));
        }
        if name.contains(['/', '\\', '\0']) || name.contains("..") {
            return Err(ImageError::InvalidName(name.to_string()));
        }
        if !name.ends_with(&format!(".{}", IMAGE_EXTENSION)) {
            return Err(ImageError::InvalidName(name.to_string()));
        }

        Ok(ImageName(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the derivative for one configured size.
    pub fn derivative_file(&self, size: u32) -> String {
        format!("{}_{}", size, self.0)
    }
}

impl fmt::Display for ImageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ImageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One written derivative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Derivative {
    pub size: u32,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct IngestedImage {
    pub name: ImageName,
    pub derivatives: Vec<Derivative>,
}

// ───── API Request Models ───────────────────────────────────────────

#[derive(Debug, MultipartForm)]
pub struct ImageUpload {
    #[multipart(rename = "image")]
    pub image: TempFile,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RemoteImageRequest {
    #[validate(url(message = "Must be a valid URL"))]
    pub url: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct Base64ImageRequest {
    #[validate(length(min = 1, message = "Payload cannot be empty"))]
    pub data: String,
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DerivativeLink {
    pub size: u32,
    pub file_name: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Serialize)]
pub struct ImageCreatedResponse {
    pub name: ImageName,
    pub derivatives: Vec<DerivativeLink>,
}

impl ImageCreatedResponse {
    pub fn new(image: IngestedImage, url_prefix: &str) -> Self {
        let derivatives = image.derivatives
            .into_iter()
            .map(|d| DerivativeLink {
                url: format!("{}/{}", url_prefix, d.file_name),
                size: d.size,
                file_name: d.file_name,
                width: d.width,
                height: d.height,
            })
            .collect();

        ImageCreatedResponse {
            name: image.name,
            derivatives,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_names_are_webp() {
        let name = ImageName::generate();
        assert!(name.as_str().ends_with(".webp"));
        assert_eq!(name.as_str().len(), 32 + ".webp".len());
    }

    #[test]
    fn derivative_file_prefixes_size() {
        let name = ImageName::parse("abc.webp").unwrap();
        assert_eq!(name.derivative_file(300), "300_abc.webp");
    }

    #[test]
    fn parse_rejects_traversal_and_wrong_extension() {
        assert!(ImageName::parse("").is_err());
        assert!(ImageName::parse("../etc/passwd.webp").is_err());
        assert!(ImageName::parse("a/b.webp").is_err());
        assert!(ImageName::parse("a\\b.webp").is_err());
        assert!(ImageName::parse("picture.png").is_err());
        assert!(ImageName::parse("picture.webp").is_ok());
    }

    #[test]
    fn response_builds_public_urls() {
        let name = ImageName::parse("abc.webp").unwrap();
        let image = IngestedImage {
            derivatives: vec![Derivative {
                size: 75,
                file_name: name.derivative_file(75),
                width: 75,
                height: 40,
            }],
            name,
        };

        let response = ImageCreatedResponse::new(image, "/images");
        assert_eq!(response.derivatives[0].url, "/images/75_abc.webp");
    }
}
