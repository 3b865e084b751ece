use std::{fmt, io};

use actix_multipart::MultipartError;
use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse
};
use derive_more::Display;
use serde::Serialize;
use validator::ValidationErrors;

#[derive(Debug)]
pub enum AppError {
    ValidationError(Vec<FieldError>),
    BadRequest(String),
    NotFound(String),
    UnsupportedMediaType(String),
    PayloadTooLarge(String),
    BadGateway(String),
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(errors) => {
                let messages = errors.iter()
                    .map(|e| format!("{}:{}", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "validation error: {}", messages)
            }
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::UnsupportedMediaType(msg) => write!(f, "Unsupported media type: {}", msg),
            AppError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            AppError::BadGateway(msg) => write!(f, "Upstream error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal server error: {}", msg)
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::ValidationError(errors) => {
                serde_json::json!({
                    "error": "Validation failed",
                    "details": errors
                })
            }
            // Internal details stay in the logs
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                serde_json::json!({"error": "Internal server error"})
            }
            _ => {
                serde_json::json!({"error": self.to_string()})
            }
        };
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let field_errors = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(|e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "Invalid value".to_string()),
                })
            })
            .collect();

        AppError::ValidationError(field_errors)
    }
}

impl AppError {
    pub fn to_http_response(&self) -> HttpResponse {
        self.error_response()
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::InternalError(format!("IO error: {}", err))
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        match err {
            MultipartError::ContentTypeIncompatible => {
                AppError::UnsupportedMediaType("Content type incompatible".to_string())
            }
            MultipartError::Payload(_) => {
                AppError::PayloadTooLarge("File too large".to_string())
            }
            _ => AppError::BadRequest(err.to_string()),
        }
    }
}

impl From<ImageError> for AppError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::Decode(_) => AppError::BadRequest("Invalid image".into()),
            ImageError::InvalidBase64(_)
            | ImageError::InvalidUrl(_)
            | ImageError::InvalidName(_)
            | ImageError::InvalidExtension
            | ImageError::EmptyFile => AppError::BadRequest(err.to_string()),
            ImageError::InvalidType(_) => AppError::UnsupportedMediaType(err.to_string()),
            ImageError::TooLarge(_) => AppError::PayloadTooLarge(err.to_string()),
            ImageError::Transport(_) => AppError::BadGateway(err.to_string()),
            ImageError::Encode(_)
            | ImageError::Storage(_)
            | ImageError::TaskFailed(_) => AppError::InternalError(err.to_string()),
        }
    }
}

/// Errors raised while ingesting, rendering or purging image derivatives.
#[derive(Debug, Display)]
pub enum ImageError {
    #[display("Failed to decode image: {_0}")]
    Decode(String),

    #[display("Failed to encode WebP derivative: {_0}")]
    Encode(String),

    #[display("Failed to fetch remote image: {_0}")]
    Transport(String),

    #[display("Invalid image URL: {_0}")]
    InvalidUrl(String),

    #[display("Invalid base64 payload: {_0}")]
    InvalidBase64(String),

    #[display("Invalid image name: {_0}")]
    InvalidName(String),

    #[display("Invalid file extension. Allowed: jpg, jpeg, png, webp, gif")]
    InvalidExtension,

    #[display("Invalid MIME type: {_0}")]
    InvalidType(String),

    #[display("Image exceeds the maximum size of {_0} bytes")]
    TooLarge(usize),

    #[display("File is empty")]
    EmptyFile,

    #[display("Storage error: {_0}")]
    Storage(io::Error),

    #[display("Image task failed: {_0}")]
    TaskFailed(String),
}

impl std::error::Error for ImageError {}

impl From<io::Error> for ImageError {
    fn from(err: io::Error) -> Self {
        ImageError::Storage(err)
    }
}

impl From<reqwest::Error> for ImageError {
    fn from(err: reqwest::Error) -> Self {
        ImageError::Transport(err.to_string())
    }
}

impl From<base64::DecodeError> for ImageError {
    fn from(err: base64::DecodeError) -> Self {
        ImageError::InvalidBase64(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ImageError {
    fn from(err: tokio::task::JoinError) -> Self {
        ImageError::TaskFailed(err.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}
