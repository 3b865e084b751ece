use actix_web::{web, error::JsonPayloadError};

use crate::errors::AppError;

const DEFAULT_JSON_LIMIT: usize = 2 * 1024 * 1024;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config(DEFAULT_JSON_LIMIT));
}

/// JSON extractor config whose errors render like every other `AppError`.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| AppError::from(err).into())
}

impl From<JsonPayloadError> for AppError {
    fn from(err: JsonPayloadError) -> Self {
        match err {
            JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                AppError::PayloadTooLarge(format!("JSON payload error: {}", err))
            }
            JsonPayloadError::ContentType => {
                AppError::UnsupportedMediaType(format!("JSON payload error: {}", err))
            }
            _ => AppError::BadRequest(format!("JSON payload error: {}", err)),
        }
    }
}
