use actix_web::{
    http::header::{CacheControl, CacheDirective},
    web, HttpResponse, Responder,
};

use crate::{errors::{AppError, ImageError}, AppState};

/// Serves one derivative straight from storage.
pub async fn serve_derivative(
    state: web::Data<AppState>,
    file_name: web::Path<String>,
) -> impl Responder {
    match state.image_handler.read_derivative(&file_name).await {
        Ok(Some(data)) => HttpResponse::Ok()
            .content_type("image/webp")
            .insert_header(CacheControl(vec![
                CacheDirective::Public,
                CacheDirective::MaxAge(31_536_000),
            ]))
            .body(data),
        Ok(None) | Err(ImageError::InvalidName(_)) => {
            AppError::NotFound(format!("Image {} not found", file_name)).to_http_response()
        }
        Err(e) => AppError::from(e).to_http_response(),
    }
}

