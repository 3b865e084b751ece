use actix_multipart::form::MultipartFormConfig;
use actix_web::web;

use crate::{constants::MULTIPART_OVERHEAD, errors::AppError, handlers::images};

use super::json_error::json_config;

pub fn config_routes(max_upload_bytes: usize) -> impl FnOnce(&mut web::ServiceConfig) {
    // Base64 inflates payloads by a third
    let json_limit = max_upload_bytes / 3 * 4 + MULTIPART_OVERHEAD;

    move |cfg| {
        cfg.service(
            web::scope("/images")
                .app_data(
                    MultipartFormConfig::default()
                        .total_limit(max_upload_bytes + MULTIPART_OVERHEAD)
                        .memory_limit(max_upload_bytes + MULTIPART_OVERHEAD)
                        .error_handler(|err, _req| AppError::from(err).into())
                )
                .app_data(json_config(json_limit))
                .service(
                    web::resource("")
                        .route(web::post().to(images::upload_image))
                )
                .service(
                    web::resource("/url")
                        .route(web::post().to(images::import_from_url))
                )
                .service(
                    web::resource("/base64")
                        .route(web::post().to(images::import_from_base64))
                )
                .service(
                    web::resource("/{name}")
                        .route(web::put().to(images::replace_image))
                        .route(web::delete().to(images::delete_image))
                )
        );
    }
}
