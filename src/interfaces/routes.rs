use actix_web::web;

use crate::{handlers::{home::home, system::health_check}, settings::ImageSettings};

mod images;
mod files;
mod json_error;

/// Registers every route. Takes the image settings because the upload limit
/// and the public prefix of derivative files come from configuration.
pub fn configure_routes(settings: ImageSettings) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.service(home);
        cfg.service(health_check);

        cfg.service(
            web::scope("/api/v1")
                .configure(images::config_routes(settings.max_upload_bytes))
        );

        cfg.configure(files::config_routes(settings.url_prefix));
        cfg.configure(json_error::config_routes);
    }
}
