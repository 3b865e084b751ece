use actix_web::web;

use crate::handlers::files;

pub fn config_routes(url_prefix: String) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.service(
            web::scope(&url_prefix)
                .route("/{file_name}", web::get().to(files::serve_derivative))
        );
    }
}
