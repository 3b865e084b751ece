use actix_multipart::form::MultipartForm;
use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::{
    entities::image::{Base64ImageRequest, ImageCreatedResponse, ImageName, ImageUpload, IngestedImage, RemoteImageRequest},
    errors::{AppError, ImageError},
    AppState,
};

fn created(state: &AppState, image: IngestedImage) -> HttpResponse {
    let url_prefix = &state.image_handler.settings.url_prefix;
    HttpResponse::Created().json(ImageCreatedResponse::new(image, url_prefix))
}

fn failed(e: ImageError) -> HttpResponse {
    AppError::from(e).to_http_response()
}

pub async fn upload_image(
    state: web::Data<AppState>,
    form: MultipartForm<ImageUpload>,
) -> impl Responder {
    let form = form.into_inner();

    match state.image_handler.ingest_from_upload(form.image).await {
        Ok(image) => created(&state, image),
        Err(e) => failed(e),
    }
}

pub async fn import_from_url(
    state: web::Data<AppState>,
    request: web::Json<RemoteImageRequest>,
) -> impl Responder {
    if let Err(err) = request.validate() {
        return AppError::from(err).to_http_response();
    }

    match state.image_handler.ingest_from_url(&request.url).await {
        Ok(image) => created(&state, image),
        Err(e) => failed(e),
    }
}

pub async fn import_from_base64(
    state: web::Data<AppState>,
    request: web::Json<Base64ImageRequest>,
) -> impl Responder {
    if let Err(err) = request.validate() {
        return AppError::from(err).to_http_response();
    }

    match state.image_handler.ingest_from_base64(&request.data).await {
        Ok(image) => created(&state, image),
        Err(e) => failed(e),
    }
}

/// Uploads a new image for an owner and drops the one it replaces.
pub async fn replace_image(
    state: web::Data<AppState>,
    name: web::Path<String>,
    form: MultipartForm<ImageUpload>,
) -> impl Responder {
    let old = match ImageName::parse(&name) {
        Ok(old) => old,
        Err(e) => return failed(e),
    };
    let upload = form.into_inner().image;

    let bytes = match state.image_handler.read_upload(&upload).await {
        Ok(bytes) => bytes,
        Err(e) => return failed(e),
    };

    match state.image_handler.replace(Some(&old), bytes).await {
        Ok(image) => created(&state, image),
        Err(e) => failed(e),
    }
}

pub async fn delete_image(
    state: web::Data<AppState>,
    name: web::Path<String>,
) -> impl Responder {
    let name = match ImageName::parse(&name) {
        Ok(name) => name,
        Err(e) => return failed(e),
    };

    match state.image_handler.purge(&name).await {
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(e) => failed(e),
    }
}
