#![allow(dead_code)]

use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use image_derivatives::{
    http::fetcher::HttpImageFetcher,
    repositories::fs_repo::FsImageRepo,
    routes::configure_routes,
    settings::ImageSettings,
    use_cases::images::ImageHandler,
    AppState,
};
use reqwest::{multipart, Client};
use std::{io::Cursor, net::TcpListener, path::{Path, PathBuf}, time::Duration};
use tempfile::TempDir;

pub const TEST_SIZES: [u32; 3] = [75, 300, 800];
pub const TEST_MAX_UPLOAD: usize = 5 * 1024 * 1024;

pub fn test_settings(dir: &Path, sizes: &[u32]) -> ImageSettings {
    ImageSettings {
        dir: dir.to_path_buf(),
        sizes: sizes.to_vec().into(),
        url_prefix: "/images".to_string(),
        max_upload_bytes: TEST_MAX_UPLOAD,
    }
}

pub fn test_fetcher() -> HttpImageFetcher {
    HttpImageFetcher::new(Duration::from_secs(2), TEST_MAX_UPLOAD).expect("Failed to build fetcher")
}

pub async fn fs_handler(dir: &Path, sizes: &[u32]) -> ImageHandler<FsImageRepo> {
    let storage = FsImageRepo::open(dir).await.expect("Failed to open image storage");
    ImageHandler::new(storage, test_settings(dir, sizes), test_fetcher())
}

/// A PNG with a gradient so the encoder has something to chew on.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });

    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut cursor, ImageFormat::Png)
        .expect("Failed to encode test PNG");
    cursor.into_inner()
}

pub fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read images dir")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

pub fn dimensions_of(path: &Path) -> (u32, u32) {
    let img = image::open(path).expect("Derivative is not a decodable image");
    (img.width(), img.height())
}

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub images_dir: PathBuf,
    _tmp: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let tmp = tempfile::tempdir().expect("Failed to create temp dir");
        let images_dir = tmp.path().join("images");

        let state = web::Data::new(AppState {
            image_handler: fs_handler(&images_dir, &TEST_SIZES).await,
        });

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let server = HttpServer::new(move || {
            let settings = state.image_handler.settings.clone();
            App::new()
                .app_data(state.clone())
                .wrap(NormalizePath::trim())
                .configure(configure_routes(settings))
        })
        .listen(listener)
        .expect("Failed to bind server")
        .workers(1)
        .run();

        tokio::spawn(server);

        let client = Client::new();
        while client.get(format!("{}/health", address)).send().await.is_err() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        Self {
            address,
            client,
            images_dir,
            _tmp: tmp,
        }
    }

    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> reqwest::Response {
        self.client
            .post(format!("{}/api/v1/images", self.address))
            .multipart(image_form(file_name, bytes))
            .send()
            .await
            .expect("Failed to upload image")
    }

    pub async fn replace(&self, old_name: &str, file_name: &str, bytes: Vec<u8>) -> reqwest::Response {
        self.client
            .put(format!("{}/api/v1/images/{}", self.address, old_name))
            .multipart(image_form(file_name, bytes))
            .send()
            .await
            .expect("Failed to replace image")
    }

    pub async fn delete(&self, name: &str) -> reqwest::Response {
        self.client
            .delete(format!("{}/api/v1/images/{}", self.address, name))
            .send()
            .await
            .expect("Failed to delete image")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to send GET")
    }
}

fn image_form(file_name: &str, bytes: Vec<u8>) -> multipart::Form {
    let part = multipart::Part::bytes(bytes)
        .file_name(file_name.to_string())
        .mime_str("application/octet-stream")
        .expect("Invalid mime");
    multipart::Form::new().part("image", part)
}
