mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod telemetry;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, routes};
pub use infrastructure::{http, imaging, utils};

use errors::ImageError;
use http::fetcher::HttpImageFetcher;
use repositories::fs_repo::FsImageRepo;
use settings::{AppConfig, ImageSettings};
use use_cases::images::ImageHandler;

pub struct AppState {
    pub image_handler: AppImageHandler,
}

pub type AppImageHandler = ImageHandler<FsImageRepo>;

impl AppState {
    /// Builds the shared state once: opens (and creates) the images directory
    /// and freezes the image settings.
    pub async fn new(config: &AppConfig) -> Result<Self, ImageError> {
        let settings = ImageSettings::from(config);
        let storage = FsImageRepo::open(&settings.dir).await?;
        let fetcher = HttpImageFetcher::new(config.remote_fetch_timeout(), config.max_upload_bytes)?;

        Ok(AppState {
            image_handler: ImageHandler::new(storage, settings, fetcher),
        })
    }
}
