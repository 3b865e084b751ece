use std::sync::Arc;

use actix_multipart::form::tempfile::TempFile;
use futures::future::join_all;
use image::DynamicImage;
use tracing::{error, info, warn};

use crate::{
    entities::image::{Derivative, ImageName, IngestedImage},
    errors::ImageError,
    http::fetcher::HttpImageFetcher,
    imaging::{derivative, upload::read_image_upload},
    repositories::image_storage::ImageStorage,
    settings::ImageSettings,
    utils::base64_payload::decode_payload,
};

/// Turns raw image bytes into one WebP derivative per configured size and
/// removes them again on request.
pub struct ImageHandler<S>
where
    S: ImageStorage,
{
    pub storage: S,
    pub settings: ImageSettings,
    pub fetcher: HttpImageFetcher,
}

impl<S> ImageHandler<S>
where
    S: ImageStorage,
{
    pub fn new(storage: S, settings: ImageSettings, fetcher: HttpImageFetcher) -> Self {
        ImageHandler { storage, settings, fetcher }
    }

    /// Ingests raw bytes under a fresh logical name.
    ///
    /// Either every configured size is written or none is: when one size
    /// fails, the others are still awaited and then purged.
    pub async fn ingest(&self, bytes: Vec<u8>) -> Result<IngestedImage, ImageError> {
        let name = ImageName::generate();

        let source = tokio::task::spawn_blocking(move || derivative::decode(&bytes)).await??;
        let source = Arc::new(source);

        let units = self.settings.sizes
            .iter()
            .map(|&size| self.write_derivative(source.clone(), &name, size));
        let results = join_all(units).await;

        let mut derivatives = Vec::with_capacity(results.len());
        let mut first_error = None;
        for result in results {
            match result {
                Ok(d) => derivatives.push(d),
                Err(e) if first_error.is_none() => first_error = Some(e),
                Err(e) => warn!("Additional derivative failure for {}: {}", name, e),
            }
        }

        if let Some(err) = first_error {
            warn!("Ingest of {} failed, rolling back: {}", name, err);
            if let Err(e) = self.purge(&name).await {
                error!("Rollback of {} incomplete: {}", name, e);
            }
            return Err(err);
        }

        info!("Ingested {} with {} derivatives", name, derivatives.len());
        Ok(IngestedImage { name, derivatives })
    }

    async fn write_derivative(
        &self,
        source: Arc<DynamicImage>,
        name: &ImageName,
        size: u32,
    ) -> Result<Derivative, ImageError> {
        let rendered = tokio::task::spawn_blocking(move || derivative::render_webp(&source, size)).await??;

        let file_name = name.derivative_file(size);
        self.storage.write(&file_name, &rendered.data).await?;

        Ok(Derivative {
            size,
            file_name,
            width: rendered.width,
            height: rendered.height,
        })
    }

    /// Validates a multipart upload and reads it fully into memory.
    pub async fn read_upload(&self, upload: &TempFile) -> Result<Vec<u8>, ImageError> {
        read_image_upload(
            upload.file_name.as_deref(),
            upload.file.path(),
            self.settings.max_upload_bytes,
        ).await
    }

    pub async fn ingest_from_upload(&self, upload: TempFile) -> Result<IngestedImage, ImageError> {
        let bytes = self.read_upload(&upload).await?;
        self.ingest(bytes).await
    }

    pub async fn ingest_from_url(&self, url: &str) -> Result<IngestedImage, ImageError> {
        let bytes = self.fetcher.fetch(url).await?;
        self.ingest(bytes).await
    }

    /// Best-effort import used for social sign-up avatars: any failure means
    /// "no image".
    pub async fn try_ingest_from_url(&self, url: &str) -> Option<IngestedImage> {
        match self.ingest_from_url(url).await {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("Skipping remote image {}: {}", url, e);
                None
            }
        }
    }

    pub async fn ingest_from_base64(&self, payload: &str) -> Result<IngestedImage, ImageError> {
        let bytes = decode_payload(payload)?;
        if bytes.len() > self.settings.max_upload_bytes {
            return Err(ImageError::TooLarge(self.settings.max_upload_bytes));
        }
        self.ingest(bytes).await
    }

    /// Removes every derivative of `name`. Missing files are skipped, so the
    /// call is idempotent. Returns how many files were actually removed.
    pub async fn purge(&self, name: &ImageName) -> Result<usize, ImageError> {
        let removals = self.settings.sizes
            .iter()
            .map(|&size| {
                let file_name = name.derivative_file(size);
                async move { self.storage.remove(&file_name).await }
            });
        let results = join_all(removals).await;

        let mut removed = 0;
        let mut first_error = None;
        for result in results {
            match result {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(e) => {
                    error!("Failed to remove a derivative of {}: {}", name, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => {
                info!("Purged {} derivatives of {}", removed, name);
                Ok(removed)
            }
        }
    }

    /// Swaps the image of an owning entity. The new image is ingested first;
    /// the old derivatives are purged only once that succeeded.
    pub async fn replace(
        &self,
        old: Option<&ImageName>,
        bytes: Vec<u8>,
    ) -> Result<IngestedImage, ImageError> {
        let image = self.ingest(bytes).await?;

        if let Some(old) = old.filter(|old| **old != image.name) {
            if let Err(e) = self.purge(old).await {
                warn!("New image {} stored but purge of {} failed: {}", image.name, old, e);
            }
        }

        Ok(image)
    }

    /// Resolves a public file name of the form `{size}_{name}` to its bytes.
    /// Names that do not match a configured size are treated as absent.
    pub async fn read_derivative(&self, file_name: &str) -> Result<Option<Vec<u8>>, ImageError> {
        let Some((size, name)) = file_name.split_once('_') else {
            return Ok(None);
        };
        let Ok(size) = size.parse::<u32>() else {
            return Ok(None);
        };
        if !self.settings.sizes.contains(&size) {
            return Ok(None);
        }
        let name = ImageName::parse(name)?;

        self.storage.read(&name.derivative_file(size)).await
    }
}
