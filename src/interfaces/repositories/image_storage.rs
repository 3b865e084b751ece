use std::io::ErrorKind;

use async_trait::async_trait;
use tokio::fs;

use crate::{errors::ImageError, repositories::fs_repo::FsImageRepo};

const WRITE_CHECK_FILE: &str = ".write-check";

/// Where derivative files live. File names are `{size}_{logical name}`.
#[async_trait]
pub trait ImageStorage: Send + Sync {
    async fn check_writable(&self) -> Result<(), ImageError>;
    async fn write(&self, file_name: &str, data: &[u8]) -> Result<(), ImageError>;
    /// Returns `false` when there was nothing to remove.
    async fn remove(&self, file_name: &str) -> Result<bool, ImageError>;
    async fn read(&self, file_name: &str) -> Result<Option<Vec<u8>>, ImageError>;
}

#[async_trait]
impl ImageStorage for FsImageRepo {
    async fn check_writable(&self) -> Result<(), ImageError> {
        let check_file = self.path_of(WRITE_CHECK_FILE);
        fs::write(&check_file, b"ok").await?;
        fs::remove_file(&check_file).await?;
        Ok(())
    }

    async fn write(&self, file_name: &str, data: &[u8]) -> Result<(), ImageError> {
        fs::write(self.path_of(file_name), data).await?;
        Ok(())
    }

    async fn remove(&self, file_name: &str) -> Result<bool, ImageError> {
        match fs::remove_file(self.path_of(file_name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn read(&self, file_name: &str) -> Result<Option<Vec<u8>>, ImageError> {
        match fs::read(self.path_of(file_name)).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
