use std::path::{Path, PathBuf};

use tracing::info;

/// Derivative storage backed by one flat directory on local disk.
#[derive(Clone, Debug)]
pub struct FsImageRepo {
    pub dir: PathBuf,
}

impl FsImageRepo {
    /// Opens the storage directory, creating it if absent.
    pub async fn open(dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        info!("Image storage ready at {}", dir.display());

        Ok(FsImageRepo { dir })
    }

    pub fn path_of(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }
}
