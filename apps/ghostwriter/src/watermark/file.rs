use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::errors::AppError;
use crate::watermark::WatermarkStore;

/// Keeps the watermark in a small text file.
///
/// Writes land in a sibling `.tmp` file that is then renamed over the
/// target, so a crash mid-write leaves either the old value or the new one.
#[derive(Debug, Clone)]
pub struct FileWatermarkStore {
    path: PathBuf,
}

impl FileWatermarkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        PathBuf::from(staging)
    }
}

#[async_trait]
impl WatermarkStore for FileWatermarkStore {
    async fn load(&self) -> Result<Option<String>, AppError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn persist(&self, value: &str) -> Result<(), AppError> {
        let staging = self.staging_path();
        tokio::fs::write(&staging, value).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        Ok(())
    }
}
