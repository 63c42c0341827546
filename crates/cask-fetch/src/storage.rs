use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use cask_version::Version;
use thiserror::Error;

use crate::artifact;

/// A cached blob plus the moment it was written. Staleness is judged by
/// the caller; storage only reports facts.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub data: Vec<u8>,
    pub written_at: SystemTime,
}

#[derive(Debug, Error)]
pub enum CacheError {
    /// The entry has never been stored. Distinct from I/O failure so
    /// callers can treat it as a normal fallthrough.
    #[error("cache miss: {0}")]
    Miss(String),

    /// The entry exists but its freshness window has passed. Produced by
    /// the caching layer, never by storage itself.
    #[error("cached entry is stale: {0}")]
    Stale(String),

    #[error("invalid artifact name: {0}")]
    InvalidName(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Persistence for the version listing and artifacts.
///
/// Implementations own their entries exclusively; callers never touch the
/// underlying files directly. No staleness policy lives here.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    async fn read_listing(&self) -> Result<StoredEntry, CacheError>;

    async fn store_listing(&self, data: &[u8]) -> Result<(), CacheError>;

    async fn read_artifact(
        &self,
        version: &Version,
        artifact: &str,
    ) -> Result<StoredEntry, CacheError>;

    async fn store_artifact(
        &self,
        version: &Version,
        artifact: &str,
        data: &[u8],
    ) -> Result<(), CacheError>;
}

/// Filesystem-backed storage using modification timestamps as write times.
///
/// Layout, compatible with the mirror HTTP surface:
///
/// ```text
/// api.json
/// v1.2.3/artifact.name
/// ```
pub struct FilesystemStorage {
    directory: PathBuf,
}

impl FilesystemStorage {
    /// Opens (creating if needed) a cache directory.
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory)?;
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn listing_path(&self) -> PathBuf {
        self.directory.join("api.json")
    }

    fn artifact_path(&self, version: &Version, artifact: &str) -> Result<PathBuf, CacheError> {
        if !artifact::is_valid_name(artifact) {
            return Err(CacheError::InvalidName(artifact.to_string()));
        }
        Ok(self
            .directory
            .join(format!("v{version}"))
            .join(artifact))
    }

    async fn read_file(&self, path: &Path) -> Result<StoredEntry, CacheError> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(CacheError::Miss(path.display().to_string()));
            }
            Err(err) => return Err(err.into()),
        };
        let written_at = metadata.modified()?;
        let data = tokio::fs::read(path).await?;
        Ok(StoredEntry { data, written_at })
    }

    async fn write_file(&self, path: &Path, data: &[u8]) -> Result<(), CacheError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        // Write-then-rename so readers never observe a partial entry.
        let tmp = path.with_file_name(format!(
            "{}.part",
            path.file_name().unwrap_or_default().to_string_lossy()
        ));
        tokio::fs::write(&tmp, data).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl CacheStorage for FilesystemStorage {
    async fn read_listing(&self) -> Result<StoredEntry, CacheError> {
        self.read_file(&self.listing_path()).await
    }

    async fn store_listing(&self, data: &[u8]) -> Result<(), CacheError> {
        self.write_file(&self.listing_path(), data).await
    }

    async fn read_artifact(
        &self,
        version: &Version,
        artifact: &str,
    ) -> Result<StoredEntry, CacheError> {
        let path = self.artifact_path(version, artifact)?;
        self.read_file(&path).await
    }

    async fn store_artifact(
        &self,
        version: &Version,
        artifact: &str,
        data: &[u8],
    ) -> Result<(), CacheError> {
        let path = self.artifact_path(version, artifact)?;
        self.write_file(&path, data).await
    }
}
