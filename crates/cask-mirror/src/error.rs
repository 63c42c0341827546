use cask_archive::ArchiveError;
use cask_fetch::{CacheError, DownloadError};
use cask_platform::PlatformError;
use cask_verify::VerifyError;
use cask_version::Version;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MirrorError>;

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("a mirror needs storage, a pull-through downloader, or both")]
    NoSource,

    #[error("writes are not supported on a pull-through mirror")]
    PullThroughWrite,

    #[error("version {0} already exists")]
    VersionExists(Version),

    #[error("version does not exist: {0}")]
    NoSuchVersion(Version),

    #[error("stored listing is corrupt: {0}")]
    CorruptListing(#[from] serde_json::Error),

    #[error(transparent)]
    Key(#[from] VerifyError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Storage(#[from] CacheError),

    #[error(transparent)]
    Download(#[from] DownloadError),
}
