use cask_archive::ArchiveError;
use cask_platform::{Architecture, Platform, PlatformError};
use cask_verify::VerifyError;
use cask_version::{Version, VersionError};
use thiserror::Error;

use crate::storage::CacheError;

pub type Result<T> = std::result::Result<T, DownloadError>;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error("no such version: {0}")]
    NoSuchVersion(Version),

    #[error("no such artifact: {0}")]
    NoSuchArtifact(String),

    #[error("no versions available from the listing endpoint")]
    EmptyListing,

    #[error("no published artifact for {platform}/{architecture} in version {version}")]
    UnsupportedPlatformOrArchitecture {
        platform: Platform,
        architecture: Architecture,
        version: Version,
    },

    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected status code {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("failed to decode listing response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("nightly builds are not available from this source")]
    NightlyUnsupported,

    #[error("operation cancelled")]
    Cancelled,
}
