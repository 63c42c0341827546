use std::sync::Arc;

use async_trait::async_trait;
use cask_fetch::{
    ApiResponse, CacheError, CacheStorage, CacheTimeout, DownloadError, DownloadOptions,
    Downloader, ListOptions, StoredEntry, filter_and_sort,
};
use cask_verify::{ArtifactVerifier, PublicKey};
use cask_version::{Version, VersionWithArtifacts};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{MirrorError, Result};

/// Policy and trust settings for a [`Mirror`].
#[derive(Debug, Clone, Default)]
pub struct MirrorConfig {
    /// Serve expired storage entries when the pull-through fetch fails.
    pub allow_stale: bool,
    /// Freshness window for the stored listing, in pull-through mode.
    pub listing_timeout: CacheTimeout,
    /// Freshness window for stored artifacts, in pull-through mode.
    pub artifact_timeout: CacheTimeout,
    /// Armored public key for verifying artifacts served by this mirror.
    /// Origin mirrors need one; pull-through mirrors can fall back to the
    /// downloader behind them.
    pub public_key: Option<String>,
}

impl MirrorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_allow_stale(mut self, allow_stale: bool) -> Self {
        self.allow_stale = allow_stale;
        self
    }

    #[must_use]
    pub fn with_listing_timeout(mut self, timeout: CacheTimeout) -> Self {
        self.listing_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_artifact_timeout(mut self, timeout: CacheTimeout) -> Self {
        self.artifact_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_public_key(mut self, armored: impl Into<String>) -> Self {
        self.public_key = Some(armored.into());
        self
    }
}

/// An artifact mirror, usable in two modes.
///
/// With a pull-through downloader, reads go fresh-storage first, then the
/// downloader (persisting best-effort), then stale storage if allowed, the
/// same tiers as the caching layer. Without one, the mirror is an origin:
/// storage is the only source, timeouts are ignored, and an absent listing
/// means "no versions" rather than an error.
///
/// Writes (`create_version`, `create_version_asset`) only work in origin
/// mode; a pull-through mirror's content is defined by whatever it mirrors.
pub struct Mirror {
    storage: Option<Arc<dyn CacheStorage>>,
    pull_through: Option<Arc<dyn Downloader>>,
    verifier: Option<ArtifactVerifier>,
    config: MirrorConfig,
}

impl Mirror {
    pub fn new(
        config: MirrorConfig,
        storage: Option<Arc<dyn CacheStorage>>,
        pull_through: Option<Arc<dyn Downloader>>,
    ) -> Result<Self> {
        if storage.is_none() && pull_through.is_none() {
            return Err(MirrorError::NoSource);
        }
        let verifier = config
            .public_key
            .as_deref()
            .map(PublicKey::from_armored)
            .transpose()?
            .map(ArtifactVerifier::new);
        Ok(Self {
            storage,
            pull_through,
            verifier,
            config,
        })
    }

    /// Registers a new version with an empty artifact list. Newest
    /// versions are prepended so the stored listing stays descending.
    pub async fn create_version(&self, version: &Version) -> Result<()> {
        let storage = self.writable_storage()?;

        let mut response = match storage.read_listing().await {
            Ok(entry) => serde_json::from_slice::<ApiResponse>(&entry.data)?,
            Err(CacheError::Miss(_)) => ApiResponse {
                versions: Vec::new(),
            },
            Err(err) => return Err(err.into()),
        };

        if response.versions.iter().any(|entry| entry.id == *version) {
            return Err(MirrorError::VersionExists(version.clone()));
        }
        response.versions.insert(
            0,
            VersionWithArtifacts {
                id: version.clone(),
                files: Vec::new(),
            },
        );

        let body = serde_json::to_vec(&response)?;
        storage.store_listing(&body).await?;
        Ok(())
    }

    /// Stores an artifact and adds it to the version's file list. The
    /// artifact is written before the listing, so a listed file always
    /// exists in storage.
    pub async fn create_version_asset(
        &self,
        version: &Version,
        asset: &str,
        data: &[u8],
    ) -> Result<()> {
        let storage = self.writable_storage()?;

        let entry = storage.read_listing().await?;
        let mut response: ApiResponse = serde_json::from_slice(&entry.data)?;

        let found = response
            .versions
            .iter_mut()
            .find(|entry| entry.id == *version)
            .ok_or_else(|| MirrorError::NoSuchVersion(version.clone()))?;
        found.files.push(asset.to_string());

        storage.store_artifact(version, asset, data).await?;
        let body = serde_json::to_vec(&response)?;
        storage.store_listing(&body).await?;
        Ok(())
    }

    /// Downloads the newest `version_count` versions into storage through
    /// the pull-through downloader. Does nothing when the mirror is an
    /// origin. Cancellation is honored between artifacts.
    pub async fn pre_warm(
        &self,
        version_count: Option<usize>,
        cancel: &CancellationToken,
        mut progress: impl FnMut(u8) + Send,
    ) -> Result<()> {
        if self.pull_through.is_none() {
            return Ok(());
        }

        let mut versions = self.list_versions(ListOptions::default()).await?;
        if let Some(count) = version_count {
            versions.truncate(count);
        }

        let total: usize = versions.iter().map(|entry| entry.files.len()).sum();
        let mut done = 0usize;
        for version in &versions {
            for artifact in &version.files {
                if cancel.is_cancelled() {
                    return Err(DownloadError::Cancelled.into());
                }
                self.download_artifact(version, artifact).await?;
                done += 1;
                progress((100 * done / total) as u8);
            }
        }
        Ok(())
    }

    fn writable_storage(&self) -> Result<&Arc<dyn CacheStorage>> {
        if self.pull_through.is_some() {
            return Err(MirrorError::PullThroughWrite);
        }
        self.storage.as_ref().ok_or(MirrorError::NoSource)
    }

    fn check_freshness(
        &self,
        entry: &StoredEntry,
        timeout: CacheTimeout,
        allow_stale: bool,
        what: &str,
    ) -> cask_fetch::Result<()> {
        if !allow_stale && !timeout.is_fresh(entry.written_at) {
            return Err(CacheError::Stale(what.to_string()).into());
        }
        Ok(())
    }

    async fn read_stored_listing(
        &self,
        storage: &Arc<dyn CacheStorage>,
        options: ListOptions,
        allow_stale: bool,
    ) -> cask_fetch::Result<Vec<VersionWithArtifacts>> {
        let entry = storage.read_listing().await?;
        self.check_freshness(&entry, self.config.listing_timeout, allow_stale, "listing")?;
        let response: ApiResponse = serde_json::from_slice(&entry.data)?;
        Ok(filter_and_sort(response.versions, options))
    }

    async fn read_stored_artifact(
        &self,
        storage: &Arc<dyn CacheStorage>,
        version: &Version,
        artifact: &str,
        allow_stale: bool,
    ) -> cask_fetch::Result<Vec<u8>> {
        let entry = storage.read_artifact(version, artifact).await?;
        self.check_freshness(&entry, self.config.artifact_timeout, allow_stale, artifact)?;
        Ok(entry.data)
    }
}

#[async_trait]
impl Downloader for Mirror {
    async fn list_versions(
        &self,
        options: ListOptions,
    ) -> cask_fetch::Result<Vec<VersionWithArtifacts>> {
        let Some(pull_through) = &self.pull_through else {
            // Origin mode: storage is authoritative, timeouts do not apply
            // and an absent listing is an empty mirror.
            let storage = self.storage.as_ref().ok_or_else(no_source)?;
            return match self.read_stored_listing(storage, options, true).await {
                Ok(versions) => Ok(versions),
                Err(DownloadError::Cache(CacheError::Miss(_))) => Ok(Vec::new()),
                Err(err) => Err(err),
            };
        };

        let Some(storage) = &self.storage else {
            return pull_through.list_versions(options).await;
        };
        if !self.config.listing_timeout.caches() {
            return pull_through.list_versions(options).await;
        }

        if let Ok(versions) = self.read_stored_listing(storage, options, false).await {
            debug!("listing served from mirror storage");
            return Ok(versions);
        }

        match pull_through.list_versions(ListOptions::default()).await {
            Ok(all) => {
                match serde_json::to_vec(&ApiResponse {
                    versions: all.clone(),
                }) {
                    Ok(body) => {
                        if let Err(err) = storage.store_listing(&body).await {
                            warn!(error = %err, "failed to persist listing to mirror storage");
                        }
                    }
                    Err(err) => warn!(error = %err, "failed to encode listing"),
                }
                Ok(filter_and_sort(all, options))
            }
            Err(live_err) => {
                if self.config.allow_stale {
                    if let Ok(versions) = self.read_stored_listing(storage, options, true).await {
                        warn!("upstream unreachable, serving stale listing");
                        return Ok(versions);
                    }
                }
                Err(live_err)
            }
        }
    }

    async fn download_artifact(
        &self,
        version: &VersionWithArtifacts,
        artifact: &str,
    ) -> cask_fetch::Result<Vec<u8>> {
        // Only listed artifacts are served, even if a file by that name
        // happens to exist in storage.
        if !version.files.iter().any(|file| file == artifact) {
            return Err(DownloadError::NoSuchArtifact(artifact.to_string()));
        }

        let Some(pull_through) = &self.pull_through else {
            let storage = self.storage.as_ref().ok_or_else(no_source)?;
            return self
                .read_stored_artifact(storage, &version.id, artifact, true)
                .await;
        };

        let Some(storage) = &self.storage else {
            return pull_through.download_artifact(version, artifact).await;
        };
        if !self.config.artifact_timeout.caches() {
            return pull_through.download_artifact(version, artifact).await;
        }

        if let Ok(data) = self
            .read_stored_artifact(storage, &version.id, artifact, false)
            .await
        {
            debug!(artifact, "artifact served from mirror storage");
            return Ok(data);
        }

        match pull_through.download_artifact(version, artifact).await {
            Ok(data) => {
                if let Err(err) = storage.store_artifact(&version.id, artifact, &data).await {
                    warn!(artifact, error = %err, "failed to persist artifact to mirror storage");
                }
                Ok(data)
            }
            Err(live_err) => {
                if self.config.allow_stale {
                    if let Ok(data) = self
                        .read_stored_artifact(storage, &version.id, artifact, true)
                        .await
                    {
                        warn!(artifact, "upstream unreachable, serving stale artifact");
                        return Ok(data);
                    }
                }
                Err(live_err)
            }
        }
    }

    fn verify_artifact(
        &self,
        artifact: &str,
        contents: &[u8],
        manifest: &[u8],
        signature: &[u8],
    ) -> cask_fetch::Result<()> {
        if let Some(verifier) = &self.verifier {
            verifier
                .verify(artifact, contents, manifest, signature)
                .map_err(cask_fetch::DownloadError::from)?;
            return Ok(());
        }
        if let Some(pull_through) = &self.pull_through {
            return pull_through.verify_artifact(artifact, contents, manifest, signature);
        }
        Err(DownloadError::InvalidConfiguration(
            "mirror has no verification key and no pull-through downloader".to_string(),
        ))
    }

    async fn download_nightly(&self, _options: &DownloadOptions) -> cask_fetch::Result<Vec<u8>> {
        // Nightlies are never mirrored; their lifecycle is too short.
        Err(DownloadError::NightlyUnsupported)
    }
}

fn no_source() -> DownloadError {
    DownloadError::InvalidConfiguration(
        "mirror has neither storage nor a pull-through downloader".to_string(),
    )
}
