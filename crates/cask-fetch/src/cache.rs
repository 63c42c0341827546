use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use cask_version::{Version, VersionWithArtifacts};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::downloader::{ApiResponse, Downloader, filter_and_sort};
use crate::error::{DownloadError, Result};
use crate::options::{DownloadOptions, ListOptions};
use crate::storage::{CacheError, CacheStorage, StoredEntry};

/// How long a cached entry counts as fresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheTimeout {
    /// Never read or write the cache for this entry kind.
    #[default]
    Disabled,
    /// Cached entries never expire.
    Indefinite,
    /// Entries older than this are stale.
    ExpiresAfter(Duration),
}

impl CacheTimeout {
    /// Whether this policy reads or writes the cache at all.
    pub fn caches(self) -> bool {
        self != CacheTimeout::Disabled
    }

    /// Whether an entry written at the given time is still fresh.
    pub fn is_fresh(self, written_at: SystemTime) -> bool {
        match self {
            CacheTimeout::Disabled => false,
            CacheTimeout::Indefinite => true,
            CacheTimeout::ExpiresAfter(ttl) => written_at
                .elapsed()
                .map(|age| age < ttl)
                .unwrap_or(true),
        }
    }
}

/// Policy knobs for [`CachingDownloader`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheConfig {
    /// Serve expired cache entries when the live fetch fails.
    pub allow_stale: bool,
    /// Freshness window for the version listing.
    pub listing_timeout: CacheTimeout,
    /// Freshness window for artifacts.
    pub artifact_timeout: CacheTimeout,
}

impl CacheConfig {
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
}

/// Caching layer over any [`Downloader`].
///
/// Reads go through three tiers: fresh cache, then the backing downloader
/// (persisting the result best-effort), then the stale cache if the policy
/// allows it. When every tier fails the backing downloader's error is
/// returned, not a cache error.
///
/// The listing is cached unfiltered; stability filters are applied on the
/// way out, so one cached listing serves every filter.
pub struct CachingDownloader<D> {
    backing: D,
    storage: Arc<dyn CacheStorage>,
    config: CacheConfig,
}

impl<D: Downloader> CachingDownloader<D> {
    pub fn new(backing: D, storage: Arc<dyn CacheStorage>, config: CacheConfig) -> Self {
        Self {
            backing,
            storage,
            config,
        }
    }

    /// Downloads the newest `version_count` versions (all of them when
    /// `None`) into the cache, reporting progress as a percentage after
    /// each artifact. Cancellation is honored between artifacts; the
    /// artifact in flight is never abandoned half-written.
    pub async fn pre_warm(
        &self,
        version_count: Option<usize>,
        cancel: &CancellationToken,
        mut progress: impl FnMut(u8) + Send,
    ) -> Result<()> {
        let mut versions = self.list_versions(ListOptions::default()).await?;
        if let Some(count) = version_count {
            versions.truncate(count);
        }

        let total: usize = versions.iter().map(|entry| entry.files.len()).sum();
        let mut done = 0usize;
        for version in &versions {
            for artifact in &version.files {
                if cancel.is_cancelled() {
                    return Err(DownloadError::Cancelled);
                }
                self.download_artifact(version, artifact).await?;
                done += 1;
                progress((100 * done / total) as u8);
            }
        }
        Ok(())
    }

    async fn read_cached_listing(
        &self,
        options: ListOptions,
        allow_stale: bool,
    ) -> Result<Vec<VersionWithArtifacts>> {
        let entry = self.storage.read_listing().await?;
        self.check_freshness(&entry, self.config.listing_timeout, allow_stale, "listing")?;
        let response: ApiResponse = serde_json::from_slice(&entry.data)?;
        Ok(filter_and_sort(response.versions, options))
    }

    async fn read_cached_artifact(
        &self,
        version: &Version,
        artifact: &str,
        allow_stale: bool,
    ) -> Result<Vec<u8>> {
        let entry = self.storage.read_artifact(version, artifact).await?;
        self.check_freshness(&entry, self.config.artifact_timeout, allow_stale, artifact)?;
        Ok(entry.data)
    }

    fn check_freshness(
        &self,
        entry: &StoredEntry,
        timeout: CacheTimeout,
        allow_stale: bool,
        what: &str,
    ) -> Result<()> {
        if !allow_stale && !timeout.is_fresh(entry.written_at) {
            return Err(CacheError::Stale(what.to_string()).into());
        }
        Ok(())
    }
}

#[async_trait]
impl<D: Downloader> Downloader for CachingDownloader<D> {
    async fn list_versions(&self, options: ListOptions) -> Result<Vec<VersionWithArtifacts>> {
        if !self.config.listing_timeout.caches() {
            return self.backing.list_versions(options).await;
        }

        if let Ok(versions) = self.read_cached_listing(options, false).await {
            debug!("listing served from cache");
            return Ok(versions);
        }

        // The full listing is fetched and cached regardless of the filter.
        match self.backing.list_versions(ListOptions::default()).await {
            Ok(all) => {
                match serde_json::to_vec(&ApiResponse {
                    versions: all.clone(),
                }) {
                    Ok(body) => {
                        if let Err(err) = self.storage.store_listing(&body).await {
                            warn!(error = %err, "failed to persist listing to cache");
                        }
                    }
                    Err(err) => warn!(error = %err, "failed to encode listing for cache"),
                }
                Ok(filter_and_sort(all, options))
            }
            Err(live_err) => {
                if self.config.allow_stale {
                    if let Ok(versions) = self.read_cached_listing(options, true).await {
                        warn!("listing endpoint unreachable, serving stale cache");
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
    ) -> Result<Vec<u8>> {
        if !self.config.artifact_timeout.caches() {
            return self.backing.download_artifact(version, artifact).await;
        }

        if let Ok(data) = self.read_cached_artifact(&version.id, artifact, false).await {
            debug!(artifact, "artifact served from cache");
            return Ok(data);
        }

        match self.backing.download_artifact(version, artifact).await {
            Ok(data) => {
                if let Err(err) = self
                    .storage
                    .store_artifact(&version.id, artifact, &data)
                    .await
                {
                    warn!(artifact, error = %err, "failed to persist artifact to cache");
                }
                Ok(data)
            }
            Err(live_err) => {
                if self.config.allow_stale {
                    if let Ok(data) =
                        self.read_cached_artifact(&version.id, artifact, true).await
                    {
                        warn!(artifact, "live download failed, serving stale cache");
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
    ) -> Result<()> {
        self.backing
            .verify_artifact(artifact, contents, manifest, signature)
    }

    async fn download_nightly(&self, options: &DownloadOptions) -> Result<Vec<u8>> {
        // Nightlies rotate daily and are not worth caching.
        self.backing.download_nightly(options).await
    }
}
