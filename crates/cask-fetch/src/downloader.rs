use async_trait::async_trait;
use cask_platform::{Architecture, Platform};
use cask_version::{VersionWithArtifacts, sort_descending};
use cask_verify::ArtifactVerifier;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::artifact;
use crate::branding::MAX_UNCOMPRESSED_SIZE;
use crate::client::{HttpClient, ReqwestClient};
use crate::config::DownloaderConfig;
use crate::error::{DownloadError, Result};
use crate::nightly;
use crate::options::{DownloadOptions, ListOptions};

/// JSON document served by the listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub versions: Vec<VersionWithArtifacts>,
}

/// A source of release listings and artifacts.
///
/// `download_version` and `download` are flows over the other methods and
/// behave identically for every implementation, so they are provided here.
/// Implementations decide where bytes come from: the network, a cache, or
/// a mirror's storage.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Lists versions matching the filter, newest first.
    async fn list_versions(&self, options: ListOptions) -> Result<Vec<VersionWithArtifacts>>;

    /// Fetches a single artifact published for a version. The artifact
    /// must appear in the version's file list.
    async fn download_artifact(
        &self,
        version: &VersionWithArtifacts,
        artifact: &str,
    ) -> Result<Vec<u8>>;

    /// Checks the manifest signature, then the artifact's checksum line.
    fn verify_artifact(
        &self,
        artifact: &str,
        contents: &[u8],
        manifest: &[u8],
        signature: &[u8],
    ) -> Result<()>;

    /// Fetches the latest (or a specific) nightly build. Nightlies carry
    /// checksums but no signature.
    async fn download_nightly(&self, options: &DownloadOptions) -> Result<Vec<u8>>;

    /// Downloads, verifies, and extracts the binary for one version.
    async fn download_version(
        &self,
        version: &VersionWithArtifacts,
        platform: Platform,
        architecture: Architecture,
    ) -> Result<Vec<u8>> {
        let manifest = self
            .download_artifact(version, &artifact::manifest_name(&version.id))
            .await?;
        let signature = self
            .download_artifact(version, &artifact::signature_name(&version.id))
            .await?;

        let platform = platform.resolve_auto()?;
        let architecture = architecture.resolve_auto()?;

        let archive_name = artifact::archive_name(&version.id, platform, architecture);
        let archive = match self.download_artifact(version, &archive_name).await {
            Ok(archive) => archive,
            Err(DownloadError::NoSuchArtifact(_)) => {
                return Err(DownloadError::UnsupportedPlatformOrArchitecture {
                    platform,
                    architecture,
                    version: version.id.clone(),
                });
            }
            Err(err) => return Err(err),
        };

        self.verify_artifact(&archive_name, &archive, &manifest, &signature)?;

        Ok(cask_archive::extract_binary(
            &archive,
            &artifact::binary_name(platform),
            MAX_UNCOMPRESSED_SIZE,
        )?)
    }

    /// Top-level download: resolve a version from the listing, then run
    /// `download_version` on it.
    async fn download(&self, options: &DownloadOptions) -> Result<Vec<u8>> {
        options.validate()?;

        let listing = self.list_versions(options.list_options()).await?;
        if listing.is_empty() {
            return Err(DownloadError::EmptyListing);
        }

        let selected = match &options.version {
            Some(wanted) => listing
                .iter()
                .find(|entry| entry.id == *wanted)
                .ok_or_else(|| DownloadError::NoSuchVersion(wanted.clone()))?,
            None => &listing[0],
        };

        self.download_version(selected, options.platform, options.architecture)
            .await
    }
}

/// Applies the stability filter and the descending order every listing
/// must come back in. Exposed for alternate [`Downloader`] implementations
/// that read listings from their own source.
pub fn filter_and_sort(
    versions: Vec<VersionWithArtifacts>,
    options: ListOptions,
) -> Vec<VersionWithArtifacts> {
    let mut versions: Vec<_> = versions
        .into_iter()
        .filter(|entry| {
            options
                .minimum_stability
                .is_none_or(|minimum| minimum.matches(&entry.id))
        })
        .collect();
    sort_descending(&mut versions);
    versions
}

/// Live downloader talking to the listing endpoint and artifact mirror
/// over HTTP.
pub struct HttpDownloader<C = ReqwestClient> {
    client: C,
    config: DownloaderConfig,
    verifier: ArtifactVerifier,
}

impl HttpDownloader<ReqwestClient> {
    pub fn new(config: DownloaderConfig) -> Result<Self> {
        Self::with_client(config, ReqwestClient::new()?)
    }
}

impl<C: HttpClient> HttpDownloader<C> {
    /// Builds a downloader over a caller-supplied HTTP client.
    pub fn with_client(config: DownloaderConfig, client: C) -> Result<Self> {
        let key = config.validate()?;
        Ok(Self {
            client,
            config,
            verifier: ArtifactVerifier::new(key),
        })
    }
}

#[async_trait]
impl<C: HttpClient> Downloader for HttpDownloader<C> {
    async fn list_versions(&self, options: ListOptions) -> Result<Vec<VersionWithArtifacts>> {
        debug!(url = %self.config.api_url, "fetching version listing");
        let body = self
            .client
            .get(&self.config.api_url, self.config.api_authorization.as_deref())
            .await?;
        let response: ApiResponse = serde_json::from_slice(&body)?;
        Ok(filter_and_sort(response.versions, options))
    }

    async fn download_artifact(
        &self,
        version: &VersionWithArtifacts,
        artifact: &str,
    ) -> Result<Vec<u8>> {
        if !version.files.iter().any(|file| file == artifact) {
            return Err(DownloadError::NoSuchArtifact(artifact.to_string()));
        }
        if !artifact::is_valid_name(artifact) {
            return Err(DownloadError::InvalidOptions(format!(
                "invalid artifact name: {artifact}"
            )));
        }

        let url = self.config.artifact_url(&version.id, artifact);
        debug!(%url, "downloading artifact");
        self.client
            .get(&url, self.config.mirror_authorization.as_deref())
            .await
    }

    fn verify_artifact(
        &self,
        artifact: &str,
        contents: &[u8],
        manifest: &[u8],
        signature: &[u8],
    ) -> Result<()> {
        self.verifier
            .verify(artifact, contents, manifest, signature)?;
        Ok(())
    }

    async fn download_nightly(&self, options: &DownloadOptions) -> Result<Vec<u8>> {
        nightly::download(&self.client, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeClient, ReleaseFixture};
    use cask_version::Stability;

    fn downloader(fixture: &ReleaseFixture) -> HttpDownloader<FakeClient> {
        let config = DownloaderConfig::new(fixture.public_key_armored())
            .with_api_url("https://api.test/api.json")
            .with_mirror_url_template("https://mirror.test/v{version}/{artifact}");
        HttpDownloader::with_client(config, fixture.client()).unwrap()
    }

    #[tokio::test]
    async fn listing_is_sorted_and_filtered() {
        let fixture = ReleaseFixture::with_versions(&["1.0.0-rc1", "1.1.0", "0.9.0"]);
        let dl = downloader(&fixture);

        let all = dl.list_versions(ListOptions::new()).await.unwrap();
        let ids: Vec<_> = all.iter().map(|v| v.id.to_string()).collect();
        assert_eq!(ids, vec!["1.1.0", "1.0.0-rc1", "0.9.0"]);

        let stable = dl
            .list_versions(ListOptions::new().with_minimum_stability(Stability::Stable))
            .await
            .unwrap();
        let ids: Vec<_> = stable.iter().map(|v| v.id.to_string()).collect();
        assert_eq!(ids, vec!["1.1.0", "0.9.0"]);
    }

    #[tokio::test]
    async fn download_resolves_the_newest_matching_version() {
        let fixture = ReleaseFixture::with_versions(&["1.0.0", "1.1.0-beta1"]);
        let dl = downloader(&fixture);

        let binary = dl
            .download(
                &DownloadOptions::new()
                    .with_platform(cask_platform::Platform::Linux)
                    .with_architecture(cask_platform::Architecture::Amd64)
                    .with_minimum_stability(Stability::Stable),
            )
            .await
            .unwrap();
        assert_eq!(binary, fixture.binary_for("1.0.0"));
    }

    #[tokio::test]
    async fn download_by_exact_version() {
        let fixture = ReleaseFixture::with_versions(&["1.0.0", "1.1.0"]);
        let dl = downloader(&fixture);

        let binary = dl
            .download(
                &DownloadOptions::new()
                    .with_platform(cask_platform::Platform::Linux)
                    .with_architecture(cask_platform::Architecture::Amd64)
                    .with_version("1.0.0".parse().unwrap()),
            )
            .await
            .unwrap();
        assert_eq!(binary, fixture.binary_for("1.0.0"));

        let err = dl
            .download(
                &DownloadOptions::new().with_version("9.9.9".parse().unwrap()),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::NoSuchVersion(_)));
    }

    #[tokio::test]
    async fn tampered_artifact_fails_checksum() {
        let mut fixture = ReleaseFixture::with_versions(&["1.0.0"]);
        fixture.corrupt_archive("1.0.0");
        let dl = downloader(&fixture);

        let err = dl
            .download(
                &DownloadOptions::new()
                    .with_platform(cask_platform::Platform::Linux)
                    .with_architecture(cask_platform::Architecture::Amd64)
                    .with_version("1.0.0".parse().unwrap()),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DownloadError::Verify(cask_verify::VerifyError::ChecksumMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn foreign_signature_fails_before_checksums() {
        let mut fixture = ReleaseFixture::with_versions(&["1.0.0"]);
        fixture.resign_with_untrusted_key("1.0.0");
        let dl = downloader(&fixture);

        let err = dl
            .download(
                &DownloadOptions::new()
                    .with_platform(cask_platform::Platform::Linux)
                    .with_architecture(cask_platform::Architecture::Amd64)
                    .with_version("1.0.0".parse().unwrap()),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DownloadError::Verify(cask_verify::VerifyError::SignatureMismatch)
        ));
    }

    #[tokio::test]
    async fn missing_platform_archive_is_reported_as_unsupported() {
        let fixture = ReleaseFixture::with_versions(&["1.0.0"]);
        let dl = downloader(&fixture);

        let listing = dl.list_versions(ListOptions::new()).await.unwrap();
        let err = dl
            .download_version(
                &listing[0],
                cask_platform::Platform::Solaris,
                cask_platform::Architecture::Amd64,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DownloadError::UnsupportedPlatformOrArchitecture { .. }
        ));
    }

    #[tokio::test]
    async fn artifact_names_outside_the_listing_are_rejected() {
        let fixture = ReleaseFixture::with_versions(&["1.0.0"]);
        let dl = downloader(&fixture);
        let listing = dl.list_versions(ListOptions::new()).await.unwrap();

        let err = dl
            .download_artifact(&listing[0], "cask_1.0.0_other_file")
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::NoSuchArtifact(_)));
    }
}
