//! Shared fixtures for unit tests: an in-memory HTTP client and a fully
//! signed release tree behind it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cask_verify::{ManifestBuilder, SecretKey};
use cask_version::VersionWithArtifacts;

use crate::artifact;
use crate::client::HttpClient;
use crate::downloader::ApiResponse;
use crate::error::{DownloadError, Result};

type UrlMap = Arc<Mutex<HashMap<String, Vec<u8>>>>;

/// Serves bytes from a shared URL map; unknown URLs get a 404.
#[derive(Clone)]
pub(crate) struct FakeClient {
    urls: UrlMap,
}

#[async_trait]
impl HttpClient for FakeClient {
    async fn get(&self, url: &str, _authorization: Option<&str>) -> Result<Vec<u8>> {
        let urls = self.urls.lock().unwrap();
        match urls.get(url) {
            Some(body) => Ok(body.clone()),
            None => Err(DownloadError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// A signed release tree for the given versions, each publishing a single
/// linux/amd64 archive, reachable at `https://api.test/api.json` and
/// `https://mirror.test/v{version}/{artifact}`.
pub(crate) struct ReleaseFixture {
    urls: UrlMap,
    secret: SecretKey,
}

impl ReleaseFixture {
    pub(crate) fn with_versions(versions: &[&str]) -> Self {
        let secret = SecretKey::from_bytes([42u8; 32]);
        let mut urls = HashMap::new();
        let mut listing = Vec::new();

        for raw in versions {
            let version: cask_version::Version = raw.parse().unwrap();
            let archive_name = artifact::archive_name(
                &version,
                cask_platform::Platform::Linux,
                cask_platform::Architecture::Amd64,
            );
            let archive =
                cask_archive::package_binary("cask", &Self::binary_bytes(raw), &[]).unwrap();

            let mut manifest = ManifestBuilder::new();
            manifest.add(&archive_name, &archive);
            let manifest = manifest.finish();
            let signature = secret.sign(&manifest);

            let manifest_name = artifact::manifest_name(&version);
            let signature_name = artifact::signature_name(&version);
            for (name, body) in [
                (archive_name.clone(), archive),
                (manifest_name.clone(), manifest),
                (signature_name.clone(), signature),
            ] {
                urls.insert(format!("https://mirror.test/v{raw}/{name}"), body);
            }

            listing.push(VersionWithArtifacts {
                id: version,
                files: vec![archive_name, manifest_name, signature_name],
            });
        }

        let api = serde_json::to_vec(&ApiResponse { versions: listing }).unwrap();
        urls.insert("https://api.test/api.json".to_string(), api);

        Self {
            urls: Arc::new(Mutex::new(urls)),
            secret,
        }
    }

    pub(crate) fn client(&self) -> FakeClient {
        FakeClient {
            urls: Arc::clone(&self.urls),
        }
    }

    pub(crate) fn public_key_armored(&self) -> String {
        self.secret.public_key().to_armored()
    }

    pub(crate) fn binary_for(&self, version: &str) -> Vec<u8> {
        Self::binary_bytes(version)
    }

    /// Replaces the archive bytes without touching the manifest, so the
    /// checksum no longer matches.
    pub(crate) fn corrupt_archive(&mut self, version: &str) {
        let parsed: cask_version::Version = version.parse().unwrap();
        let name = artifact::archive_name(
            &parsed,
            cask_platform::Platform::Linux,
            cask_platform::Architecture::Amd64,
        );
        self.urls
            .lock()
            .unwrap()
            .insert(format!("https://mirror.test/v{version}/{name}"), b"not the archive".to_vec());
    }

    /// Re-signs the manifest with a key the downloader does not trust.
    pub(crate) fn resign_with_untrusted_key(&mut self, version: &str) {
        let parsed: cask_version::Version = version.parse().unwrap();
        let manifest_url = format!(
            "https://mirror.test/v{version}/{}",
            artifact::manifest_name(&parsed)
        );
        let signature_url = format!(
            "https://mirror.test/v{version}/{}",
            artifact::signature_name(&parsed)
        );

        let mut urls = self.urls.lock().unwrap();
        let manifest = urls.get(&manifest_url).unwrap().clone();
        let rogue = SecretKey::from_bytes([99u8; 32]);
        urls.insert(signature_url, rogue.sign(&manifest));
    }

    fn binary_bytes(version: &str) -> Vec<u8> {
        format!("binary for {version}").into_bytes()
    }
}
