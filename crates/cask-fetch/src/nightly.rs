use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::artifact;
use crate::branding::{ARTIFACT_PREFIX, MAX_UNCOMPRESSED_SIZE, NIGHTLY_BASE_URL};
use crate::client::HttpClient;
use crate::error::{DownloadError, Result};
use crate::options::DownloadOptions;

static NIGHTLY_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{8}-[a-fA-F0-9]{10}$").expect("nightly id regex"));

/// Identifier of a nightly build: `YYYYMMDD-<10 hex digits of the commit>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NightlyId(String);

impl NightlyId {
    pub fn new(build_date: &str, commit: &str) -> Result<Self> {
        format!("{build_date}-{commit}").parse()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `YYYYMMDD` component, which doubles as the directory the build
    /// is published under.
    pub fn date(&self) -> &str {
        &self.0[..8]
    }
}

impl fmt::Display for NightlyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NightlyId {
    type Err = DownloadError;

    fn from_str(s: &str) -> Result<Self> {
        if !NIGHTLY_ID_RE.is_match(s) {
            return Err(DownloadError::InvalidOptions(format!(
                "nightly build id {s:?} does not match the YYYYMMDD-XXXXXXXXXX format"
            )));
        }
        Ok(Self(s.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct NightlyMetadata {
    date: String,
    commit: String,
}

/// Fetches a nightly build, verifying its checksum. Nightlies are not
/// signed, so there is no signature step.
pub(crate) async fn download<C: HttpClient>(
    client: &C,
    options: &DownloadOptions,
) -> Result<Vec<u8>> {
    options.validate()?;

    let platform = options.platform.resolve_auto()?;
    let architecture = options.architecture.resolve_auto()?;

    let id = match &options.nightly_id {
        Some(id) => id.clone(),
        None => latest_id(client).await?,
    };
    debug!(id = %id, "resolved nightly build");

    let base = format!("{NIGHTLY_BASE_URL}/nightlies/{}", id.date());

    let archive_name = format!("{ARTIFACT_PREFIX}nightly-{id}_{platform}_{architecture}.tar.gz");
    let archive = client.get(&format!("{base}/{archive_name}"), None).await?;

    let sums_name = format!("{ARTIFACT_PREFIX}nightly-{id}_SHA256SUMS");
    let sums = client.get(&format!("{base}/{sums_name}"), None).await?;

    cask_verify::verify_artifact(&archive_name, &archive, &sums)?;

    Ok(cask_archive::extract_binary(
        &archive,
        &artifact::binary_name(platform),
        MAX_UNCOMPRESSED_SIZE,
    )?)
}

async fn latest_id<C: HttpClient>(client: &C) -> Result<NightlyId> {
    let url = format!("{NIGHTLY_BASE_URL}/nightlies/latest.json");
    let body = client.get(&url, None).await?;
    let metadata: NightlyMetadata = serde_json::from_slice(&body)?;
    NightlyId::new(&metadata.date, &metadata.commit)
}
