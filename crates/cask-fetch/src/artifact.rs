use cask_platform::{Architecture, Platform};
use cask_version::Version;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::branding::{ARTIFACT_PREFIX, BINARY_NAME};

static ARTIFACT_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._-]+$").expect("artifact name regex"));

/// Artifact names are single path segments. Anything that could smuggle
/// a separator or traversal component is rejected up front.
pub fn is_valid_name(artifact: &str) -> bool {
    ARTIFACT_NAME_RE.is_match(artifact)
}

/// Name of the checksum manifest for a version.
pub fn manifest_name(version: &Version) -> String {
    format!("{ARTIFACT_PREFIX}{version}_SHA256SUMS")
}

/// Name of the detached signature over the checksum manifest.
pub fn signature_name(version: &Version) -> String {
    format!("{ARTIFACT_PREFIX}{version}_SHA256SUMS.gpgsig")
}

/// Name of the platform archive for a version.
pub fn archive_name(version: &Version, platform: Platform, architecture: Architecture) -> String {
    format!("{ARTIFACT_PREFIX}{version}_{platform}_{architecture}.tar.gz")
}

/// Name of the executable inside an archive for the given platform.
pub fn binary_name(platform: Platform) -> String {
    if platform == Platform::Windows {
        format!("{BINARY_NAME}.exe")
    } else {
        BINARY_NAME.to_string()
    }
}
