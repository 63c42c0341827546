use crate::error::{Result, VerifyError};
use crate::hasher::Sha256Hasher;
use crate::keys::PublicKey;

/// Accumulates checksum manifest lines in the order artifacts are added.
///
/// Each line is `<hex sha256>  <artifact name>` with two spaces between the
/// digest and the name, terminated by a newline.
#[derive(Debug, Default)]
pub struct ManifestBuilder {
    lines: String,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, artifact: &str, data: &[u8]) {
        let digest = hex::encode(Sha256Hasher::digest(data));
        self.lines.push_str(&digest);
        self.lines.push_str("  ");
        self.lines.push_str(artifact);
        self.lines.push('\n');
    }

    pub fn finish(self) -> Vec<u8> {
        self.lines.into_bytes()
    }
}

/// Looks up the hex digest recorded for `artifact` in a checksum manifest.
///
/// Matching is by line suffix, so names containing spaces still resolve as
/// long as the two-space separator precedes them.
pub fn find_checksum(manifest: &[u8], artifact: &str) -> Result<String> {
    let text = std::str::from_utf8(manifest).map_err(|_| VerifyError::MissingChecksum {
        artifact: artifact.to_string(),
    })?;
    let suffix = format!("  {artifact}");
    for line in text.lines() {
        if let Some(digest) = line.strip_suffix(&suffix) {
            return Ok(digest.to_string());
        }
    }
    Err(VerifyError::MissingChecksum {
        artifact: artifact.to_string(),
    })
}

/// Verifies `data` against the manifest entry for `artifact`.
///
/// The manifest itself must already be authenticated; this only covers the
/// checksum comparison.
pub fn verify_artifact(artifact: &str, data: &[u8], manifest: &[u8]) -> Result<()> {
    let expected = find_checksum(manifest, artifact)?;
    let actual = hex::encode(Sha256Hasher::digest(data));
    if actual != expected {
        return Err(VerifyError::ChecksumMismatch {
            artifact: artifact.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

/// The full verification pipeline bound to one trusted key.
///
/// The order is fixed: the manifest signature is checked before any
/// checksum comparison, so an attacker-controlled manifest is never
/// consulted.
#[derive(Debug, Clone)]
pub struct ArtifactVerifier {
    key: PublicKey,
}

impl ArtifactVerifier {
    pub fn new(key: PublicKey) -> Self {
        Self { key }
    }

    pub fn key(&self) -> &PublicKey {
        &self.key
    }

    pub fn verify(
        &self,
        artifact: &str,
        contents: &[u8],
        manifest: &[u8],
        signature: &[u8],
    ) -> Result<()> {
        self.key.verify_detached(signature, manifest)?;
        verify_artifact(artifact, contents, manifest)
    }
}
