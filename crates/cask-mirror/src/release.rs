use cask_fetch::artifact;
use cask_platform::{Architecture, Platform};
use cask_verify::{ManifestBuilder, SecretKey};
use cask_version::Version;

use crate::error::Result;
use crate::mirror::Mirror;

struct ReleaseBinary {
    platform: Platform,
    architecture: Architecture,
    contents: Vec<u8>,
    extra_files: Vec<(String, Vec<u8>)>,
}

/// Accumulates binaries and artifacts for one release, then publishes the
/// whole set to an origin mirror.
///
/// `build` consumes the builder; a release is assembled exactly once.
pub struct ReleaseBuilder {
    key: SecretKey,
    binaries: Vec<ReleaseBinary>,
    artifacts: Vec<(String, Vec<u8>)>,
}

impl ReleaseBuilder {
    pub fn new(key: SecretKey) -> Self {
        Self {
            key,
            binaries: Vec::new(),
            artifacts: Vec::new(),
        }
    }

    /// Queues a binary to be packaged as the platform archive for
    /// `platform`/`architecture`. Extra files (license, changelog) ride
    /// along in the same archive.
    pub fn package_binary(
        &mut self,
        platform: Platform,
        architecture: Architecture,
        contents: Vec<u8>,
        extra_files: Vec<(String, Vec<u8>)>,
    ) -> Result<()> {
        let platform = platform.resolve_auto()?;
        let architecture = architecture.resolve_auto()?;
        self.binaries.push(ReleaseBinary {
            platform,
            architecture,
            contents,
            extra_files,
        });
        Ok(())
    }

    /// Adds a raw artifact to the release under its own name. It is
    /// covered by the checksum manifest like any packaged archive.
    pub fn add_artifact(&mut self, name: impl Into<String>, data: Vec<u8>) {
        self.artifacts.push((name.into(), data));
    }

    /// Packages every queued binary, writes the checksum manifest, signs
    /// it, and publishes the version with all artifacts to the mirror.
    pub async fn build(mut self, version: &Version, mirror: &Mirror) -> Result<()> {
        for binary in &self.binaries {
            let name = artifact::archive_name(version, binary.platform, binary.architecture);
            let extra: Vec<(&str, &[u8])> = binary
                .extra_files
                .iter()
                .map(|(name, data)| (name.as_str(), data.as_slice()))
                .collect();
            let archive = cask_archive::package_binary(
                &artifact::binary_name(binary.platform),
                &binary.contents,
                &extra,
            )?;
            self.artifacts.push((name, archive));
        }

        let mut manifest = ManifestBuilder::new();
        for (name, data) in &self.artifacts {
            manifest.add(name, data);
        }
        let manifest = manifest.finish();
        let signature = self.key.sign(&manifest);
        self.artifacts
            .push((artifact::manifest_name(version), manifest));
        self.artifacts
            .push((artifact::signature_name(version), signature));

        mirror.create_version(version).await?;
        for (name, data) in &self.artifacts {
            mirror.create_version_asset(version, name, data).await?;
        }
        Ok(())
    }
}
