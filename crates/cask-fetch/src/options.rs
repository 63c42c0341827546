use cask_platform::{Architecture, Platform};
use cask_version::{Stability, Version};

use crate::error::{DownloadError, Result};
use crate::nightly::NightlyId;

/// Filter for version listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Keep only versions at or above this stability tier.
    pub minimum_stability: Option<Stability>,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_minimum_stability(mut self, stability: Stability) -> Self {
        self.minimum_stability = Some(stability);
        self
    }
}

/// Settings for a top-level download. Platform and architecture default
/// to the current host.
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    pub platform: Platform,
    pub architecture: Architecture,
    /// Exact version to download. Mutually exclusive with
    /// `minimum_stability`.
    pub version: Option<Version>,
    /// Download the newest version at or above this tier. Mutually
    /// exclusive with `version`.
    pub minimum_stability: Option<Stability>,
    /// Specific nightly build to fetch. Only consulted by
    /// `download_nightly`; when absent the latest nightly is resolved.
    pub nightly_id: Option<NightlyId>,
}

impl DownloadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    #[must_use]
    pub fn with_architecture(mut self, architecture: Architecture) -> Self {
        self.architecture = architecture;
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    #[must_use]
    pub fn with_minimum_stability(mut self, stability: Stability) -> Self {
        self.minimum_stability = Some(stability);
        self
    }

    #[must_use]
    pub fn with_nightly_id(mut self, id: NightlyId) -> Self {
        self.nightly_id = Some(id);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.version.is_some() && self.minimum_stability.is_some() {
            return Err(DownloadError::InvalidOptions(
                "version and minimum stability constraints are mutually exclusive".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn list_options(&self) -> ListOptions {
        ListOptions {
            minimum_stability: self.minimum_stability,
        }
    }
}
