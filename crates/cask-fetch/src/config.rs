use cask_verify::PublicKey;
use cask_version::Version;

use crate::branding::{DEFAULT_API_URL, DEFAULT_MIRROR_URL_TEMPLATE};
use crate::error::{DownloadError, Result};

/// Configuration for a live downloader.
///
/// URLs default to the official endpoints; the trusted release key has no
/// default and must be supplied.
#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    /// Endpoint serving the version listing JSON.
    pub api_url: String,
    /// Optional `Authorization` header value for listing requests.
    pub api_authorization: Option<String>,
    /// Artifact URL template with `{version}` and `{artifact}` placeholders.
    pub mirror_url_template: String,
    /// Optional `Authorization` header value for artifact requests,
    /// e.g. `Bearer <token>` for a private mirror.
    pub mirror_authorization: Option<String>,
    /// Armored public key the checksum manifest signature is checked against.
    pub public_key: String,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_authorization: None,
            mirror_url_template: DEFAULT_MIRROR_URL_TEMPLATE.to_string(),
            mirror_authorization: None,
            public_key: String::new(),
        }
    }
}

impl DownloaderConfig {
    pub fn new(public_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    #[must_use]
    pub fn with_api_authorization(mut self, authorization: impl Into<String>) -> Self {
        self.api_authorization = Some(authorization.into());
        self
    }

    #[must_use]
    pub fn with_mirror_url_template(mut self, template: impl Into<String>) -> Self {
        self.mirror_url_template = template.into();
        self
    }

    #[must_use]
    pub fn with_mirror_authorization(mut self, authorization: impl Into<String>) -> Self {
        self.mirror_authorization = Some(authorization.into());
        self
    }

    /// Parses the configured key and checks the URL template placeholders.
    pub fn validate(&self) -> Result<PublicKey> {
        if !self.mirror_url_template.contains("{version}")
            || !self.mirror_url_template.contains("{artifact}")
        {
            return Err(DownloadError::InvalidConfiguration(
                "mirror URL template must contain {version} and {artifact}".to_string(),
            ));
        }
        PublicKey::from_armored(&self.public_key).map_err(Into::into)
    }

    pub(crate) fn artifact_url(&self, version: &Version, artifact: &str) -> String {
        self.mirror_url_template
            .replace("{version}", version.as_str())
            .replace("{artifact}", artifact)
    }
}
