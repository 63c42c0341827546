//! Product-wide constants. Everything that names the product or its
//! default endpoints lives here so a rebrand touches one file.

/// Name of the product being distributed.
pub const PRODUCT_NAME: &str = "Cask";

/// Name of the executable inside release archives. Windows artifacts
/// carry a `.exe` suffix on top of this.
pub const BINARY_NAME: &str = "cask";

/// Prefix of every published artifact file name.
pub const ARTIFACT_PREFIX: &str = "cask_";

/// Default endpoint serving the version listing JSON.
pub const DEFAULT_API_URL: &str = "https://get.caskproject.org/cask/api.json";

/// Default artifact URL template. `{version}` and `{artifact}` are
/// substituted per download.
pub const DEFAULT_MIRROR_URL_TEMPLATE: &str =
    "https://github.com/caskproject/cask/releases/download/v{version}/{artifact}";

/// Base URL of the nightly build host.
pub const NIGHTLY_BASE_URL: &str = "https://nightlies.caskproject.org";

/// Hard ceiling on the decompressed size of any single extracted file.
/// Guards against decompression bombs.
pub const MAX_UNCOMPRESSED_SIZE: u64 = 1024 * 1024 * 1024 * 1024;
