use std::fmt;
use std::str::FromStr;

use crate::error::{PlatformError, Result};

/// Operating system a release artifact targets.
///
/// The wire name for macOS is `darwin`, matching the artifact naming
/// convention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Resolves to the host operating system.
    #[default]
    Auto,
    Windows,
    Linux,
    MacOS,
    Solaris,
    OpenBsd,
    FreeBsd,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Auto => "",
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::MacOS => "darwin",
            Platform::Solaris => "solaris",
            Platform::OpenBsd => "openbsd",
            Platform::FreeBsd => "freebsd",
        }
    }

    /// Replaces `Auto` with the platform of the current host.
    pub fn resolve_auto(self) -> Result<Platform> {
        if self != Platform::Auto {
            return Ok(self);
        }
        match std::env::consts::OS {
            "windows" => Ok(Platform::Windows),
            "linux" => Ok(Platform::Linux),
            "macos" => Ok(Platform::MacOS),
            "solaris" => Ok(Platform::Solaris),
            "openbsd" => Ok(Platform::OpenBsd),
            "freebsd" => Ok(Platform::FreeBsd),
            other => Err(PlatformError::UnsupportedPlatform(other.to_string())),
        }
    }

    /// All concrete platforms, excluding `Auto`.
    pub fn values() -> [Platform; 6] {
        [
            Platform::Windows,
            Platform::Linux,
            Platform::MacOS,
            Platform::Solaris,
            Platform::OpenBsd,
            Platform::FreeBsd,
        ]
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" => Ok(Platform::Auto),
            "windows" => Ok(Platform::Windows),
            "linux" => Ok(Platform::Linux),
            "darwin" => Ok(Platform::MacOS),
            "solaris" => Ok(Platform::Solaris),
            "openbsd" => Ok(Platform::OpenBsd),
            "freebsd" => Ok(Platform::FreeBsd),
            other => Err(PlatformError::InvalidPlatform(other.to_string())),
        }
    }
}
