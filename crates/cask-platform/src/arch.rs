use std::fmt;
use std::str::FromStr;

use crate::error::{PlatformError, Result};

/// CPU architecture a release artifact targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Architecture {
    /// Resolves to the host architecture.
    #[default]
    Auto,
    X86,
    Amd64,
    Arm,
    Arm64,
}

impl Architecture {
    pub fn as_str(self) -> &'static str {
        match self {
            Architecture::Auto => "",
            Architecture::X86 => "386",
            Architecture::Amd64 => "amd64",
            Architecture::Arm => "arm",
            Architecture::Arm64 => "arm64",
        }
    }

    /// Replaces `Auto` with the architecture of the current host.
    pub fn resolve_auto(self) -> Result<Architecture> {
        if self != Architecture::Auto {
            return Ok(self);
        }
        match std::env::consts::ARCH {
            "x86" => Ok(Architecture::X86),
            "x86_64" => Ok(Architecture::Amd64),
            "arm" => Ok(Architecture::Arm),
            "aarch64" => Ok(Architecture::Arm64),
            other => Err(PlatformError::UnsupportedArchitecture(other.to_string())),
        }
    }

    /// All concrete architectures, excluding `Auto`.
    pub fn values() -> [Architecture; 4] {
        [
            Architecture::X86,
            Architecture::Amd64,
            Architecture::Arm,
            Architecture::Arm64,
        ]
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Architecture {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" => Ok(Architecture::Auto),
            "386" => Ok(Architecture::X86),
            "amd64" => Ok(Architecture::Amd64),
            "arm" => Ok(Architecture::Arm),
            "arm64" => Ok(Architecture::Arm64),
            other => Err(PlatformError::InvalidArchitecture(other.to_string())),
        }
    }
}
