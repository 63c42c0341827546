use std::fmt;
use std::str::FromStr;

use crate::error::VersionError;
use crate::version::Version;

/// Pre-release stability tiers, ordered from least to most stable.
///
/// Used both as a parse result on [`Version`] and as a caller-supplied
/// minimum-acceptance filter when listing versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stability {
    Alpha,
    Beta,
    Rc,
    Stable,
}

impl Stability {
    /// Returns true if the version meets this stability threshold or better.
    pub fn matches(self, version: &Version) -> bool {
        version.stability() >= self
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stability::Alpha => "alpha",
            Stability::Beta => "beta",
            Stability::Rc => "rc",
            Stability::Stable => "",
        }
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stability {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alpha" => Ok(Stability::Alpha),
            "beta" => Ok(Stability::Beta),
            "rc" => Ok(Stability::Rc),
            "" | "stable" => Ok(Stability::Stable),
            other => Err(VersionError::InvalidStability(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_ordered() {
        assert!(Stability::Alpha < Stability::Beta);
        assert!(Stability::Beta < Stability::Rc);
        assert!(Stability::Rc < Stability::Stable);
    }

    #[test]
    fn matches_is_a_minimum() {
        let rc: Version = "1.2.0-rc1".parse().unwrap();
        let stable: Version = "1.2.0".parse().unwrap();
        let beta: Version = "1.2.0-beta3".parse().unwrap();

        assert!(Stability::Beta.matches(&rc));
        assert!(Stability::Beta.matches(&stable));
        assert!(Stability::Beta.matches(&beta));
        assert!(!Stability::Rc.matches(&beta));
        assert!(!Stability::Stable.matches(&rc));
    }

    #[test]
    fn parse_round_trips() {
        for s in ["alpha", "beta", "rc", ""] {
            let tier: Stability = s.parse().unwrap();
            assert_eq!(tier.as_str(), s);
        }
        assert!("nightly".parse::<Stability>().is_err());
    }
}
