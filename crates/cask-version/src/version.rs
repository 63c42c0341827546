use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, VersionError};
use crate::stability::Stability;

static VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<major>[0-9]+)\.(?P<minor>[0-9]+)\.(?P<patch>[0-9]+)(?:-(?P<stability>alpha|beta|rc)(?P<stabilityver>[0-9]+))?$",
    )
    .expect("version regex")
});

/// A validated release version.
///
/// Only successfully parsed instances exist, so accessors never fail.
/// Equality is equality of the original string; ordering is over the
/// `(major, minor, patch, stability, stability number)` tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    raw: String,
    major: u64,
    minor: u64,
    patch: u64,
    stability: Stability,
    stability_ver: Option<u64>,
}

impl Version {
    pub fn parse(s: &str) -> Result<Self> {
        let caps = VERSION_RE
            .captures(s)
            .ok_or_else(|| VersionError::InvalidVersion(s.to_string()))?;

        let field = |name: &str| -> Result<u64> {
            caps.name(name)
                .expect("mandatory capture")
                .as_str()
                .parse()
                .map_err(|_| VersionError::InvalidVersion(s.to_string()))
        };

        let stability = match caps.name("stability") {
            Some(m) => m.as_str().parse()?,
            None => Stability::Stable,
        };
        let stability_ver = match caps.name("stabilityver") {
            Some(m) => Some(
                m.as_str()
                    .parse()
                    .map_err(|_| VersionError::InvalidVersion(s.to_string()))?,
            ),
            None => None,
        };

        Ok(Self {
            raw: s.to_string(),
            major: field("major")?,
            minor: field("minor")?,
            patch: field("patch")?,
            stability,
            stability_ver,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    pub fn stability(&self) -> Stability {
        self.stability
    }

    /// The numeric suffix of a pre-release, e.g. `2` for `1.0.0-beta2`.
    /// `None` for stable versions.
    pub fn stability_ver(&self) -> Option<u64> {
        self.stability_ver
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (
            self.major,
            self.minor,
            self.patch,
            self.stability,
            self.stability_ver,
        )
            .cmp(&(
                other.major,
                other.minor,
                other.patch,
                other.stability,
                other.stability_ver,
            ))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Version::parse(&raw).map_err(D::Error::custom)
    }
}

/// A version together with the artifact file names published for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionWithArtifacts {
    pub id: Version,
    pub files: Vec<String>,
}

/// Sorts a listing newest-first. The sort is stable, so entries the
/// comparator cannot distinguish keep their server-provided order.
pub fn sort_descending(versions: &mut [VersionWithArtifacts]) {
    versions.sort_by(|a, b| b.id.cmp(&a.id));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stable_and_pre_release() {
        let v = Version::parse("1.2.3").unwrap();
        assert_eq!(v.major(), 1);
        assert_eq!(v.minor(), 2);
        assert_eq!(v.patch(), 3);
        assert_eq!(v.stability(), Stability::Stable);
        assert_eq!(v.stability_ver(), None);

        let v = Version::parse("1.2.3-rc4").unwrap();
        assert_eq!(v.stability(), Stability::Rc);
        assert_eq!(v.stability_ver(), Some(4));
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in [
            "",
            "1",
            "1.2",
            "1.2.3.4",
            "1.2.3-rc",
            "1.2.3-gamma1",
            "v1.2.3",
            "1.2.3 ",
            "1.2.3-rc1extra",
        ] {
            assert!(Version::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn ordering_follows_stability_ranks() {
        let order = ["1.0.0-alpha1", "1.0.0-beta2", "1.0.0-rc1", "1.0.0"];
        for pair in order.windows(2) {
            let lo = Version::parse(pair[0]).unwrap();
            let hi = Version::parse(pair[1]).unwrap();
            assert!(lo < hi, "{lo} should order below {hi}");
        }

        let a = Version::parse("1.0.0-rc1").unwrap();
        let b = Version::parse("1.0.0-rc2").unwrap();
        assert!(a < b);

        let a = Version::parse("1.10.0").unwrap();
        let b = Version::parse("1.9.9").unwrap();
        assert!(a > b);
    }

    #[test]
    fn descending_sort_is_idempotent() {
        let mut listing: Vec<VersionWithArtifacts> = ["1.0.0-rc1", "1.1.0", "0.9.0", "1.0.0"]
            .iter()
            .map(|s| VersionWithArtifacts {
                id: s.parse().unwrap(),
                files: vec![],
            })
            .collect();

        sort_descending(&mut listing);
        let once: Vec<String> = listing.iter().map(|v| v.id.to_string()).collect();
        sort_descending(&mut listing);
        let twice: Vec<String> = listing.iter().map(|v| v.id.to_string()).collect();

        assert_eq!(once, vec!["1.1.0", "1.0.0", "1.0.0-rc1", "0.9.0"]);
        assert_eq!(once, twice);
    }

    #[test]
    fn serde_uses_the_raw_string() {
        let v = Version::parse("2.0.0-beta1").unwrap();
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "\"2.0.0-beta1\"");
        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);

        assert!(serde_json::from_str::<Version>("\"not-a-version\"").is_err());
    }
}
