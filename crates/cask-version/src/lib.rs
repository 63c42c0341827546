//! Version types and operations for Cask releases.
//!
//! Release versions follow a fixed `MAJOR.MINOR.PATCH[-STABILITYn]` grammar
//! where the stability suffix is one of `alpha`, `beta`, or `rc`. A version
//! without a suffix is stable and orders above any pre-release of the same
//! triple.

pub use error::{Result, VersionError};
pub use stability::Stability;
pub use version::{Version, VersionWithArtifacts, sort_descending};

mod error;
mod stability;
mod version;
