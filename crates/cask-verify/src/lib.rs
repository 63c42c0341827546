//! Artifact verification for Cask releases.
//!
//! A release ships a checksum manifest listing the SHA-256 digest of every
//! artifact, plus a detached Ed25519 signature over the manifest bytes.
//! Verifying an artifact means checking the signature first and only then
//! comparing the artifact's digest against the manifest line that names it.
//!
//! Keys travel in an ASCII armor so they can live in configuration files:
//!
//! ```text
//! -----BEGIN CASK PUBLIC KEY-----
//! <base64 of the 32 raw key bytes>
//! -----END CASK PUBLIC KEY-----
//! ```

pub use self::error::{Result, VerifyError};
pub use self::hasher::{Hasher, Sha256Hasher};
pub use self::keys::{PublicKey, SecretKey};
pub use self::manifest::{ArtifactVerifier, ManifestBuilder, find_checksum, verify_artifact};

mod error;
mod hasher;
mod keys;
mod manifest;
