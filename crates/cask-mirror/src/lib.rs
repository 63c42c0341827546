//! Artifact mirroring for Cask releases.
//!
//! A [`Mirror`] serves the same listing and artifact layout the official
//! endpoints use, either as an origin (populated by a [`ReleaseBuilder`])
//! or as a pull-through cache in front of another [`Downloader`]. The
//! [`router`] function exposes it over HTTP so stock downloaders can point
//! at it unchanged.
//!
//! [`Downloader`]: cask_fetch::Downloader

pub use error::{MirrorError, Result};
pub use http::{router, serve};
pub use mirror::{Mirror, MirrorConfig};
pub use release::ReleaseBuilder;

mod error;
mod http;
mod mirror;
mod release;
