//! Verified downloading of Cask releases.
//!
//! [`HttpDownloader`] talks to the listing endpoint and artifact mirror,
//! verifying every archive against its signed checksum manifest before
//! extracting the binary. [`CachingDownloader`] wraps any downloader with
//! a cache directory that doubles as a servable mirror tree. Storage is
//! pluggable through [`CacheStorage`]; [`FilesystemStorage`] is the stock
//! implementation.

pub use cache::{CacheConfig, CacheTimeout, CachingDownloader};
pub use client::{HttpClient, ReqwestClient};
pub use config::DownloaderConfig;
pub use downloader::{ApiResponse, Downloader, HttpDownloader, filter_and_sort};
pub use error::{DownloadError, Result};
pub use nightly::NightlyId;
pub use options::{DownloadOptions, ListOptions};
pub use storage::{CacheError, CacheStorage, FilesystemStorage, StoredEntry};

pub mod artifact;
pub mod branding;
mod cache;
mod client;
mod config;
mod downloader;
mod error;
mod nightly;
mod options;
mod storage;

#[cfg(test)]
mod test_support;
