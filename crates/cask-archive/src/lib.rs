//! Release archive handling.
//!
//! Artifacts are gzip-compressed tarballs holding the product binary plus
//! optional extra files. Extraction is single-entry and size-bounded so a
//! hostile archive cannot expand past the caller's limit.

pub use error::{ArchiveError, Result};
pub use extract::extract_binary;
pub use package::package_binary;

mod error;
mod extract;
mod package;
