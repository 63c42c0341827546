use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ArchiveError>;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive does not contain {name}")]
    MissingEntry { name: String },

    #[error("entry {name} exceeds the {limit} byte extraction limit")]
    EntryTooLarge { name: String, limit: u64 },

    #[error("corrupted archive: {0}")]
    Corrupted(io::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}
