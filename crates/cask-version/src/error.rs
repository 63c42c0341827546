use thiserror::Error;

pub type Result<T> = std::result::Result<T, VersionError>;

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("invalid version: {0}")]
    InvalidVersion(String),

    #[error("invalid stability value: {0}")]
    InvalidStability(String),
}
