use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlatformError>;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("invalid platform: {0}")]
    InvalidPlatform(String),

    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("invalid architecture: {0}")]
    InvalidArchitecture(String),

    #[error("unsupported architecture: {0}")]
    UnsupportedArchitecture(String),
}
