use thiserror::Error;

pub type Result<T> = std::result::Result<T, VerifyError>;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("invalid signature encoding: {0}")]
    InvalidSignature(String),

    #[error("signature does not match the checksum manifest")]
    SignatureMismatch,

    #[error("no checksum recorded for artifact {artifact}")]
    MissingChecksum { artifact: String },

    #[error("checksum mismatch for artifact {artifact}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        artifact: String,
        expected: String,
        actual: String,
    },
}
