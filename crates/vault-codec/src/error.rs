//! Error types for vault-codec

use thiserror::Error;

use crate::outcome::FailureReason;

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

/// Codec error types
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    #[error("Hashing failed: {0}")]
    HashingFailed(String),

    #[error("Integrity check failed: {0}")]
    IntegrityFailure(FailureReason),

    #[error("Value could not be decoded: {0}")]
    Undecodable(FailureReason),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration errors, raised while resolving [`crate::CodecSettings`]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No encryption key configured - set VAULT_ENCRYPTION_KEY for production deployments")]
    MissingKey,

    #[error("Encryption key is too short: need at least {expected} bytes, got {got}")]
    WeakKey { expected: usize, got: usize },

    #[error("Invalid configuration value for {field}: {message}")]
    Invalid { field: &'static str, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<FailureReason> for CodecError {
    fn from(reason: FailureReason) -> Self {
        match reason {
            FailureReason::IntegrityCheckFailed => Self::IntegrityFailure(reason),
            _ => Self::Undecodable(reason),
        }
    }
}
