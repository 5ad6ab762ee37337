//! Error types for deaddrop-storage

use thiserror::Error;

use deaddrop_crypto::CryptoError;

/// Errors that can occur in the dead-drop pipeline
#[derive(Debug, Error)]
pub enum StorageError {
    /// Share policy outside `2 <= threshold <= total <= 10`
    #[error("invalid share policy: {threshold}-of-{total}")]
    InvalidPolicy { threshold: u32, total: u32 },

    /// The storage daemon rejected the upload
    #[error("upload failed: {0}")]
    UploadFailed(String),

    /// The storage daemon could not be reached
    #[error("storage daemon unavailable: {0}")]
    StorageUnavailable(String),

    /// The session key could not be rebuilt from the given shares
    #[error("key recovery failed: {0}")]
    KeyRecovery(String),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline operations
pub type StorageResult<T> = Result<T, StorageError>;
