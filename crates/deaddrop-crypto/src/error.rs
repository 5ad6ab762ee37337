//! Error types for deaddrop-crypto

use thiserror::Error;

/// Errors that can occur during cryptographic operations
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The identity file exists but the password does not decrypt it
    #[error("wrong password for identity file")]
    WrongPassword,

    /// AEAD tag verification failed on a message or chunk
    #[error("message authentication failed")]
    AuthFailure,

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("invalid identity file: {0}")]
    InvalidIdentityFile(String),

    #[error("envelope too short: expected at least {expected} bytes, got {actual}")]
    TruncatedEnvelope { expected: usize, actual: usize },

    /// The vault has not been unsealed yet
    #[error("identity vault is sealed")]
    Sealed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for crypto operations
pub type CryptoResult<T> = Result<T, CryptoError>;
