//! Error types for deaddrop-gossip

use thiserror::Error;

use deaddrop_crypto::CryptoError;

/// Errors that can occur in the Ghost Mode layer
///
/// Start idempotence is enforced by the node coordinator, which owns
/// the actor handle; this crate always builds a fresh actor, so there
/// is no already-running case at this layer.
#[derive(Debug, Error)]
pub enum GossipError {
    /// The actor is not running (or has already shut down)
    #[error("ghost mode is not running")]
    NotRunning,

    /// Recipient is not a valid base58 32-byte public key
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),

    /// The gossip layer refused or failed the publish
    #[error("publish failed: {0}")]
    PublishFailed(String),

    #[error("failed to subscribe to topic: {0}")]
    SubscribeFailed(String),

    /// Transport construction or listen failure
    #[error("transport error: {0}")]
    Transport(String),

    /// The actor dropped a command reply without answering
    #[error("channel closed")]
    ChannelClosed,

    /// Payload could not be encoded or decoded
    #[error("codec error: {0}")]
    Codec(String),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl From<serde_json::Error> for GossipError {
    fn from(e: serde_json::Error) -> Self {
        GossipError::Codec(e.to_string())
    }
}

/// Result type for gossip operations
pub type GossipResult<T> = Result<T, GossipError>;
