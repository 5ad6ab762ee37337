//! Error types for the node coordinator
//!
//! Host commands surface exactly one error string; the wrapped
//! subsystem errors pass through transparently.

use thiserror::Error;

/// Errors surfaced over the host command interface
#[derive(Debug, Error)]
pub enum NodeError {
    /// Ghost Mode was started twice
    #[error("ghost mode is already running")]
    AlreadyRunning,

    /// A Ghost Mode command arrived before `start_ghost_mode`
    #[error("ghost mode is not running")]
    NotRunning,

    #[error(transparent)]
    Crypto(#[from] deaddrop_crypto::CryptoError),

    #[error(transparent)]
    Gossip(#[from] deaddrop_gossip::GossipError),

    #[error(transparent)]
    Storage(#[from] deaddrop_storage::StorageError),
}

/// Result type for host commands
pub type NodeResult<T> = Result<T, NodeError>;
