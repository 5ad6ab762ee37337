//! # DeadDrop Storage
//!
//! The dead-drop pipeline: constant-memory chunked authenticated
//! encryption, publication to a content-addressed store, and threshold
//! splitting of the session key.
//!
//! ## Features
//!
//! - 4 MiB streaming windows, each sealed independently
//! - Single multipart upload to a local IPFS daemon
//! - `t`-of-`n` Shamir shares over GF(256) (`2 <= t <= n <= 10`)
//! - Session keys wiped immediately after dealing
//!
//! ## Example
//!
//! ```rust,ignore
//! use deaddrop_storage::{create_drop, retrieve_drop, IpfsClient};
//!
//! let ipfs = IpfsClient::default();
//!
//! // Encrypt + publish, 2-of-3 key split
//! let receipt = create_drop("secret.pdf".as_ref(), 2, 3, &ipfs).await?;
//! println!("cid: {}", receipt.cid);
//!
//! // Any two shares bring it back
//! let shares = &receipt.shards[..2];
//! retrieve_drop(&receipt.cid, shares, "recovered.pdf".as_ref(), &ipfs).await?;
//! ```

pub mod chunks;
pub mod error;
pub mod ipfs;
pub mod pipeline;
pub mod shares;

// Re-exports
pub use chunks::{decrypt_stream, encrypt_stream, CHUNK_SIZE};
pub use error::{StorageError, StorageResult};
pub use ipfs::{IpfsClient, DEFAULT_API_URL};
pub use pipeline::{create_drop, retrieve_drop, DropReceipt};
pub use shares::{deal_shares, recover_key, validate_policy, MAX_SHARES, MIN_THRESHOLD};
