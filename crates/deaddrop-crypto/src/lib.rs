//! # DeadDrop Crypto
//!
//! Identity vault and cryptographic primitives for DeadDrop.
//!
//! Provides the long-term X25519 identity, its password-sealed on-disk
//! form, ECDH-based message envelopes for Ghost Mode, and the per-file
//! session keys used by the dead-drop pipeline.
//!
//! ## Features
//!
//! - X25519 identity with a base58 public identifier
//! - Password-sealed identity file (Argon2id + ChaCha20-Poly1305)
//! - End-to-end message envelopes (`pk || nonce || ct || tag`)
//! - Random per-file session keys, zeroized on drop
//!
//! ## Example
//!
//! ```rust,ignore
//! use deaddrop_crypto::{envelope, Vault};
//!
//! // Unseal (or create) the identity under a password
//! let vault = Vault::new("./deaddrop-data");
//! let public_id = vault.unseal("p@ss")?;
//!
//! // Encrypt a message to a peer
//! let me = vault.identity()?;
//! let peer = deaddrop_crypto::parse_public_id(&peer_id)?;
//! let sealed = envelope::encrypt_to(&me, &peer, b"hello")?;
//!
//! // The peer recovers both the sender key and the plaintext
//! let (sender, plaintext) = envelope::decrypt_from(&peer_identity, &sealed)?;
//! ```
//!
//! ## Security model
//!
//! The long-term X25519 key doubles as the ECDH partner for every
//! message; there is no ephemeral ratchet. Compromise of the private
//! scalar therefore retroactively exposes all past messages. The wire
//! envelope carries the sender's long-term public key in the clear and
//! would need revision before any ratcheted scheme could be layered on.

pub mod envelope;
pub mod error;
pub mod identity;
pub mod session;
pub mod vault;

// Re-exports
pub use error::{CryptoError, CryptoResult};
pub use identity::{parse_public_id, Identity, PUBLIC_KEY_SIZE};
pub use session::{SessionKey, KEY_SIZE, NONCE_SIZE, TAG_SIZE};
pub use vault::{Vault, IDENTITY_FILE};

// Re-export the curve types so dependents don't need a direct
// x25519-dalek dependency just to name a peer key.
pub use x25519_dalek::PublicKey;
