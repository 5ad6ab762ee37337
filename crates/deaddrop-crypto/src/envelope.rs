//! End-to-end message envelopes
//!
//! Wire format: `sender_pk(32) || nonce(12) || ciphertext || tag(16)`.
//! Carrying the sender's long-term public key in the clear lets the
//! receiver perform ECDH without any out-of-band state; the first
//! message can be sent right after pasting a public identifier.
//!
//! The AEAD key is derived from the X25519 shared secret under a
//! domain-separation label so ghost-message keys can never collide
//! with the dead-drop file AEAD.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use x25519_dalek::PublicKey;
use zeroize::{Zeroize, Zeroizing};

use crate::error::{CryptoError, CryptoResult};
use crate::identity::{Identity, PUBLIC_KEY_SIZE};
use crate::session::{NONCE_SIZE, TAG_SIZE};

/// Domain-separation label for the message-key KDF
const KEY_LABEL: &[u8] = b"deaddrop-message-key";

/// Minimum length of a well-formed envelope
pub const MIN_ENVELOPE_SIZE: usize = PUBLIC_KEY_SIZE + NONCE_SIZE + TAG_SIZE;

/// Derive the AEAD key for a message: SHA-256(label || shared secret)
fn message_key(shared_secret: &[u8; 32]) -> Zeroizing<[u8; 32]> {
    let mut hasher = Sha256::new();
    hasher.update(KEY_LABEL);
    hasher.update(shared_secret);
    let digest = hasher.finalize();

    let mut key = Zeroizing::new([0u8; 32]);
    key.copy_from_slice(&digest);
    key
}

/// Encrypt a message to a recipient
///
/// Returns `sender_pk || nonce || ciphertext || tag`.
pub fn encrypt_to(
    sender: &Identity,
    recipient: &PublicKey,
    plaintext: &[u8],
) -> CryptoResult<Vec<u8>> {
    let mut shared = sender.shared_secret(recipient);
    let key = message_key(&shared);
    shared.zeroize();

    let cipher = ChaCha20Poly1305::new_from_slice(&key[..])
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let mut envelope = Vec::with_capacity(PUBLIC_KEY_SIZE + NONCE_SIZE + ciphertext.len());
    envelope.extend_from_slice(sender.public_key().as_bytes());
    envelope.extend_from_slice(&nonce_bytes);
    envelope.extend_from_slice(&ciphertext);
    Ok(envelope)
}

/// Decrypt an envelope addressed to us
///
/// Returns the sender's public key alongside the plaintext. Fails with
/// [`CryptoError::AuthFailure`] on any tag mismatch, including a
/// ciphertext that was encrypted for a different recipient.
pub fn decrypt_from(receiver: &Identity, envelope: &[u8]) -> CryptoResult<(PublicKey, Vec<u8>)> {
    if envelope.len() < MIN_ENVELOPE_SIZE {
        return Err(CryptoError::TruncatedEnvelope {
            expected: MIN_ENVELOPE_SIZE,
            actual: envelope.len(),
        });
    }

    let (sender_bytes, rest) = envelope.split_at(PUBLIC_KEY_SIZE);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_SIZE);

    let mut sender_key = [0u8; PUBLIC_KEY_SIZE];
    sender_key.copy_from_slice(sender_bytes);
    let sender = PublicKey::from(sender_key);

    let mut shared = receiver.shared_secret(&sender);
    let key = message_key(&shared);
    shared.zeroize();

    let cipher = ChaCha20Poly1305::new_from_slice(&key[..])
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| CryptoError::AuthFailure)?;

    Ok((sender, plaintext))
}
