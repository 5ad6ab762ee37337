//! Per-file session keys
//!
//! A session key encrypts exactly one dead-drop payload and is dealt
//! into threshold shares immediately afterwards. The key material is
//! wiped on drop; callers that copy it out with [`SessionKey::expose`]
//! take over that responsibility.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::{rngs::OsRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CryptoError, CryptoResult};

/// Symmetric key size (256 bits)
pub const KEY_SIZE: usize = 32;

/// Nonce size for ChaCha20-Poly1305 (12 bytes)
pub const NONCE_SIZE: usize = 12;

/// Poly1305 authentication tag size (16 bytes)
pub const TAG_SIZE: usize = 16;

/// Random symmetric key scoped to a single dead drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKey([u8; KEY_SIZE]);

impl SessionKey {
    /// Generate a fresh random session key
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut key);
        Self(key)
    }

    /// Rebuild a session key from recovered bytes
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKey(format!(
                "expected {KEY_SIZE}-byte session key, got {}",
                bytes.len()
            )));
        }
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    /// Copy out the raw key material
    ///
    /// The caller must zeroize the returned array once done with it.
    pub fn expose(&self) -> [u8; KEY_SIZE] {
        self.0
    }

    /// Seal one chunk of plaintext
    ///
    /// Returns `nonce(12) || ciphertext || tag(16)` under a fresh
    /// random nonce.
    pub fn seal_chunk(&self, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        let cipher = ChaCha20Poly1305::new_from_slice(&self.0)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    /// Open one sealed chunk (`nonce || ciphertext || tag`)
    ///
    /// Fails with [`CryptoError::AuthFailure`] if any byte has been
    /// altered.
    pub fn open_chunk(&self, sealed: &[u8]) -> CryptoResult<Vec<u8>> {
        if sealed.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::TruncatedEnvelope {
                expected: NONCE_SIZE + TAG_SIZE,
                actual: sealed.len(),
            });
        }

        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        let cipher = ChaCha20Poly1305::new_from_slice(&self.0)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CryptoError::AuthFailure)
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKey(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open_roundtrip() {
        let key = SessionKey::generate();
        let data = b"chunk of a larger file";

        let sealed = key.seal_chunk(data).unwrap();
        assert_eq!(sealed.len(), NONCE_SIZE + data.len() + TAG_SIZE);

        let opened = key.open_chunk(&sealed).unwrap();
        assert_eq!(opened, data);
    }

    #[test]
    fn test_empty_chunk_roundtrip() {
        let key = SessionKey::generate();
        let sealed = key.seal_chunk(b"").unwrap();
        assert_eq!(key.open_chunk(&sealed).unwrap(), b"");
    }

    #[test]
    fn test_tampered_chunk_fails() {
        let key = SessionKey::generate();
        let mut sealed = key.seal_chunk(b"payload").unwrap();

        for i in 0..sealed.len() {
            sealed[i] ^= 0x01;
            assert!(matches!(
                key.open_chunk(&sealed),
                Err(CryptoError::AuthFailure)
            ));
            sealed[i] ^= 0x01;
        }
    }

    #[test]
    fn test_wrong_key_fails() {
        let sealed = SessionKey::generate().seal_chunk(b"payload").unwrap();
        let other = SessionKey::generate();
        assert!(matches!(
            other.open_chunk(&sealed),
            Err(CryptoError::AuthFailure)
        ));
    }

    #[test]
    fn test_truncated_chunk_rejected() {
        let key = SessionKey::generate();
        assert!(matches!(
            key.open_chunk(&[0u8; 5]),
            Err(CryptoError::TruncatedEnvelope { .. })
        ));
    }

    #[test]
    fn test_from_bytes_length_check() {
        assert!(SessionKey::from_bytes(&[0u8; 31]).is_err());
        assert!(SessionKey::from_bytes(&[0u8; 32]).is_ok());
    }
}
