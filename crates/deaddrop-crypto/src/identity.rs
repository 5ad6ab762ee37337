//! Long-term X25519 identity
//!
//! The identity authenticates application messages; the transport layer
//! uses a separate Ed25519 keypair managed by the swarm. Peers know each
//! other only by the base58 encoding of the X25519 public key.

use rand::rngs::OsRng;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroize;

use crate::error::{CryptoError, CryptoResult};

/// Size of an X25519 public key in bytes
pub const PUBLIC_KEY_SIZE: usize = 32;

/// X25519 keypair identifying this installation
///
/// The private scalar is zeroized when the last clone is dropped
/// (via the `zeroize` feature of x25519-dalek).
#[derive(Clone)]
pub struct Identity {
    public_key: PublicKey,
    private_key: StaticSecret,
}

impl Identity {
    /// Generate a new random identity
    pub fn generate() -> Self {
        let private_key = StaticSecret::random_from_rng(OsRng);
        let public_key = PublicKey::from(&private_key);
        Self {
            public_key,
            private_key,
        }
    }

    /// Rebuild an identity from a raw private scalar
    ///
    /// The caller's copy of the scalar is wiped before returning.
    pub fn from_private_bytes(mut bytes: [u8; 32]) -> Self {
        let private_key = StaticSecret::from(bytes);
        bytes.zeroize();
        let public_key = PublicKey::from(&private_key);
        Self {
            public_key,
            private_key,
        }
    }

    /// The public half of the keypair
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Public identifier: base58 of the public key
    pub fn public_id(&self) -> String {
        bs58::encode(self.public_key.as_bytes()).into_string()
    }

    /// Perform ECDH with a peer's public key
    ///
    /// The returned bytes are raw shared-secret material; callers must
    /// zeroize them once a symmetric key has been derived.
    pub fn shared_secret(&self, peer: &PublicKey) -> [u8; 32] {
        self.private_key.diffie_hellman(peer).to_bytes()
    }

    /// Raw private scalar, for sealing into the identity file
    pub(crate) fn private_bytes(&self) -> [u8; 32] {
        self.private_key.to_bytes()
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("public_id", &self.public_id())
            .finish_non_exhaustive()
    }
}

/// Parse a base58 public identifier into a public key
///
/// Rejects strings that are not valid base58 or do not decode to
/// exactly 32 bytes.
pub fn parse_public_id(id: &str) -> CryptoResult<PublicKey> {
    let bytes = bs58::decode(id)
        .into_vec()
        .map_err(|e| CryptoError::InvalidKey(format!("invalid base58: {e}")))?;

    if bytes.len() != PUBLIC_KEY_SIZE {
        return Err(CryptoError::InvalidKey(format!(
            "expected {PUBLIC_KEY_SIZE}-byte key, got {}",
            bytes.len()
        )));
    }

    let mut key = [0u8; PUBLIC_KEY_SIZE];
    key.copy_from_slice(&bytes);
    Ok(PublicKey::from(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_exchange_commutes() {
        let alice = Identity::generate();
        let bob = Identity::generate();

        let alice_shared = alice.shared_secret(bob.public_key());
        let bob_shared = bob.shared_secret(alice.public_key());

        assert_eq!(alice_shared, bob_shared);
    }

    #[test]
    fn test_public_id_length() {
        // base58 of 32 bytes is 43 or 44 characters
        for _ in 0..16 {
            let id = Identity::generate().public_id();
            assert!(
                (43..=44).contains(&id.len()),
                "unexpected id length {}",
                id.len()
            );
        }
    }

    #[test]
    fn test_parse_public_id_roundtrip() {
        let identity = Identity::generate();
        let parsed = parse_public_id(&identity.public_id()).unwrap();
        assert_eq!(parsed.as_bytes(), identity.public_key().as_bytes());
    }

    #[test]
    fn test_parse_public_id_rejects_bad_input() {
        assert!(parse_public_id("not-base58-0OIl").is_err());
        // Valid base58, wrong decoded length
        assert!(parse_public_id("abc").is_err());
    }

    #[test]
    fn test_from_private_bytes_rebuilds_same_keypair() {
        let identity = Identity::generate();
        let rebuilt = Identity::from_private_bytes(identity.private_bytes());
        assert_eq!(identity.public_id(), rebuilt.public_id());
    }
}
