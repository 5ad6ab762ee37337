//! Password-sealed identity persistence
//!
//! The vault keeps exactly one identity file per installation. The
//! private scalar is sealed under a key derived from the user password
//! with Argon2id and stored as a self-describing JSON record
//! `{ salt, nonce, ciphertext }`. Once unsealed, the keypair is cached
//! in process memory for the lifetime of the application so the user
//! is never re-prompted; [`Vault::seal`] wipes the cache on shutdown.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use argon2::{Algorithm, Argon2, Params, Version};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::error::{CryptoError, CryptoResult};
use crate::identity::Identity;
use crate::session::NONCE_SIZE;

/// Filename of the encrypted identity record
pub const IDENTITY_FILE: &str = "identity.enc";

const SALT_SIZE: usize = 16;

// Argon2id parameters: 16 MiB memory, 3 iterations, 1 lane
const ARGON2_MEMORY_KIB: u32 = 16 * 1024;
const ARGON2_ITERATIONS: u32 = 3;
const ARGON2_LANES: u32 = 1;
const ARGON2_OUTPUT_LEN: usize = 32;

/// On-disk form of the sealed identity
#[derive(Serialize, Deserialize)]
struct SealedIdentity {
    salt: [u8; SALT_SIZE],
    nonce: [u8; NONCE_SIZE],
    ciphertext: Vec<u8>,
}

/// Password-gated store for the long-term identity
///
/// The unsealed keypair is held behind a single-writer lock and is
/// effectively write-once: repeated [`Vault::unseal`] calls re-verify
/// the password against the file but never replace a live identity.
pub struct Vault {
    path: PathBuf,
    unsealed: Mutex<Option<Identity>>,
}

impl Vault {
    /// Create a vault rooted at the given data directory
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: data_dir.into().join(IDENTITY_FILE),
            unsealed: Mutex::new(None),
        }
    }

    /// Path of the encrypted identity file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unseal the identity, creating it on first use
    ///
    /// If no identity file exists, a fresh keypair is generated and
    /// sealed under the password. If one exists, it is decrypted; an
    /// AEAD tag failure maps to [`CryptoError::WrongPassword`]. Either
    /// way the keypair is cached and the public identifier returned.
    pub fn unseal(&self, password: &str) -> CryptoResult<String> {
        let identity = if self.path.exists() {
            self.load(password)?
        } else {
            let identity = Identity::generate();
            self.store(&identity, password)?;
            info!(public_id = %identity.public_id(), "generated new identity");
            identity
        };

        let public_id = identity.public_id();
        let mut cache = self.unsealed.lock().expect("identity cache lock poisoned");
        if cache.is_none() {
            *cache = Some(identity);
        }
        Ok(public_id)
    }

    /// Clone the unsealed identity out of the cache
    pub fn identity(&self) -> CryptoResult<Identity> {
        self.unsealed
            .lock()
            .expect("identity cache lock poisoned")
            .clone()
            .ok_or(CryptoError::Sealed)
    }

    /// Public identifier of the unsealed identity
    pub fn public_id(&self) -> CryptoResult<String> {
        Ok(self.identity()?.public_id())
    }

    /// Whether the identity has been unsealed this process
    pub fn is_unsealed(&self) -> bool {
        self.unsealed
            .lock()
            .expect("identity cache lock poisoned")
            .is_some()
    }

    /// Wipe the in-memory identity
    ///
    /// Dropping the cached identity zeroizes the private scalar. The
    /// on-disk file is untouched; the next [`Vault::unseal`] restores it.
    pub fn seal(&self) {
        self.unsealed
            .lock()
            .expect("identity cache lock poisoned")
            .take();
    }

    fn store(&self, identity: &Identity, password: &str) -> CryptoResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut salt = [0u8; SALT_SIZE];
        OsRng.fill_bytes(&mut salt);
        let key = derive_key(password, &salt)?;

        let cipher = ChaCha20Poly1305::new_from_slice(&key[..])
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let private_bytes = Zeroizing::new(identity.private_bytes());
        let ciphertext = cipher
            .encrypt(nonce, &private_bytes[..])
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        let sealed = SealedIdentity {
            salt,
            nonce: nonce_bytes,
            ciphertext,
        };
        let json = serde_json::to_string(&sealed)
            .map_err(|e| CryptoError::InvalidIdentityFile(e.to_string()))?;

        // Write-then-rename so a crash never leaves a half-written record
        let tmp = self.path.with_extension("enc.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), "sealed identity to disk");
        Ok(())
    }

    fn load(&self, password: &str) -> CryptoResult<Identity> {
        let json = fs::read_to_string(&self.path)?;
        let sealed: SealedIdentity = serde_json::from_str(&json)
            .map_err(|e| CryptoError::InvalidIdentityFile(e.to_string()))?;

        let key = derive_key(password, &sealed.salt)?;
        let cipher = ChaCha20Poly1305::new_from_slice(&key[..])
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        let plaintext = Zeroizing::new(
            cipher
                .decrypt(
                    Nonce::from_slice(&sealed.nonce),
                    sealed.ciphertext.as_slice(),
                )
                .map_err(|_| CryptoError::WrongPassword)?,
        );

        if plaintext.len() != 32 {
            return Err(CryptoError::InvalidIdentityFile(format!(
                "expected 32-byte scalar, got {}",
                plaintext.len()
            )));
        }

        let mut scalar = [0u8; 32];
        scalar.copy_from_slice(&plaintext);
        let identity = Identity::from_private_bytes(scalar);

        debug!(public_id = %identity.public_id(), "unsealed identity from disk");
        Ok(identity)
    }
}

/// Derive the file-sealing key from the password and salt
fn derive_key(password: &str, salt: &[u8]) -> CryptoResult<Zeroizing<[u8; 32]>> {
    let params = Params::new(
        ARGON2_MEMORY_KIB,
        ARGON2_ITERATIONS,
        ARGON2_LANES,
        Some(ARGON2_OUTPUT_LEN),
    )
    .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut key[..])
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_unseal_creates_identity_file() {
        let dir = TempDir::new().unwrap();
        let vault = Vault::new(dir.path());

        assert!(!vault.is_unsealed());
        let public_id = vault.unseal("p@ss").unwrap();

        assert!(vault.path().exists());
        assert!((43..=44).contains(&public_id.len()));
        assert!(vault.is_unsealed());
        assert_eq!(vault.public_id().unwrap(), public_id);
    }

    #[test]
    fn test_unseal_roundtrip_same_password() {
        let dir = TempDir::new().unwrap();

        let first = Vault::new(dir.path()).unseal("p@ss").unwrap();
        // Fresh vault instance, same file
        let second = Vault::new(dir.path()).unseal("p@ss").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_wrong_password() {
        let dir = TempDir::new().unwrap();
        Vault::new(dir.path()).unseal("p@ss").unwrap();

        let vault = Vault::new(dir.path());
        assert!(matches!(
            vault.unseal("wrong"),
            Err(CryptoError::WrongPassword)
        ));
        assert!(!vault.is_unsealed());
    }

    #[test]
    fn test_unseal_is_idempotent_for_cached_identity() {
        let dir = TempDir::new().unwrap();
        let vault = Vault::new(dir.path());

        let first = vault.unseal("p@ss").unwrap();
        let second = vault.unseal("p@ss").unwrap();
        assert_eq!(first, second);

        // A wrong password is still rejected even while cached
        assert!(matches!(
            vault.unseal("wrong"),
            Err(CryptoError::WrongPassword)
        ));
        // ...and the cached identity survives the failed attempt
        assert_eq!(vault.public_id().unwrap(), first);
    }

    #[test]
    fn test_identity_requires_unseal() {
        let dir = TempDir::new().unwrap();
        let vault = Vault::new(dir.path());
        assert!(matches!(vault.identity(), Err(CryptoError::Sealed)));
    }

    #[test]
    fn test_seal_wipes_cache() {
        let dir = TempDir::new().unwrap();
        let vault = Vault::new(dir.path());
        vault.unseal("p@ss").unwrap();

        vault.seal();
        assert!(!vault.is_unsealed());
        assert!(matches!(vault.identity(), Err(CryptoError::Sealed)));
    }

    #[test]
    fn test_corrupt_file_rejected() {
        let dir = TempDir::new().unwrap();
        let vault = Vault::new(dir.path());
        fs::write(vault.path(), b"not json").unwrap();

        assert!(matches!(
            vault.unseal("p@ss"),
            Err(CryptoError::InvalidIdentityFile(_))
        ));
    }

    #[test]
    fn test_sealed_record_shape() {
        let dir = TempDir::new().unwrap();
        let vault = Vault::new(dir.path());
        vault.unseal("p@ss").unwrap();

        let json = fs::read_to_string(vault.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["salt"].as_array().unwrap().len(), SALT_SIZE);
        assert_eq!(value["nonce"].as_array().unwrap().len(), NONCE_SIZE);
        // 32-byte scalar plus the 16-byte tag
        assert_eq!(value["ciphertext"].as_array().unwrap().len(), 48);
    }
}
