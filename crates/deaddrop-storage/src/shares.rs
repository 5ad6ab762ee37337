//! Threshold key shares
//!
//! The per-drop session key is dealt into `n` Shamir shares over
//! GF(256); any `t` of them rebuild the key, any `t - 1` reveal
//! nothing. Shares travel as hex strings so they can be pasted into
//! any channel.

use sharks::{Share, Sharks};
use zeroize::Zeroize;

use deaddrop_crypto::SessionKey;

use crate::error::{StorageError, StorageResult};

/// Smallest allowed threshold
pub const MIN_THRESHOLD: u32 = 2;

/// Largest allowed number of shares
pub const MAX_SHARES: u32 = 10;

/// Check a `t`-of-`n` policy
pub fn validate_policy(threshold: u32, total: u32) -> StorageResult<()> {
    if threshold < MIN_THRESHOLD || total > MAX_SHARES || threshold > total {
        return Err(StorageError::InvalidPolicy { threshold, total });
    }
    Ok(())
}

/// Deal `total` hex-encoded shares of the session key
pub fn deal_shares(key: &SessionKey, threshold: u32, total: u32) -> StorageResult<Vec<String>> {
    validate_policy(threshold, total)?;

    let mut secret = key.expose();
    let sharks = Sharks(threshold as u8);
    let shares: Vec<String> = sharks
        .dealer(&secret)
        .take(total as usize)
        .map(|share| hex::encode(Vec::from(&share)))
        .collect();
    secret.zeroize();

    Ok(shares)
}

/// Rebuild the session key from hex-encoded shares
///
/// The polynomial degree is fixed at dealing time; feeding fewer than
/// `threshold` shares yields bytes unrelated to the original key, so
/// the subsequent chunk decryption fails authentication.
pub fn recover_key(shares: &[String]) -> StorageResult<SessionKey> {
    if shares.is_empty() {
        return Err(StorageError::KeyRecovery("no shares provided".to_string()));
    }

    let parsed: Vec<Share> = shares
        .iter()
        .map(|s| {
            let bytes = hex::decode(s)
                .map_err(|e| StorageError::KeyRecovery(format!("invalid hex share: {e}")))?;
            Share::try_from(bytes.as_slice())
                .map_err(|e| StorageError::KeyRecovery(format!("malformed share: {e}")))
        })
        .collect::<StorageResult<_>>()?;

    let mut secret = Sharks(0)
        .recover(&parsed)
        .map_err(|e| StorageError::KeyRecovery(e.to_string()))?;

    let key = SessionKey::from_bytes(&secret).map_err(StorageError::from);
    secret.zeroize();
    key
}
