//! The dead-drop pipeline
//!
//! `create_drop` is single-shot: encrypt to a temp file, publish,
//! deal shares, wipe the key. Nothing is retried and no shares exist
//! until the upload has succeeded, so a failed drop leaves the caller
//! with nothing to leak. The reverse path rebuilds the key from any
//! threshold subset of shares and streams the blob back to plaintext.
//!
//! Chunk encryption is CPU-bound and runs on the blocking worker pool
//! so it never ties up an async worker thread; the callers suspend
//! only on the HTTP transfers and the worker joins.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use zeroize::Zeroize;

use deaddrop_crypto::SessionKey;

use crate::chunks::{decrypt_stream, encrypt_stream};
use crate::error::{StorageError, StorageResult};
use crate::ipfs::IpfsClient;
use crate::shares::{deal_shares, recover_key, validate_policy};

/// Outcome of a successful drop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropReceipt {
    /// Content identifier of the published ciphertext
    pub cid: String,
    /// Hex-encoded key shares, `threshold` of which recover the key
    pub shards: Vec<String>,
}

/// Encrypt a file, publish it, and deal the key into shares
pub async fn create_drop(
    path: &Path,
    threshold: u32,
    total: u32,
    ipfs: &IpfsClient,
) -> StorageResult<DropReceipt> {
    validate_policy(threshold, total)?;

    let mut key = SessionKey::generate();
    let sealed = NamedTempFile::new()?;

    // Stream encryption on the blocking pool; the worker's key clone
    // wipes itself on drop
    let input = path.to_path_buf();
    let sealed_path = sealed.path().to_path_buf();
    let stream_key = key.clone();
    let encrypted_len = tokio::task::spawn_blocking(move || -> StorageResult<u64> {
        let mut reader = BufReader::new(File::open(&input)?);
        let mut writer = BufWriter::new(File::create(&sealed_path)?);
        encrypt_stream(&mut reader, &mut writer, &stream_key)
    })
    .await
    .map_err(|e| StorageError::Io(io::Error::other(e)))??;
    debug!(
        input = %path.display(),
        encrypted_len,
        "sealed drop payload"
    );

    let cid = ipfs.add(sealed.path()).await?;

    // Shares exist only once the upload has succeeded
    let shards = deal_shares(&key, threshold, total)?;
    key.zeroize();

    info!(%cid, threshold, total, "created drop");
    Ok(DropReceipt { cid, shards })
}

/// Fetch a drop, rebuild the key from shares, and decrypt it
///
/// Returns the number of plaintext bytes written to `output`.
pub async fn retrieve_drop(
    cid: &str,
    shards: &[String],
    output: &Path,
    ipfs: &IpfsClient,
) -> StorageResult<u64> {
    let mut key = recover_key(shards)?;

    let fetched = NamedTempFile::new()?;
    ipfs.cat(cid, fetched.path()).await?;

    let fetched_path = fetched.path().to_path_buf();
    let output_path = output.to_path_buf();
    let stream_key = key.clone();
    let recovered = tokio::task::spawn_blocking(move || -> StorageResult<u64> {
        let mut reader = BufReader::new(File::open(&fetched_path)?);
        let mut writer = BufWriter::new(File::create(&output_path)?);
        decrypt_stream(&mut reader, &mut writer, &stream_key)
    })
    .await
    .map_err(|e| StorageError::Io(io::Error::other(e)))??;
    key.zeroize();

    info!(%cid, bytes = recovered, output = %output.display(), "retrieved drop");
    Ok(recovered)
}
