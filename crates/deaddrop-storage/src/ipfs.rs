//! Client for the local IPFS HTTP API
//!
//! Talks to the daemon's `/api/v0` endpoint: one multipart `add` per
//! drop, a streaming `cat` for retrieval, and `id` as a liveness
//! probe. Connection-level failures map to `StorageUnavailable`; a
//! daemon that answers but rejects the upload maps to `UploadFailed`.

use std::path::Path;

use futures::StreamExt;
use reqwest::multipart;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::error::{StorageError, StorageResult};

/// Default API endpoint of a local IPFS daemon
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5001/api/v0";

/// Thin client over the daemon's HTTP API
#[derive(Debug, Clone)]
pub struct IpfsClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

#[derive(Debug, Deserialize)]
struct IdResponse {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "AgentVersion")]
    agent_version: String,
}

impl IpfsClient {
    /// Create a client for the given API base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// API base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload a file as a single multipart `add`
    ///
    /// The file is streamed from disk, so upload memory stays constant
    /// regardless of blob size. Returns the content identifier.
    pub async fn add(&self, path: &Path) -> StorageResult<String> {
        let file = tokio::fs::File::open(path).await?;
        let len = file.metadata().await?.len();

        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let part = multipart::Part::stream_with_length(body, len)
            .file_name("encrypted_blob")
            .mime_str("application/octet-stream")
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{}/add", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StorageError::UploadFailed(format!(
                "ipfs add returned {}",
                response.status()
            )));
        }

        let reply: AddResponse = response
            .json()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        debug!(cid = %reply.hash, bytes = len, "published blob");
        Ok(reply.hash)
    }

    /// Stream a blob from the daemon into a local file
    ///
    /// Returns the number of bytes written.
    pub async fn cat(&self, cid: &str, output: &Path) -> StorageResult<u64> {
        let response = self
            .http
            .post(format!("{}/cat?arg={}", self.base_url, cid))
            .send()
            .await
            .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StorageError::StorageUnavailable(format!(
                "ipfs cat returned {}",
                response.status()
            )));
        }

        let mut file = tokio::fs::File::create(output).await?;
        let mut stream = response.bytes_stream();
        let mut fetched = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;
            file.write_all(&chunk).await?;
            fetched += chunk.len() as u64;
        }
        file.flush().await?;

        debug!(%cid, bytes = fetched, "fetched blob");
        Ok(fetched)
    }

    /// Probe the daemon and report its identity
    pub async fn id(&self) -> StorageResult<String> {
        let response = self
            .http
            .post(format!("{}/id", self.base_url))
            .send()
            .await
            .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StorageError::StorageUnavailable(format!(
                "ipfs id returned {}",
                response.status()
            )));
        }

        let reply: IdResponse = response
            .json()
            .await
            .map_err(|e| StorageError::StorageUnavailable(e.to_string()))?;

        Ok(format!("{} ({})", reply.agent_version, reply.id))
    }
}

impl Default for IpfsClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
