//! # DeadDrop Node
//!
//! Backend coordinator tying the identity vault, the Ghost Mode actor
//! and the dead-drop pipeline together behind the command surface the
//! host process (UI bridge, CLI) consumes.
//!
//! ## Example
//!
//! ```rust,ignore
//! use deaddrop_node::{DeadDropNode, NodeConfig};
//!
//! let node = DeadDropNode::new(NodeConfig::default());
//!
//! // Unlock (or create) the identity
//! let public_id = node.init_identity("p@ss")?;
//!
//! // Ghost Mode: events arrive asynchronously
//! let mut events = node.start_ghost_mode().await?;
//! let message_id = node.send_ghost_message(&peer_id, "hello").await?;
//!
//! // Dead drop: encrypt, publish, split the key 2-of-3
//! let receipt = node.create_drop("secret.pdf".as_ref(), 2, 3).await?;
//! ```

mod config;
mod error;

pub use config::NodeConfig;
pub use error::{NodeError, NodeResult};

// The host deals in these types directly
pub use deaddrop_gossip::GhostEvent;
pub use deaddrop_storage::DropReceipt;

use std::path::Path;
use std::sync::Mutex;

use tokio::sync::mpsc;
use tracing::info;

use deaddrop_crypto::Vault;
use deaddrop_gossip::GhostHandle;
use deaddrop_storage::IpfsClient;

/// The backend engine
///
/// One instance per installation. All methods take `&self`; the only
/// mutable state is the vault's unseal cache and the slot holding the
/// running actor handle.
pub struct DeadDropNode {
    config: NodeConfig,
    vault: Vault,
    ipfs: IpfsClient,
    ghost: Mutex<Option<GhostHandle>>,
}

impl DeadDropNode {
    /// Create a node from configuration
    pub fn new(config: NodeConfig) -> Self {
        let vault = Vault::new(&config.data_dir);
        let ipfs = IpfsClient::new(&config.ipfs_api_url);
        Self {
            config,
            vault,
            ipfs,
            ghost: Mutex::new(None),
        }
    }

    /// Unseal (or create) the identity under a password
    ///
    /// Returns the public identifier peers use to address this node.
    pub fn init_identity(&self, password: &str) -> NodeResult<String> {
        Ok(self.vault.unseal(password)?)
    }

    /// Public identifier of the unsealed identity
    pub fn public_id(&self) -> NodeResult<String> {
        Ok(self.vault.public_id()?)
    }

    /// Spawn the Ghost Mode actor and return its event stream
    pub async fn start_ghost_mode(&self) -> NodeResult<mpsc::UnboundedReceiver<GhostEvent>> {
        let identity = self.vault.identity()?;

        let mut slot = self.ghost.lock().expect("ghost handle lock poisoned");
        if slot.as_ref().is_some_and(|handle| handle.is_running()) {
            return Err(NodeError::AlreadyRunning);
        }

        let (handle, events) = deaddrop_gossip::start(identity, self.config.ghost_config())?;
        *slot = Some(handle);
        Ok(events)
    }

    /// Encrypt a message to a peer and publish it on their inbox
    ///
    /// Returns the message id; the matching `msg_delivered` event
    /// arrives once the recipient acknowledges.
    pub async fn send_ghost_message(&self, target: &str, content: &str) -> NodeResult<String> {
        let handle = self
            .ghost
            .lock()
            .expect("ghost handle lock poisoned")
            .as_ref()
            .filter(|handle| handle.is_running())
            .cloned()
            .ok_or(NodeError::NotRunning)?;

        Ok(handle.send(target, content).await?)
    }

    /// Stop the Ghost Mode actor
    ///
    /// Idempotent: stopping a node that never started is a no-op.
    pub async fn stop_ghost_mode(&self) -> NodeResult<()> {
        let handle = self.ghost.lock().expect("ghost handle lock poisoned").take();
        if let Some(handle) = handle {
            handle.shutdown().await;
            info!("ghost mode stopped");
        }
        Ok(())
    }

    /// Encrypt a file, publish it to IPFS, and deal the key into shares
    pub async fn create_drop(
        &self,
        file_path: &Path,
        threshold: u32,
        total_shards: u32,
    ) -> NodeResult<DropReceipt> {
        Ok(deaddrop_storage::create_drop(file_path, threshold, total_shards, &self.ipfs).await?)
    }

    /// Fetch a drop by CID and decrypt it using the given shares
    pub async fn retrieve_drop(
        &self,
        cid: &str,
        shards: &[String],
        output_path: &Path,
    ) -> NodeResult<u64> {
        Ok(deaddrop_storage::retrieve_drop(cid, shards, output_path, &self.ipfs).await?)
    }

    /// Probe the IPFS daemon; returns its version string
    pub async fn test_ipfs(&self) -> NodeResult<String> {
        Ok(self.ipfs.id().await?)
    }

    /// Stop the actor and wipe the in-memory identity
    pub async fn shutdown(&self) -> NodeResult<()> {
        self.stop_ghost_mode().await?;
        self.vault.seal();
        Ok(())
    }
}
