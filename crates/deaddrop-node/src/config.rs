//! Configuration for the node coordinator

use std::path::PathBuf;

use deaddrop_gossip::{GhostConfig, Multiaddr};
use deaddrop_storage::DEFAULT_API_URL;

/// Configuration for a [`crate::DeadDropNode`]
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Directory holding the encrypted identity file
    pub data_dir: PathBuf,
    /// Base URL of the IPFS daemon's HTTP API
    pub ipfs_api_url: String,
    /// Relay servers for NAT traversal; empty disables relaying
    pub relay_addresses: Vec<Multiaddr>,
    /// Capacity of the actor command channel
    pub command_buffer: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("deaddrop"),
            ipfs_api_url: DEFAULT_API_URL.to_string(),
            relay_addresses: Vec::new(),
            command_buffer: 64,
        }
    }
}

impl NodeConfig {
    /// Create a configuration with a custom data directory
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Set the IPFS API endpoint
    pub fn with_ipfs_api_url(mut self, url: impl Into<String>) -> Self {
        self.ipfs_api_url = url.into();
        self
    }

    /// Add a relay server to dial at startup
    pub fn with_relay_address(mut self, addr: Multiaddr) -> Self {
        self.relay_addresses.push(addr);
        self
    }

    pub(crate) fn ghost_config(&self) -> GhostConfig {
        GhostConfig {
            relay_addresses: self.relay_addresses.clone(),
            command_buffer: self.command_buffer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NodeConfig::default();
        assert!(config.data_dir.ends_with("deaddrop"));
        assert_eq!(config.ipfs_api_url, DEFAULT_API_URL);
        assert!(config.relay_addresses.is_empty());
    }

    #[test]
    fn test_builder() {
        let relay: Multiaddr = "/ip4/203.0.113.7/tcp/4001".parse().unwrap();
        let config = NodeConfig::with_data_dir("/tmp/dd")
            .with_ipfs_api_url("http://127.0.0.1:5002/api/v0")
            .with_relay_address(relay.clone());

        assert_eq!(config.data_dir, PathBuf::from("/tmp/dd"));
        assert_eq!(config.ipfs_api_url, "http://127.0.0.1:5002/api/v0");
        assert_eq!(config.relay_addresses, vec![relay]);
    }
}
