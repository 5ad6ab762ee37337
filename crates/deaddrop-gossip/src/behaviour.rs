//! libp2p behaviour stack for Ghost Mode
//!
//! Gossipsub carries the encrypted envelopes; mDNS feeds LAN peers
//! into the mesh; identify, ping, relay-client and DCUtR handle
//! connection housekeeping and NAT traversal. The relay pieces are
//! always compiled in but stay idle until a relay address is dialed.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use libp2p::{
    dcutr, gossipsub, identify, identity::Keypair, mdns, ping, relay, swarm::NetworkBehaviour,
    PeerId,
};

use crate::error::{GossipError, GossipResult};

/// Identify protocol version announced to peers
pub const PROTOCOL_VERSION: &str = "/deaddrop/1.0.0";

/// Combined network behaviour of a ghost node
#[derive(NetworkBehaviour)]
pub struct GhostBehaviour {
    pub gossipsub: gossipsub::Behaviour,
    pub mdns: mdns::tokio::Behaviour,
    pub identify: identify::Behaviour,
    pub ping: ping::Behaviour,
    pub relay_client: relay::client::Behaviour,
    pub dcutr: dcutr::Behaviour,
}

impl GhostBehaviour {
    /// Assemble the behaviour stack for a transport keypair
    pub fn new(key: &Keypair, relay_client: relay::client::Behaviour) -> GossipResult<Self> {
        let peer_id = PeerId::from(key.public());

        // Content-addressed message ids deduplicate identical floods
        let message_id_fn = |message: &gossipsub::Message| {
            let mut hasher = DefaultHasher::new();
            message.data.hash(&mut hasher);
            gossipsub::MessageId::from(hasher.finish().to_string())
        };

        let gossipsub_config = gossipsub::ConfigBuilder::default()
            .heartbeat_interval(Duration::from_secs(1))
            .validation_mode(gossipsub::ValidationMode::Permissive)
            .message_id_fn(message_id_fn)
            .build()
            .map_err(|e| GossipError::Transport(e.to_string()))?;

        let gossipsub = gossipsub::Behaviour::new(
            gossipsub::MessageAuthenticity::Signed(key.clone()),
            gossipsub_config,
        )
        .map_err(|e| GossipError::Transport(e.to_string()))?;

        let mdns = mdns::tokio::Behaviour::new(mdns::Config::default(), peer_id)
            .map_err(|e| GossipError::Transport(e.to_string()))?;

        let identify = identify::Behaviour::new(identify::Config::new(
            PROTOCOL_VERSION.to_string(),
            key.public(),
        ));

        Ok(Self {
            gossipsub,
            mdns,
            identify,
            ping: ping::Behaviour::new(ping::Config::new()),
            relay_client,
            dcutr: dcutr::Behaviour::new(peer_id),
        })
    }
}
