//! # DeadDrop Gossip
//!
//! Ghost Mode: authenticated, end-to-end encrypted peer-to-peer
//! messaging over a gossipsub overlay.
//!
//! Each peer subscribes to its own inbox topic
//! (`/deaddrop/inbox/<base58-pk>`); sending publishes an encrypted
//! envelope on the recipient's inbox, and the recipient answers with
//! an acknowledgement on the sender's. All swarm state is confined to
//! one actor task; hosts talk to it through a command handle and an
//! event stream.
//!
//! ## Features
//!
//! - Single-writer event loop around the libp2p swarm
//! - mDNS discovery feeding the gossip mesh
//! - Optional circuit-relay + DCUtR hole punching for NAT traversal
//! - Delivery acknowledgements correlated by message id
//!
//! ## Example
//!
//! ```rust,ignore
//! use deaddrop_gossip::{start, GhostConfig, GhostEvent};
//!
//! let identity = vault.identity()?;
//! let (handle, mut events) = start(identity, GhostConfig::default())?;
//!
//! let message_id = handle.send(&peer_id, "hello").await?;
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         GhostEvent::Message { from, content, .. } => {
//!             println!("{from}: {content}");
//!         }
//!         GhostEvent::Delivered { id } => {
//!             assert_eq!(id, message_id);
//!         }
//!     }
//! }
//! ```

pub mod acks;
pub mod actor;
pub mod behaviour;
pub mod error;
pub mod events;
pub mod topic;
pub mod wire;

// Re-exports
pub use acks::{AckTable, ACK_TTL};
pub use actor::{start, GhostConfig, GhostHandle};
pub use behaviour::{GhostBehaviour, PROTOCOL_VERSION};
pub use error::{GossipError, GossipResult};
pub use events::GhostEvent;
pub use topic::{inbox_topic, INBOX_PREFIX};
pub use wire::Payload;

// Relay addresses are plain multiaddrs; re-export so hosts don't need
// a direct libp2p dependency to configure them.
pub use libp2p::Multiaddr;
