//! The Ghost Mode actor
//!
//! The libp2p swarm is not safe under concurrent mutation, so all of
//! it lives inside a single task. The loop multiplexes three ready
//! signals (swarm events, host commands, the maintenance tick) and
//! services exactly one per iteration. Commands arrive over a bounded
//! channel; events leave over an unbounded one in production order.
//!
//! Cryptographic failures on inbound traffic are logged and swallowed:
//! a malformed gossip item must never take the node down. Only the
//! terminal shutdown command stops the loop.

use std::time::Duration;

use futures::StreamExt;
use libp2p::{
    core::upgrade,
    gossipsub, identify, mdns, noise, relay,
    swarm::{self, SwarmEvent},
    tcp, yamux, Multiaddr, PeerId, Swarm, Transport,
};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use deaddrop_crypto::{parse_public_id, Identity, PublicKey};

use crate::acks::{AckTable, ACK_TTL};
use crate::behaviour::{GhostBehaviour, GhostBehaviourEvent};
use crate::error::{GossipError, GossipResult};
use crate::events::GhostEvent;
use crate::topic::inbox_topic;
use crate::wire::{self, Payload};

/// Cadence of the ack-table pruning tick
const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(60);

/// Upper bound on the post-shutdown publish drain
const SHUTDOWN_DRAIN: Duration = Duration::from_secs(2);

/// Configuration for a ghost node
#[derive(Debug, Clone)]
pub struct GhostConfig {
    /// Relay servers to dial at startup; an empty list leaves the
    /// relay client and DCUtR idle
    pub relay_addresses: Vec<Multiaddr>,
    /// Capacity of the host command channel
    pub command_buffer: usize,
}

impl Default for GhostConfig {
    fn default() -> Self {
        Self {
            relay_addresses: Vec::new(),
            command_buffer: 64,
        }
    }
}

/// Commands the handle forwards into the actor loop
enum Command {
    Send {
        target: PublicKey,
        target_id: String,
        message_id: String,
        content: String,
        reply: oneshot::Sender<GossipResult<()>>,
    },
    Shutdown,
}

/// Cloneable handle to a running actor
#[derive(Clone)]
pub struct GhostHandle {
    commands: mpsc::Sender<Command>,
    local_id: String,
}

impl GhostHandle {
    /// Public identifier of the local node
    pub fn public_id(&self) -> &str {
        &self.local_id
    }

    /// Whether the actor loop is still alive
    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }

    /// Encrypt and publish a message to a peer's inbox
    ///
    /// Returns the fresh message id the delivery ack will carry.
    pub async fn send(
        &self,
        target_b58: &str,
        content: impl Into<String>,
    ) -> GossipResult<String> {
        let target = parse_public_id(target_b58)
            .map_err(|_| GossipError::InvalidRecipient(target_b58.to_string()))?;

        let message_id = Uuid::new_v4().to_string();
        let (reply_tx, reply_rx) = oneshot::channel();

        // A closed command channel means the actor has stopped; a
        // reply dropped mid-flight is a channel failure in its own
        // right (the command was accepted but never answered)
        self.commands
            .send(Command::Send {
                target,
                target_id: target_b58.to_string(),
                message_id: message_id.clone(),
                content: content.into(),
                reply: reply_tx,
            })
            .await
            .map_err(|_| GossipError::NotRunning)?;

        reply_rx.await.map_err(|_| GossipError::ChannelClosed)??;
        Ok(message_id)
    }

    /// Ask the actor to stop after draining outstanding publishes
    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
    }
}

/// Build the swarm and spawn the actor loop
///
/// Listens on an ephemeral TCP port on all interfaces, subscribes to
/// the local inbox topic, dials any configured relays, and returns the
/// command handle together with the host event stream. Must be called
/// from within a tokio runtime.
pub fn start(
    identity: Identity,
    config: GhostConfig,
) -> GossipResult<(GhostHandle, mpsc::UnboundedReceiver<GhostEvent>)> {
    let public_id = identity.public_id();

    // Transport identity is separate from the application identity:
    // Ed25519 authenticates connections, X25519 authenticates messages.
    let local_key = libp2p::identity::Keypair::generate_ed25519();
    let local_peer_id = PeerId::from(local_key.public());

    let (relay_transport, relay_client) = relay::client::new(local_peer_id);

    let transport = tcp::tokio::Transport::new(tcp::Config::default())
        .or_transport(relay_transport)
        .upgrade(upgrade::Version::V1)
        .authenticate(
            noise::Config::new(&local_key).map_err(|e| GossipError::Transport(e.to_string()))?,
        )
        .multiplex(yamux::Config::default())
        .boxed();

    let behaviour = GhostBehaviour::new(&local_key, relay_client)?;
    let mut swarm = Swarm::new(
        transport,
        behaviour,
        local_peer_id,
        swarm::Config::with_tokio_executor(),
    );

    let topic = inbox_topic(&public_id);
    swarm
        .behaviour_mut()
        .gossipsub
        .subscribe(&topic)
        .map_err(|e| GossipError::SubscribeFailed(e.to_string()))?;

    let listen: Multiaddr = "/ip4/0.0.0.0/tcp/0"
        .parse()
        .map_err(|e: libp2p::multiaddr::Error| GossipError::Transport(e.to_string()))?;
    swarm
        .listen_on(listen)
        .map_err(|e| GossipError::Transport(e.to_string()))?;

    for addr in &config.relay_addresses {
        match swarm.dial(addr.clone()) {
            Ok(()) => info!(relay = %addr, "dialing relay"),
            Err(e) => warn!(relay = %addr, error = %e, "failed to dial relay"),
        }
    }

    let (command_tx, command_rx) = mpsc::channel(config.command_buffer);
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    info!(peer = %local_peer_id, %public_id, inbox = %topic, "ghost mode started");

    let actor = GhostActor {
        swarm,
        identity,
        commands: command_rx,
        events: event_tx,
        acks: AckTable::new(),
    };
    tokio::spawn(actor.run());

    Ok((
        GhostHandle {
            commands: command_tx,
            local_id: public_id,
        },
        event_rx,
    ))
}

/// The event loop; sole owner of the swarm and the ack table
struct GhostActor {
    swarm: Swarm<GhostBehaviour>,
    identity: Identity,
    commands: mpsc::Receiver<Command>,
    events: mpsc::UnboundedSender<GhostEvent>,
    acks: AckTable,
}

impl GhostActor {
    async fn run(mut self) {
        let mut maintenance = time::interval(MAINTENANCE_INTERVAL);
        maintenance.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                event = self.swarm.select_next_some() => self.handle_swarm_event(event),

                command = self.commands.recv() => match command {
                    Some(Command::Send { target, target_id, message_id, content, reply }) => {
                        let result = self.publish_payload(
                            &target,
                            &target_id,
                            &Payload::message(message_id.clone(), content),
                        );
                        if result.is_ok() {
                            self.acks.record(message_id);
                        }
                        let _ = reply.send(result);
                    }
                    Some(Command::Shutdown) | None => break,
                },

                _ = maintenance.tick() => self.acks.prune(ACK_TTL),
            }
        }

        self.drain().await;
        debug!("ghost actor stopped");
    }

    /// Give queued publishes a bounded window to reach the wire
    async fn drain(&mut self) {
        let deadline = time::sleep(SHUTDOWN_DRAIN);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => break,
                event = self.swarm.select_next_some() => self.handle_swarm_event(event),
            }
        }
    }

    fn handle_swarm_event(&mut self, event: SwarmEvent<GhostBehaviourEvent>) {
        match event {
            SwarmEvent::Behaviour(GhostBehaviourEvent::Gossipsub(gossipsub::Event::Message {
                message,
                ..
            })) => {
                self.handle_inbound(&message.data);
            }
            SwarmEvent::Behaviour(GhostBehaviourEvent::Mdns(mdns::Event::Discovered(peers))) => {
                for (peer, addr) in peers {
                    debug!(%peer, %addr, "mdns discovered peer");
                    self.swarm.behaviour_mut().gossipsub.add_explicit_peer(&peer);
                }
            }
            SwarmEvent::Behaviour(GhostBehaviourEvent::Mdns(mdns::Event::Expired(peers))) => {
                for (peer, _) in peers {
                    debug!(%peer, "mdns peer expired");
                    self.swarm
                        .behaviour_mut()
                        .gossipsub
                        .remove_explicit_peer(&peer);
                }
            }
            SwarmEvent::Behaviour(GhostBehaviourEvent::Identify(identify::Event::Received {
                peer_id,
                info,
                ..
            })) => {
                debug!(peer = %peer_id, protocol = %info.protocol_version, "identify received");
            }
            SwarmEvent::Behaviour(GhostBehaviourEvent::RelayClient(
                relay::client::Event::ReservationReqAccepted { relay_peer_id, .. },
            )) => {
                info!(relay = %relay_peer_id, "relay reservation accepted");
            }
            SwarmEvent::Behaviour(GhostBehaviourEvent::Dcutr(event)) => {
                debug!(?event, "dcutr");
            }
            SwarmEvent::NewListenAddr { address, .. } => {
                info!(%address, "listening");
            }
            SwarmEvent::ConnectionEstablished { peer_id, .. } => {
                debug!(peer = %peer_id, "connection established");
            }
            _ => {}
        }
    }

    /// Decrypt one gossip item and react to its payload
    fn handle_inbound(&mut self, data: &[u8]) {
        let (sender, payload) = match wire::open(&self.identity, data) {
            Ok(opened) => opened,
            Err(e) => {
                // Traffic for other inboxes and malformed envelopes
                // both land here; neither may crash the node
                warn!(error = %e, "dropping undecryptable gossip item");
                return;
            }
        };

        match payload {
            Payload::Msg { id, content, ts } => {
                let from = bs58::encode(sender.as_bytes()).into_string();
                debug!(%from, message_id = %id, "ghost message received");

                let _ = self.events.send(GhostEvent::Message {
                    id: id.clone(),
                    from: from.clone(),
                    content,
                    ts,
                });

                // Confirm delivery on the sender's own inbox
                if let Err(e) = self.publish_payload(&sender, &from, &Payload::ack(id)) {
                    warn!(target = %from, error = %e, "failed to publish ack");
                }
            }
            Payload::Ack { id, .. } => {
                if self.acks.mark_acked(&id) {
                    debug!(message_id = %id, "message delivered");
                    let _ = self.events.send(GhostEvent::Delivered { id });
                }
            }
        }
    }

    fn publish_payload(
        &mut self,
        target: &PublicKey,
        target_id: &str,
        payload: &Payload,
    ) -> GossipResult<()> {
        let sealed = wire::seal(&self.identity, target, payload)?;
        self.swarm
            .behaviour_mut()
            .gossipsub
            .publish(inbox_topic(target_id), sealed)
            .map(|_| ())
            .map_err(|e| GossipError::PublishFailed(e.to_string()))
    }
}
