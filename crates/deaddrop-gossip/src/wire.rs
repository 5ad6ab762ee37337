//! Ghost message payloads
//!
//! The outer envelope (`sender_pk || nonce || ct || tag`) comes from
//! `deaddrop-crypto`; this module defines the JSON record inside it
//! and the seal/open pair the actor uses on every publish and receive.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use deaddrop_crypto::{envelope, Identity, PublicKey};

use crate::error::GossipResult;

/// Plaintext of a ghost envelope
///
/// `kind` discriminates messages from delivery acknowledgements; acks
/// carry only the id of the message they confirm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Payload {
    #[serde(rename = "msg")]
    Msg {
        id: String,
        content: String,
        ts: i64,
    },
    #[serde(rename = "ack")]
    Ack { id: String, ts: i64 },
}

impl Payload {
    /// Build a message payload stamped with the current time
    pub fn message(id: impl Into<String>, content: impl Into<String>) -> Self {
        Payload::Msg {
            id: id.into(),
            content: content.into(),
            ts: unix_now(),
        }
    }

    /// Build an acknowledgement for a received message id
    pub fn ack(id: impl Into<String>) -> Self {
        Payload::Ack {
            id: id.into(),
            ts: unix_now(),
        }
    }
}

/// Seconds since the Unix epoch
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Encrypt a payload to a recipient's inbox
pub fn seal(sender: &Identity, recipient: &PublicKey, payload: &Payload) -> GossipResult<Vec<u8>> {
    let plaintext = serde_json::to_vec(payload)?;
    Ok(envelope::encrypt_to(sender, recipient, &plaintext)?)
}

/// Decrypt an inbound envelope into its sender and payload
pub fn open(receiver: &Identity, data: &[u8]) -> GossipResult<(PublicKey, Payload)> {
    let (sender, plaintext) = envelope::decrypt_from(receiver, data)?;
    let payload = serde_json::from_slice(&plaintext)?;
    Ok((sender, payload))
}
