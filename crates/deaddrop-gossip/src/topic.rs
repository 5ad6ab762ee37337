//! Inbox topic convention
//!
//! Every peer subscribes to exactly one topic derived from its
//! application-level public key. Sending a message means publishing
//! on the recipient's inbox; acknowledging means publishing on the
//! original sender's.

use libp2p::gossipsub::IdentTopic;

/// Prefix of every inbox topic string
pub const INBOX_PREFIX: &str = "/deaddrop/inbox/";

/// Inbox topic for a base58 public identifier
pub fn inbox_topic(public_id: &str) -> IdentTopic {
    IdentTopic::new(format!("{INBOX_PREFIX}{public_id}"))
}
