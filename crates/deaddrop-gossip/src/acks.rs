//! Delivery acknowledgement tracking
//!
//! The actor records every published message id and marks it when the
//! recipient's ack arrives. Entries older than five minutes are pruned
//! on the maintenance tick whether or not they were acked; a message
//! that was never confirmed simply expires.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// How long an entry may live before the maintenance tick removes it
pub const ACK_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct AckEntry {
    sent_at: Instant,
    acked: bool,
}

/// Ack table owned exclusively by the actor loop
#[derive(Debug, Default)]
pub struct AckTable {
    entries: HashMap<String, AckEntry>,
}

impl AckTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly published message id
    pub fn record(&mut self, id: String) {
        self.entries.insert(
            id,
            AckEntry {
                sent_at: Instant::now(),
                acked: false,
            },
        );
    }

    /// Mark a message as delivered
    ///
    /// Returns `true` only on the first ack for a known id; unknown or
    /// repeated acks return `false` and the caller drops them silently.
    pub fn mark_acked(&mut self, id: &str) -> bool {
        match self.entries.get_mut(id) {
            Some(entry) if !entry.acked => {
                entry.acked = true;
                true
            }
            _ => false,
        }
    }

    /// Drop entries strictly older than `max_age`
    pub fn prune(&mut self, max_age: Duration) {
        let now = Instant::now();
        self.entries
            .retain(|_, entry| now.duration_since(entry.sent_at) <= max_age);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_ack() {
        let mut table = AckTable::new();
        table.record("m1".to_string());

        assert!(table.contains("m1"));
        assert!(table.mark_acked("m1"));
        // Second ack for the same id is dropped
        assert!(!table.mark_acked("m1"));
    }

    #[test]
    fn test_unknown_ack_is_ignored() {
        let mut table = AckTable::new();
        assert!(!table.mark_acked("never-sent"));
    }

    #[test]
    fn test_prune_respects_age() {
        let mut table = AckTable::new();
        table.record("m1".to_string());
        table.mark_acked("m1");
        table.record("m2".to_string());

        // Entries younger than the TTL survive, acked or not
        table.prune(Duration::from_secs(300));
        assert_eq!(table.len(), 2);

        // A zero TTL removes everything older than "right now"
        std::thread::sleep(Duration::from_millis(5));
        table.prune(Duration::ZERO);
        assert!(table.is_empty());
    }
}
