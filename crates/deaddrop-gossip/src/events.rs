//! Events emitted to the host
//!
//! The actor pushes these over an unbounded channel in the order it
//! produced them. The serde shape matches what the host-facing bridge
//! forwards to the UI verbatim.

use serde::Serialize;

/// Asynchronous event from the Ghost Mode actor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event")]
pub enum GhostEvent {
    /// A decrypted inbound message
    #[serde(rename = "ghost_msg")]
    Message {
        id: String,
        from: String,
        content: String,
        #[serde(rename = "timestamp")]
        ts: i64,
    },

    /// A previously sent message was acknowledged by its recipient
    #[serde(rename = "msg_delivered")]
    Delivered { id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event = GhostEvent::Message {
            id: "m1".to_string(),
            from: "peer".to_string(),
            content: "hello".to_string(),
            ts: 1700000000,
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "ghost_msg");
        assert_eq!(json["timestamp"], 1700000000);

        let event = GhostEvent::Delivered {
            id: "m1".to_string(),
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "msg_delivered");
        assert_eq!(json["id"], "m1");
    }
}
