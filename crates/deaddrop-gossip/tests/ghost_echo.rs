//! Two-node echo over a real swarm
//!
//! Ignored by default: relies on mDNS discovery over the local
//! network, which CI sandboxes usually block. Run with:
//!
//! ```text
//! cargo test -p deaddrop-gossip -- --ignored
//! ```

use std::time::Duration;

use tokio::time::{sleep, timeout};

use deaddrop_crypto::Identity;
use deaddrop_gossip::{start, GhostConfig, GhostEvent};

const DISCOVERY_WAIT: Duration = Duration::from_secs(5);
const EVENT_WAIT: Duration = Duration::from_secs(20);

#[tokio::test]
#[ignore = "requires mDNS discovery on an open local network"]
async fn message_is_delivered_and_acked() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("deaddrop_gossip=debug")
        .try_init();

    let alice = Identity::generate();
    let bob = Identity::generate();
    let alice_id = alice.public_id();
    let bob_id = bob.public_id();

    let (alice_handle, mut alice_events) = start(alice, GhostConfig::default()).unwrap();
    let (_bob_handle, mut bob_events) = start(bob, GhostConfig::default()).unwrap();

    // Let mDNS find the peers and gossipsub build its mesh
    sleep(DISCOVERY_WAIT).await;

    // Publish can race mesh formation; retry until it sticks
    let mut message_id = None;
    for _ in 0..10 {
        match alice_handle.send(&bob_id, "hello").await {
            Ok(id) => {
                message_id = Some(id);
                break;
            }
            Err(_) => sleep(Duration::from_secs(1)).await,
        }
    }
    let message_id = message_id.expect("publish never succeeded");

    // Bob sees the decrypted message, attributed to Alice
    let received = timeout(EVENT_WAIT, bob_events.recv())
        .await
        .expect("timed out waiting for ghost_msg")
        .expect("event stream closed");
    match received {
        GhostEvent::Message {
            id,
            from,
            content,
            ..
        } => {
            assert_eq!(id, message_id);
            assert_eq!(from, alice_id);
            assert_eq!(content, "hello");
        }
        other => panic!("unexpected event: {other:?}"),
    }

    // Alice sees the delivery confirmation
    let delivered = timeout(EVENT_WAIT, alice_events.recv())
        .await
        .expect("timed out waiting for msg_delivered")
        .expect("event stream closed");
    assert_eq!(
        delivered,
        GhostEvent::Delivered {
            id: message_id.clone()
        }
    );

    alice_handle.shutdown().await;
}

#[tokio::test]
async fn send_to_invalid_recipient_fails_fast() {
    let identity = Identity::generate();
    let (handle, _events) = start(identity, GhostConfig::default()).unwrap();

    let err = handle.send("not-a-key", "hello").await.unwrap_err();
    assert!(matches!(
        err,
        deaddrop_gossip::GossipError::InvalidRecipient(_)
    ));

    handle.shutdown().await;
}

#[tokio::test]
async fn handle_reports_not_running_after_shutdown() {
    let identity = Identity::generate();
    let peer = Identity::generate().public_id();
    let (handle, _events) = start(identity, GhostConfig::default()).unwrap();

    assert!(handle.is_running());
    handle.shutdown().await;

    // The loop exits between iterations; give it a moment
    for _ in 0..50 {
        if !handle.is_running() {
            break;
        }
        sleep(Duration::from_millis(100)).await;
    }
    assert!(!handle.is_running());

    let err = handle.send(&peer, "too late").await.unwrap_err();
    assert!(matches!(err, deaddrop_gossip::GossipError::NotRunning));
}
