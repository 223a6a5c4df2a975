//! # Overlay Flows over an In-Memory Network
//!
//! Multi-node scenarios driven through the public API only:
//!
//! 1. **Bootstrap → dial → accept**: a node seeded with bootstrap peers
//!    opens sessions to them and both routing tables learn each other
//! 2. **Encrypted traffic**: frames arrive in order, nonces never repeat
//! 3. **Message signatures**: weak and strong signatures made by one node
//!    verify on another
//! 4. **Table maintenance**: dead peers are evicted from full buckets

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::RwLock;
    use tokio::sync::watch;
    use tokio::time::timeout;
    use tokio_stream::StreamExt;

    use skad_overlay::test_utils::{identity, RecordingBroadcaster, StaticLivenessProbe};
    use skad_overlay::{
        ConnectionApi, ConnectionError, DiscoveryAdapter, DiscoveryAdapterBuilder,
        KeyExchangeState, MemoryNetwork, MessageType, OverlayConfig, PeerId, RoutingTable,
        SignatureError, SignedMessage, Signer,
    };

    use crate::init_tracing;

    const WAIT: Duration = Duration::from_secs(5);

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    struct Node {
        peer: PeerId,
        adapter: DiscoveryAdapter,
        broadcaster: RecordingBroadcaster,
    }

    /// Node with deterministic identity `seed`, reachable on `network`.
    fn spawn_node(network: &MemoryNetwork, seed: u8, address: &str) -> Node {
        let (signer, peer) = identity(seed, address);
        node_with(network, signer, peer, |b| b)
    }

    fn node_with(
        network: &MemoryNetwork,
        signer: Arc<dyn Signer>,
        peer: PeerId,
        extra: impl FnOnce(DiscoveryAdapterBuilder) -> DiscoveryAdapterBuilder,
    ) -> Node {
        let config = OverlayConfig::for_testing();
        let routes = Arc::new(RwLock::new(RoutingTable::with_config(peer.clone(), &config)));
        let broadcaster = RecordingBroadcaster::new();
        let key = signer.public_key();

        let builder = DiscoveryAdapterBuilder::new(Arc::clone(&signer))
            .routing_table(routes)
            .config(config)
            .dialer(Arc::new(network.dialer(key.clone(), peer.address())))
            .listener(Arc::new(network.listen(key, peer.address())))
            .broadcaster(Arc::new(broadcaster.clone()));
        let adapter = extra(builder).build().expect("adapter wiring");

        Node {
            peer,
            adapter,
            broadcaster,
        }
    }

    // =============================================================================
    // BOOTSTRAP AND SESSIONS
    // =============================================================================

    #[tokio::test]
    async fn test_bootstrap_then_connect_to_every_seed() {
        init_tracing();
        let network = MemoryNetwork::new();
        let alice = spawn_node(&network, 1, "10.0.0.1:4000");
        let bob = spawn_node(&network, 2, "10.0.0.2:4000");
        let carol = spawn_node(&network, 3, "10.0.0.3:4000");

        let (_stop, stop_rx) = watch::channel(false);
        let mut bob_incoming = bob.adapter.establish_passively(stop_rx.clone()).unwrap();
        let mut carol_incoming = carol.adapter.establish_passively(stop_rx).unwrap();

        alice
            .adapter
            .bootstrap(&[bob.peer.clone(), carol.peer.clone()])
            .await
            .unwrap();
        assert_eq!(alice.broadcaster.broadcasts(), vec![MessageType::Ping.encode()]);

        for remote in [&bob.peer, &carol.peer] {
            let session = alice
                .adapter
                .establish_actively(alice.peer.public_key(), remote.public_key())
                .await
                .unwrap();
            assert_eq!(session.remote_public_key(), remote.public_key());
        }

        let at_bob = timeout(WAIT, bob_incoming.next()).await.unwrap().unwrap();
        let at_carol = timeout(WAIT, carol_incoming.next()).await.unwrap().unwrap();
        assert!(at_bob.is_passive() && at_carol.is_passive());

        // Both seeds learned alice from the handshake alone
        for seed in [&bob, &carol] {
            assert_eq!(
                seed.adapter.address_of(alice.peer.public_key()).unwrap(),
                alice.peer.address()
            );
        }
        assert_eq!(alice.adapter.peer_public_keys().len(), 2);
    }

    #[tokio::test]
    async fn test_session_traffic_is_ordered_and_counted() {
        init_tracing();
        let network = MemoryNetwork::new();
        let alice = spawn_node(&network, 1, "10.0.0.1:4000");
        let bob = spawn_node(&network, 2, "10.0.0.2:4000");

        let (_stop, stop_rx) = watch::channel(false);
        let mut incoming = bob.adapter.establish_passively(stop_rx).unwrap();
        alice
            .adapter
            .add_peer_id(bob.peer.public_key(), bob.peer.address())
            .await
            .unwrap();

        let outgoing = alice
            .adapter
            .establish_actively(alice.peer.public_key(), bob.peer.public_key())
            .await
            .unwrap();
        let accepted = timeout(WAIT, incoming.next()).await.unwrap().unwrap();
        assert_eq!(accepted.wait_for_completion().await, KeyExchangeState::Done);

        for i in 0u32..20 {
            outgoing.send(&i.to_le_bytes()).await.unwrap();
        }
        for i in 0u32..20 {
            assert_eq!(accepted.recv().await.unwrap(), i.to_le_bytes());
        }
        accepted.send(b"ack").await.unwrap();
        assert_eq!(outgoing.recv().await.unwrap(), b"ack");

        // Handshake frames do not consume nonces
        assert_eq!(outgoing.nonce_counters().await, (20, 1));
        assert_eq!(accepted.nonce_counters().await, (1, 20));

        outgoing.close().await;
        assert!(accepted.recv().await.is_err());
    }

    #[tokio::test]
    async fn test_connecting_to_self_is_refused() {
        let network = MemoryNetwork::new();
        let alice = spawn_node(&network, 1, "10.0.0.1:4000");
        let key = alice.peer.public_key();

        let result = alice.adapter.establish_actively(key, key).await;
        assert_eq!(result.unwrap_err(), ConnectionError::SelfConnect);
    }

    #[tokio::test]
    async fn test_dialing_vanished_peer_fails_cleanly() {
        let network = MemoryNetwork::new();
        let alice = spawn_node(&network, 1, "10.0.0.1:4000");
        let (_, ghost) = identity(9, "10.0.0.9:4000");

        alice
            .adapter
            .add_peer_id(ghost.public_key(), ghost.address())
            .await
            .unwrap();
        let result = alice
            .adapter
            .establish_actively(alice.peer.public_key(), ghost.public_key())
            .await;
        assert!(matches!(result, Err(ConnectionError::Transport(_))));
    }

    // =============================================================================
    // MESSAGE SIGNATURES
    // =============================================================================

    #[tokio::test]
    async fn test_signatures_verify_across_nodes() {
        let network = MemoryNetwork::new();
        let alice = spawn_node(&network, 1, "10.0.0.1:4000");
        let bob = spawn_node(&network, 2, "10.0.0.2:4000");
        let at_alice = alice.adapter.authenticator();
        let at_bob = bob.adapter.authenticator();

        let weak = alice.adapter.weak_message(b"find_node".to_vec());
        assert_eq!(at_bob.verify_weak_signature(&weak), Ok(()));

        let mut strong = SignedMessage::new(alice.peer.clone(), b"store".to_vec());
        strong.signature = at_alice.strong_signature(&strong).unwrap();
        assert_eq!(at_bob.verify_strong_signature(&strong), Ok(()));

        // Any change to the body breaks the strong signature
        strong.body.push(0);
        assert_eq!(
            at_bob.verify_strong_signature(&strong),
            Err(SignatureError::Invalid)
        );
    }

    // =============================================================================
    // TABLE MAINTENANCE
    // =============================================================================

    #[tokio::test]
    async fn test_dead_peers_make_room_for_new_ones() {
        let network = MemoryNetwork::new();
        let (signer, me) = identity(1, "10.0.0.1:4000");
        let probe = StaticLivenessProbe::all_dead();
        let node = node_with(&network, signer, me, |b| {
            b.liveness_probe(Arc::new(probe.clone()))
        });

        let routes = node.adapter.routing_table();
        let k = routes.read().k();
        let crowd: Vec<PeerId> = {
            let table = routes.read();
            (0u32..)
                .map(|i| PeerId::new(i.to_le_bytes().to_vec(), format!("10.2.0.1:{}", 6000 + i)))
                .filter(|p| table.bucket_index_for(p.node_id()) == Some(255))
                .take(k * 2)
                .collect()
        };

        for peer in &crowd {
            node.adapter
                .add_peer_id(peer.public_key(), peer.address())
                .await
                .unwrap();
        }

        // Each insert past k evicted the oldest; the last k remain
        let table = routes.read();
        let bucket = table.bucket(255).unwrap();
        assert_eq!(bucket.peers(), &crowd[k..]);
        assert_eq!(probe.pinged(), crowd[..k].to_vec());
    }
}
