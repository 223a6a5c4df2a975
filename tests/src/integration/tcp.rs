//! # Overlay over Loopback TCP
//!
//! Same handshake as the in-memory flows, with real sockets and the
//! hello exchange of the TCP transport in front.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::RwLock;
    use tokio::net::TcpStream;
    use tokio::sync::watch;
    use tokio::time::timeout;
    use tokio_stream::StreamExt;

    use skad_overlay::test_utils::identity;
    use skad_overlay::{
        ConnectionApi, DiscoveryAdapter, DiscoveryAdapterBuilder, OverlayConfig, PeerId,
        RoutingTable, Signer, TcpDialer, TcpListenerAdapter,
    };

    use crate::init_tracing;

    /// Node bound to an ephemeral loopback port.
    async fn tcp_node(seed: u8) -> (PeerId, DiscoveryAdapter) {
        let (signer, _) = identity(seed, "");
        let key = signer.public_key();
        let listener = TcpListenerAdapter::bind(key.clone(), "127.0.0.1:0")
            .await
            .unwrap();
        let address = listener.local_address().to_string();
        let peer = PeerId::new(key.clone(), address.clone());

        let config = OverlayConfig::for_testing();
        let routes = Arc::new(RwLock::new(RoutingTable::with_config(peer.clone(), &config)));
        let adapter = DiscoveryAdapterBuilder::new(signer)
            .routing_table(routes)
            .config(config)
            .dialer(Arc::new(TcpDialer::new(key, address)))
            .listener(Arc::new(listener))
            .build()
            .unwrap();
        (peer, adapter)
    }

    #[tokio::test]
    async fn test_tcp_sessions_carry_encrypted_frames() {
        init_tracing();
        let (alice, alice_adapter) = tcp_node(1).await;
        let (bob, bob_adapter) = tcp_node(2).await;

        let (stop, stop_rx) = watch::channel(false);
        let mut incoming = bob_adapter.establish_passively(stop_rx).unwrap();

        alice_adapter
            .add_peer_id(bob.public_key(), bob.address())
            .await
            .unwrap();
        let outgoing = alice_adapter
            .establish_actively(alice.public_key(), bob.public_key())
            .await
            .unwrap();
        let accepted = timeout(Duration::from_secs(5), incoming.next())
            .await
            .unwrap()
            .unwrap();

        outgoing.send(b"over tcp").await.unwrap();
        assert_eq!(accepted.recv().await.unwrap(), b"over tcp");
        accepted.send(&[0u8; 64 * 1024]).await.unwrap();
        assert_eq!(outgoing.recv().await.unwrap().len(), 64 * 1024);

        // Bob learned alice's listening address from her hello
        assert_eq!(
            bob_adapter.address_of(alice.public_key()).unwrap(),
            alice.address()
        );

        stop.send(true).unwrap();
        let end = timeout(Duration::from_secs(5), incoming.next()).await.unwrap();
        assert!(end.is_none());
    }

    #[tokio::test]
    async fn test_stalled_connection_does_not_block_handshakes() {
        init_tracing();
        let (alice, alice_adapter) = tcp_node(3).await;
        let (bob, bob_adapter) = tcp_node(4).await;

        let (_stop, stop_rx) = watch::channel(false);
        let mut incoming = bob_adapter.establish_passively(stop_rx).unwrap();

        // Opens a socket to bob and never says hello
        let _stalled = TcpStream::connect(bob.address()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        alice_adapter
            .add_peer_id(bob.public_key(), bob.address())
            .await
            .unwrap();
        let outgoing = timeout(
            Duration::from_secs(5),
            alice_adapter.establish_actively(alice.public_key(), bob.public_key()),
        )
        .await
        .expect("handshake completes while another connection stalls")
        .unwrap();
        let accepted = timeout(Duration::from_secs(5), incoming.next())
            .await
            .unwrap()
            .unwrap();

        outgoing.send(b"still served").await.unwrap();
        assert_eq!(accepted.recv().await.unwrap(), b"still served");
    }
}
