//! Connection establishment and routing table maintenance.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use skad_crypto::DhKeyPair;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info, warn};

use crate::adapters::network::MessageType;
use crate::auth::{MessageAuthenticator, SignedMessage};
use crate::domain::{NodeId, OverlayConfig, PeerId, RoutingError, RoutingTable};
use crate::ports::{
    Broadcaster, ConfigProvider, ConnectionApi, ConnectionError, Dialer, Listener, LivenessProbe,
    PuzzleCheck, Signer, TimeSource, Transport, TransportError,
};
use crate::session::PeerSession;

/// Drives handshakes over the node's transports and keeps the routing
/// table current.
///
/// Cheap to clone; clones share the routing table and capabilities.
///
/// # Locking
///
/// The routing table lock is never held across an `.await`.
#[derive(Clone)]
pub struct DiscoveryAdapter {
    pub(super) routes: Arc<RwLock<RoutingTable>>,
    pub(super) signer: Arc<dyn Signer>,
    pub(super) config: OverlayConfig,
    pub(super) dialer: Option<Arc<dyn Dialer>>,
    pub(super) listener: Option<Arc<dyn Listener>>,
    pub(super) broadcaster: Option<Arc<dyn Broadcaster>>,
    pub(super) probe: Option<Arc<dyn LivenessProbe>>,
    pub(super) puzzle: Arc<dyn PuzzleCheck>,
    pub(super) time_source: Arc<dyn TimeSource>,
}

impl DiscoveryAdapter {
    /// Shared handle to the routing table.
    pub fn routing_table(&self) -> Arc<RwLock<RoutingTable>> {
        Arc::clone(&self.routes)
    }

    /// Our current identity.
    pub fn self_peer(&self) -> PeerId {
        self.routes.read().self_peer().clone()
    }

    /// Overlay tunables.
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Message authenticator for our current identity.
    pub fn authenticator(&self) -> MessageAuthenticator {
        MessageAuthenticator::new(
            self.self_peer(),
            Arc::clone(&self.signer),
            Arc::clone(&self.time_source),
        )
    }

    /// Message carrying `body` with a weak signature valid for the
    /// configured TTL.
    pub fn weak_message(&self, body: impl Into<Vec<u8>>) -> SignedMessage {
        self.authenticator()
            .weak_message(body, self.config.weak_signature_ttl)
    }

    /// Insert or refresh a full peer identity (nonce included).
    ///
    /// On `BucketFull` the bucket's least recently seen peer is probed; if
    /// it is dead it is evicted and the insert is retried once. A second
    /// failure drops the new peer. Any other routing error is returned.
    pub async fn add_peer(&self, peer: PeerId) -> Result<(), ConnectionError> {
        let local = self.self_peer();
        debug!(
            local = %local.public_key_hex(),
            address = %peer.address(),
            peer = %peer.public_key_hex(),
            "adding peer to routing table"
        );

        if !self.puzzle.verify_puzzle(&peer) {
            warn!(peer = %peer.public_key_hex(), "rejecting peer failing identity puzzle");
            return Err(ConnectionError::InvalidIdentity);
        }

        let result = self.routes.write().update(peer.clone());
        match result {
            Ok(()) => Ok(()),
            Err(RoutingError::BucketFull) => {
                if self.evict_last_seen_peer(peer.node_id()).await {
                    let retry = self.routes.write().update(peer.clone());
                    if let Err(err) = retry {
                        debug!(
                            peer = %peer.public_key_hex(),
                            error = %err,
                            "dropping peer after eviction retry"
                        );
                    }
                } else {
                    debug!(
                        peer = %peer.public_key_hex(),
                        "bucket full and oldest peer alive, dropping peer"
                    );
                }
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Bootstrap from `provider`'s peers after dropping unusable, duplicate
    /// and self addresses.
    pub async fn bootstrap_from(
        &self,
        provider: &dyn ConfigProvider,
    ) -> Result<(), ConnectionError> {
        let self_address = self.self_peer().address().to_string();
        let configured = provider.bootstrap_peers().len();
        let peers = provider.filtered_bootstrap_peers(&self_address);
        if peers.len() < configured {
            debug!(
                configured,
                kept = peers.len(),
                "filtered bootstrap peers"
            );
        }
        self.bootstrap(&peers).await
    }

    /// Probe the least recently seen peer of `target`'s bucket.
    ///
    /// Returns `true` if it was dead and has been removed. A live peer is
    /// moved to the most-recently-seen position instead. Without a liveness
    /// probe every peer counts as alive.
    pub async fn evict_last_seen_peer(&self, target: &NodeId) -> bool {
        let candidate = self.routes.read().least_recently_seen(target);
        let Some(candidate) = candidate else {
            return false;
        };

        let alive = match &self.probe {
            Some(probe) => probe.ping(&candidate).await,
            None => true,
        };

        if alive {
            let refreshed = self.routes.write().update(candidate.clone());
            if let Err(err) = refreshed {
                debug!(peer = %candidate.public_key_hex(), error = %err, "failed to refresh live peer");
            }
            return false;
        }

        let removed = self.routes.write().remove_peer(candidate.node_id());
        match removed {
            Ok(peer) => {
                info!(peer = %peer.public_key_hex(), address = %peer.address(), "evicted unresponsive peer");
                true
            }
            Err(_) => false,
        }
    }

    async fn handshake(
        &self,
        transport: Box<dyn Transport>,
        passive: bool,
    ) -> Result<Arc<PeerSession>, ConnectionError> {
        let session = PeerSession::establish(
            transport,
            DhKeyPair::generate(),
            Arc::clone(&self.signer),
            passive,
        )
        .await?;

        if let Err(err) = session.complete_handshake(self.config.handshake_timeout).await {
            session.close().await;
            return Err(err.into());
        }
        Ok(session)
    }

    async fn accept_session(
        &self,
        transport: Box<dyn Transport>,
    ) -> Result<Arc<PeerSession>, ConnectionError> {
        let metadata = transport.metadata();
        let session = self.handshake(transport, true).await?;

        let peer = PeerId::new(session.remote_public_key(), metadata.remote_addr)
            .with_nonce(metadata.remote_nonce);
        if let Err(err) = self.add_peer(peer).await {
            warn!(
                peer = %hex::encode(session.remote_public_key()),
                error = %err,
                "accepted peer not added to routing table"
            );
        }
        Ok(session)
    }

    async fn accept_loop(
        self,
        listener: Arc<dyn Listener>,
        mut cancel: watch::Receiver<bool>,
        sessions: mpsc::Sender<Arc<PeerSession>>,
    ) {
        let mut learned_address = false;
        let mut cancel_open = true;
        info!(local = %self.self_peer().public_key_hex(), "accepting connections");

        loop {
            let cancelled = *cancel.borrow();
            if cancelled {
                break;
            }

            let accepted = tokio::select! {
                changed = cancel.changed(), if cancel_open => {
                    if changed.is_err() {
                        // Without a sender the loop only ends with the
                        // listener or the session stream.
                        debug!("cancel sender dropped, accepting until the stream is dropped");
                        cancel_open = false;
                    }
                    continue;
                }
                _ = sessions.closed() => {
                    debug!("session stream dropped");
                    break;
                }
                accepted = listener.accept() => accepted,
            };

            let transport = match accepted {
                Ok(transport) => transport,
                Err(TransportError::Closed) => {
                    info!("listener closed, stopping accept loop");
                    break;
                }
                Err(err) => {
                    error!(error = %err, "failed to accept connection");
                    continue;
                }
            };

            if !learned_address {
                learned_address = true;
                let observed = transport.metadata().local_addr;
                if !observed.is_empty() {
                    info!(address = %observed, "learned self address from accepted connection");
                    self.routes.write().set_self_address(observed);
                }
            }

            let adapter = self.clone();
            let sessions = sessions.clone();
            tokio::spawn(async move {
                match adapter.accept_session(transport).await {
                    Ok(session) => {
                        if sessions.send(session).await.is_err() {
                            debug!("session stream dropped");
                        }
                    }
                    Err(err) => error!(error = %err, "passive handshake failed"),
                }
            });
        }

        info!("accept loop stopped");
    }
}

#[async_trait]
impl ConnectionApi for DiscoveryAdapter {
    async fn establish_actively(
        &self,
        local: &[u8],
        remote: &[u8],
    ) -> Result<Arc<PeerSession>, ConnectionError> {
        if local == remote {
            return Err(ConnectionError::SelfConnect);
        }

        let (local_peer, remote_peer) = {
            let routes = self.routes.read();
            let local_peer = routes.self_peer().clone();
            if local_peer.public_key() != local {
                return Err(ConnectionError::LocalMismatch);
            }
            let remote_peer = routes
                .get_peer_from_public_key(remote)
                .ok_or(ConnectionError::PeerNotFound)?;
            (local_peer, remote_peer)
        };

        if local_peer.address() == remote_peer.address() {
            return Err(ConnectionError::AddressCollision(
                remote_peer.address().to_string(),
            ));
        }

        let dialer = self
            .dialer
            .as_ref()
            .ok_or(ConnectionError::NotConfigured("dialer"))?;

        debug!(
            local = %local_peer.public_key_hex(),
            remote = %remote_peer.public_key_hex(),
            address = %remote_peer.address(),
            "establishing session"
        );
        let transport = dialer.dial(remote_peer.address()).await?;
        let session = self.handshake(transport, false).await?;

        let refreshed = self.routes.write().update(remote_peer.clone());
        if let Err(err) = refreshed {
            debug!(peer = %remote_peer.public_key_hex(), error = %err, "could not refresh connected peer");
        }
        Ok(session)
    }

    fn establish_passively(
        &self,
        cancel: watch::Receiver<bool>,
    ) -> Result<ReceiverStream<Arc<PeerSession>>, ConnectionError> {
        let listener = self
            .listener
            .clone()
            .ok_or(ConnectionError::NotConfigured("listener"))?;

        let (tx, rx) = mpsc::channel(self.config.accept_backlog.max(1));
        tokio::spawn(self.clone().accept_loop(listener, cancel, tx));
        Ok(ReceiverStream::new(rx))
    }

    async fn add_peer_id(&self, public_key: &[u8], address: &str) -> Result<(), ConnectionError> {
        // A known peer keeps the nonce it was admitted with.
        let nonce = self
            .routes
            .read()
            .get_peer_from_public_key(public_key)
            .map(|stored| stored.nonce().to_vec())
            .unwrap_or_default();
        self.add_peer(PeerId::new(public_key, address).with_nonce(nonce))
            .await
    }

    async fn bootstrap(&self, peers: &[PeerId]) -> Result<(), ConnectionError> {
        if peers.is_empty() {
            return Ok(());
        }
        let broadcaster = self
            .broadcaster
            .as_ref()
            .ok_or(ConnectionError::NotConfigured("broadcaster"))?;

        for peer in peers {
            self.add_peer(peer.clone()).await?;
        }

        info!(peers = peers.len(), "bootstrapping, broadcasting ping");
        broadcaster.broadcast(MessageType::Ping.encode()).await?;
        Ok(())
    }

    fn peer_public_keys(&self) -> Vec<Vec<u8>> {
        self.routes
            .read()
            .get_peers()
            .iter()
            .map(|p| p.public_key().to_vec())
            .collect()
    }

    fn address_of(&self, public_key: &[u8]) -> Result<String, ConnectionError> {
        self.routes
            .read()
            .get_peer_from_public_key(public_key)
            .map(|p| p.address().to_string())
            .ok_or(ConnectionError::PeerNotFound)
    }
}

impl std::fmt::Debug for DiscoveryAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryAdapter")
            .field("self_peer", &self.self_peer())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
