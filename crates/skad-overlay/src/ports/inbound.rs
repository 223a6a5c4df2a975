//! # Driving Ports (Inbound API)
//!
//! The connection-level API the overlay exposes to the node.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;
use tokio_stream::wrappers::ReceiverStream;

use super::outbound::TransportError;
use crate::domain::{PeerId, RoutingError};
use crate::session::{HandshakeError, PeerSession};

/// Errors from establishing sessions and maintaining the routing table.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectionError {
    /// Local and remote public keys are the same
    #[error("refusing to connect to self")]
    SelfConnect,
    /// The given local key is not the routing table's own identity
    #[error("local public key does not match routing table identity")]
    LocalMismatch,
    /// The remote is not in the routing table
    #[error("peer not found in routing table")]
    PeerNotFound,
    /// The remote advertises our own address
    #[error("remote peer advertises our own address {0}")]
    AddressCollision(String),
    /// A capability this operation needs was not supplied
    #[error("adapter not configured: missing {0}")]
    NotConfigured(&'static str),
    /// The peer's identity fails the proof-of-work check
    #[error("peer identity fails proof-of-work check")]
    InvalidIdentity,
    /// Handshake failure
    #[error(transparent)]
    Handshake(#[from] HandshakeError),
    /// Routing table rejected the peer
    #[error("routing table: {0}")]
    Routing(#[from] RoutingError),
    /// Transport failure
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Establishing sessions and maintaining the routing table.
///
/// # Example
///
/// ```rust,ignore
/// use skad_overlay::ports::ConnectionApi;
///
/// async fn connect<T: ConnectionApi>(api: &T, local: &[u8], remote: &[u8]) {
///     let session = api.establish_actively(local, remote).await?;
///     session.send(b"hello").await?;
/// }
/// ```
#[async_trait]
pub trait ConnectionApi: Send + Sync {
    /// Dial a known peer and run the active side of the handshake.
    ///
    /// # Errors
    ///
    /// - `SelfConnect` if `local == remote`
    /// - `LocalMismatch` if `local` is not our own public key
    /// - `PeerNotFound` if `remote` is not in the routing table
    /// - `AddressCollision` if `remote` advertises our own address
    async fn establish_actively(
        &self,
        local: &[u8],
        remote: &[u8],
    ) -> Result<Arc<PeerSession>, ConnectionError>;

    /// Start accepting connections until `cancel` flips to `true`.
    ///
    /// Every handshaken session is yielded on the returned stream. Failed
    /// accepts and handshakes are logged and skipped.
    ///
    /// Dropping the `watch::Sender` behind `cancel` does not stop accepting.
    /// The loop then runs until the listener closes or the returned stream
    /// is dropped.
    fn establish_passively(
        &self,
        cancel: watch::Receiver<bool>,
    ) -> Result<ReceiverStream<Arc<PeerSession>>, ConnectionError>;

    /// Insert or refresh a peer, evicting a dead bucket member if needed.
    ///
    /// A peer already in the table keeps its stored proof-of-work nonce.
    async fn add_peer_id(&self, public_key: &[u8], address: &str)
        -> Result<(), ConnectionError>;

    /// Seed the routing table and announce ourselves with a ping.
    async fn bootstrap(&self, peers: &[PeerId]) -> Result<(), ConnectionError>;

    /// Public keys of every peer in the routing table.
    fn peer_public_keys(&self) -> Vec<Vec<u8>>;

    /// Address of a peer in the routing table.
    fn address_of(&self, public_key: &[u8]) -> Result<String, ConnectionError>;
}
