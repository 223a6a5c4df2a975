//! # Driven Ports (Outbound SPI)
//!
//! Capabilities the overlay **requires** from the host application. Every
//! adapter is handed to the overlay explicitly at construction time.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{filter_peers, OverlayConfig, PeerId};

/// Long-term identity: signs with the local key, verifies against any key.
///
/// # Thread Safety
///
/// Shared by every session of a node, so implementations must be
/// `Send + Sync`.
pub trait Signer: Send + Sync {
    /// Local public key, as carried in [`PeerId::public_key`].
    fn public_key(&self) -> Vec<u8>;

    /// Sign `data` with the local private key.
    fn sign(&self, data: &[u8]) -> Vec<u8>;

    /// Check `signature` over `data` against `public_key`.
    fn verify(&self, public_key: &[u8], data: &[u8], signature: &[u8]) -> bool;

    /// Fixed length of every signature this scheme produces.
    fn signature_size(&self) -> usize;
}

/// Addresses describing one connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportMetadata {
    /// Our address as observed on this connection.
    pub local_addr: String,
    /// Address the remote advertises as reachable.
    pub remote_addr: String,
    /// Proof-of-work nonce the remote advertises for its identity.
    pub remote_nonce: Vec<u8>,
}

/// Framed, bidirectional byte-message transport to one remote.
///
/// Frames are delivered whole and in order. The overlay never calls
/// `receive` concurrently on the same transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one frame.
    async fn send(&self, frame: &[u8]) -> Result<(), TransportError>;

    /// Receive the next frame.
    async fn receive(&self) -> Result<Vec<u8>, TransportError>;

    /// Public key the remote claims. The handshake verifies the remote's
    /// signature against it.
    fn remote_endpoint(&self) -> Vec<u8>;

    /// Close the connection. Idempotent.
    async fn close(&self);

    /// Connection addresses.
    fn metadata(&self) -> TransportMetadata;
}

/// Opens outgoing transports.
#[async_trait]
pub trait Dialer: Send + Sync {
    /// Connect to `address`.
    async fn dial(&self, address: &str) -> Result<Box<dyn Transport>, TransportError>;
}

/// Yields incoming transports.
#[async_trait]
pub trait Listener: Send + Sync {
    /// Wait for the next inbound connection.
    ///
    /// `TransportError::Closed` means the listener is gone for good.
    async fn accept(&self) -> Result<Box<dyn Transport>, TransportError>;
}

/// Sends a message body to all connected peers.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Broadcast `body`.
    async fn broadcast(&self, body: Vec<u8>) -> Result<(), TransportError>;
}

/// Checks whether a peer still responds.
///
/// Used before evicting the least recently seen member of a full bucket.
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    /// `true` if `peer` answered.
    async fn ping(&self, peer: &PeerId) -> bool;
}

/// Errors from transport operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The connection or listener is closed
    #[error("transport closed")]
    Closed,
    /// Underlying I/O failure
    #[error("transport I/O error: {0}")]
    Io(String),
    /// Frame exceeds the transport's size limit
    #[error("frame of {size} bytes exceeds limit of {limit}")]
    FrameTooLarge {
        /// Size of the rejected frame
        size: usize,
        /// Maximum accepted size
        limit: usize,
    },
    /// No listener at the dialled address
    #[error("connection refused: {0}")]
    ConnectionRefused(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::BrokenPipe => TransportError::Closed,
            _ => TransportError::Io(err.to_string()),
        }
    }
}

/// Abstract interface for time-related operations.
///
/// Enables deterministic testing by injecting controllable time sources.
pub trait TimeSource: Send + Sync {
    /// Current unix time in nanoseconds.
    fn now_nanos(&self) -> i64;
}

/// Abstract interface for configuration loading.
pub trait ConfigProvider: Send + Sync {
    /// Well-known peers to bootstrap from.
    fn bootstrap_peers(&self) -> Vec<PeerId>;

    /// Bootstrap peers reachable from `self_address`: no empty, invalid or
    /// duplicate addresses, none at our own address, all in unified form.
    fn filtered_bootstrap_peers(&self, self_address: &str) -> Vec<PeerId> {
        filter_peers(self_address, &self.bootstrap_peers())
    }

    /// Overlay tunables.
    fn overlay_config(&self) -> OverlayConfig;
}

/// Proof-of-work identity check (Sybil resistance).
pub trait PuzzleCheck: Send + Sync {
    /// `true` if `peer`'s identity carries enough proof-of-work.
    fn verify_puzzle(&self, peer: &PeerId) -> bool;
}
