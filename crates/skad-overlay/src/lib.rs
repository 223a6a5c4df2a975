//! # S/Kademlia Secure Overlay
//!
//! Secure-transport and peer-discovery core of a structured P2P overlay.
//!
//! Peers are identified by long-term Ed25519 keys. Connections are upgraded
//! to encrypted sessions by a signed ephemeral X25519 handshake, and the
//! peers that complete one are kept in a Kademlia routing table hardened
//! with S/Kademlia identity puzzles.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture with:
//! - **Domain Layer:** node IDs, XOR distance, k-buckets, routing table
//! - **Ports Layer:** the connection API and the capabilities it needs
//!   (signer, transports, clock, liveness probe, puzzle check)
//! - **Session Layer:** handshake state machine and AES-GCM channels
//! - **Auth Layer:** weak and strong message signatures
//! - **Adapters Layer:** discovery adapter, Ed25519 identities, in-memory
//!   and TCP transports, configuration
//!
//! ## Features
//!
//! - `network` - TCP transport and TOML configuration
//! - `test-utils` - Deterministic clock, recording broadcaster, scripted probe
//!
//! ## Example
//!
//! ```rust
//! use skad_overlay::{PeerId, RoutingTable, OverlayConfig};
//!
//! let me = PeerId::new(vec![1u8; 32], "10.0.0.1:3000");
//! let mut table = RoutingTable::with_config(me, &OverlayConfig::default());
//!
//! table.update(PeerId::new(vec![2u8; 32], "10.0.0.2:3000")).unwrap();
//! assert_eq!(table.peer_count(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// =============================================================================
// CORE MODULES
// =============================================================================

pub mod auth;
pub mod domain;
pub mod ports;
pub mod session;

// =============================================================================
// ADAPTERS
// =============================================================================

pub mod adapters;

/// Test utilities (FixedTimeSource, RecordingBroadcaster, etc.)
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// =============================================================================
// RE-EXPORTS
// =============================================================================

// Domain
pub use domain::{
    calculate_bucket_index, filter_peers, find_k_closest, sort_peers_by_distance,
    to_unified_address, xor_distance, Distance, KBucket, NodeId, OverlayConfig, PeerId,
    RoutingError, RoutingTable, RoutingTableStats,
};

// Ports
pub use ports::{
    Broadcaster, ConfigProvider, ConnectionApi, ConnectionError, Dialer, Listener, LivenessProbe,
    PuzzleCheck, Signer, TimeSource, Transport, TransportError, TransportMetadata,
};

// Sessions and signatures
pub use auth::{MessageAuthenticator, SignatureError, SignedMessage};
pub use session::{ChannelError, HandshakeError, KeyExchangeState, PeerSession};

// Adapters
pub use adapters::{
    DiscoveryAdapter, DiscoveryAdapterBuilder, Ed25519Signer, MemoryNetwork, MessageType,
    NoOpPuzzleValidator, PuzzleValidator, StaticConfigProvider, SystemTimeSource,
};

#[cfg(feature = "network")]
pub use adapters::network::{
    ConfigError, TcpDialer, TcpListenerAdapter, TcpTransport, TomlConfigProvider,
    DEFAULT_HELLO_TIMEOUT,
};

#[cfg(feature = "test-utils")]
pub use test_utils::{FixedTimeSource, RecordingBroadcaster, StaticLivenessProbe};
