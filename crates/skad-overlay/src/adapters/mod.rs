//! # Adapters
//!
//! Concrete implementations of the ports:
//!
//! - `discovery` - Connection establishment and routing table maintenance
//! - `identity` - Ed25519 long-term identities
//! - `memory` - In-process transports for tests and simulations
//! - `network` - Clock, identity puzzles, config and TCP (feature `network`)

pub mod discovery;
pub mod identity;
pub mod memory;
pub mod network;

pub use discovery::{DiscoveryAdapter, DiscoveryAdapterBuilder};
pub use identity::Ed25519Signer;
pub use memory::{Endpoint, MemoryDialer, MemoryListener, MemoryNetwork, MemoryTransport};
pub use network::{
    Hello, MessageType, NoOpPuzzleValidator, PuzzleValidator, StaticConfigProvider,
    SystemTimeSource,
};
