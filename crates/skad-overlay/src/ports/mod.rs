//! # Ports Layer - Hexagonal Architecture Boundaries
//!
//! - **Driving Ports (Inbound):** the connection API the overlay exposes
//! - **Driven Ports (Outbound):** capabilities the overlay requires

pub mod inbound;
pub mod outbound;

pub use inbound::{ConnectionApi, ConnectionError};
pub use outbound::{
    Broadcaster, ConfigProvider, Dialer, Listener, LivenessProbe, PuzzleCheck, Signer,
    TimeSource, Transport, TransportError, TransportMetadata,
};
