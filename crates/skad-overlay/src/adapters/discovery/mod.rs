//! # Discovery Adapter
//!
//! Connects the session layer to the routing table:
//!
//! - dials known peers and accepts inbound ones, running the handshake
//! - inserts authenticated peers, evicting dead ones from full buckets
//! - seeds the table from bootstrap peers and announces us with a ping

mod adapter;
mod builder;

pub use adapter::DiscoveryAdapter;
pub use builder::DiscoveryAdapterBuilder;
pub use crate::ports::ConnectionError;
