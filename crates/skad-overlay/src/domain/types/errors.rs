//! Domain Errors for the Routing Table

use std::fmt;

/// Errors returned by routing table operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// The peer's bucket is at capacity; nothing was changed.
    BucketFull,
    /// Peer not found in routing table
    PeerNotFound,
    /// Attempted to add the local node to its own table
    SelfInsertion,
}

impl fmt::Display for RoutingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BucketFull => write!(f, "K-bucket is at capacity"),
            Self::PeerNotFound => write!(f, "Peer not found in routing table"),
            Self::SelfInsertion => write!(f, "Cannot add local node to routing table"),
        }
    }
}

impl std::error::Error for RoutingError {}
