//! K-Bucket implementation for Kademlia routing.

use crate::domain::{NodeId, PeerId};

/// A k-bucket storing up to k peers at a specific distance range.
///
/// Peers are ordered least-recently-seen first: the front is the eviction
/// candidate, the back is the peer we heard from last.
///
/// # Security
/// A full bucket never drops an existing peer on its own. Replacing the
/// oldest entry requires the caller to first establish that it is dead,
/// which keeps long-lived honest peers in place against table flooding.
#[derive(Debug, Clone, Default)]
pub struct KBucket {
    pub(crate) peers: Vec<PeerId>,
}

impl KBucket {
    /// Create a new empty k-bucket
    pub fn new() -> Self {
        Self { peers: Vec::new() }
    }

    /// Number of peers in this bucket
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Check if the bucket is empty
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Check if the bucket is full
    pub fn is_full(&self, k: usize) -> bool {
        self.peers.len() >= k
    }

    /// Least recently seen peer
    pub fn oldest_peer(&self) -> Option<&PeerId> {
        self.peers.first()
    }

    /// Most recently seen peer
    pub fn newest_peer(&self) -> Option<&PeerId> {
        self.peers.last()
    }

    /// Peers, least recently seen first
    pub fn peers(&self) -> &[PeerId] {
        &self.peers
    }

    /// Append a peer at the most-recently-seen position (assumes not full)
    pub(crate) fn add_peer(&mut self, peer: PeerId) {
        self.peers.push(peer);
    }

    pub(crate) fn remove_peer(&mut self, node_id: &NodeId) -> Option<PeerId> {
        self.position(node_id).map(|pos| self.peers.remove(pos))
    }

    /// Move a peer to the most-recently-seen position, taking the address
    /// from `latest`.
    pub(crate) fn move_to_back(&mut self, latest: &PeerId) -> bool {
        match self.position(latest.node_id()) {
            Some(pos) => {
                let mut peer = self.peers.remove(pos);
                if peer.address() != latest.address() {
                    peer.set_address(latest.address());
                }
                self.peers.push(peer);
                true
            }
            None => false,
        }
    }

    /// Check if bucket contains a peer
    pub fn contains(&self, node_id: &NodeId) -> bool {
        self.position(node_id).is_some()
    }

    pub(crate) fn get(&self, node_id: &NodeId) -> Option<&PeerId> {
        self.peers.iter().find(|p| p.node_id() == node_id)
    }

    fn position(&self, node_id: &NodeId) -> Option<usize> {
        self.peers.iter().position(|p| p.node_id() == node_id)
    }
}
