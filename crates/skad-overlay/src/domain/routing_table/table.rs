//! Main RoutingTable implementation.

use crate::domain::{
    calculate_bucket_index, find_k_closest, NodeId, OverlayConfig, PeerId, RoutingError,
};

use super::bucket::KBucket;
use super::config::NUM_BUCKETS;
use super::stats::RoutingTableStats;

/// S/Kademlia routing table.
///
/// # Invariants
/// - A peer identity appears in at most one bucket, the one selected by
///   [`calculate_bucket_index`].
/// - No bucket holds more than `k` peers.
/// - The local peer is never stored.
#[derive(Debug)]
pub struct RoutingTable {
    /// Our own identity; only the address may change after creation
    self_peer: PeerId,
    /// 256 k-buckets, one for each possible XOR distance bit length
    buckets: Vec<KBucket>,
    /// Bucket capacity
    k: usize,
}

impl RoutingTable {
    /// Create a routing table with bucket capacity `k`.
    pub fn new(self_peer: PeerId, k: usize) -> Self {
        let buckets = (0..NUM_BUCKETS).map(|_| KBucket::new()).collect();
        Self {
            self_peer,
            buckets,
            k,
        }
    }

    /// Create a routing table using the bucket capacity from `config`.
    pub fn with_config(self_peer: PeerId, config: &OverlayConfig) -> Self {
        Self::new(self_peer, config.k)
    }

    /// Our own identity.
    pub fn self_peer(&self) -> &PeerId {
        &self.self_peer
    }

    /// Replace our own advertised address (e.g. once an accepted connection
    /// reveals how the outside sees us).
    pub fn set_self_address(&mut self, address: impl Into<String>) {
        self.self_peer.set_address(address);
    }

    /// Bucket capacity.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Bucket index `id` maps to, `None` for our own id.
    pub fn bucket_index_for(&self, id: &NodeId) -> Option<usize> {
        calculate_bucket_index(self.self_peer.node_id(), id)
    }

    /// Bucket by index.
    pub fn bucket(&self, index: usize) -> Option<&KBucket> {
        self.buckets.get(index)
    }

    /// Insert or refresh a peer.
    ///
    /// - already present: moved to the most-recently-seen position, address
    ///   refreshed;
    /// - absent, bucket has room: appended as most recently seen;
    /// - absent, bucket full: `BucketFull`, table unchanged.
    pub fn update(&mut self, peer: PeerId) -> Result<(), RoutingError> {
        let index = self
            .bucket_index_for(peer.node_id())
            .ok_or(RoutingError::SelfInsertion)?;
        let k = self.k;
        let bucket = &mut self.buckets[index];

        if bucket.move_to_back(&peer) {
            return Ok(());
        }
        if bucket.is_full(k) {
            return Err(RoutingError::BucketFull);
        }
        bucket.add_peer(peer);
        Ok(())
    }

    /// Look up a peer by node id.
    pub fn get_peer(&self, id: &NodeId) -> Option<PeerId> {
        let index = self.bucket_index_for(id)?;
        self.buckets[index].get(id).cloned()
    }

    /// Look up a peer by its public key.
    pub fn get_peer_from_public_key(&self, public_key: &[u8]) -> Option<PeerId> {
        self.get_peer(&NodeId::from_public_key(public_key))
    }

    /// Every stored peer, bucket by bucket.
    pub fn get_peers(&self) -> Vec<PeerId> {
        self.buckets
            .iter()
            .flat_map(|b| b.peers().iter().cloned())
            .collect()
    }

    /// Check if a peer is stored.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.bucket_index_for(id)
            .map(|index| self.buckets[index].contains(id))
            .unwrap_or(false)
    }

    /// Remove a peer.
    pub fn remove_peer(&mut self, id: &NodeId) -> Result<PeerId, RoutingError> {
        let index = self
            .bucket_index_for(id)
            .ok_or(RoutingError::PeerNotFound)?;
        self.buckets[index]
            .remove_peer(id)
            .ok_or(RoutingError::PeerNotFound)
    }

    /// Least recently seen peer of the bucket `id` falls into.
    ///
    /// This is the eviction candidate when that bucket is full.
    pub fn least_recently_seen(&self, id: &NodeId) -> Option<PeerId> {
        let index = self.bucket_index_for(id)?;
        self.buckets[index].oldest_peer().cloned()
    }

    /// Up to `count` stored peers closest to `target`, closest first.
    pub fn find_closest_peers(&self, target: &NodeId, count: usize) -> Vec<PeerId> {
        find_k_closest(&self.get_peers(), target, count)
    }

    /// Total peer count across all buckets
    pub fn peer_count(&self) -> usize {
        self.buckets.iter().map(|b| b.len()).sum()
    }

    /// Routing table statistics
    pub fn stats(&self) -> RoutingTableStats {
        RoutingTableStats {
            total_peers: self.peer_count(),
            buckets_used: self.buckets.iter().filter(|b| !b.is_empty()).count(),
            full_buckets: self.buckets.iter().filter(|b| b.is_full(self.k)).count(),
            bucket_capacity: self.k,
        }
    }
}
