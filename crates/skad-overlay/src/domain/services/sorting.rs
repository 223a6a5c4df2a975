//! Peer sorting and selection.

use super::distance::xor_distance;
use crate::domain::{NodeId, PeerId};

/// Sort peers by XOR distance from a target node (closest first).
pub fn sort_peers_by_distance(peers: &[PeerId], target: &NodeId) -> Vec<PeerId> {
    let mut sorted = peers.to_vec();
    sorted.sort_by_cached_key(|p| xor_distance(p.node_id(), target));
    sorted
}

/// Find the k closest peers to a target from a list
///
/// # Returns
/// Up to k peers sorted by distance (closest first)
pub fn find_k_closest(peers: &[PeerId], target: &NodeId, k: usize) -> Vec<PeerId> {
    let sorted = sort_peers_by_distance(peers, target);
    sorted.into_iter().take(k).collect()
}
