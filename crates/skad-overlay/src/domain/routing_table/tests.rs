//! Tests for Routing Table Implementation

use super::*;
use crate::domain::{NodeId, OverlayConfig, PeerId, RoutingError};

fn self_peer() -> PeerId {
    PeerId::new(b"local-node".to_vec(), "127.0.0.1:3000")
}

fn make_table() -> RoutingTable {
    RoutingTable::with_config(self_peer(), &OverlayConfig::for_testing())
}

/// Peers whose derived NodeId lands in bucket `index` of `table`.
///
/// NodeIds are hashes, so candidates are searched for by counter.
fn peers_in_bucket(table: &RoutingTable, index: usize, count: usize) -> Vec<PeerId> {
    (0u32..)
        .map(|i| {
            let mut key = b"peer-".to_vec();
            key.extend_from_slice(&i.to_le_bytes());
            PeerId::new(key, format!("10.0.0.{}:{}", i % 250, 4000 + i))
        })
        .filter(|p| table.bucket_index_for(p.node_id()) == Some(index))
        .take(count)
        .collect()
}

// =============================================================================
// Test Group 1: Bucket Capacity
// =============================================================================

#[test]
fn test_bucket_rejects_when_full() {
    let mut table = make_table();
    let k = table.k();
    let peers = peers_in_bucket(&table, 255, k + 1);

    for peer in &peers[..k] {
        table.update(peer.clone()).unwrap();
    }

    assert_eq!(
        table.update(peers[k].clone()),
        Err(RoutingError::BucketFull)
    );
    assert_eq!(table.bucket(255).unwrap().len(), k);
    assert!(!table.contains(peers[k].node_id()));
}

#[test]
fn test_reinsert_into_full_bucket_keeps_occupancy() {
    let mut table = make_table();
    let k = table.k();
    let peers = peers_in_bucket(&table, 255, k);

    for peer in &peers {
        table.update(peer.clone()).unwrap();
    }

    // Re-inserting an existing member of a full bucket is a refresh
    table.update(peers[0].clone()).unwrap();

    let bucket = table.bucket(255).unwrap();
    assert_eq!(bucket.len(), k);
    assert_eq!(bucket.newest_peer(), Some(&peers[0]));
    assert_eq!(bucket.oldest_peer(), Some(&peers[1]));
}

#[test]
fn test_full_bucket_does_not_affect_other_buckets() {
    let mut table = make_table();
    let k = table.k();
    for peer in peers_in_bucket(&table, 255, k) {
        table.update(peer).unwrap();
    }

    let other = peers_in_bucket(&table, 254, 1).remove(0);
    assert_eq!(table.update(other), Ok(()));
    assert_eq!(table.peer_count(), k + 1);
}

// =============================================================================
// Test Group 2: Ordering and Refresh
// =============================================================================

#[test]
fn test_update_appends_most_recent_last() {
    let mut table = make_table();
    let peers = peers_in_bucket(&table, 255, 3);

    for peer in &peers {
        table.update(peer.clone()).unwrap();
    }

    assert_eq!(table.bucket(255).unwrap().peers(), &peers[..]);
    assert_eq!(table.least_recently_seen(peers[2].node_id()), Some(peers[0].clone()));
}

#[test]
fn test_update_refreshes_address() {
    let mut table = make_table();
    let mut peer = peers_in_bucket(&table, 255, 1).remove(0);
    table.update(peer.clone()).unwrap();

    peer.set_address("192.168.1.7:9000");
    table.update(peer.clone()).unwrap();

    let stored = table.get_peer(peer.node_id()).unwrap();
    assert_eq!(stored.address(), "192.168.1.7:9000");
    assert_eq!(table.peer_count(), 1);
}

// =============================================================================
// Test Group 3: Self and Lookups
// =============================================================================

#[test]
fn test_self_is_never_inserted() {
    let mut table = make_table();
    let result = table.update(self_peer());

    assert_eq!(result, Err(RoutingError::SelfInsertion));
    assert_eq!(table.peer_count(), 0);
    assert_eq!(table.bucket_index_for(self_peer().node_id()), None);
}

#[test]
fn test_get_peer_from_public_key() {
    let mut table = make_table();
    let peer = peers_in_bucket(&table, 255, 1).remove(0);
    table.update(peer.clone()).unwrap();

    assert_eq!(table.get_peer_from_public_key(peer.public_key()), Some(peer));
    assert_eq!(table.get_peer_from_public_key(b"unknown"), None);
}

#[test]
fn test_remove_peer() {
    let mut table = make_table();
    let peer = peers_in_bucket(&table, 255, 1).remove(0);
    table.update(peer.clone()).unwrap();

    assert_eq!(table.remove_peer(peer.node_id()), Ok(peer.clone()));
    assert_eq!(
        table.remove_peer(peer.node_id()),
        Err(RoutingError::PeerNotFound)
    );
    assert_eq!(table.remove_peer(&NodeId::zero()), Err(RoutingError::PeerNotFound));
}

#[test]
fn test_set_self_address() {
    let mut table = make_table();
    table.set_self_address("203.0.113.9:3000");

    assert_eq!(table.self_peer().address(), "203.0.113.9:3000");
    assert_eq!(table.self_peer(), &self_peer());
}

#[test]
fn test_find_closest_peers() {
    let mut table = RoutingTable::new(self_peer(), 16);
    let mut peers = Vec::new();
    for index in [255, 254, 253] {
        peers.extend(peers_in_bucket(&table, index, 2));
    }
    for peer in &peers {
        table.update(peer.clone()).unwrap();
    }

    let target = *peers[3].node_id();
    let closest = table.find_closest_peers(&target, 2);

    assert_eq!(closest.len(), 2);
    assert_eq!(closest[0], peers[3]);
}

#[test]
fn test_stats() {
    let mut table = make_table();
    let k = table.k();
    for peer in peers_in_bucket(&table, 255, k) {
        table.update(peer).unwrap();
    }
    table.update(peers_in_bucket(&table, 254, 1).remove(0)).unwrap();

    let stats = table.stats();
    assert_eq!(stats.total_peers, k + 1);
    assert_eq!(stats.buckets_used, 2);
    assert_eq!(stats.full_buckets, 1);
    assert_eq!(stats.bucket_capacity, k);
}
