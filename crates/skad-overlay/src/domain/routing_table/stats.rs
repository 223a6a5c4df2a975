//! Routing table statistics.

/// Snapshot of routing table occupancy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingTableStats {
    /// Peers across all buckets
    pub total_peers: usize,
    /// Buckets holding at least one peer
    pub buckets_used: usize,
    /// Buckets at capacity
    pub full_buckets: usize,
    /// Bucket capacity (k)
    pub bucket_capacity: usize,
}
