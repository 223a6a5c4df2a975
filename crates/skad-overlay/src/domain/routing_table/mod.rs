//! Routing Table Implementation
//!
//! S/Kademlia routing table: 256 buckets indexed by the bit length of the
//! XOR distance to the local node, each holding at most `k` peers ordered
//! least-recently-seen first.

mod bucket;
mod config;
mod stats;
mod table;

pub use bucket::KBucket;
pub use config::NUM_BUCKETS;
pub use stats::RoutingTableStats;
pub use table::RoutingTable;

#[cfg(test)]
mod tests;
