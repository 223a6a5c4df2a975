//! Domain Services - Pure functions for Kademlia operations
//!
//! All functions in this module are pure (no I/O, no state mutation)
//! and deterministic (same inputs → same outputs).

mod addresses;
mod distance;
mod sorting;

pub use addresses::{filter_peers, to_unified_address};
pub use distance::{calculate_bucket_index, xor_distance};
pub use sorting::{find_k_closest, sort_peers_by_distance};
