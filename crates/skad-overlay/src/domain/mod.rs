//! Domain Layer - Pure business logic with no I/O
//!
//! - Node identifiers derived from public keys, and XOR distance
//! - Routing table with k-buckets

pub mod routing_table;
pub mod services;
/// Core domain types (entities, values, errors)
pub mod types;

pub use routing_table::*;
pub use services::*;
pub use types::*;
