//! # S/Kademlia Overlay Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Criterion benchmarks (routing table, channel)
//! └── src/integration/  # Multi-node flows over memory and TCP transports
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p skad-tests
//! RUST_LOG=skad_overlay=debug cargo test -p skad-tests -- --nocapture
//!
//! # Benchmarks
//! cargo bench -p skad-tests
//! ```

pub mod integration;

/// Install a test subscriber honouring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
