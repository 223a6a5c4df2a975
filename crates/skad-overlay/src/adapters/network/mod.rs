//! # Network Adapters
//!
//! ## Adapters Provided
//!
//! - `SystemTimeSource` - Production time source using system clock
//! - `PuzzleValidator` / `NoOpPuzzleValidator` - Identity proof-of-work checks
//! - `StaticConfigProvider` - In-code configuration
//! - `TcpDialer` / `TcpListenerAdapter` - Framed TCP transport (requires "network" feature)
//! - `TomlConfigProvider` - Config file loading (requires "network" feature)

/// Configuration providers
pub mod config;
/// Security validators
pub mod security;
/// Time source adapters
pub mod time;
/// Transport adapters
pub mod transport;

pub use config::StaticConfigProvider;
pub use security::{NoOpPuzzleValidator, PuzzleValidator};
pub use time::SystemTimeSource;
pub use transport::{Hello, MessageType, MAX_FRAME_SIZE};

#[cfg(feature = "network")]
pub use config::{ConfigError, TomlConfigProvider};

#[cfg(feature = "network")]
pub use transport::{TcpDialer, TcpListenerAdapter, TcpTransport, DEFAULT_HELLO_TIMEOUT};
