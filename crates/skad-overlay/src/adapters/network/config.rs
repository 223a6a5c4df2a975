use crate::domain::{OverlayConfig, PeerId};
use crate::ports::ConfigProvider;

// ============================================================================
// StaticConfigProvider - Hardcoded config for testing/development
// ============================================================================

/// Static configuration provider with hardcoded values.
///
/// Useful for testing and development. For production, use `TomlConfigProvider`.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider {
    bootstrap_peers: Vec<PeerId>,
    config: OverlayConfig,
}

impl StaticConfigProvider {
    /// Create with default config and no bootstrap peers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with specified bootstrap peers.
    #[must_use]
    pub fn with_bootstrap_peers(mut self, peers: Vec<PeerId>) -> Self {
        self.bootstrap_peers = peers;
        self
    }

    /// Create with specified overlay config.
    #[must_use]
    pub fn with_config(mut self, config: OverlayConfig) -> Self {
        self.config = config;
        self
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn bootstrap_peers(&self) -> Vec<PeerId> {
        self.bootstrap_peers.clone()
    }

    fn overlay_config(&self) -> OverlayConfig {
        self.config.clone()
    }
}

// ============================================================================
// TomlConfigProvider - Config file loading (requires "network" feature)
// ============================================================================

#[cfg(feature = "network")]
mod toml_config {
    use super::*;
    use serde::Deserialize;
    use std::fs;
    use std::path::Path;
    use std::time::Duration;
    use thiserror::Error;

    /// Configuration file structure.
    #[derive(Debug, Deserialize)]
    struct ConfigFile {
        #[serde(default)]
        bootstrap: BootstrapSection,
        #[serde(default)]
        overlay: OverlaySection,
    }

    #[derive(Debug, Deserialize, Default)]
    struct BootstrapSection {
        #[serde(default)]
        peers: Vec<BootstrapPeer>,
    }

    #[derive(Debug, Deserialize)]
    struct BootstrapPeer {
        public_key: String,
        address: String,
        #[serde(default)]
        nonce: Option<String>,
    }

    #[derive(Debug, Deserialize, Default)]
    struct OverlaySection {
        k: Option<usize>,
        handshake_timeout_ms: Option<u64>,
        accept_backlog: Option<usize>,
        weak_signature_ttl_ms: Option<u64>,
        puzzle_c1: Option<u32>,
        puzzle_c2: Option<u32>,
    }

    /// TOML-based configuration provider.
    ///
    /// # Config File Format
    ///
    /// ```toml
    /// [overlay]
    /// k = 16
    /// handshake_timeout_ms = 10000
    /// accept_backlog = 64
    /// weak_signature_ttl_ms = 5000
    /// puzzle_c1 = 0
    /// puzzle_c2 = 0
    ///
    /// [[bootstrap.peers]]
    /// public_key = "8a88e3dd7409f195fd52db2d3cba5d72ca6709bf1d94121bf3748801b40f6f5c"
    /// address = "10.0.0.1:3000"
    /// ```
    ///
    /// Missing `[overlay]` keys fall back to [`OverlayConfig::default`].
    #[derive(Debug, Clone)]
    pub struct TomlConfigProvider {
        bootstrap_peers: Vec<PeerId>,
        config: OverlayConfig,
    }

    impl TomlConfigProvider {
        /// Load configuration from a TOML file.
        ///
        /// # Errors
        ///
        /// Returns error if file cannot be read or parsed.
        pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
            let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
                path: path.as_ref().display().to_string(),
                error: e.to_string(),
            })?;

            Self::parse(&content)
        }

        /// Parse configuration from a TOML string.
        pub fn parse(content: &str) -> Result<Self, ConfigError> {
            let file: ConfigFile =
                toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

            let bootstrap_peers = file
                .bootstrap
                .peers
                .iter()
                .map(Self::parse_peer)
                .collect::<Result<Vec<_>, _>>()?;

            let defaults = OverlayConfig::default();
            let oc = file.overlay;
            let config = OverlayConfig {
                k: oc.k.unwrap_or(defaults.k),
                handshake_timeout: oc
                    .handshake_timeout_ms
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.handshake_timeout),
                accept_backlog: oc.accept_backlog.unwrap_or(defaults.accept_backlog),
                weak_signature_ttl: oc
                    .weak_signature_ttl_ms
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.weak_signature_ttl),
                puzzle_c1: oc.puzzle_c1.unwrap_or(defaults.puzzle_c1),
                puzzle_c2: oc.puzzle_c2.unwrap_or(defaults.puzzle_c2),
            };

            Ok(Self {
                bootstrap_peers,
                config,
            })
        }

        fn parse_peer(peer: &BootstrapPeer) -> Result<PeerId, ConfigError> {
            let public_key = hex::decode(&peer.public_key)
                .map_err(|e| ConfigError::InvalidPeer(format!("{}: {e}", peer.public_key)))?;
            let mut parsed = PeerId::new(public_key, peer.address.clone());
            if let Some(nonce) = &peer.nonce {
                let nonce = hex::decode(nonce)
                    .map_err(|e| ConfigError::InvalidPeer(format!("nonce {nonce}: {e}")))?;
                parsed = parsed.with_nonce(nonce);
            }
            Ok(parsed)
        }
    }

    impl ConfigProvider for TomlConfigProvider {
        fn bootstrap_peers(&self) -> Vec<PeerId> {
            self.bootstrap_peers.clone()
        }

        fn overlay_config(&self) -> OverlayConfig {
            self.config.clone()
        }
    }

    /// Errors that can occur during config loading.
    #[derive(Debug, Clone, Error, PartialEq, Eq)]
    pub enum ConfigError {
        /// File I/O error.
        #[error("Failed to read {path}: {error}")]
        Io {
            /// Path of the file that failed to load.
            path: String,
            /// Error message from the I/O operation.
            error: String,
        },
        /// TOML parsing error.
        #[error("Failed to parse config: {0}")]
        Parse(String),
        /// Bootstrap peer entry with malformed hex.
        #[error("Invalid bootstrap peer: {0}")]
        InvalidPeer(String),
    }
}

#[cfg(feature = "network")]
pub use toml_config::{ConfigError, TomlConfigProvider};
