//! Explicit wiring for [`DiscoveryAdapter`].

use std::sync::Arc;

use parking_lot::RwLock;

use super::adapter::DiscoveryAdapter;
use crate::adapters::network::{PuzzleValidator, SystemTimeSource};
use crate::domain::{OverlayConfig, RoutingTable};
use crate::ports::{
    Broadcaster, ConnectionError, Dialer, Listener, LivenessProbe, PuzzleCheck, Signer, TimeSource,
};

/// Builder for [`DiscoveryAdapter`].
///
/// The routing table and signer are required. Every other capability is
/// optional; operations that need a missing one fail with
/// [`ConnectionError::NotConfigured`].
///
/// # Example
///
/// ```rust,ignore
/// let adapter = DiscoveryAdapterBuilder::new(signer)
///     .routing_table(table)
///     .dialer(dialer)
///     .listener(listener)
///     .build()?;
/// ```
pub struct DiscoveryAdapterBuilder {
    signer: Arc<dyn Signer>,
    routes: Option<Arc<RwLock<RoutingTable>>>,
    config: OverlayConfig,
    dialer: Option<Arc<dyn Dialer>>,
    listener: Option<Arc<dyn Listener>>,
    broadcaster: Option<Arc<dyn Broadcaster>>,
    probe: Option<Arc<dyn LivenessProbe>>,
    puzzle: Option<Arc<dyn PuzzleCheck>>,
    time_source: Option<Arc<dyn TimeSource>>,
}

impl DiscoveryAdapterBuilder {
    /// Start wiring an adapter that signs with `signer`.
    pub fn new(signer: Arc<dyn Signer>) -> Self {
        Self {
            signer,
            routes: None,
            config: OverlayConfig::default(),
            dialer: None,
            listener: None,
            broadcaster: None,
            probe: None,
            puzzle: None,
            time_source: None,
        }
    }

    /// Routing table to maintain. May be shared with other components.
    pub fn routing_table(mut self, routes: Arc<RwLock<RoutingTable>>) -> Self {
        self.routes = Some(routes);
        self
    }

    /// Overlay tunables.
    pub fn config(mut self, config: OverlayConfig) -> Self {
        self.config = config;
        self
    }

    /// Capability for outgoing connections.
    pub fn dialer(mut self, dialer: Arc<dyn Dialer>) -> Self {
        self.dialer = Some(dialer);
        self
    }

    /// Capability for incoming connections.
    pub fn listener(mut self, listener: Arc<dyn Listener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Capability for announcing ourselves on bootstrap.
    pub fn broadcaster(mut self, broadcaster: Arc<dyn Broadcaster>) -> Self {
        self.broadcaster = Some(broadcaster);
        self
    }

    /// Capability for checking eviction candidates. Without one, full
    /// buckets never evict.
    pub fn liveness_probe(mut self, probe: Arc<dyn LivenessProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Identity check. Defaults to a [`PuzzleValidator`] with the config's
    /// difficulties.
    pub fn puzzle_check(mut self, puzzle: Arc<dyn PuzzleCheck>) -> Self {
        self.puzzle = Some(puzzle);
        self
    }

    /// Clock for weak signature expiry. Defaults to the system clock.
    pub fn time_source(mut self, time_source: Arc<dyn TimeSource>) -> Self {
        self.time_source = Some(time_source);
        self
    }

    /// Finish wiring.
    ///
    /// # Errors
    ///
    /// - `NotConfigured` without a routing table
    /// - `LocalMismatch` if the table's own identity is not the signer's key
    pub fn build(self) -> Result<DiscoveryAdapter, ConnectionError> {
        let routes = self
            .routes
            .ok_or(ConnectionError::NotConfigured("routing table"))?;
        if routes.read().self_peer().public_key() != self.signer.public_key().as_slice() {
            return Err(ConnectionError::LocalMismatch);
        }

        let puzzle = self.puzzle.unwrap_or_else(|| {
            Arc::new(PuzzleValidator::new(
                self.config.puzzle_c1,
                self.config.puzzle_c2,
            ))
        });
        let time_source = self
            .time_source
            .unwrap_or_else(|| Arc::new(SystemTimeSource::new()));

        Ok(DiscoveryAdapter {
            routes,
            signer: self.signer,
            config: self.config,
            dialer: self.dialer,
            listener: self.listener,
            broadcaster: self.broadcaster,
            probe: self.probe,
            puzzle,
            time_source,
        })
    }
}
