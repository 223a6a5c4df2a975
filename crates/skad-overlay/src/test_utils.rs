//! Test utilities for the overlay.
//!
//! Deterministic stand-ins for the capabilities the overlay requires.
//! Enable with the `test-utils` feature flag.
//!
//! # Example
//!
//! ```rust
//! use skad_overlay::test_utils::FixedTimeSource;
//! use skad_overlay::ports::TimeSource;
//!
//! let time_source = FixedTimeSource::new(1000);
//! assert_eq!(time_source.now_nanos(), 1000);
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::adapters::identity::Ed25519Signer;
use crate::domain::PeerId;
use crate::ports::{Broadcaster, LivenessProbe, Signer, TimeSource, TransportError};

/// A time source that returns a settable timestamp.
#[derive(Debug, Clone, Default)]
pub struct FixedTimeSource {
    nanos: Arc<AtomicI64>,
}

impl FixedTimeSource {
    /// Create a time source stuck at `nanos` (unix nanoseconds).
    pub fn new(nanos: i64) -> Self {
        Self {
            nanos: Arc::new(AtomicI64::new(nanos)),
        }
    }

    /// Move the clock; visible through every clone.
    pub fn set(&self, nanos: i64) {
        self.nanos.store(nanos, Ordering::SeqCst);
    }

    /// Move the clock forward.
    pub fn advance(&self, nanos: i64) {
        self.nanos.fetch_add(nanos, Ordering::SeqCst);
    }
}

impl TimeSource for FixedTimeSource {
    fn now_nanos(&self) -> i64 {
        self.nanos.load(Ordering::SeqCst)
    }
}

/// Broadcaster that records every body instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct RecordingBroadcaster {
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl RecordingBroadcaster {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bodies broadcast so far, oldest first.
    pub fn broadcasts(&self) -> Vec<Vec<u8>> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Broadcaster for RecordingBroadcaster {
    async fn broadcast(&self, body: Vec<u8>) -> Result<(), TransportError> {
        self.sent.lock().push(body);
        Ok(())
    }
}

/// Liveness probe with scripted answers.
///
/// Peers without an explicit answer get the default.
#[derive(Debug, Clone)]
pub struct StaticLivenessProbe {
    default_alive: bool,
    answers: Arc<Mutex<HashMap<Vec<u8>, bool>>>,
    pinged: Arc<Mutex<Vec<PeerId>>>,
}

impl StaticLivenessProbe {
    /// Every peer answers.
    pub fn all_alive() -> Self {
        Self::with_default(true)
    }

    /// No peer answers.
    pub fn all_dead() -> Self {
        Self::with_default(false)
    }

    fn with_default(default_alive: bool) -> Self {
        Self {
            default_alive,
            answers: Arc::new(Mutex::new(HashMap::new())),
            pinged: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Script the answer for one peer.
    pub fn set_alive(&self, peer: &PeerId, alive: bool) {
        self.answers.lock().insert(peer.public_key().to_vec(), alive);
    }

    /// Peers pinged so far, oldest first.
    pub fn pinged(&self) -> Vec<PeerId> {
        self.pinged.lock().clone()
    }
}

#[async_trait]
impl LivenessProbe for StaticLivenessProbe {
    async fn ping(&self, peer: &PeerId) -> bool {
        self.pinged.lock().push(peer.clone());
        self.answers
            .lock()
            .get(peer.public_key())
            .copied()
            .unwrap_or(self.default_alive)
    }
}

/// Deterministic signer plus the matching identity at `address`.
pub fn identity(seed: u8, address: &str) -> (Arc<dyn Signer>, PeerId) {
    let signer: Arc<dyn Signer> = Arc::new(Ed25519Signer::from_seed([seed; 32]));
    let peer = PeerId::new(signer.public_key(), address);
    (signer, peer)
}
