//! Value Objects for the Overlay

use std::cmp::Ordering;
use std::time::Duration;

/// Full 256-bit XOR distance between two node identifiers.
///
/// Ordered as a big-endian integer, so sorting by `Distance` sorts by
/// closeness (smallest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Distance(pub [u8; 32]);

impl Distance {
    /// Wrap raw XOR bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Distance of a node to itself.
    pub fn zero() -> Self {
        Self([0u8; 32])
    }

    /// True for the distance of a node to itself.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Number of significant bits in the distance (0 for zero).
    pub fn bit_length(&self) -> usize {
        for (i, byte) in self.0.iter().enumerate() {
            if *byte != 0 {
                return (32 - i) * 8 - byte.leading_zeros() as usize;
            }
        }
        0
    }

    /// Bucket a peer at this distance belongs to: `bit_length - 1`.
    ///
    /// `None` for the zero distance; a node never has a bucket for itself.
    pub fn bucket_index(&self) -> Option<usize> {
        self.bit_length().checked_sub(1)
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Distance {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

/// Overlay tunables.
///
/// # Security Notes
///
/// - `handshake_timeout`: bounds how long a silent remote can hold a session
///   (and, on the passive side, a handshake task) open.
/// - `puzzle_c1` / `puzzle_c2`: S/Kademlia static and dynamic proof-of-work
///   difficulty in leading zero bits. Zero disables the check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayConfig {
    /// Bucket capacity (default: 16)
    pub k: usize,
    /// Upper bound on waiting for the remote's handshake frame (default: 10s)
    pub handshake_timeout: Duration,
    /// Sessions buffered by a passive accept loop before it blocks (default: 64)
    pub accept_backlog: usize,
    /// Lifetime of a weak signature created via the authenticator (default: 5s)
    pub weak_signature_ttl: Duration,
    /// Static puzzle difficulty (default: 0)
    pub puzzle_c1: u32,
    /// Dynamic puzzle difficulty (default: 0)
    pub puzzle_c2: u32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            k: 16,
            handshake_timeout: Duration::from_secs(10),
            accept_backlog: 64,
            weak_signature_ttl: Duration::from_secs(5),
            puzzle_c1: 0,
            puzzle_c2: 0,
        }
    }
}

impl OverlayConfig {
    /// Create a config suitable for testing (smaller values)
    pub fn for_testing() -> Self {
        Self {
            k: 3, // Smaller buckets for easier testing
            handshake_timeout: Duration::from_millis(500),
            accept_backlog: 8,
            weak_signature_ttl: Duration::from_secs(1),
            puzzle_c1: 0,
            puzzle_c2: 0,
        }
    }
}
