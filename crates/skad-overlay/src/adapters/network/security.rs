use skad_crypto::{blake3_hash, count_leading_zero_bits};

use crate::domain::PeerId;
use crate::ports::PuzzleCheck;

// ============================================================================
// NoOpPuzzleValidator - Accepts every identity
// ============================================================================

/// Puzzle check that accepts every identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpPuzzleValidator;

impl NoOpPuzzleValidator {
    /// Create a new no-op validator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl PuzzleCheck for NoOpPuzzleValidator {
    fn verify_puzzle(&self, _peer: &PeerId) -> bool {
        true
    }
}

// ============================================================================
// PuzzleValidator - S/Kademlia static and dynamic crypto puzzles
// ============================================================================

/// S/Kademlia identity puzzles.
///
/// - **static**: `BLAKE3(node_id)` has at least `c1` leading zero bits. Makes
///   generating identities expensive.
/// - **dynamic**: `BLAKE3(node_id ⊕ nonce)` has at least `c2` leading zero
///   bits. The nonce is the peer's solution; cost can be raised later
///   without invalidating the key.
///
/// The nonce is XORed over the node id byte by byte; bytes past 32 are
/// ignored and a short nonce leaves the remaining bytes unchanged.
#[derive(Debug, Clone, Copy)]
pub struct PuzzleValidator {
    c1: u32,
    c2: u32,
}

impl PuzzleValidator {
    /// Validator requiring `c1` static and `c2` dynamic leading zero bits.
    #[must_use]
    pub fn new(c1: u32, c2: u32) -> Self {
        Self { c1, c2 }
    }

    /// Static puzzle only.
    pub fn verify_static(&self, peer: &PeerId) -> bool {
        count_leading_zero_bits(&blake3_hash(peer.node_id().as_bytes())) >= self.c1
    }

    /// Dynamic puzzle only.
    pub fn verify_dynamic(&self, peer: &PeerId) -> bool {
        let mut mixed = *peer.node_id().as_bytes();
        for (byte, nonce) in mixed.iter_mut().zip(peer.nonce()) {
            *byte ^= nonce;
        }
        count_leading_zero_bits(&blake3_hash(&mixed)) >= self.c2
    }
}

impl PuzzleCheck for PuzzleValidator {
    fn verify_puzzle(&self, peer: &PeerId) -> bool {
        self.verify_static(peer) && self.verify_dynamic(peer)
    }
}
