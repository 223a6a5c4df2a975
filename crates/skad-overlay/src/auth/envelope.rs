//! Signed message envelope and canonical signing inputs.

use crate::domain::types::entities::put_length_prefixed;
use crate::domain::PeerId;

/// A message as seen by the signature schemes.
///
/// `expiration` is only meaningful for weak signatures and `body` only for
/// strong ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignedMessage {
    /// Claimed sender
    pub sender: Option<PeerId>,
    /// Signature bytes; empty when unsigned
    pub signature: Vec<u8>,
    /// Unix time in nanoseconds after which a weak signature is rejected
    pub expiration: i64,
    /// Application payload
    pub body: Vec<u8>,
}

impl SignedMessage {
    /// Unsigned message from `sender` carrying `body`.
    pub fn new(sender: PeerId, body: impl Into<Vec<u8>>) -> Self {
        Self {
            sender: Some(sender),
            signature: Vec::new(),
            expiration: 0,
            body: body.into(),
        }
    }

    /// Set the expiration.
    pub fn with_expiration(mut self, expiration: i64) -> Self {
        self.expiration = expiration;
        self
    }
}

/// Weak signing input: `encode(sender) ‖ expiration (i64 LE)`.
pub fn weak_payload(sender: &PeerId, expiration: i64) -> Vec<u8> {
    let mut payload = sender.encode();
    payload.extend_from_slice(&expiration.to_le_bytes());
    payload
}

/// Strong signing input: every field but the signature,
/// `encode(sender) ‖ expiration (i64 LE) ‖ len (u64 LE) ‖ body`.
pub fn strong_payload(sender: &PeerId, expiration: i64, body: &[u8]) -> Vec<u8> {
    let mut payload = weak_payload(sender, expiration);
    put_length_prefixed(&mut payload, body);
    payload
}
