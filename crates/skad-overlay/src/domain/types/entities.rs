//! Core Domain Entities for the Overlay
//!
//! A peer is identified by its long-term public key. Everything the routing
//! table keys on (the [`NodeId`]) is derived from that key.

use std::fmt;
use std::hash::{Hash, Hasher};

use skad_crypto::blake3_hash;

/// 256-bit node identifier derived from a public key hash.
///
/// `NodeId = BLAKE3(public_key)`. Binding the routing key to key ownership is
/// what stops a peer from choosing its own position in the keyspace.
///
/// # Security
///
/// Equality is constant-time. Standard `PartialEq` for byte arrays
/// short-circuits on the first difference, which leaks via timing.
// Hash over the raw bytes is consistent with the manual PartialEq:
// equal NodeIds have equal bytes.
#[allow(clippy::derived_hash_with_manual_eq)]
#[derive(Clone, Copy, Hash)]
pub struct NodeId(pub [u8; 32]);

impl PartialEq for NodeId {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        let mut result = 0u8;
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            result |= a ^ b;
        }
        result == 0
    }
}

impl Eq for NodeId {}

impl NodeId {
    /// Create a NodeId from a raw 32-byte array.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive the NodeId of a public key.
    pub fn from_public_key(public_key: &[u8]) -> Self {
        Self(blake3_hash(public_key))
    }

    /// Underlying bytes for XOR distance calculation.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// All-zero NodeId.
    pub fn zero() -> Self {
        Self([0u8; 32])
    }
}

impl AsRef<[u8]> for NodeId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Identity of a peer in the overlay.
///
/// Two `PeerId`s are the same peer iff their public keys are equal. The
/// address and nonce are carried along but never take part in equality.
#[derive(Clone)]
pub struct PeerId {
    public_key: Vec<u8>,
    address: String,
    /// Proof-of-work nonce for the dynamic identity puzzle.
    nonce: Vec<u8>,
    node_id: NodeId,
}

impl PeerId {
    /// Create a peer identity with an empty nonce.
    pub fn new(public_key: impl Into<Vec<u8>>, address: impl Into<String>) -> Self {
        let public_key = public_key.into();
        let node_id = NodeId::from_public_key(&public_key);
        Self {
            public_key,
            address: address.into(),
            nonce: Vec::new(),
            node_id,
        }
    }

    /// Attach a proof-of-work nonce.
    pub fn with_nonce(mut self, nonce: impl Into<Vec<u8>>) -> Self {
        self.nonce = nonce.into();
        self
    }

    /// Long-term public key.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Network address the peer is reachable at.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Proof-of-work nonce (may be empty).
    pub fn nonce(&self) -> &[u8] {
        &self.nonce
    }

    /// Routing key, `BLAKE3(public_key)`.
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    /// Replace the address. The only mutable part of an identity.
    pub fn set_address(&mut self, address: impl Into<String>) {
        self.address = address.into();
    }

    /// Hex-encoded public key, for log fields.
    pub fn public_key_hex(&self) -> String {
        hex::encode(&self.public_key)
    }

    /// Canonical byte encoding used as signing input.
    ///
    /// Each field is prefixed with its length as a `u64` little-endian:
    /// `len ‖ public_key ‖ len ‖ nonce ‖ len ‖ address`. The prefix covers
    /// any field length, so distinct identities never encode alike.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            24 + self.public_key.len() + self.nonce.len() + self.address.len(),
        );
        for field in [
            self.public_key.as_slice(),
            self.nonce.as_slice(),
            self.address.as_bytes(),
        ] {
            put_length_prefixed(&mut out, field);
        }
        out
    }
}

/// Append `len (u64 LE) ‖ field`.
pub(crate) fn put_length_prefixed(out: &mut Vec<u8>, field: &[u8]) {
    out.extend_from_slice(&(field.len() as u64).to_le_bytes());
    out.extend_from_slice(field);
}

impl PartialEq for PeerId {
    fn eq(&self, other: &Self) -> bool {
        self.public_key == other.public_key
    }
}

impl Eq for PeerId {}

impl Hash for PeerId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.public_key.hash(state);
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerId")
            .field("public_key", &hex::encode(&self.public_key))
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = hex::encode(&self.public_key);
        write!(f, "{}@{}", &key[..key.len().min(16)], self.address)
    }
}
