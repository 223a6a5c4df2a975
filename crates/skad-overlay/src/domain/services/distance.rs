//! Kademlia distance calculations.

use crate::domain::{Distance, NodeId};

/// XOR distance between two NodeIds.
///
/// # Properties
/// - Symmetric: `xor_distance(a, b) == xor_distance(b, a)`
/// - Identity: `xor_distance(a, a)` is zero
/// - Unidirectional: for a fixed `a`, every distance has exactly one `b`
pub fn xor_distance(a: &NodeId, b: &NodeId) -> Distance {
    let mut out = [0u8; 32];
    for (o, (x, y)) in out.iter_mut().zip(a.as_bytes().iter().zip(b.as_bytes())) {
        *o = x ^ y;
    }
    Distance::new(out)
}

/// Bucket index of `remote` relative to `local`.
///
/// Bucket `i` holds peers whose XOR distance has bit length `i + 1`, so
/// bucket 255 covers the half of the keyspace that differs in the top bit.
/// Returns `None` when `remote == local`.
#[inline]
pub fn calculate_bucket_index(local: &NodeId, remote: &NodeId) -> Option<usize> {
    let local_bytes = local.as_bytes();
    let remote_bytes = remote.as_bytes();

    for i in 0..32 {
        let xor = local_bytes[i] ^ remote_bytes[i];
        if xor != 0 {
            let bits = (32 - i) * 8 - xor.leading_zeros() as usize;
            return Some(bits - 1);
        }
    }
    None
}
