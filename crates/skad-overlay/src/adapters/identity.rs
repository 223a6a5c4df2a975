//! Ed25519 long-term identity.

use skad_crypto::{verify_raw, Ed25519KeyPair, ED25519_SIGNATURE_LENGTH};

use crate::ports::Signer;

/// [`Signer`] backed by an Ed25519 keypair.
pub struct Ed25519Signer {
    keypair: Ed25519KeyPair,
}

impl Ed25519Signer {
    /// Fresh random identity.
    pub fn generate() -> Self {
        Self {
            keypair: Ed25519KeyPair::generate(),
        }
    }

    /// Deterministic identity from a 32-byte seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            keypair: Ed25519KeyPair::from_seed(seed),
        }
    }
}

impl Signer for Ed25519Signer {
    fn public_key(&self) -> Vec<u8> {
        self.keypair.public_key().as_bytes().to_vec()
    }

    fn sign(&self, data: &[u8]) -> Vec<u8> {
        self.keypair.sign(data).as_bytes().to_vec()
    }

    fn verify(&self, public_key: &[u8], data: &[u8], signature: &[u8]) -> bool {
        verify_raw(public_key, data, signature).is_ok()
    }

    fn signature_size(&self) -> usize {
        ED25519_SIGNATURE_LENGTH
    }
}

impl std::fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("public_key", &hex::encode(self.public_key()))
            .finish_non_exhaustive()
    }
}
