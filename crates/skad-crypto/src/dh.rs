//! # X25519 Ephemeral Key Exchange
//!
//! One [`DhKeyPair`] per handshake. Deriving the shared secret consumes the
//! keypair, so the secret scalar cannot outlive the exchange.

use crate::CryptoError;
use rand::{CryptoRng, RngCore};
use x25519_dalek::{EphemeralSecret, PublicKey};
use zeroize::Zeroizing;

/// Length of an encoded X25519 public value.
pub const DH_PUBLIC_KEY_LENGTH: usize = 32;

/// Ephemeral X25519 keypair.
pub struct DhKeyPair {
    secret: EphemeralSecret,
    public: PublicKey,
}

impl DhKeyPair {
    /// Generate a fresh keypair from the thread-local CSPRNG.
    pub fn generate() -> Self {
        Self::from_rng(&mut rand::thread_rng())
    }

    /// Generate a fresh keypair from the supplied CSPRNG.
    pub fn from_rng<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let secret = EphemeralSecret::random_from_rng(rng);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Raw public value, as sent on the wire.
    pub fn public_bytes(&self) -> [u8; DH_PUBLIC_KEY_LENGTH] {
        self.public.to_bytes()
    }

    /// Complete the exchange against the remote's raw public value.
    ///
    /// Consumes the keypair. Fails if the remote value has the wrong length or
    /// is a low-order point (the result would not depend on our secret).
    pub fn diffie_hellman(
        self,
        remote_public: &[u8],
    ) -> Result<Zeroizing<[u8; DH_PUBLIC_KEY_LENGTH]>, CryptoError> {
        let remote: [u8; DH_PUBLIC_KEY_LENGTH] =
            remote_public
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: DH_PUBLIC_KEY_LENGTH,
                    actual: remote_public.len(),
                })?;

        let shared = self.secret.diffie_hellman(&PublicKey::from(remote));
        if !shared.was_contributory() {
            return Err(CryptoError::NonContributoryKey);
        }
        Ok(Zeroizing::new(shared.to_bytes()))
    }
}

impl std::fmt::Debug for DhKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DhKeyPair")
            .field("public", &self.public.as_bytes())
            .finish_non_exhaustive()
    }
}
