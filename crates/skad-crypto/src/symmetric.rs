//! # Symmetric Session Encryption
//!
//! AES-256-GCM with caller-supplied 96-bit nonces. The session key is the
//! SHA-256 digest of the raw Diffie-Hellman shared secret.
//!
//! Nonce management is the caller's responsibility: a (key, nonce) pair must
//! never seal two different messages.

use crate::hashing::sha256;
use crate::CryptoError;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use zeroize::Zeroize;

/// Length of an AES-GCM nonce in bytes.
pub const AEAD_NONCE_LENGTH: usize = 12;

/// Length of the AES-GCM authentication tag appended to each ciphertext.
pub const AEAD_TAG_LENGTH: usize = 16;

/// Secret key (256-bit).
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SecretKey([u8; 32]);

impl SecretKey {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive a session key by hashing raw shared-secret bytes.
    pub fn derive_from_shared_secret(shared_secret: &[u8]) -> Self {
        Self(sha256(shared_secret))
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// AES-256-GCM context for one session.
#[derive(Clone)]
pub struct SessionCipher {
    cipher: Aes256Gcm,
}

impl SessionCipher {
    /// Build a cipher context from a 256-bit key.
    pub fn new(key: &SecretKey) -> Result<Self, CryptoError> {
        let cipher =
            Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| CryptoError::InvalidKeyLength {
                expected: 32,
                actual: key.as_bytes().len(),
            })?;
        Ok(Self { cipher })
    }

    /// Seal `plaintext` under `nonce` with no associated data.
    pub fn seal(
        &self,
        nonce: &[u8; AEAD_NONCE_LENGTH],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        self.cipher
            .encrypt(Nonce::from_slice(nonce), plaintext)
            .map_err(|_| CryptoError::EncryptionFailed)
    }

    /// Open `ciphertext` sealed under `nonce` with no associated data.
    pub fn open(
        &self,
        nonce: &[u8; AEAD_NONCE_LENGTH],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CryptoError::DecryptionFailed)
    }
}

impl std::fmt::Debug for SessionCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionCipher(AES-256-GCM)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher(seed: u8) -> SessionCipher {
        SessionCipher::new(&SecretKey::from_bytes([seed; 32])).unwrap()
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let cipher = cipher(1);
        let nonce = [0u8; AEAD_NONCE_LENGTH];

        let sealed = cipher.seal(&nonce, b"Hello, overlay!").unwrap();
        assert_eq!(sealed.len(), b"Hello, overlay!".len() + AEAD_TAG_LENGTH);
        assert_eq!(cipher.open(&nonce, &sealed).unwrap(), b"Hello, overlay!");
    }

    #[test]
    fn test_wrong_key_fails() {
        let nonce = [0u8; AEAD_NONCE_LENGTH];
        let sealed = cipher(1).seal(&nonce, b"secret").unwrap();

        assert_eq!(
            cipher(2).open(&nonce, &sealed),
            Err(CryptoError::DecryptionFailed)
        );
    }

    #[test]
    fn test_wrong_nonce_fails() {
        let cipher = cipher(3);
        let sealed = cipher.seal(&[0u8; AEAD_NONCE_LENGTH], b"secret").unwrap();

        let mut other = [0u8; AEAD_NONCE_LENGTH];
        other[0] = 1;
        assert_eq!(cipher.open(&other, &sealed), Err(CryptoError::DecryptionFailed));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let cipher = cipher(4);
        let nonce = [9u8; AEAD_NONCE_LENGTH];
        let mut sealed = cipher.seal(&nonce, b"secret").unwrap();
        sealed[0] ^= 0xFF;

        assert!(cipher.open(&nonce, &sealed).is_err());
    }

    #[test]
    fn test_key_derivation_is_sha256() {
        let key = SecretKey::derive_from_shared_secret(b"abc");
        assert_eq!(
            hex::encode(key.as_bytes()),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
