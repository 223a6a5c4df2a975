//! # skad-crypto - Primitives for the S/Kademlia Overlay
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `signatures` | Ed25519 | Long-term peer identities |
//! | `dh` | X25519 | Ephemeral handshake key exchange |
//! | `symmetric` | AES-256-GCM | Per-session authenticated encryption |
//! | `hashing` | BLAKE3, SHA-256 | Node IDs, session key derivation |
//!
//! ## Security Properties
//!
//! - **Ed25519**: Deterministic nonces, no RNG dependency when signing
//! - **X25519**: Ephemeral secrets are consumed by the exchange and zeroized
//! - **AES-256-GCM**: Caller-supplied 96-bit nonces; the overlay derives them
//!   from per-direction counters and never reuses one

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dh;
pub mod errors;
pub mod hashing;
pub mod signatures;
pub mod symmetric;

// Re-exports
pub use dh::{DhKeyPair, DH_PUBLIC_KEY_LENGTH};
pub use errors::CryptoError;
pub use hashing::{blake3_hash, count_leading_zero_bits, sha256, Blake3Hasher};
pub use signatures::{
    verify_raw, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature, ED25519_PUBLIC_KEY_LENGTH,
    ED25519_SIGNATURE_LENGTH,
};
pub use symmetric::{SecretKey, SessionCipher, AEAD_NONCE_LENGTH, AEAD_TAG_LENGTH};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
