//! Session errors.

use thiserror::Error;

use crate::ports::TransportError;

/// Failures of the authenticated key exchange.
///
/// Every variant except `AlreadyFailed` is returned exactly once per
/// session: the session enters `Failed` at the same time.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HandshakeError {
    /// Frame shorter than a signature
    #[error("handshake frame too short: {actual} bytes, signature alone is {expected}")]
    IncompleteMessage {
        /// Signature size of the signer
        expected: usize,
        /// Bytes received
        actual: usize,
    },
    /// Remote's signature over its public value did not verify
    #[error("handshake signature verification failed")]
    SignatureVerificationFailed,
    /// Malformed or low-order remote public value
    #[error("failed to compute shared key")]
    KeyComputationFailed,
    /// AEAD context could not be built from the derived key
    #[error("failed to set up session cipher")]
    CipherSetupFailed,
    /// A previous step of this handshake already failed
    #[error("key exchange failed previously")]
    AlreadyFailed,
    /// The remote's handshake frame did not arrive in time
    #[error("handshake timed out")]
    Timeout,
    /// Sending or receiving a handshake frame failed
    #[error("handshake transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Failures of the encrypted channel.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChannelError {
    /// The handshake has not completed successfully
    #[error("session not established")]
    NotEstablished,
    /// Authentication tag mismatch; the session stays usable
    #[error("failed to decrypt message")]
    DecryptionFailed,
    /// Sealing failed
    #[error("failed to encrypt message")]
    EncryptionFailed,
    /// This direction has used every nonce
    #[error("nonce counter exhausted")]
    NonceExhausted,
    /// The session was closed
    #[error("session closed")]
    Closed,
    /// Transport failure
    #[error("channel transport error: {0}")]
    Transport(#[from] TransportError),
}
