//! Message signature errors.

use thiserror::Error;

/// Why a message signature was rejected.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// Signature or sender missing
    #[error("message has no sender or no signature")]
    NoSender,
    /// Weak signature past its expiration
    #[error("signature expired")]
    Expired,
    /// Signature does not verify against the sender's key
    #[error("signature invalid")]
    Invalid,
    /// Refusing to strongly sign a message that already carries a signature
    #[error("message already signed")]
    AlreadySigned,
}
