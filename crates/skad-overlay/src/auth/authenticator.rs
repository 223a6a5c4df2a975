//! Weak and strong message signatures.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::envelope::{strong_payload, weak_payload, SignedMessage};
use super::errors::SignatureError;
use crate::domain::PeerId;
use crate::ports::{Signer, TimeSource};

/// Signs and verifies messages on behalf of the local peer.
///
/// - **Weak**: binds only the sender identity and an expiration time. Cheap
///   to keep around and re-attach to many messages until it expires.
/// - **Strong**: binds the sender, expiration and body of one message.
pub struct MessageAuthenticator {
    self_peer: PeerId,
    signer: Arc<dyn Signer>,
    time_source: Arc<dyn TimeSource>,
}

impl MessageAuthenticator {
    /// Authenticator for `self_peer`, whose key `signer` holds.
    pub fn new(self_peer: PeerId, signer: Arc<dyn Signer>, time_source: Arc<dyn TimeSource>) -> Self {
        Self {
            self_peer,
            signer,
            time_source,
        }
    }

    /// Our identity as attached to outgoing messages.
    pub fn self_peer(&self) -> &PeerId {
        &self.self_peer
    }

    /// Weak signature over our identity, valid until `expiration` (unix nanos).
    pub fn weak_signature(&self, expiration: i64) -> Vec<u8> {
        self.signer.sign(&weak_payload(&self.self_peer, expiration))
    }

    /// Unsigned-body message from us carrying a fresh weak signature valid
    /// for `ttl`.
    pub fn weak_message(&self, body: impl Into<Vec<u8>>, ttl: Duration) -> SignedMessage {
        let ttl = i64::try_from(ttl.as_nanos()).unwrap_or(i64::MAX);
        let expiration = self.time_source.now_nanos().saturating_add(ttl);
        SignedMessage {
            sender: Some(self.self_peer.clone()),
            signature: self.weak_signature(expiration),
            expiration,
            body: body.into(),
        }
    }

    /// Check a weak signature.
    ///
    /// Checks run in order: signature present, sender present, not expired,
    /// cryptographically valid.
    pub fn verify_weak_signature(&self, msg: &SignedMessage) -> Result<(), SignatureError> {
        if msg.signature.is_empty() {
            return Err(SignatureError::NoSender);
        }
        let sender = msg.sender.as_ref().ok_or(SignatureError::NoSender)?;

        if self.time_source.now_nanos() > msg.expiration {
            debug!(sender = %sender.public_key_hex(), expiration = msg.expiration, "weak signature expired");
            return Err(SignatureError::Expired);
        }

        let payload = weak_payload(sender, msg.expiration);
        if !self.signer.verify(sender.public_key(), &payload, &msg.signature) {
            return Err(SignatureError::Invalid);
        }
        Ok(())
    }

    /// Strong signature over `msg`.
    ///
    /// Refuses a message that already carries a signature, so a weak
    /// signature is never silently replaced.
    pub fn strong_signature(&self, msg: &SignedMessage) -> Result<Vec<u8>, SignatureError> {
        if !msg.signature.is_empty() {
            return Err(SignatureError::AlreadySigned);
        }
        let sender = msg.sender.as_ref().ok_or(SignatureError::NoSender)?;
        Ok(self
            .signer
            .sign(&strong_payload(sender, msg.expiration, &msg.body)))
    }

    /// Check a strong signature. Expiration is not enforced.
    pub fn verify_strong_signature(&self, msg: &SignedMessage) -> Result<(), SignatureError> {
        if msg.signature.is_empty() {
            return Err(SignatureError::NoSender);
        }
        let sender = msg.sender.as_ref().ok_or(SignatureError::NoSender)?;

        let payload = strong_payload(sender, msg.expiration, &msg.body);
        if !self.signer.verify(sender.public_key(), &payload, &msg.signature) {
            return Err(SignatureError::Invalid);
        }
        Ok(())
    }
}

impl std::fmt::Debug for MessageAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageAuthenticator")
            .field("self_peer", &self.self_peer)
            .finish_non_exhaustive()
    }
}
