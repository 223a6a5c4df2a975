//! Authenticated X25519 key exchange.
//!
//! Each side sends one frame, `signature ‖ public_value`, where the
//! signature is made with its long-term key over its ephemeral X25519 public
//! value. The dialer sends first; the acceptor replies only after verifying
//! the dialer's frame. Both derive `SHA-256(shared_secret)` as the AES-256-GCM
//! session key.

use std::sync::Arc;
use std::time::Duration;

use skad_crypto::{DhKeyPair, SecretKey, SessionCipher};
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

use super::errors::HandshakeError;
use super::state::{KeyExchangeState, SessionState};
use crate::ports::{Signer, Transport, TransportMetadata};

/// One connection to a remote peer: handshake state plus the encrypted
/// channel built on top of it.
pub struct PeerSession {
    pub(super) transport: Box<dyn Transport>,
    signer: Arc<dyn Signer>,
    remote_endpoint: Vec<u8>,
    passive: bool,
    pub(super) state: Mutex<SessionState>,
    /// Serializes `recv` so frame order and counter order agree.
    pub(super) recv_lock: Mutex<()>,
    /// `None` until the exchange reaches a terminal state; set exactly once.
    completion: watch::Sender<Option<KeyExchangeState>>,
}

/// Handshake frame for `public_value`: `signature ‖ public_value`.
pub fn signed_public_value(signer: &dyn Signer, public_value: &[u8]) -> Vec<u8> {
    let mut frame = signer.sign(public_value);
    frame.extend_from_slice(public_value);
    frame
}

impl PeerSession {
    /// Start a session over `transport`.
    ///
    /// The active side sends its signed public value immediately and waits
    /// for the reply; the passive side sends nothing until it has verified
    /// the dialer's frame.
    pub async fn establish(
        transport: Box<dyn Transport>,
        dh_keypair: DhKeyPair,
        signer: Arc<dyn Signer>,
        passive: bool,
    ) -> Result<Arc<Self>, HandshakeError> {
        let remote_endpoint = transport.remote_endpoint();
        let initial = if passive {
            KeyExchangeState::PassivelyWaitForPublicKey
        } else {
            KeyExchangeState::ActivelyWaitForPublicKey
        };

        if !passive {
            let frame = signed_public_value(signer.as_ref(), &dh_keypair.public_bytes());
            if let Err(err) = transport.send(&frame).await {
                transport.close().await;
                return Err(HandshakeError::Transport(err));
            }
        }

        let (completion, _) = watch::channel(None);
        debug!(
            remote = %hex::encode(&remote_endpoint),
            passive,
            "key exchange started"
        );

        Ok(Arc::new(Self {
            transport,
            signer,
            remote_endpoint,
            passive,
            state: Mutex::new(SessionState::new(initial, dh_keypair)),
            recv_lock: Mutex::new(()),
            completion,
        }))
    }

    /// Feed the remote's handshake frame into the exchange.
    ///
    /// Only valid while waiting for the remote's public value. From `Failed`
    /// this returns `AlreadyFailed`.
    ///
    /// # Panics
    ///
    /// When called in `Invalid` or `Done`; the caller has lost track of the
    /// session.
    pub async fn continue_key_exchange(&self, raw: &[u8]) -> Result<(), HandshakeError> {
        let mut state = self.state.lock().await;
        match state.kx_state {
            KeyExchangeState::PassivelyWaitForPublicKey
            | KeyExchangeState::ActivelyWaitForPublicKey => {}
            KeyExchangeState::Failed => return Err(HandshakeError::AlreadyFailed),
            other => unreachable!("continue_key_exchange called in state {other:?}"),
        }

        match self.run_key_exchange(&mut state, raw).await {
            Ok(()) => {
                debug!(remote = %hex::encode(&self.remote_endpoint), "key exchange done");
                self.finish(&mut state, KeyExchangeState::Done);
                Ok(())
            }
            Err(err) => {
                warn!(
                    remote = %hex::encode(&self.remote_endpoint),
                    error = %err,
                    "key exchange failed"
                );
                state.dh_keypair = None;
                self.finish(&mut state, KeyExchangeState::Failed);
                Err(err)
            }
        }
    }

    async fn run_key_exchange(
        &self,
        state: &mut SessionState,
        raw: &[u8],
    ) -> Result<(), HandshakeError> {
        let signature_size = self.signer.signature_size();
        if raw.len() < signature_size {
            return Err(HandshakeError::IncompleteMessage {
                expected: signature_size,
                actual: raw.len(),
            });
        }

        let (signature, public_value) = raw.split_at(signature_size);
        if !self
            .signer
            .verify(&self.remote_endpoint, public_value, signature)
        {
            return Err(HandshakeError::SignatureVerificationFailed);
        }

        let keypair = state
            .dh_keypair
            .take()
            .ok_or(HandshakeError::KeyComputationFailed)?;
        let local_public = keypair.public_bytes();
        let shared = keypair
            .diffie_hellman(public_value)
            .map_err(|_| HandshakeError::KeyComputationFailed)?;

        if self.passive {
            let frame = signed_public_value(self.signer.as_ref(), &local_public);
            self.transport.send(&frame).await?;
        }

        let key = SecretKey::derive_from_shared_secret(&shared[..]);
        drop(shared);
        let cipher = SessionCipher::new(&key).map_err(|_| HandshakeError::CipherSetupFailed)?;
        state.cipher = Some(cipher);
        Ok(())
    }

    /// Read the remote's handshake frame and complete the exchange.
    ///
    /// The session is marked `Failed` if nothing arrives within `timeout`.
    pub async fn complete_handshake(&self, timeout: Duration) -> Result<(), HandshakeError> {
        let frame = match tokio::time::timeout(timeout, self.transport.receive()).await {
            Ok(Ok(frame)) => frame,
            Ok(Err(err)) => {
                self.fail_pending().await;
                return Err(HandshakeError::Transport(err));
            }
            Err(_) => {
                warn!(
                    remote = %hex::encode(&self.remote_endpoint),
                    timeout_ms = timeout.as_millis() as u64,
                    "handshake timed out"
                );
                self.fail_pending().await;
                return Err(HandshakeError::Timeout);
            }
        };
        self.continue_key_exchange(&frame).await
    }

    /// Wait until the exchange reaches `Done` or `Failed`.
    pub async fn wait_for_completion(&self) -> KeyExchangeState {
        let mut rx = self.completion.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let result = rx.wait_for(Option::is_some).await;
        match result.ok().and_then(|state| *state) {
            Some(state) => state,
            None => KeyExchangeState::Failed,
        }
    }

    /// Current key exchange state.
    pub async fn state(&self) -> KeyExchangeState {
        self.state.lock().await.kx_state
    }

    /// Close the session and its transport. Idempotent.
    ///
    /// A handshake still in progress becomes `Failed`.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        if state.closed {
            return;
        }
        state.closed = true;
        self.transport.close().await;
        if !state.kx_state.is_terminal() {
            state.dh_keypair = None;
            self.finish(&mut state, KeyExchangeState::Failed);
        }
        debug!(remote = %hex::encode(&self.remote_endpoint), "session closed");
    }

    /// Public key the remote authenticated with.
    pub fn remote_public_key(&self) -> &[u8] {
        &self.remote_endpoint
    }

    /// `true` on the accepting side.
    pub fn is_passive(&self) -> bool {
        self.passive
    }

    /// Addresses of the underlying connection.
    pub fn metadata(&self) -> TransportMetadata {
        self.transport.metadata()
    }

    async fn fail_pending(&self) {
        let mut state = self.state.lock().await;
        if state.kx_state.is_waiting() {
            state.dh_keypair = None;
            self.finish(&mut state, KeyExchangeState::Failed);
        }
    }

    /// Enter a terminal state and fire the completion signal.
    fn finish(&self, state: &mut SessionState, terminal: KeyExchangeState) {
        state.kx_state = terminal;
        self.completion.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(terminal);
            true
        });
    }
}

impl std::fmt::Debug for PeerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerSession")
            .field("remote", &hex::encode(&self.remote_endpoint))
            .field("passive", &self.passive)
            .finish_non_exhaustive()
    }
}
