//! Encrypted message channel over an established session.

use tracing::trace;

use super::errors::ChannelError;
use super::handshake::PeerSession;
use super::state::{KeyExchangeState, SessionState};
use crate::ports::TransportError;

impl PeerSession {
    /// Seal `body` with the next local nonce and send it.
    ///
    /// The counter is advanced under the session lock, so concurrent senders
    /// never share a nonce.
    pub async fn send(&self, body: &[u8]) -> Result<(), ChannelError> {
        let mut state = self.state.lock().await;
        ensure_established(&state)?;

        let nonce = state.local_nonce.next_nonce()?;
        let cipher = state.cipher.as_ref().ok_or(ChannelError::NotEstablished)?;
        let ciphertext = cipher
            .seal(&nonce, body)
            .map_err(|_| ChannelError::EncryptionFailed)?;

        trace!(len = body.len(), "sealed message");
        self.transport.send(&ciphertext).await?;
        Ok(())
    }

    /// Open a frame received from the remote with the next remote nonce.
    ///
    /// A frame that fails authentication is rejected but the session stays
    /// usable. Its nonce is consumed either way.
    pub async fn open(&self, ciphertext: &[u8]) -> Result<Vec<u8>, ChannelError> {
        let mut state = self.state.lock().await;
        ensure_established(&state)?;

        let nonce = state.remote_nonce.next_nonce()?;
        let cipher = state.cipher.as_ref().ok_or(ChannelError::NotEstablished)?;
        cipher
            .open(&nonce, ciphertext)
            .map_err(|_| ChannelError::DecryptionFailed)
    }

    /// Receive the next frame from the transport and open it.
    pub async fn recv(&self) -> Result<Vec<u8>, ChannelError> {
        let _guard = self.recv_lock.lock().await;
        let frame = match self.transport.receive().await {
            Ok(frame) => frame,
            Err(TransportError::Closed) => return Err(ChannelError::Closed),
            Err(err) => return Err(ChannelError::Transport(err)),
        };
        self.open(&frame).await
    }

    /// Messages `(sent, opened)` so far.
    pub async fn nonce_counters(&self) -> (u64, u64) {
        let state = self.state.lock().await;
        (state.local_nonce.used(), state.remote_nonce.used())
    }
}

fn ensure_established(state: &SessionState) -> Result<(), ChannelError> {
    if state.closed {
        return Err(ChannelError::Closed);
    }
    if state.kx_state != KeyExchangeState::Done {
        return Err(ChannelError::NotEstablished);
    }
    Ok(())
}
