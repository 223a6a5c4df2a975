//! Key exchange states.

use skad_crypto::{DhKeyPair, SessionCipher};

use super::nonce::NonceCounter;

/// Progress of a session's key exchange.
///
/// ```text
/// Invalid ──► PassivelyWaitForPublicKey ──┬──► Done
///        └──► ActivelyWaitForPublicKey ───┴──► Failed
/// ```
///
/// `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyExchangeState {
    /// Not started
    Invalid,
    /// Accepted side, waiting for the dialer's public value
    PassivelyWaitForPublicKey,
    /// Dialing side, own value sent, waiting for the reply
    ActivelyWaitForPublicKey,
    /// Shared key derived; the channel is usable
    Done,
    /// The exchange failed or the session was closed before completing
    Failed,
}

impl KeyExchangeState {
    /// `Done` or `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// One of the two waiting states.
    pub fn is_waiting(self) -> bool {
        matches!(
            self,
            Self::PassivelyWaitForPublicKey | Self::ActivelyWaitForPublicKey
        )
    }
}

/// Everything guarded by the session lock.
pub(crate) struct SessionState {
    pub(crate) kx_state: KeyExchangeState,
    /// Present only while waiting; consumed by the exchange.
    pub(crate) dh_keypair: Option<DhKeyPair>,
    /// Present only in `Done`.
    pub(crate) cipher: Option<SessionCipher>,
    pub(crate) local_nonce: NonceCounter,
    pub(crate) remote_nonce: NonceCounter,
    pub(crate) closed: bool,
}

impl SessionState {
    pub(crate) fn new(kx_state: KeyExchangeState, dh_keypair: DhKeyPair) -> Self {
        Self {
            kx_state,
            dh_keypair: Some(dh_keypair),
            cipher: None,
            local_nonce: NonceCounter::new(),
            remote_nonce: NonceCounter::new(),
            closed: false,
        }
    }
}
