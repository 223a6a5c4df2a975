//! # Peer Sessions
//!
//! A [`PeerSession`] upgrades a raw [`Transport`](crate::ports::Transport)
//! into an encrypted channel:
//!
//! 1. **Handshake**: signed ephemeral X25519 exchange, authenticated with the
//!    long-term keys of both sides.
//! 2. **Channel**: AES-256-GCM with per-direction counter nonces.
//!
//! ## Concurrency
//!
//! One async mutex guards the key exchange state, both nonce counters and
//! the cipher. Seal-and-send happens under it, so ciphertexts leave in
//! counter order.

mod channel;
mod errors;
mod handshake;
mod nonce;
mod state;

pub use errors::{ChannelError, HandshakeError};
pub use handshake::{signed_public_value, PeerSession};
pub use nonce::{encode_nonce, NonceCounter};
pub use state::KeyExchangeState;
