//! # Message Authentication
//!
//! Signature schemes for overlay messages, independent of the session
//! encryption:
//!
//! | Scheme | Covers | Expires |
//! |--------|--------|---------|
//! | weak | sender, expiration | yes |
//! | strong | sender, expiration, body | no |

mod authenticator;
mod envelope;
mod errors;

pub use authenticator::MessageAuthenticator;
pub use envelope::{strong_payload, weak_payload, SignedMessage};
pub use errors::SignatureError;

#[cfg(test)]
mod tests;
