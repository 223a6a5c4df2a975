//! # Integration Flows
//!
//! - `flows` - nodes wired over an in-memory network
//! - `tcp` - the same handshake over loopback sockets

pub mod flows;
pub mod tcp;
