//! Peer address normalization.

use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};

use crate::domain::PeerId;

/// Canonical `ip:port` form of `address`.
///
/// `localhost` and an empty host map to `127.0.0.1`. Hostnames other than
/// `localhost` are not resolved and yield `None`, as do a missing, invalid
/// or zero port.
pub fn to_unified_address(address: &str) -> Option<String> {
    let (host, port) = address.rsplit_once(':')?;
    let port: u16 = port.parse().ok()?;
    if port == 0 {
        return None;
    }
    let host = match host {
        "" | "localhost" => "127.0.0.1",
        other => other,
    };
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    let ip: IpAddr = host.parse().ok()?;
    Some(SocketAddr::new(ip, port).to_string())
}

/// Peers worth contacting from `self_address`.
///
/// Drops peers with an empty or unparseable address, peers at our own
/// address and later duplicates of an address already seen. Kept peers
/// carry their address in unified form. Order is preserved.
pub fn filter_peers(self_address: &str, peers: &[PeerId]) -> Vec<PeerId> {
    let mut visited = HashSet::new();
    visited.insert(to_unified_address(self_address).unwrap_or_else(|| self_address.to_string()));

    peers
        .iter()
        .filter_map(|peer| {
            let unified = to_unified_address(peer.address())?;
            if !visited.insert(unified.clone()) {
                return None;
            }
            let mut peer = peer.clone();
            peer.set_address(unified);
            Some(peer)
        })
        .collect()
}
