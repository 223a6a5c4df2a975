//! In-process transports.
//!
//! [`MemoryNetwork`] connects dialers to listeners by address string inside
//! one process. Used for loopback handshakes and for wiring whole overlays
//! together in tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::ports::{Dialer, Listener, Transport, TransportError, TransportMetadata};

/// One end of an in-memory connection.
pub struct MemoryTransport {
    remote_endpoint: Vec<u8>,
    metadata: TransportMetadata,
    outbound: Mutex<Option<mpsc::UnboundedSender<Vec<u8>>>>,
    inbound: tokio::sync::Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
    closed: watch::Sender<bool>,
}

/// Identity and address of one side of a [`MemoryTransport::pair`].
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Public key the other side will see as `remote_endpoint()`
    pub public_key: Vec<u8>,
    /// Address the other side will see as `remote_addr`
    pub address: String,
    /// Identity nonce the other side will see as `remote_nonce`
    pub nonce: Vec<u8>,
}

impl Endpoint {
    /// Convenience constructor.
    pub fn new(public_key: impl Into<Vec<u8>>, address: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            address: address.into(),
            nonce: Vec::new(),
        }
    }

    /// Advertise `nonce` alongside the public key.
    pub fn with_nonce(mut self, nonce: impl Into<Vec<u8>>) -> Self {
        self.nonce = nonce.into();
        self
    }
}

impl MemoryTransport {
    /// Two connected ends: frames sent on one arrive on the other.
    pub fn pair(a: Endpoint, b: Endpoint) -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::unbounded_channel();
        let (b_tx, a_rx) = mpsc::unbounded_channel();

        let a_end = Self::new(&a, &b, a_tx, a_rx);
        let b_end = Self::new(&b, &a, b_tx, b_rx);
        (a_end, b_end)
    }

    fn new(
        local: &Endpoint,
        remote: &Endpoint,
        tx: mpsc::UnboundedSender<Vec<u8>>,
        rx: mpsc::UnboundedReceiver<Vec<u8>>,
    ) -> Self {
        Self {
            remote_endpoint: remote.public_key.clone(),
            metadata: TransportMetadata {
                local_addr: local.address.clone(),
                remote_addr: remote.address.clone(),
                remote_nonce: remote.nonce.clone(),
            },
            outbound: Mutex::new(Some(tx)),
            inbound: tokio::sync::Mutex::new(rx),
            closed: watch::channel(false).0,
        }
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, frame: &[u8]) -> Result<(), TransportError> {
        let outbound = self.outbound.lock();
        let tx = outbound.as_ref().ok_or(TransportError::Closed)?;
        tx.send(frame.to_vec()).map_err(|_| TransportError::Closed)
    }

    async fn receive(&self) -> Result<Vec<u8>, TransportError> {
        let mut closed = self.closed.subscribe();
        let already_closed = *closed.borrow();
        if already_closed {
            return Err(TransportError::Closed);
        }
        let mut inbound = self.inbound.lock().await;
        tokio::select! {
            _ = closed.wait_for(|closed| *closed) => Err(TransportError::Closed),
            frame = inbound.recv() => frame.ok_or(TransportError::Closed),
        }
    }

    fn remote_endpoint(&self) -> Vec<u8> {
        self.remote_endpoint.clone()
    }

    async fn close(&self) {
        // Wakes a pending receive so it releases the inbound lock.
        self.closed.send_replace(true);
        // Dropping the sender ends the remote's receive loop.
        self.outbound.lock().take();
        // Closing the receiver makes the remote's sends fail.
        self.inbound.lock().await.close();
    }

    fn metadata(&self) -> TransportMetadata {
        self.metadata.clone()
    }
}

struct Registration {
    public_key: Vec<u8>,
    address: String,
    incoming: mpsc::UnboundedSender<MemoryTransport>,
}

/// Address book of in-memory listeners.
#[derive(Clone, Default)]
pub struct MemoryNetwork {
    listeners: Arc<Mutex<HashMap<String, Arc<Registration>>>>,
}

impl MemoryNetwork {
    /// Empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `public_key` at `address`.
    ///
    /// A previous listener at the same address is replaced.
    pub fn listen(&self, public_key: impl Into<Vec<u8>>, address: impl Into<String>) -> MemoryListener {
        let (tx, rx) = mpsc::unbounded_channel();
        let address = address.into();
        let registration = Arc::new(Registration {
            public_key: public_key.into(),
            address: address.clone(),
            incoming: tx,
        });
        self.listeners.lock().insert(address, registration);
        MemoryListener {
            incoming: tokio::sync::Mutex::new(rx),
        }
    }

    /// Make `alias` reach the listener at `target`.
    ///
    /// The accepting side observes `alias` as its own address, the way a
    /// node behind NAT only learns its public address from inbound peers.
    pub fn alias(&self, alias: impl Into<String>, target: &str) -> Result<(), TransportError> {
        let mut listeners = self.listeners.lock();
        let registration = listeners
            .get(target)
            .cloned()
            .ok_or_else(|| TransportError::ConnectionRefused(target.to_string()))?;
        listeners.insert(alias.into(), registration);
        Ok(())
    }

    /// Dialer that connects as `public_key`, advertising `address`.
    pub fn dialer(&self, public_key: impl Into<Vec<u8>>, address: impl Into<String>) -> MemoryDialer {
        MemoryDialer {
            network: self.clone(),
            local: Endpoint::new(public_key, address),
        }
    }
}

/// Accepts connections registered on a [`MemoryNetwork`].
pub struct MemoryListener {
    incoming: tokio::sync::Mutex<mpsc::UnboundedReceiver<MemoryTransport>>,
}

#[async_trait]
impl Listener for MemoryListener {
    async fn accept(&self) -> Result<Box<dyn Transport>, TransportError> {
        let mut incoming = self.incoming.lock().await;
        match incoming.recv().await {
            Some(transport) => Ok(Box::new(transport)),
            None => Err(TransportError::Closed),
        }
    }
}

/// Dials listeners on a [`MemoryNetwork`].
pub struct MemoryDialer {
    network: MemoryNetwork,
    local: Endpoint,
}

impl MemoryDialer {
    /// Advertise `nonce` as the proof-of-work nonce of the dialling identity.
    pub fn with_nonce(mut self, nonce: impl Into<Vec<u8>>) -> Self {
        self.local = self.local.with_nonce(nonce);
        self
    }
}

#[async_trait]
impl Dialer for MemoryDialer {
    async fn dial(&self, address: &str) -> Result<Box<dyn Transport>, TransportError> {
        let registration = self
            .network
            .listeners
            .lock()
            .get(address)
            .cloned()
            .ok_or_else(|| TransportError::ConnectionRefused(address.to_string()))?;

        // The accepting side sees the address it was reached at.
        let listener_end = Endpoint::new(registration.public_key.clone(), address);
        let (ours, theirs) = MemoryTransport::pair(self.local.clone(), listener_end);
        registration
            .incoming
            .send(theirs)
            .map_err(|_| TransportError::ConnectionRefused(address.to_string()))?;

        debug!(
            address,
            listener = %registration.address,
            "memory connection established"
        );
        Ok(Box::new(ours))
    }
}
