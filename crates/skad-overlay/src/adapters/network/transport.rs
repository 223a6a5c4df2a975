use crate::ports::TransportError;

// ============================================================================
// Probe messages
// ============================================================================

/// Liveness probe message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    /// PING request to check if peer is alive.
    Ping = 0x01,
    /// PONG response to a PING.
    Pong = 0x02,
}

impl MessageType {
    /// Encode as a broadcast body: the type byte alone.
    pub fn encode(self) -> Vec<u8> {
        vec![self as u8]
    }

    /// Decode a probe body.
    pub fn decode(body: &[u8]) -> Option<Self> {
        match body {
            [0x01] => Some(Self::Ping),
            [0x02] => Some(Self::Pong),
            _ => None,
        }
    }
}

// ============================================================================
// Framing
// ============================================================================

/// Largest frame a stream transport accepts (16 MiB).
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Connection preamble: who we are, where we can be reached and the
/// proof-of-work nonce of our identity.
///
/// Wire format: `len (u32 BE) ‖ public_key ‖ len (u32 BE) ‖ address ‖
/// len (u32 BE) ‖ nonce`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hello {
    /// Long-term public key of the sender
    pub public_key: Vec<u8>,
    /// Address the sender listens on
    pub address: String,
    /// Nonce solving the sender's dynamic puzzle (may be empty)
    pub nonce: Vec<u8>,
}

impl Hello {
    /// Hello without a nonce.
    pub fn new(public_key: Vec<u8>, address: String) -> Self {
        Self {
            public_key,
            address,
            nonce: Vec::new(),
        }
    }

    /// Serialize.
    pub fn encode(&self) -> Vec<u8> {
        let mut out =
            Vec::with_capacity(12 + self.public_key.len() + self.address.len() + self.nonce.len());
        for field in [&self.public_key[..], self.address.as_bytes(), &self.nonce[..]] {
            out.extend_from_slice(&(field.len() as u32).to_be_bytes());
            out.extend_from_slice(field);
        }
        out
    }

    /// Parse.
    pub fn decode(data: &[u8]) -> Result<Self, TransportError> {
        let malformed = || TransportError::Io("malformed hello frame".to_string());

        let (public_key, rest) = split_prefixed(data).ok_or_else(malformed)?;
        let (address, rest) = split_prefixed(rest).ok_or_else(malformed)?;
        let (nonce, rest) = split_prefixed(rest).ok_or_else(malformed)?;
        if !rest.is_empty() {
            return Err(malformed());
        }
        let address = String::from_utf8(address.to_vec()).map_err(|_| malformed())?;

        Ok(Self {
            public_key: public_key.to_vec(),
            address,
            nonce: nonce.to_vec(),
        })
    }
}

fn split_prefixed(data: &[u8]) -> Option<(&[u8], &[u8])> {
    let len_bytes: [u8; 4] = data.get(..4)?.try_into().ok()?;
    let len = u32::from_be_bytes(len_bytes) as usize;
    let rest = &data[4..];
    if rest.len() < len {
        return None;
    }
    Some(rest.split_at(len))
}

// ============================================================================
// TCP transport (requires "network" feature)
// ============================================================================

#[cfg(feature = "network")]
mod tcp {
    use super::*;
    use crate::ports::{Dialer, Listener, Transport, TransportMetadata};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::{mpsc, Mutex};
    use tokio::task::JoinHandle;
    use tracing::{debug, warn};

    /// Length-prefixed frames over TCP.
    ///
    /// # Wire Protocol
    ///
    /// - Every frame is `len (u32 BE) ‖ payload`, payload at most
    ///   [`MAX_FRAME_SIZE`].
    /// - The first frame in each direction is a [`Hello`].
    pub struct TcpTransport {
        reader: Mutex<OwnedReadHalf>,
        writer: Mutex<OwnedWriteHalf>,
        remote_endpoint: Vec<u8>,
        metadata: TransportMetadata,
    }

    impl TcpTransport {
        /// Exchange hellos over a freshly connected stream.
        pub async fn handshake(stream: TcpStream, local: &Hello) -> Result<Self, TransportError> {
            let local_addr = stream.local_addr()?.to_string();
            let (read_half, write_half) = stream.into_split();
            let reader = Mutex::new(read_half);
            let writer = Mutex::new(write_half);

            write_frame(&mut *writer.lock().await, &local.encode()).await?;
            let remote = Hello::decode(&read_frame(&mut *reader.lock().await).await?)?;

            Ok(Self {
                reader,
                writer,
                remote_endpoint: remote.public_key,
                metadata: TransportMetadata {
                    local_addr,
                    remote_addr: remote.address,
                    remote_nonce: remote.nonce,
                },
            })
        }
    }

    #[async_trait]
    impl Transport for TcpTransport {
        async fn send(&self, frame: &[u8]) -> Result<(), TransportError> {
            let mut writer = self.writer.lock().await;
            write_frame(&mut *writer, frame).await
        }

        async fn receive(&self) -> Result<Vec<u8>, TransportError> {
            let mut reader = self.reader.lock().await;
            read_frame(&mut *reader).await
        }

        fn remote_endpoint(&self) -> Vec<u8> {
            self.remote_endpoint.clone()
        }

        async fn close(&self) {
            let mut writer = self.writer.lock().await;
            if let Err(err) = writer.shutdown().await {
                debug!(error = %err, "tcp shutdown failed");
            }
        }

        fn metadata(&self) -> TransportMetadata {
            self.metadata.clone()
        }
    }

    async fn write_frame(writer: &mut OwnedWriteHalf, payload: &[u8]) -> Result<(), TransportError> {
        if payload.len() > MAX_FRAME_SIZE {
            return Err(TransportError::FrameTooLarge {
                size: payload.len(),
                limit: MAX_FRAME_SIZE,
            });
        }
        writer.write_all(&(payload.len() as u32).to_be_bytes()).await?;
        writer.write_all(payload).await?;
        writer.flush().await?;
        Ok(())
    }

    async fn read_frame(reader: &mut OwnedReadHalf) -> Result<Vec<u8>, TransportError> {
        let len = reader.read_u32().await? as usize;
        if len > MAX_FRAME_SIZE {
            return Err(TransportError::FrameTooLarge {
                size: len,
                limit: MAX_FRAME_SIZE,
            });
        }
        let mut payload = vec![0u8; len];
        reader.read_exact(&mut payload).await?;
        Ok(payload)
    }

    /// Dials [`TcpTransport`]s.
    #[derive(Debug, Clone)]
    pub struct TcpDialer {
        local: Hello,
    }

    impl TcpDialer {
        /// Dialer announcing `public_key`, reachable at `listen_address`.
        pub fn new(public_key: Vec<u8>, listen_address: String) -> Self {
            Self {
                local: Hello::new(public_key, listen_address),
            }
        }

        /// Announce `nonce` as the solution of our dynamic puzzle.
        pub fn with_nonce(mut self, nonce: Vec<u8>) -> Self {
            self.local.nonce = nonce;
            self
        }
    }

    #[async_trait]
    impl Dialer for TcpDialer {
        async fn dial(&self, address: &str) -> Result<Box<dyn Transport>, TransportError> {
            let stream = TcpStream::connect(address)
                .await
                .map_err(|e| TransportError::ConnectionRefused(format!("{address}: {e}")))?;
            let transport = TcpTransport::handshake(stream, &self.local).await?;
            Ok(Box::new(transport))
        }
    }

    /// Time an inbound connection gets to complete its hello.
    pub const DEFAULT_HELLO_TIMEOUT: Duration = Duration::from_secs(10);

    /// Transports that finished their hello but are not yet accepted.
    const ACCEPT_QUEUE: usize = 64;

    /// Pause after a failed `accept(2)`, e.g. on descriptor exhaustion.
    const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

    /// Accepts [`TcpTransport`]s.
    ///
    /// A background task accepts sockets and runs each hello exchange in
    /// its own task under a timeout, so a connection that never sends its
    /// hello cannot hold up other inbound peers. The task stops when the
    /// adapter is dropped.
    pub struct TcpListenerAdapter {
        local_address: String,
        incoming: Mutex<mpsc::Receiver<TcpTransport>>,
        acceptor: JoinHandle<()>,
    }

    impl TcpListenerAdapter {
        /// Bind `address`, announcing `public_key` to every inbound peer.
        ///
        /// The advertised address is the bound socket address.
        pub async fn bind(public_key: Vec<u8>, address: &str) -> Result<Self, TransportError> {
            Self::bind_with(public_key, Vec::new(), address, DEFAULT_HELLO_TIMEOUT).await
        }

        /// Like [`bind`](Self::bind), also announcing `nonce` and bounding
        /// each inbound hello exchange by `hello_timeout`.
        pub async fn bind_with(
            public_key: Vec<u8>,
            nonce: Vec<u8>,
            address: &str,
            hello_timeout: Duration,
        ) -> Result<Self, TransportError> {
            let listener = TcpListener::bind(address).await?;
            let bound = listener.local_addr()?.to_string();
            let local = Arc::new(Hello {
                public_key,
                address: bound.clone(),
                nonce,
            });

            let (tx, rx) = mpsc::channel(ACCEPT_QUEUE);
            let acceptor = tokio::spawn(run_acceptor(listener, local, hello_timeout, tx));

            Ok(Self {
                local_address: bound,
                incoming: Mutex::new(rx),
                acceptor,
            })
        }

        /// Address actually bound (resolves port 0).
        pub fn local_address(&self) -> &str {
            &self.local_address
        }
    }

    impl Drop for TcpListenerAdapter {
        fn drop(&mut self) {
            self.acceptor.abort();
        }
    }

    #[async_trait]
    impl Listener for TcpListenerAdapter {
        async fn accept(&self) -> Result<Box<dyn Transport>, TransportError> {
            let mut incoming = self.incoming.lock().await;
            match incoming.recv().await {
                Some(transport) => Ok(Box::new(transport)),
                None => Err(TransportError::Closed),
            }
        }
    }

    async fn run_acceptor(
        listener: TcpListener,
        local: Arc<Hello>,
        hello_timeout: Duration,
        ready: mpsc::Sender<TcpTransport>,
    ) {
        loop {
            let accepted = tokio::select! {
                _ = ready.closed() => break,
                accepted = listener.accept() => accepted,
            };
            let (stream, peer) = match accepted {
                Ok(accepted) => accepted,
                Err(err) => {
                    warn!(error = %err, "tcp accept failed");
                    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    continue;
                }
            };
            debug!(peer = %peer, "tcp connection accepted");

            let local = local.clone();
            let ready = ready.clone();
            tokio::spawn(async move {
                let hello = TcpTransport::handshake(stream, &local);
                match tokio::time::timeout(hello_timeout, hello).await {
                    Ok(Ok(transport)) => {
                        if ready.send(transport).await.is_err() {
                            debug!(peer = %peer, "listener dropped before accept");
                        }
                    }
                    Ok(Err(err)) => debug!(peer = %peer, error = %err, "hello exchange failed"),
                    Err(_) => debug!(peer = %peer, "hello exchange timed out"),
                }
            });
        }
        debug!(address = %local.address, "tcp acceptor stopped");
    }
}

#[cfg(feature = "network")]
pub use tcp::{TcpDialer, TcpListenerAdapter, TcpTransport, DEFAULT_HELLO_TIMEOUT};
