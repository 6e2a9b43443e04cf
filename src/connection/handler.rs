//! Connection Handler Module
//!
//! This module handles individual client connections to FrameKV.
//! Each client gets its own handler task that runs in a loop,
//! reading messages and sending responses.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! 1. Client connects (TCP handshake)
//!        │
//!        ▼
//! 2. ConnectionHandler spawned
//!        │
//!        ▼
//! 3. ┌──────────────────────────────┐
//!    │      Main Loop               │
//!    │                              │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Read one message        │ │  Reading
//!    │  └───────────┬─────────────┘ │
//!    │              ▼               │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Decode + execute        │ │  Dispatching
//!    │  └───────────┬─────────────┘ │
//!    │              ▼               │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Send response           │ │  Writing
//!    │  └───────────┬─────────────┘ │
//!    │              ▼               │
//!    │         [Loop back]          │
//!    └──────────────────────────────┘
//!        │
//!        ▼
//! 4. End of stream / transport error / malformed frame
//!        │
//!        ▼
//! 5. Handler task ends (Closed)
//! ```
//!
//! ## Buffer Management
//!
//! Each connection owns a fixed-size buffer and treats every read as exactly
//! one message. Frames are not reassembled across reads, so a message larger
//! than the buffer, or one the network splits, is rejected as malformed.
//!
//! ## Failure Handling
//!
//! - Unknown verbs, short commands and missing keys produce a failure payload
//!   and the loop continues.
//! - A malformed frame gets a `FAILED` reply and then the connection closes,
//!   since the protocol has no marker to resynchronise on.
//! - Read and write errors close the connection.

use crate::commands::CommandHandler;
use crate::protocol::{self, response, ProtocolError};
use bytes::Bytes;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tracing::{debug, error, info, trace, warn};

/// Statistics for connection handling
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Currently active connections (outstanding handlers)
    pub active_connections: AtomicU64,
    /// Total messages decoded and executed
    pub messages_processed: AtomicU64,
    /// Messages rejected as malformed frames
    pub protocol_errors: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn message_processed(&self) {
        self.messages_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn protocol_error(&self) {
        self.protocol_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Number of handlers that have not finished yet.
    pub fn active(&self) -> u64 {
        self.active_connections.load(Ordering::Relaxed)
    }
}

/// Handles a single client connection.
///
/// This struct owns the stream and read buffer for one connected client.
pub struct ConnectionHandler {
    /// The TCP stream for this connection
    stream: BufWriter<TcpStream>,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Fixed-size buffer; one read fills at most this much
    buffer: Vec<u8>,

    /// The command handler (shares the storage engine with other connections)
    command_handler: CommandHandler,

    /// Connection statistics (shared)
    stats: Arc<ConnectionStats>,
}

impl ConnectionHandler {
    /// Creates a new connection handler.
    ///
    /// # Arguments
    ///
    /// * `stream` - The TCP stream for this connection
    /// * `addr` - The client's socket address
    /// * `command_handler` - The command handler for executing commands
    /// * `buffer_size` - Size of the per-connection read buffer
    /// * `stats` - Shared connection statistics
    pub fn new(
        stream: TcpStream,
        addr: SocketAddr,
        command_handler: CommandHandler,
        buffer_size: usize,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream: BufWriter::new(stream),
            addr,
            buffer: vec![0u8; buffer_size],
            command_handler,
            stats,
        }
    }

    /// Runs the main connection loop.
    ///
    /// Returns `Ok(())` when the client closes its end, or the error that
    /// closed the connection.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "Client connected");

        let result = self.main_loop().await;

        match &result {
            Ok(()) => info!(client = %self.addr, "Client disconnected"),
            Err(ConnectionError::Io(io_err))
                if io_err.kind() == std::io::ErrorKind::ConnectionReset =>
            {
                debug!(client = %self.addr, "Connection reset by client")
            }
            Err(e @ ConnectionError::Io(_)) => {
                error!(client = %self.addr, error = %e, "Connection error")
            }
            Err(e) => warn!(client = %self.addr, error = %e, "Closing connection"),
        }

        result
    }

    /// The main read-execute-respond loop.
    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        loop {
            let n = self.stream.get_mut().read(&mut self.buffer).await?;
            if n == 0 {
                return Ok(());
            }

            self.stats.bytes_read(n);
            trace!(client = %self.addr, bytes = n, "Read data");

            let tokens = match protocol::decode(&self.buffer[..n]) {
                Ok(tokens) => tokens,
                Err(e) => {
                    self.stats.protocol_error();
                    // Best effort: the connection is closing either way
                    let _ = self
                        .send_response(&Bytes::from_static(response::FAILED))
                        .await;
                    return Err(ConnectionError::Protocol(e));
                }
            };

            debug!(
                client = %self.addr,
                count = tokens.len(),
                tokens = ?tokens,
                "Received message"
            );

            let response = self.command_handler.execute(&tokens);
            self.stats.message_processed();

            self.send_response(&response).await?;
        }
    }

    /// Sends a response to the client.
    async fn send_response(&mut self, response: &Bytes) -> Result<(), ConnectionError> {
        self.stream.write_all(response).await?;
        self.stream.flush().await?;
        self.stats.bytes_written(response.len());
        trace!(
            client = %self.addr,
            bytes = response.len(),
            "Sent response"
        );
        Ok(())
    }
}

impl Drop for ConnectionHandler {
    // Runs on every exit from `run`, unwinding included
    fn drop(&mut self) {
        self.stats.connection_closed();
    }
}

/// Errors that close a connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// Read or write failure on the socket
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed frame
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Handles a client connection.
///
/// This is a convenience function that creates a ConnectionHandler
/// and runs it to completion. Errors are already logged by the handler.
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    command_handler: CommandHandler,
    buffer_size: usize,
    stats: Arc<ConnectionStats>,
) {
    let handler = ConnectionHandler::new(stream, addr, command_handler, buffer_size, stats);
    let _ = handler.run().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::encode;
    use crate::storage::StorageEngine;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn create_test_server() -> (SocketAddr, Arc<StorageEngine>, Arc<ConnectionStats>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let storage = Arc::new(StorageEngine::new());
        let stats = Arc::new(ConnectionStats::new());

        let storage_clone = Arc::clone(&storage);
        let stats_clone = Arc::clone(&stats);

        tokio::spawn(async move {
            while let Ok((stream, client_addr)) = listener.accept().await {
                let handler = CommandHandler::new(Arc::clone(&storage_clone));
                let stats = Arc::clone(&stats_clone);
                tokio::spawn(handle_connection(stream, client_addr, handler, 4096, stats));
            }
        });

        (addr, storage, stats)
    }

    async fn roundtrip(client: &mut TcpStream, tokens: &[&str]) -> Vec<u8> {
        client.write_all(&encode(tokens)).await.unwrap();
        let mut buf = [0u8; 256];
        let n = client.read(&mut buf).await.unwrap();
        buf[..n].to_vec()
    }

    #[tokio::test]
    async fn test_set_get_del() {
        let (addr, storage, _) = create_test_server().await;

        let mut client = TcpStream::connect(addr).await.unwrap();

        assert_eq!(roundtrip(&mut client, &["SET", "a", "1"]).await, b"SUCCESS");
        assert_eq!(roundtrip(&mut client, &["GET", "a"]).await, b"1");
        assert_eq!(storage.len(), 1);

        assert_eq!(roundtrip(&mut client, &["DEL", "a"]).await, b"SUCCESS");
        let response = roundtrip(&mut client, &["GET", "a"]).await;
        assert!(response.starts_with(b"FAILED"));
    }

    #[tokio::test]
    async fn test_bad_command_keeps_connection_open() {
        let (addr, _, _) = create_test_server().await;

        let mut client = TcpStream::connect(addr).await.unwrap();

        assert_eq!(roundtrip(&mut client, &["PING"]).await, b"FAILED");
        assert_eq!(roundtrip(&mut client, &["SET", "only-key"]).await, b"FAILED");
        assert_eq!(roundtrip(&mut client, &[]).await, b"FAILED");

        // Still serving
        assert_eq!(roundtrip(&mut client, &["SET", "k", "v"]).await, b"SUCCESS");
    }

    #[tokio::test]
    async fn test_malformed_frame_closes_connection() {
        let (addr, _, stats) = create_test_server().await;

        let mut client = TcpStream::connect(addr).await.unwrap();

        // Declares one 16-byte token but carries 3 bytes
        client
            .write_all(b"\x01\x00\x00\x00\x10\x00\x00\x00abc")
            .await
            .unwrap();

        let mut buf = [0u8; 64];
        let n = client.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"FAILED");

        // Server hangs up afterwards
        let n = client.read(&mut buf).await.unwrap();
        assert_eq!(n, 0);

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        assert_eq!(stats.protocol_errors.load(Ordering::Relaxed), 1);
        assert_eq!(stats.active(), 0);
    }

    #[tokio::test]
    async fn test_clients_share_store() {
        let (addr, _, _) = create_test_server().await;

        let mut writer = TcpStream::connect(addr).await.unwrap();
        let mut reader = TcpStream::connect(addr).await.unwrap();

        assert_eq!(
            roundtrip(&mut writer, &["SET", "shared", "value"]).await,
            b"SUCCESS"
        );
        assert_eq!(roundtrip(&mut reader, &["GET", "shared"]).await, b"value");
    }

    #[tokio::test]
    async fn test_connection_stats() {
        let (addr, _, stats) = create_test_server().await;

        assert_eq!(stats.active_connections.load(Ordering::Relaxed), 0);

        let mut client = TcpStream::connect(addr).await.unwrap();

        // Give the server time to accept the connection
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        assert_eq!(stats.connections_accepted.load(Ordering::Relaxed), 1);
        assert_eq!(stats.active_connections.load(Ordering::Relaxed), 1);

        let _ = roundtrip(&mut client, &["SET", "a", "1"]).await;

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        assert_eq!(stats.messages_processed.load(Ordering::Relaxed), 1);
        assert!(stats.bytes_read.load(Ordering::Relaxed) > 0);
        assert_eq!(stats.bytes_written.load(Ordering::Relaxed), 7);

        // Close connection
        drop(client);

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        assert_eq!(stats.active_connections.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_active_count_released_on_panic() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let stats = Arc::new(ConnectionStats::new());

        let _client = TcpStream::connect(addr).await.unwrap();
        let (stream, peer) = listener.accept().await.unwrap();

        let handler = ConnectionHandler::new(
            stream,
            peer,
            CommandHandler::new(Arc::new(StorageEngine::new())),
            4096,
            Arc::clone(&stats),
        );
        assert_eq!(stats.active(), 1);

        let task = tokio::spawn(async move {
            let _handler = handler;
            panic!("handler blew up");
        });

        assert!(task.await.unwrap_err().is_panic());
        assert_eq!(stats.active(), 0);
        assert_eq!(stats.connections_accepted.load(Ordering::Relaxed), 1);
    }
}
