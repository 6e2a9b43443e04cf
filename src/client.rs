//! Async Client
//!
//! A thin client for the frame protocol, used by the CLI binary and tests.
//!
//! Responses carry no length prefix, so the client reads each one with a
//! single read into its buffer. That is the same one-read-one-message
//! convention the server applies to requests.
//!
//! ## Empty responses
//!
//! A `GET` of a key holding an empty value makes the server write zero
//! bytes. On the wire that is no response at all, so every read is bounded
//! by a timeout and reports [`ClientError::Timeout`] when nothing arrives.
//! The caller cannot tell an empty value from a server that never answered.
//! A reply that arrives after the timeout is read as the response to the
//! next request, so drop the client after a timeout if that matters.

use crate::protocol::{encode, response};
use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};

/// Default size of the client's response buffer (64 KB).
const RESPONSE_BUFFER_SIZE: usize = 64 * 1024;

/// Default time to wait for a response.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors returned by the client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The server closed the connection instead of replying
    #[error("connection closed by server")]
    ConnectionClosed,

    /// No response bytes arrived in time (also what an empty value looks like)
    #[error("no response within {0:?}")]
    Timeout(Duration),
}

/// A connection to a FrameKV server.
///
/// # Example
///
/// ```no_run
/// use framekv::Client;
///
/// # async fn run() -> Result<(), framekv::ClientError> {
/// let mut client = Client::connect("127.0.0.1:6379").await?;
///
/// client.set("name", "Ariz").await?;
/// assert_eq!(client.get("name").await?.as_deref(), Some(&b"Ariz"[..]));
/// # Ok(())
/// # }
/// ```
pub struct Client {
    stream: TcpStream,
    buffer: Vec<u8>,
    read_timeout: Duration,
}

impl Client {
    /// Connects to a server.
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self {
            stream,
            buffer: vec![0u8; RESPONSE_BUFFER_SIZE],
            read_timeout: DEFAULT_READ_TIMEOUT,
        })
    }

    /// Sets how long [`send`](Self::send) waits for a response.
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Sends one message framing `tokens` and returns the raw response.
    ///
    /// Fails with [`ClientError::Timeout`] if nothing arrives within the
    /// read timeout.
    pub async fn send<T: AsRef<[u8]>>(&mut self, tokens: &[T]) -> Result<Bytes, ClientError> {
        self.stream.write_all(&encode(tokens)).await?;

        let limit = self.read_timeout;
        let n = tokio::time::timeout(limit, self.stream.read(&mut self.buffer))
            .await
            .map_err(|_| ClientError::Timeout(limit))??;
        if n == 0 {
            return Err(ClientError::ConnectionClosed);
        }

        Ok(Bytes::copy_from_slice(&self.buffer[..n]))
    }

    /// `GET key`. Returns `None` when the server reports a failure.
    ///
    /// A stored value that itself starts with `FAILED` is indistinguishable
    /// from a miss. An empty stored value surfaces as [`ClientError::Timeout`].
    pub async fn get(&mut self, key: impl AsRef<[u8]>) -> Result<Option<Bytes>, ClientError> {
        let reply = self.send(&[b"GET".as_slice(), key.as_ref()]).await?;
        Ok((!reply.starts_with(response::FAILED)).then_some(reply))
    }

    /// `SET key value`. Returns true on `SUCCESS`.
    pub async fn set(
        &mut self,
        key: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
    ) -> Result<bool, ClientError> {
        let reply = self
            .send(&[b"SET".as_slice(), key.as_ref(), value.as_ref()])
            .await?;
        Ok(reply == response::SUCCESS)
    }

    /// `DEL key`. Returns true on `SUCCESS`, false if the key was absent.
    pub async fn del(&mut self, key: impl AsRef<[u8]>) -> Result<bool, ClientError> {
        let reply = self.send(&[b"DEL".as_slice(), key.as_ref()]).await?;
        Ok(reply == response::SUCCESS)
    }
}
