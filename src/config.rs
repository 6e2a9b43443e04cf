//! Server Configuration
//!
//! Centralized configuration with sensible defaults. The port is the only
//! setting the protocol core depends on; the rest tune the connection buffer,
//! the accept loop, and shutdown.

use std::time::Duration;

/// Default size of each connection's read buffer (4 KB).
///
/// A message must fit in a single read of this size.
pub const DEFAULT_BUFFER_SIZE: usize = 4 * 1024;

/// Default pause after a temporary accept error.
pub const DEFAULT_ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Default time allowed for connections to drain on shutdown.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for a FrameKV server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Host to bind to
    pub host: String,

    /// Port to listen on; `0` lets the OS pick one
    pub port: u16,

    /// Size of the fixed read buffer each connection owns
    pub buffer_size: usize,

    /// Delay before retrying after a temporary accept error
    pub accept_retry_delay: Duration,

    /// Consecutive temporary accept errors tolerated before the accept loop
    /// gives up. `None` retries forever.
    pub max_accept_retries: Option<u32>,

    /// Drain deadline used by the server binary on shutdown
    pub shutdown_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: crate::DEFAULT_HOST.to_string(),
            port: crate::DEFAULT_PORT,
            buffer_size: DEFAULT_BUFFER_SIZE,
            accept_retry_delay: DEFAULT_ACCEPT_RETRY_DELAY,
            max_accept_retries: None,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

impl Config {
    /// Creates a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the read buffer size. Zero is bumped to the smallest usable
    /// buffer, one count header.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(crate::protocol::LEN_SIZE);
        self
    }

    pub fn with_accept_retry_delay(mut self, delay: Duration) -> Self {
        self.accept_retry_delay = delay;
        self
    }

    pub fn with_max_accept_retries(mut self, max: Option<u32>) -> Self {
        self.max_accept_retries = max;
        self
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Returns the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 6379);
        assert_eq!(config.bind_address(), "127.0.0.1:6379");
        assert_eq!(config.buffer_size, DEFAULT_BUFFER_SIZE);
        assert_eq!(config.accept_retry_delay, Duration::from_millis(100));
        assert_eq!(config.max_accept_retries, None);
    }

    #[test]
    fn test_builder() {
        let config = Config::new()
            .with_host("0.0.0.0")
            .with_port(7000)
            .with_buffer_size(0)
            .with_max_accept_retries(Some(3));

        assert_eq!(config.bind_address(), "0.0.0.0:7000");
        assert_eq!(config.buffer_size, 4);
        assert_eq!(config.max_accept_retries, Some(3));
    }
}
