//! Listener and Accept Loop
//!
//! [`Server`] owns the lifecycle: `start` binds and spawns the accept loop,
//! `shutdown` stops it and waits for connections to drain.
//!
//! The accept loop keeps every connection task in a `JoinSet`. When told to
//! stop it closes the listener first, so new connection attempts are refused
//! straight away, and then waits for the set to empty. A shutdown deadline
//! only bounds how long the caller waits: handlers still running at that
//! point are left to finish on their own, never aborted.

use crate::commands::CommandHandler;
use crate::config::Config;
use crate::connection::{handle_connection, ConnectionStats};
use crate::storage::StorageEngine;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

/// Errors surfaced by the server lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not be set up
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Connections did not drain before the deadline
    #[error("timed out after {0:?} waiting for connections to drain")]
    ShutdownTimeout(Duration),

    /// `shutdown` was called on a server that is not running
    #[error("server is not running")]
    NotStarted,

    /// `start` was called twice
    #[error("server is already running")]
    AlreadyStarted,

    /// The accept loop task panicked
    #[error("accept loop failed: {0}")]
    AcceptTask(#[from] JoinError),
}

/// A running (or ready to run) FrameKV server.
///
/// # Example
///
/// ```no_run
/// use framekv::{Config, Server, StorageEngine};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # async fn run() -> Result<(), framekv::ServerError> {
/// let storage = Arc::new(StorageEngine::new());
/// let mut server = Server::new(Config::default(), storage);
///
/// let addr = server.start().await?;
/// println!("listening on {}", addr);
///
/// server.shutdown(Duration::from_secs(5)).await?;
/// # Ok(())
/// # }
/// ```
pub struct Server {
    config: Config,
    storage: Arc<StorageEngine>,
    stats: Arc<ConnectionStats>,
    local_addr: Option<SocketAddr>,
    shutdown_tx: Option<watch::Sender<bool>>,
    accept_task: Option<JoinHandle<()>>,
}

impl Server {
    /// Creates a server that will serve `storage` once started.
    pub fn new(config: Config, storage: Arc<StorageEngine>) -> Self {
        Self {
            config,
            storage,
            stats: Arc::new(ConnectionStats::new()),
            local_addr: None,
            shutdown_tx: None,
            accept_task: None,
        }
    }

    /// Binds the listener and starts accepting in the background.
    ///
    /// Returns the bound address as soon as the listener is up; the only
    /// error reported here is a bind failure.
    pub async fn start(&mut self) -> Result<SocketAddr, ServerError> {
        if self.accept_task.is_some() {
            return Err(ServerError::AlreadyStarted);
        }

        let addr = self.config.bind_address();
        let bind_error = |source| ServerError::Bind {
            addr: addr.clone(),
            source,
        };

        let listener = TcpListener::bind(&addr).await.map_err(bind_error)?;
        let local_addr = listener.local_addr().map_err(bind_error)?;

        info!(addr = %local_addr, "Server started");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let acceptor = Acceptor {
            listener,
            storage: Arc::clone(&self.storage),
            stats: Arc::clone(&self.stats),
            buffer_size: self.config.buffer_size,
            retry_delay: self.config.accept_retry_delay,
            max_retries: self.config.max_accept_retries,
            shutdown_rx,
        };

        self.accept_task = Some(tokio::spawn(acceptor.run()));
        self.shutdown_tx = Some(shutdown_tx);
        self.local_addr = Some(local_addr);

        Ok(local_addr)
    }

    /// Stops accepting and waits up to `deadline` for connections to finish.
    ///
    /// The listener is closed immediately. If the deadline passes first,
    /// returns [`ServerError::ShutdownTimeout`] and leaves the remaining
    /// handlers running.
    pub async fn shutdown(&mut self, deadline: Duration) -> Result<(), ServerError> {
        let (Some(shutdown_tx), Some(accept_task)) =
            (self.shutdown_tx.take(), self.accept_task.take())
        else {
            return Err(ServerError::NotStarted);
        };

        info!(active = self.stats.active(), "Shutting down server");
        // The accept loop may already have exited on a fatal error
        let _ = shutdown_tx.send(true);

        match tokio::time::timeout(deadline, accept_task).await {
            Ok(joined) => {
                joined?;
                info!("Server shutdown complete");
                Ok(())
            }
            Err(_) => {
                warn!(
                    active = self.stats.active(),
                    "Shutdown deadline passed, abandoning remaining connections"
                );
                Err(ServerError::ShutdownTimeout(deadline))
            }
        }
    }

    /// The address the listener is bound to, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Shared connection statistics.
    pub fn stats(&self) -> &Arc<ConnectionStats> {
        &self.stats
    }

    /// The storage engine this server serves.
    pub fn storage(&self) -> &Arc<StorageEngine> {
        &self.storage
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// State moved into the accept loop task.
struct Acceptor {
    listener: TcpListener,
    storage: Arc<StorageEngine>,
    stats: Arc<ConnectionStats>,
    buffer_size: usize,
    retry_delay: Duration,
    max_retries: Option<u32>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Acceptor {
    async fn run(mut self) {
        let mut handlers = JoinSet::new();
        let mut retries = AcceptRetry::new(self.max_retries);

        loop {
            tokio::select! {
                biased;

                // Also fires if the Server handle was dropped
                _ = self.shutdown_rx.changed() => {
                    debug!("Accept loop received shutdown signal");
                    break;
                }

                Some(res) = handlers.join_next() => {
                    if let Err(e) = res {
                        if e.is_panic() {
                            error!("A connection handler panicked: {e:?}");
                        }
                    }
                }

                res = self.listener.accept() => match res {
                    Ok((stream, addr)) => {
                        retries.reset();
                        debug!(client = %addr, "Accepted connection");

                        let handler = CommandHandler::new(Arc::clone(&self.storage));
                        let stats = Arc::clone(&self.stats);
                        handlers.spawn(handle_connection(
                            stream,
                            addr,
                            handler,
                            self.buffer_size,
                            stats,
                        ));
                    }
                    Err(e) => match retries.on_error(&e) {
                        AcceptAction::Retry => {
                            warn!(error = %e, "Temporary error when accepting connection");
                            tokio::time::sleep(self.retry_delay).await;
                        }
                        AcceptAction::GiveUp if is_temporary(&e) => {
                            error!(
                                error = %e,
                                attempts = retries.consecutive(),
                                "Giving up on accept after repeated temporary errors"
                            );
                            break;
                        }
                        AcceptAction::GiveUp => {
                            error!(error = %e, "Failed to accept connection");
                            break;
                        }
                    },
                },
            }
        }

        // Refuse new connections before waiting on the old ones
        drop(self.listener);

        if !handlers.is_empty() {
            info!(outstanding = handlers.len(), "Waiting for connections to drain");
        }
        while let Some(res) = handlers.join_next().await {
            if let Err(e) = res {
                if e.is_panic() {
                    error!("A connection handler panicked: {e:?}");
                }
            }
        }
        info!("All connections drained");
    }
}

/// What the accept loop does after a failed accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AcceptAction {
    /// Sleep for the retry delay, then accept again
    Retry,
    /// Stop accepting and drain
    GiveUp,
}

/// Counts consecutive temporary accept errors against an optional bound.
#[derive(Debug)]
struct AcceptRetry {
    consecutive: u32,
    max: Option<u32>,
}

impl AcceptRetry {
    fn new(max: Option<u32>) -> Self {
        Self { consecutive: 0, max }
    }

    /// Called after every successful accept.
    fn reset(&mut self) {
        self.consecutive = 0;
    }

    fn consecutive(&self) -> u32 {
        self.consecutive
    }

    /// Decides whether to keep accepting after `e`.
    ///
    /// Non-temporary errors always give up. Temporary ones retry until more
    /// than `max` happen in a row; with no bound they retry forever.
    fn on_error(&mut self, e: &io::Error) -> AcceptAction {
        if !is_temporary(e) {
            return AcceptAction::GiveUp;
        }

        self.consecutive = self.consecutive.saturating_add(1);
        if self.max.is_some_and(|max| self.consecutive > max) {
            AcceptAction::GiveUp
        } else {
            AcceptAction::Retry
        }
    }
}

/// Whether an accept error is worth retrying.
///
/// Covers errors tied to a single aborted handshake and running out of
/// file descriptors.
fn is_temporary(e: &io::Error) -> bool {
    use io::ErrorKind::*;

    if matches!(
        e.kind(),
        ConnectionAborted | ConnectionReset | ConnectionRefused | Interrupted | WouldBlock | TimedOut
    ) {
        return true;
    }

    #[cfg(unix)]
    {
        // ENFILE / EMFILE
        const ENFILE: i32 = 23;
        const EMFILE: i32 = 24;
        if matches!(e.raw_os_error(), Some(ENFILE) | Some(EMFILE)) {
            return true;
        }
    }

    false
}
