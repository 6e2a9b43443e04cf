//! Server Module
//!
//! Owns the network endpoint: binds the listener, accepts connections, spawns
//! a handler task for each, and drains them on shutdown.
//!
//! ## Lifecycle
//!
//! ```text
//!   Server::new ──> start() ──> [accepting] ──> shutdown(deadline)
//!                     │                              │
//!                     │ bind error                   ├─ listener closed at once
//!                     ▼                              ├─ wait for handlers
//!               ServerError::Bind                    └─ ShutdownTimeout if the
//!                                                       deadline passes first
//! ```
//!
//! ## Accept Errors
//!
//! Temporary errors (an aborted handshake, running out of file descriptors)
//! pause the loop for `accept_retry_delay` and retry. By default retries are
//! unbounded; `max_accept_retries` caps consecutive failures. Any other accept
//! error ends the accept loop.

pub mod listener;

pub use listener::{Server, ServerError};
