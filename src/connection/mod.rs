//! Connection Handler Module
//!
//! This module manages individual client connections to FrameKV.
//! The server spawns one task per accepted connection; the task owns the
//! socket until the client leaves or something goes wrong.
//!
//! ## Per-Connection State Machine
//!
//! ```text
//!            ┌──────────────────────────────────────┐
//!            ▼                                      │
//!      ┌───────────┐  bytes   ┌─────────────┐  resp │  ┌───────────┐
//!  ───>│  Reading  │─────────>│ Dispatching │──────>└──│  Writing  │
//!      └─────┬─────┘          └──────┬──────┘          └─────┬─────┘
//!            │ EOF / read error      │ malformed frame       │ write error
//!            ▼                       ▼                       ▼
//!      ┌─────────────────────────────────────────────────────────────┐
//!      │                           Closed                            │
//!      └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Connections only meet each other at the storage engine's lock; nothing a
//! handler does can stall or fail another handler.
//!
//! ## Example
//!
//! ```ignore
//! use framekv::connection::{handle_connection, ConnectionStats};
//! use framekv::commands::CommandHandler;
//! use framekv::storage::StorageEngine;
//! use std::sync::Arc;
//!
//! let storage = Arc::new(StorageEngine::new());
//! let stats = Arc::new(ConnectionStats::new());
//! let handler = CommandHandler::new(storage);
//!
//! // For each accepted connection...
//! let (stream, addr) = listener.accept().await?;
//! tokio::spawn(handle_connection(stream, addr, handler, 4096, stats));
//! ```

pub mod handler;

// Re-export commonly used types
pub use handler::{handle_connection, ConnectionError, ConnectionHandler, ConnectionStats};
