//! # FrameKV - A Minimal Networked Key-Value Store
//!
//! FrameKV is a small, volatile, single-node key-value server. Clients send
//! commands over TCP using a compact length-prefixed binary framing and get
//! one raw response back per message.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                              FrameKV                              │
//! │                                                                   │
//! │  ┌─────────────┐  spawn  ┌─────────────┐  tokens ┌─────────────┐  │
//! │  │   Server    │────────>│ Connection  │────────>│  Command    │  │
//! │  │ (acceptor)  │         │  Handler    │<────────│  Handler    │  │
//! │  └─────────────┘         └──────┬──────┘  bytes  └──────┬──────┘  │
//! │                                 │                       │         │
//! │                                 ▼                       ▼         │
//! │                          ┌─────────────┐        ┌──────────────┐  │
//! │                          │   Frame     │        │StorageEngine │  │
//! │                          │   Decoder   │        │ (one RwLock) │  │
//! │                          └─────────────┘        └──────────────┘  │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use framekv::{Client, Config, Server, StorageEngine};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let storage = Arc::new(StorageEngine::new());
//!     let mut server = Server::new(Config::default().with_port(0), storage);
//!     let addr = server.start().await?;
//!
//!     let mut client = Client::connect(addr).await?;
//!     client.set("name", "Ariz").await?;
//!     println!("{:?}", client.get("name").await?);
//!     drop(client);
//!
//!     server.shutdown(Duration::from_secs(5)).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Commands
//!
//! - `GET key` - the raw value, or `FAILED. err: not found`
//! - `SET key value` - `SUCCESS`
//! - `DEL key` - `SUCCESS`, or `FAILED. err: key not found`
//!
//! Anything else gets `FAILED`.
//!
//! ## Module Overview
//!
//! - [`protocol`]: Frame encoder and decoder
//! - [`storage`]: The shared, lock-guarded key-value map
//! - [`commands`]: Verb dispatch against the store
//! - [`connection`]: Per-client read/dispatch/write loop
//! - [`server`]: Listener, accept loop and graceful shutdown
//! - [`client`]: Async client for the same protocol
//! - [`config`]: Server settings
//!
//! ## Known Limitations
//!
//! - One read is one message: frames are not reassembled across reads.
//! - Responses are not framed; clients delimit them by reading once.
//! - A message carries exactly one command. Tokens beyond the verb's arity
//!   are ignored.

pub mod client;
pub mod commands;
pub mod config;
pub mod connection;
pub mod protocol;
pub mod server;
pub mod storage;

// Re-export commonly used types for convenience
pub use client::{Client, ClientError};
pub use commands::{Command, CommandHandler};
pub use config::Config;
pub use connection::{handle_connection, ConnectionError, ConnectionStats};
pub use protocol::{decode, encode, ProtocolError};
pub use server::{Server, ServerError};
pub use storage::{StorageEngine, StorageError};

/// The default port FrameKV listens on
pub const DEFAULT_PORT: u16 = 6379;

/// The default host FrameKV binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Version of FrameKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
