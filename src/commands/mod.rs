//! Command Handler Module
//!
//! This module implements the command processing layer for FrameKV.
//! It receives decoded tokens, interprets them as one command, executes it
//! against the storage engine, and returns the raw response bytes.
//!
//! ## Architecture
//!
//! ```text
//! Client Request
//!       │
//!       ▼
//! ┌─────────────────┐
//! │  Frame Decoder  │  (protocol module)
//! └────────┬────────┘
//!          │ tokens
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (this module)
//! │                 │
//! │  - Parse verb   │
//! │  - Check arity  │
//! │  - Execute      │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ StorageEngine   │  (storage module)
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! - `GET key`
//! - `SET key value`
//! - `DEL key`

pub mod command;
pub mod handler;

// Re-export the main command types
pub use command::Command;
pub use handler::CommandHandler;
