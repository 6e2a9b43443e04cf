//! Storage Engine Module
//!
//! This module provides the in-memory key-value store shared by all
//! connections.
//!
//! ## Features
//!
//! - **Single RwLock**: Concurrent readers, exclusive writers, one lock for the whole map
//! - **Opaque Values**: Keys and values are raw bytes, stored as `Bytes`
//! - **Explicit Ownership**: The store is an ordinary value passed around in an `Arc`,
//!   so tests can run as many independent stores as they like
//!
//! The store is volatile. Entries live until deleted or until the process exits.
//!
//! ## Example
//!
//! ```
//! use framekv::storage::StorageEngine;
//! use bytes::Bytes;
//! use std::sync::Arc;
//!
//! let engine = Arc::new(StorageEngine::new());
//!
//! engine.set(Bytes::from("name"), Bytes::from("Ariz"));
//! assert_eq!(engine.get(b"name").unwrap(), Bytes::from("Ariz"));
//! ```

pub mod engine;

// Re-export commonly used types
pub use engine::{StorageEngine, StorageError, StorageResult, StorageStats};
