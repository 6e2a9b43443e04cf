//! Thread-Safe Storage Engine
//!
//! This module implements the single key-value mapping shared by every
//! connection. Keys and values are opaque byte strings.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               StorageEngine                 │
//! │  ┌───────────────────────────────────────┐  │
//! │  │   RwLock<HashMap<Bytes, Bytes>>       │  │
//! │  │                                       │  │
//! │  │   get  -> shared read lock            │  │
//! │  │   set  -> exclusive write lock        │  │
//! │  │   del  -> exclusive write lock        │  │
//! │  └───────────────────────────────────────┘  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! One lock guards the whole map. GETs run concurrently with each other but
//! never alongside a SET or DEL. The public methods are the only places the
//! lock is taken, and the map itself is never handed out.
//!
//! Statistics counters are atomics updated outside the lock.

use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Errors returned by store operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// The key is not present
    #[error("not found")]
    NotFound,
}

/// Result type for store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// The key-value store for FrameKV.
///
/// Construct one per server and share it behind an `Arc`. Independent
/// instances never see each other's data.
///
/// # Example
///
/// ```
/// use framekv::storage::{StorageEngine, StorageError};
/// use bytes::Bytes;
///
/// let engine = StorageEngine::new();
///
/// engine.set(Bytes::from("name"), Bytes::from("Ariz"));
/// assert_eq!(engine.get(b"name"), Ok(Bytes::from("Ariz")));
///
/// assert_eq!(engine.del(b"name"), Ok(()));
/// assert_eq!(engine.get(b"name"), Err(StorageError::NotFound));
/// ```
pub struct StorageEngine {
    /// The mapping, guarded by a single reader-writer lock
    data: RwLock<HashMap<Bytes, Bytes>>,

    /// Statistics: total GET operations
    get_count: AtomicU64,

    /// Statistics: total SET operations
    set_count: AtomicU64,

    /// Statistics: total DEL operations
    del_count: AtomicU64,

    /// Statistics: GET/DEL calls that found no key
    miss_count: AtomicU64,
}

impl std::fmt::Debug for StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageEngine")
            .field("keys", &self.len())
            .field("get_count", &self.get_count.load(Ordering::Relaxed))
            .field("set_count", &self.set_count.load(Ordering::Relaxed))
            .field("del_count", &self.del_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for StorageEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageEngine {
    /// Creates an empty storage engine.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
            get_count: AtomicU64::new(0),
            set_count: AtomicU64::new(0),
            del_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
        }
    }

    /// Sets a key-value pair, overwriting any previous value.
    pub fn set(&self, key: Bytes, value: Bytes) {
        self.set_count.fetch_add(1, Ordering::Relaxed);
        self.data.write().insert(key, value);
    }

    /// Gets the current value for a key.
    ///
    /// Fails with [`StorageError::NotFound`] if the key is absent.
    pub fn get(&self, key: &[u8]) -> StorageResult<Bytes> {
        self.get_count.fetch_add(1, Ordering::Relaxed);

        let value = self.data.read().get(key).cloned();
        value.ok_or_else(|| self.miss())
    }

    /// Removes a key.
    ///
    /// Fails with [`StorageError::NotFound`] if the key is absent.
    pub fn del(&self, key: &[u8]) -> StorageResult<()> {
        self.del_count.fetch_add(1, Ordering::Relaxed);

        let removed = self.data.write().remove(key);
        match removed {
            Some(_) => Ok(()),
            None => Err(self.miss()),
        }
    }

    /// Returns true if the key is present.
    pub fn contains(&self, key: &[u8]) -> bool {
        self.data.read().contains_key(key)
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns true if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a snapshot of the operation counters.
    pub fn stats(&self) -> StorageStats {
        StorageStats {
            keys: self.len() as u64,
            get_ops: self.get_count.load(Ordering::Relaxed),
            set_ops: self.set_count.load(Ordering::Relaxed),
            del_ops: self.del_count.load(Ordering::Relaxed),
            misses: self.miss_count.load(Ordering::Relaxed),
        }
    }

    fn miss(&self) -> StorageError {
        self.miss_count.fetch_add(1, Ordering::Relaxed);
        StorageError::NotFound
    }
}

/// Database statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of keys currently stored
    pub keys: u64,
    /// Total GET operations
    pub get_ops: u64,
    /// Total SET operations
    pub set_ops: u64,
    /// Total DEL operations
    pub del_ops: u64,
    /// GET and DEL calls on absent keys
    pub misses: u64,
}
