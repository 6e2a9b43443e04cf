//! Command Handler
//!
//! Executes one decoded message against the storage engine and produces the
//! raw response bytes.
//!
//! ## Responses
//!
//! | Verb  | Success            | Failure                        |
//! |-------|--------------------|--------------------------------|
//! | `GET` | the raw value      | `FAILED. err: not found`       |
//! | `SET` | `SUCCESS`          | never fails                    |
//! | `DEL` | `SUCCESS`          | `FAILED. err: key not found`   |
//! | other | n/a                | `FAILED`                       |
//!
//! There is no envelope around these payloads, so a value that happens to
//! read `SUCCESS` is indistinguishable from a success reply.

use crate::commands::Command;
use crate::protocol::{failure_with, response};
use crate::storage::{StorageEngine, StorageError};
use bytes::Bytes;
use std::sync::Arc;
use tracing::trace;

/// Failure detail for a `DEL` of an absent key. `GET` reports the plain
/// [`StorageError::NotFound`] text instead; clients match on both strings.
const DEL_NOT_FOUND: &str = "key not found";

/// Dispatches commands to the storage engine.
#[derive(Clone)]
pub struct CommandHandler {
    /// The storage engine
    storage: Arc<StorageEngine>,
}

impl CommandHandler {
    /// Creates a new command handler with the given storage engine.
    pub fn new(storage: Arc<StorageEngine>) -> Self {
        Self { storage }
    }

    /// Executes the command framed by `tokens` and returns the response.
    ///
    /// Never panics on bad input: empty lists, unknown verbs and short
    /// commands all yield `FAILED`.
    pub fn execute(&self, tokens: &[Bytes]) -> Bytes {
        match Command::from_tokens(tokens) {
            Some(command) => {
                trace!(command = command.name(), "Executing command");
                self.apply(command)
            }
            None => Bytes::from_static(response::FAILED),
        }
    }

    /// Applies an already-parsed command.
    pub fn apply(&self, command: Command) -> Bytes {
        match command {
            Command::Get { key } => match self.storage.get(&key) {
                Ok(value) => value,
                Err(e) => failure_with(e),
            },
            Command::Set { key, value } => {
                self.storage.set(key, value);
                Bytes::from_static(response::SUCCESS)
            }
            Command::Del { key } => match self.storage.del(&key) {
                Ok(()) => Bytes::from_static(response::SUCCESS),
                Err(StorageError::NotFound) => failure_with(DEL_NOT_FOUND),
            },
        }
    }

    /// Returns the storage engine this handler writes to.
    pub fn storage(&self) -> &Arc<StorageEngine> {
        &self.storage
    }
}
