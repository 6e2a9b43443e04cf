//! Binary Frame Protocol
//!
//! This module implements the length-prefixed framing clients use to send
//! commands to FrameKV.
//!
//! ## Overview
//!
//! Each message carries a token count followed by that many length-prefixed
//! tokens, all headers being little-endian `u32`s. The first token is the verb,
//! the rest are its arguments. Responses go back as raw, unframed bytes.
//!
//! ## Modules
//!
//! - `types`: Wire constants, response literals and the frame encoder
//! - `parser`: Bounds-checked decoder for incoming frames
//!
//! ## Example
//!
//! ```
//! use framekv::protocol::{decode, encode};
//!
//! let frame = encode(&["GET", "name"]);
//! let tokens = decode(&frame).unwrap();
//! assert_eq!(tokens, vec!["GET", "name"]);
//! ```

pub mod parser;
pub mod types;

// Re-export commonly used items for convenience
pub use parser::{decode, ProtocolError, ProtocolResult};
pub use types::{encode, failure_with, response, LEN_SIZE};
