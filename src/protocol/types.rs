//! Wire Format Types and Encoding
//!
//! A message is a little-endian token count followed by that many
//! length-prefixed tokens:
//!
//! ```text
//! message := u32(token_count) token*
//! token   := u32(byte_length) bytes[byte_length]
//! ```
//!
//! ## Example
//!
//! `["GET", "a"]` is framed as:
//!
//! ```text
//! 02 00 00 00 | 03 00 00 00 'G' 'E' 'T' | 01 00 00 00 'a'
//! ```
//!
//! Responses are raw bytes with no length prefix or terminator. A client
//! delimits a response by reading it in one go.

use bytes::{BufMut, Bytes, BytesMut};

/// Size of every count and length header, in bytes.
pub const LEN_SIZE: usize = 4;

/// Literal response payloads written back to clients.
pub mod response {
    /// Returned by a successful `SET` or `DEL`.
    pub const SUCCESS: &[u8] = b"SUCCESS";

    /// Returned for unknown verbs, short commands and malformed frames.
    pub const FAILED: &[u8] = b"FAILED";

    /// Prefix of a failure that carries an error detail.
    pub const FAILED_WITH_ERR: &str = "FAILED. err: ";
}

/// Encodes an ordered list of tokens into a single frame.
///
/// The serving path never encodes; this is the client half of the codec.
///
/// # Example
///
/// ```
/// use framekv::protocol::{decode, encode};
///
/// let frame = encode(&["SET", "name", "Ariz"]);
/// let tokens = decode(&frame).unwrap();
/// assert_eq!(tokens, vec!["SET", "name", "Ariz"]);
/// ```
pub fn encode<T: AsRef<[u8]>>(tokens: &[T]) -> Bytes {
    let body: usize = tokens.iter().map(|t| LEN_SIZE + t.as_ref().len()).sum();
    let mut buf = BytesMut::with_capacity(LEN_SIZE + body);

    buf.put_u32_le(tokens.len() as u32);
    for token in tokens {
        let token = token.as_ref();
        buf.put_u32_le(token.len() as u32);
        buf.put_slice(token);
    }

    buf.freeze()
}

/// Builds the `FAILED. err: <detail>` payload.
pub fn failure_with(detail: impl std::fmt::Display) -> Bytes {
    Bytes::from(format!("{}{}", response::FAILED_WITH_ERR, detail))
}
