//! Frame Decoder
//!
//! Turns the bytes of one read into the ordered list of tokens it frames.
//!
//! ## How Decoding Works
//!
//! 1. Read the 4-byte token count `N`
//! 2. Reject `N` if the rest of the buffer could not even hold `N` length headers
//! 3. For each token, read its 4-byte length `L`, then `L` bytes
//!
//! Every read is bounds-checked against what is left in the buffer, so a short
//! or lying frame yields a [`ProtocolError`] rather than an out-of-bounds read.
//! The token vector starts small and grows as tokens are actually read, so a
//! large count header alone never drives an allocation.
//!
//! Token bytes are passed through opaquely: no UTF-8 validation, embedded NULs
//! are kept.
//!
//! ## Limitations
//!
//! One read is one message. A frame split across two reads is reported as
//! truncated, and bytes after the last declared token are ignored.

use crate::protocol::types::LEN_SIZE;
use bytes::{Buf, Bytes};
use thiserror::Error;

/// Errors that can occur while decoding a frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The buffer ends before the token count header is complete
    #[error("truncated header: need {needed} bytes, have {available}")]
    TruncatedHeader { needed: usize, available: usize },

    /// The count header declares more tokens than the buffer can hold
    #[error("frame declares {declared} tokens but can hold at most {max}")]
    TooManyTokens { declared: usize, max: usize },

    /// A token's length header or body runs past the end of the buffer
    #[error("truncated token {index}: need {needed} bytes, have {available}")]
    TruncatedToken {
        index: usize,
        needed: usize,
        available: usize,
    },
}

/// Result type for decoding operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Token slots reserved up front; commands have at most three tokens.
const PREALLOCATED_TOKENS: usize = 4;

fn initial_capacity(declared: usize) -> usize {
    declared.min(PREALLOCATED_TOKENS)
}

/// Decodes one message into its ordered tokens.
///
/// # Example
///
/// ```
/// use framekv::protocol::decode;
///
/// let buf = b"\x02\x00\x00\x00\x03\x00\x00\x00GET\x01\x00\x00\x00a";
/// let tokens = decode(buf).unwrap();
/// assert_eq!(tokens, vec!["GET", "a"]);
/// ```
pub fn decode(buf: &[u8]) -> ProtocolResult<Vec<Bytes>> {
    let mut src = buf;

    if src.remaining() < LEN_SIZE {
        return Err(ProtocolError::TruncatedHeader {
            needed: LEN_SIZE,
            available: src.remaining(),
        });
    }

    let declared = src.get_u32_le() as usize;

    // Even empty tokens carry a length header
    let max = src.remaining() / LEN_SIZE;
    if declared > max {
        return Err(ProtocolError::TooManyTokens { declared, max });
    }

    let mut tokens = Vec::with_capacity(initial_capacity(declared));

    for index in 0..declared {
        if src.remaining() < LEN_SIZE {
            return Err(ProtocolError::TruncatedToken {
                index,
                needed: LEN_SIZE,
                available: src.remaining(),
            });
        }

        let len = src.get_u32_le() as usize;
        if src.remaining() < len {
            return Err(ProtocolError::TruncatedToken {
                index,
                needed: len,
                available: src.remaining(),
            });
        }

        tokens.push(Bytes::copy_from_slice(&src[..len]));
        src.advance(len);
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::encode;

    #[test]
    fn test_decode_set_command() {
        let frame = encode(&["SET", "key", "value"]);
        let tokens = decode(&frame).unwrap();
        assert_eq!(tokens, vec!["SET", "key", "value"]);
    }

    #[test]
    fn test_decode_preserves_order_of_many_tokens() {
        let frame = encode(&["GET", "key", "DEL", "key", "PING"]);
        let tokens = decode(&frame).unwrap();
        assert_eq!(tokens, vec!["GET", "key", "DEL", "key", "PING"]);
    }

    #[test]
    fn test_decode_empty_tokens() {
        let frame = encode(&["", "SET", ""]);
        let tokens = decode(&frame).unwrap();
        assert_eq!(tokens, vec!["", "SET", ""]);
    }

    #[test]
    fn test_decode_zero_tokens() {
        let tokens = decode(b"\x00\x00\x00\x00").unwrap();
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_decode_binary_token() {
        let frame = encode(&[&b"hel\x00o"[..], &b"\xff\xfe"[..]]);
        let tokens = decode(&frame).unwrap();
        assert_eq!(tokens[0], Bytes::from_static(b"hel\x00o"));
        assert_eq!(tokens[1], Bytes::from_static(b"\xff\xfe"));
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let mut frame = encode(&["GET", "a"]).to_vec();
        frame.extend_from_slice(b"garbage");
        let tokens = decode(&frame).unwrap();
        assert_eq!(tokens, vec!["GET", "a"]);
    }

    #[test]
    fn test_decode_short_header() {
        let result = decode(b"\x01\x00");
        assert_eq!(
            result,
            Err(ProtocolError::TruncatedHeader {
                needed: 4,
                available: 2
            })
        );
    }

    #[test]
    fn test_decode_empty_buffer() {
        assert!(matches!(
            decode(b""),
            Err(ProtocolError::TruncatedHeader { available: 0, .. })
        ));
    }

    #[test]
    fn test_decode_huge_count_rejected_before_allocating() {
        let result = decode(b"\xff\xff\xff\xff\x00\x00\x00\x00");
        assert_eq!(
            result,
            Err(ProtocolError::TooManyTokens {
                declared: u32::MAX as usize,
                max: 1
            })
        );
    }

    #[test]
    fn test_decode_truncated_token_body() {
        let frame = encode(&["SET", "key", "value"]);
        let short = &frame[..frame.len() - 2];
        assert_eq!(
            decode(short),
            Err(ProtocolError::TruncatedToken {
                index: 2,
                needed: 5,
                available: 3
            })
        );
    }

    #[test]
    fn test_decode_truncated_length_header() {
        // Two tokens declared, first complete, second header cut short.
        // Padding keeps the count check from tripping first.
        let buf = b"\x02\x00\x00\x00\x01\x00\x00\x00a\x00\x00\x00";
        assert_eq!(
            decode(buf),
            Err(ProtocolError::TruncatedToken {
                index: 1,
                needed: 4,
                available: 3
            })
        );
    }

    #[test]
    fn test_decode_length_past_end() {
        let buf = b"\x01\x00\x00\x00\xff\xff\xff\x7fabc";
        assert!(matches!(
            decode(buf),
            Err(ProtocolError::TruncatedToken { index: 0, .. })
        ));
    }

    #[test]
    fn test_every_prefix_of_a_frame_is_rejected() {
        let frame = encode(&["SET", "a", "1"]);
        for end in 0..frame.len() {
            assert!(decode(&frame[..end]).is_err(), "prefix of {} bytes", end);
        }
        assert!(decode(&frame).is_ok());
    }

    #[test]
    fn test_reservation_is_capped() {
        assert_eq!(initial_capacity(0), 0);
        assert_eq!(initial_capacity(3), 3);
        assert_eq!(initial_capacity(1024), PREALLOCATED_TOKENS);
    }

    #[test]
    fn test_decode_more_tokens_than_reserved() {
        let words: Vec<String> = (0..100).map(|i| format!("t{}", i)).collect();
        let tokens = decode(&encode(words.as_slice())).unwrap();
        assert_eq!(tokens.len(), 100);
        assert_eq!(tokens[99], "t99");
    }

    #[test]
    fn test_count_of_empty_tokens_fits_buffer() {
        // 1000 empty tokens: a count header plus 1000 zero length headers
        let mut frame = 1000u32.to_le_bytes().to_vec();
        frame.extend(std::iter::repeat(0u8).take(1000 * LEN_SIZE));

        let tokens = decode(&frame).unwrap();
        assert_eq!(tokens.len(), 1000);
        assert!(tokens.iter().all(|t| t.is_empty()));
    }
}
