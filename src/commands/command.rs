//! Command Parsing
//!
//! Maps a decoded token list onto one of the supported verbs.
//!
//! The verb is the first token and must match exactly (case-sensitive).
//! Each verb needs a fixed number of tokens; any tokens past that arity
//! are ignored, so `["GET", "a", "b"]` reads key `a`. A message never
//! carries more than one command.

use bytes::Bytes;

/// A single verb-plus-arguments operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `GET key`
    Get { key: Bytes },
    /// `SET key value`
    Set { key: Bytes, value: Bytes },
    /// `DEL key`
    Del { key: Bytes },
}

impl Command {
    /// Builds a command from decoded tokens.
    ///
    /// Returns `None` for an empty list, an unknown verb, or a known verb
    /// with too few tokens.
    ///
    /// # Example
    ///
    /// ```
    /// use framekv::commands::Command;
    /// use bytes::Bytes;
    ///
    /// let tokens = vec![Bytes::from("DEL"), Bytes::from("name")];
    /// assert_eq!(
    ///     Command::from_tokens(&tokens),
    ///     Some(Command::Del { key: Bytes::from("name") })
    /// );
    /// ```
    pub fn from_tokens(tokens: &[Bytes]) -> Option<Self> {
        let (verb, args) = tokens.split_first()?;

        match &verb[..] {
            b"GET" => match args {
                [key, ..] => Some(Command::Get { key: key.clone() }),
                _ => None,
            },
            b"SET" => match args {
                [key, value, ..] => Some(Command::Set {
                    key: key.clone(),
                    value: value.clone(),
                }),
                _ => None,
            },
            b"DEL" => match args {
                [key, ..] => Some(Command::Del { key: key.clone() }),
                _ => None,
            },
            _ => None,
        }
    }

    /// Returns the verb name, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Get { .. } => "GET",
            Command::Set { .. } => "SET",
            Command::Del { .. } => "DEL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(args: &[&str]) -> Vec<Bytes> {
        args.iter().map(|s| Bytes::from(s.to_string())).collect()
    }

    #[test]
    fn test_parse_get() {
        assert_eq!(
            Command::from_tokens(&tokens(&["GET", "a"])),
            Some(Command::Get {
                key: Bytes::from("a")
            })
        );
    }

    #[test]
    fn test_parse_set() {
        assert_eq!(
            Command::from_tokens(&tokens(&["SET", "a", "1"])),
            Some(Command::Set {
                key: Bytes::from("a"),
                value: Bytes::from("1")
            })
        );
    }

    #[test]
    fn test_extra_tokens_ignored() {
        assert_eq!(
            Command::from_tokens(&tokens(&["SET", "a", "1", "GET", "a"])),
            Some(Command::Set {
                key: Bytes::from("a"),
                value: Bytes::from("1")
            })
        );
        assert_eq!(
            Command::from_tokens(&tokens(&["DEL", "a", "b"])),
            Some(Command::Del {
                key: Bytes::from("a")
            })
        );
    }

    #[test]
    fn test_too_few_tokens() {
        assert_eq!(Command::from_tokens(&tokens(&["GET"])), None);
        assert_eq!(Command::from_tokens(&tokens(&["SET", "a"])), None);
        assert_eq!(Command::from_tokens(&tokens(&["DEL"])), None);
    }

    #[test]
    fn test_unknown_or_empty() {
        assert_eq!(Command::from_tokens(&[]), None);
        assert_eq!(Command::from_tokens(&tokens(&["PING"])), None);
        assert_eq!(Command::from_tokens(&tokens(&[""])), None);
    }

    #[test]
    fn test_verb_is_case_sensitive() {
        assert_eq!(Command::from_tokens(&tokens(&["get", "a"])), None);
        assert_eq!(Command::from_tokens(&tokens(&["Set", "a", "1"])), None);
    }

    #[test]
    fn test_empty_key_is_valid() {
        assert_eq!(
            Command::from_tokens(&tokens(&["GET", ""])),
            Some(Command::Get { key: Bytes::new() })
        );
    }
}
