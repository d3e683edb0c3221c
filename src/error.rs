//! Centralized error types for msgbody.
//!
//! The resolution core never lets these escape `resolve`: decode failures and
//! selection misses are turned into a fallback [`ResolvedContent`]. Only the
//! file and JSON boundary reports errors to the caller.
//!
//! [`ResolvedContent`]: crate::model::content::ResolvedContent

use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a base64url body into UTF-8 text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// After alphabet normalisation the input length is `4n + 1`, which no
    /// amount of padding can repair.
    #[error("base64 input of {len} characters cannot be padded to a multiple of 4")]
    InvalidLength { len: usize },

    /// The input holds symbols outside the alphabet, or the decoded bytes
    /// are not valid UTF-8.
    #[error("invalid base64 body: {0}")]
    InvalidBytes(String),
}

/// Why the selector produced no candidate.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMiss {
    /// No `text/html` or `text/plain` part with a body exists in the tree.
    #[error("no text/html or text/plain part with a body")]
    NoCandidate,

    /// The tree is nested deeper than the selector is willing to walk.
    #[error("MIME tree nested deeper than {limit} levels")]
    RecursionLimitExceeded { limit: usize },
}

/// Errors from the non-core layers: file loading and message parsing.
#[derive(Error, Debug)]
pub enum MsgBodyError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file does not exist.
    #[error("Message file not found: {0}")]
    FileNotFound(PathBuf),

    /// The JSON was well-formed but is neither a message nor a payload.
    #[error("Not a Gmail message or payload: {0}")]
    InvalidMessage(String),

    /// The input is not valid JSON, or does not match the message shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for `Result<T, MsgBodyError>`.
pub type Result<T> = std::result::Result<T, MsgBodyError>;

impl MsgBodyError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_messages() {
        let err = DecodeError::InvalidLength { len: 5 };
        assert!(err.to_string().contains("5 characters"));
        let err = DecodeError::InvalidBytes("bad symbol".into());
        assert!(err.to_string().contains("bad symbol"));
    }

    #[test]
    fn test_io_helper_keeps_path() {
        let err = MsgBodyError::io(
            "/tmp/msg.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/tmp/msg.json"));
    }
}
