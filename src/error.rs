//! Error types for zset-client
//!
//! Three layers of failure are kept apart:
//! - [`TransportError`]: the round trip itself failed (I/O, framing, closed)
//! - a non-`ok` status inside a well-formed reply ([`ZSetError::Status`])
//! - a payload token that is not a valid number ([`DecodeError`])
//!
//! Every error surfaced by the client names the operation and its arguments.

use thiserror::Error;

use crate::protocol::StatusKind;

/// Result type alias using ZSetError
pub type Result<T> = std::result::Result<T, ZSetError>;

/// Unified error type for ZSet operations
#[derive(Debug, Error)]
pub enum ZSetError {
    // -------------------------------------------------------------------------
    // Round-trip Errors
    // -------------------------------------------------------------------------
    #[error("{op} {args}: transport error: {source}")]
    Transport {
        op: &'static str,
        args: String,
        #[source]
        source: TransportError,
    },

    // -------------------------------------------------------------------------
    // Reply Errors
    // -------------------------------------------------------------------------
    #[error("{op} {args}: server replied {kind}{}", fmt_detail(.detail))]
    Status {
        op: &'static str,
        args: String,
        kind: StatusKind,
        detail: Option<String>,
    },

    #[error("{op} {args}: {source}")]
    Decode {
        op: &'static str,
        args: String,
        #[source]
        source: DecodeError,
    },

    // -------------------------------------------------------------------------
    // Caller Errors
    // -------------------------------------------------------------------------
    #[error("{op}: invalid argument: {reason}")]
    InvalidArgument { op: &'static str, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ZSetError {
    /// The classified status kind, if this error came from a non-`ok` reply
    pub fn status_kind(&self) -> Option<StatusKind> {
        match self {
            ZSetError::Status { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// True when the store answered `not_found`
    ///
    /// Lets callers treat absence as a value rather than a hard failure.
    pub fn is_not_found(&self) -> bool {
        self.status_kind() == Some(StatusKind::NotFound)
    }

    /// True when the round trip itself failed
    pub fn is_transport(&self) -> bool {
        matches!(self, ZSetError::Transport { .. })
    }
}

fn fmt_detail(detail: &Option<String>) -> String {
    match detail {
        Some(d) => format!(" ({d})"),
        None => String::new(),
    }
}

/// Failure of a single `Transport::execute` round trip
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Connection closed")]
    Closed,
}

/// A payload token that could not be coerced into the expected number
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid score token {token:?}")]
    InvalidScore { token: String },

    #[error("missing payload token at position {index}")]
    MissingToken { index: usize },

    // -------------------------------------------------------------------------
    // Request-side decoding (store side)
    // -------------------------------------------------------------------------
    #[error("Unknown Command: {name}")]
    UnknownCommand { name: String },

    #[error("wrong number of arguments for {command}: expected {expected}, got {got}")]
    ArgumentCount {
        command: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("{command} expects key/score pairs, key {key:?} has no score")]
    UnpairedArgument { command: &'static str, key: String },

    #[error("invalid integer argument {token:?}")]
    InvalidInteger { token: String },
}
