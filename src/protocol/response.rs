//! Response definitions
//!
//! Status classification of replies and the typed member record.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Response status, decoded once from token 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Ok,
    NotFound,
    /// The store's `error` status
    ServerError,
    Fail,
    ClientError,
}

impl StatusKind {
    /// Wire token for this status
    pub fn as_str(self) -> &'static str {
        match self {
            StatusKind::Ok => "ok",
            StatusKind::NotFound => "not_found",
            StatusKind::ServerError => "error",
            StatusKind::Fail => "fail",
            StatusKind::ClientError => "client_error",
        }
    }

    /// Recognize a status token; `None` for anything outside the known set
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "ok" => Some(StatusKind::Ok),
            "not_found" => Some(StatusKind::NotFound),
            "error" => Some(StatusKind::ServerError),
            "fail" => Some(StatusKind::Fail),
            "client_error" => Some(StatusKind::ClientError),
            _ => None,
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome<'a> {
    /// Status `ok`; carries tokens 1..N
    Success(&'a [String]),

    /// Any other status. `kind` is never `Ok`.
    Failure {
        kind: StatusKind,
        detail: Option<&'a str>,
    },
}

/// Classify a reply by its status token
///
/// An empty reply or an unrecognized status is a `Fail`, never a success.
/// For recognized failures `detail` is the first payload token (the store's
/// reason text); for unrecognized ones it is the raw status token.
pub fn classify(tokens: &[String]) -> Outcome<'_> {
    let Some((status, payload)) = tokens.split_first() else {
        return Outcome::Failure {
            kind: StatusKind::Fail,
            detail: None,
        };
    };

    match StatusKind::from_token(status) {
        Some(StatusKind::Ok) => Outcome::Success(payload),
        Some(kind) => Outcome::Failure {
            kind,
            detail: payload.first().map(String::as_str),
        },
        None => Outcome::Failure {
            kind: StatusKind::Fail,
            detail: Some(status.as_str()),
        },
    }
}

/// A reply built by the store side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: StatusKind,

    /// Payload tokens
    pub payload: Vec<String>,
}

impl Response {
    /// Create an OK response
    pub fn ok(payload: Vec<String>) -> Self {
        Self {
            status: StatusKind::Ok,
            payload,
        }
    }

    /// Create an OK response carrying one integer
    pub fn ok_int(value: i64) -> Self {
        Self::ok(vec![value.to_string()])
    }

    /// Create a NOT_FOUND response
    pub fn not_found() -> Self {
        Self {
            status: StatusKind::NotFound,
            payload: Vec::new(),
        }
    }

    /// Create a CLIENT_ERROR response
    pub fn client_error(message: &str) -> Self {
        Self {
            status: StatusKind::ClientError,
            payload: vec![message.to_string()],
        }
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self {
            status: StatusKind::ServerError,
            payload: vec![message.to_string()],
        }
    }

    /// Flatten into wire tokens, status first
    pub fn into_tokens(self) -> Vec<String> {
        let mut tokens = Vec::with_capacity(self.payload.len() + 1);
        tokens.push(self.status.as_str().to_string());
        tokens.extend(self.payload);
        tokens
    }
}

/// A (key, score) pair of a sorted set
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    pub key: String,
    pub score: i64,
}

impl Member {
    pub fn new(key: impl Into<String>, score: i64) -> Self {
        Self {
            key: key.into(),
            score,
        }
    }
}
