//! Command definitions
//!
//! One variant per sorted-set operation, borrowing its arguments from the
//! caller. Encoding into wire tokens lives in the codec.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Command types, one per wire command name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandType {
    ZSet,
    ZGet,
    ZDel,
    ZExists,
    ZCount,
    ZClear,
    ZScan,
    ZrScan,
    MultiZSet,
    MultiZGet,
    MultiZDel,
    ZIncr,
    ZList,
    ZSize,
    ZKeys,
    ZSum,
    ZAvg,
    ZRank,
    ZRRank,
    ZRange,
    ZRRange,
    ZRemRangeByRank,
    ZRemRangeByScore,
    ZPopFront,
    ZPopBack,
}

impl CommandType {
    /// Every command understood by the store
    pub const ALL: [CommandType; 25] = [
        CommandType::ZSet,
        CommandType::ZGet,
        CommandType::ZDel,
        CommandType::ZExists,
        CommandType::ZCount,
        CommandType::ZClear,
        CommandType::ZScan,
        CommandType::ZrScan,
        CommandType::MultiZSet,
        CommandType::MultiZGet,
        CommandType::MultiZDel,
        CommandType::ZIncr,
        CommandType::ZList,
        CommandType::ZSize,
        CommandType::ZKeys,
        CommandType::ZSum,
        CommandType::ZAvg,
        CommandType::ZRank,
        CommandType::ZRRank,
        CommandType::ZRange,
        CommandType::ZRRange,
        CommandType::ZRemRangeByRank,
        CommandType::ZRemRangeByScore,
        CommandType::ZPopFront,
        CommandType::ZPopBack,
    ];

    /// Wire name of the command
    pub fn as_str(self) -> &'static str {
        match self {
            CommandType::ZSet => "zset",
            CommandType::ZGet => "zget",
            CommandType::ZDel => "zdel",
            CommandType::ZExists => "zexists",
            CommandType::ZCount => "zcount",
            CommandType::ZClear => "zclear",
            CommandType::ZScan => "zscan",
            CommandType::ZrScan => "zrscan",
            CommandType::MultiZSet => "multi_zset",
            CommandType::MultiZGet => "multi_zget",
            CommandType::MultiZDel => "multi_zdel",
            CommandType::ZIncr => "zincr",
            CommandType::ZList => "zlist",
            CommandType::ZSize => "zsize",
            CommandType::ZKeys => "zkeys",
            CommandType::ZSum => "zsum",
            CommandType::ZAvg => "zavg",
            CommandType::ZRank => "zrank",
            CommandType::ZRRank => "zrrank",
            CommandType::ZRange => "zrange",
            CommandType::ZRRange => "zrrange",
            CommandType::ZRemRangeByRank => "zremrangebyrank",
            CommandType::ZRemRangeByScore => "zremrangebyscore",
            CommandType::ZPopFront => "zpop_front",
            CommandType::ZPopBack => "zpop_back",
        }
    }

    /// Look up a command by wire name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A range endpoint
///
/// `Unbounded` travels as an empty token and means `-inf` or `+inf`
/// depending on which side of the range it sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Bound {
    #[default]
    Unbounded,
    Value(i64),
}

impl Bound {
    /// The concrete value, if any
    pub fn value(self) -> Option<i64> {
        match self {
            Bound::Unbounded => None,
            Bound::Value(v) => Some(v),
        }
    }

    /// Wire token for this bound
    pub fn to_wire(self) -> String {
        match self {
            Bound::Unbounded => String::new(),
            Bound::Value(v) => v.to_string(),
        }
    }

    /// Parse a wire token; `None` when the token is neither empty nor an integer
    pub fn from_wire(token: &str) -> Option<Self> {
        if token.is_empty() {
            return Some(Bound::Unbounded);
        }
        token.parse().ok().map(Bound::Value)
    }
}

impl From<i64> for Bound {
    fn from(value: i64) -> Self {
        Bound::Value(value)
    }
}

// Unsuffixed integer literals fall back to i32.
impl From<i32> for Bound {
    fn from(value: i32) -> Self {
        Bound::Value(i64::from(value))
    }
}

impl From<Option<i64>> for Bound {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Bound::Unbounded, Bound::Value)
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Unbounded => f.write_str("inf"),
            Bound::Value(v) => write!(f, "{v}"),
        }
    }
}

/// A sorted-set command with borrowed arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    /// Set the score of a key
    ZSet { name: &'a str, key: &'a str, score: i64 },

    /// Get the score of a key
    ZGet { name: &'a str, key: &'a str },

    /// Delete a key
    ZDel { name: &'a str, key: &'a str },

    /// Check whether a key exists
    ZExists { name: &'a str, key: &'a str },

    /// Count keys whose score lies in `[start, end]`
    ZCount { name: &'a str, start: Bound, end: Bound },

    /// Remove every key of the set
    ZClear { name: &'a str },

    /// Forward scan anchored at `(key_start, start)`
    ZScan {
        name: &'a str,
        key_start: &'a str,
        start: Bound,
        end: Bound,
        limit: u64,
    },

    /// Reverse scan anchored at `(key_start, start)`
    ZrScan {
        name: &'a str,
        key_start: &'a str,
        start: Bound,
        end: Bound,
        limit: u64,
    },

    /// Set many scores at once
    MultiZSet { name: &'a str, entries: Vec<(&'a str, i64)> },

    /// Get many scores at once
    MultiZGet { name: &'a str, keys: Vec<&'a str> },

    /// Delete many keys at once
    MultiZDel { name: &'a str, keys: Vec<&'a str> },

    /// Add `by` (possibly negative) to the score of a key
    ZIncr { name: &'a str, key: &'a str, by: i64 },

    /// List set names in `(name_start, name_end]`
    ZList {
        name_start: &'a str,
        name_end: &'a str,
        limit: u64,
    },

    /// Number of keys in a set
    ZSize { name: &'a str },

    /// Keys only, same rule as `ZScan`
    ZKeys {
        name: &'a str,
        key_start: &'a str,
        start: Bound,
        end: Bound,
        limit: u64,
    },

    /// Sum of scores in `[start, end]`
    ZSum { name: &'a str, start: Bound, end: Bound },

    /// Average of scores in `[start, end]`
    ZAvg { name: &'a str, start: Bound, end: Bound },

    /// Zero-based forward rank of a key
    ZRank { name: &'a str, key: &'a str },

    /// Zero-based reverse rank of a key
    ZRRank { name: &'a str, key: &'a str },

    /// Members at positions `[offset, offset + limit)`
    ZRange { name: &'a str, offset: u64, limit: u64 },

    /// Members at reverse positions `[offset, offset + limit)`
    ZRRange { name: &'a str, offset: u64, limit: u64 },

    /// Remove members whose rank lies in `[start, end]`
    ZRemRangeByRank { name: &'a str, start: Bound, end: Bound },

    /// Remove members whose score lies in `[start, end]`
    ZRemRangeByScore { name: &'a str, start: Bound, end: Bound },

    /// Remove and return up to `limit` lowest members
    ZPopFront { name: &'a str, limit: u64 },

    /// Remove and return up to `limit` highest members
    ZPopBack { name: &'a str, limit: u64 },
}

impl Command<'_> {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::ZSet { .. } => CommandType::ZSet,
            Command::ZGet { .. } => CommandType::ZGet,
            Command::ZDel { .. } => CommandType::ZDel,
            Command::ZExists { .. } => CommandType::ZExists,
            Command::ZCount { .. } => CommandType::ZCount,
            Command::ZClear { .. } => CommandType::ZClear,
            Command::ZScan { .. } => CommandType::ZScan,
            Command::ZrScan { .. } => CommandType::ZrScan,
            Command::MultiZSet { .. } => CommandType::MultiZSet,
            Command::MultiZGet { .. } => CommandType::MultiZGet,
            Command::MultiZDel { .. } => CommandType::MultiZDel,
            Command::ZIncr { .. } => CommandType::ZIncr,
            Command::ZList { .. } => CommandType::ZList,
            Command::ZSize { .. } => CommandType::ZSize,
            Command::ZKeys { .. } => CommandType::ZKeys,
            Command::ZSum { .. } => CommandType::ZSum,
            Command::ZAvg { .. } => CommandType::ZAvg,
            Command::ZRank { .. } => CommandType::ZRank,
            Command::ZRRank { .. } => CommandType::ZRRank,
            Command::ZRange { .. } => CommandType::ZRange,
            Command::ZRRange { .. } => CommandType::ZRRange,
            Command::ZRemRangeByRank { .. } => CommandType::ZRemRangeByRank,
            Command::ZRemRangeByScore { .. } => CommandType::ZRemRangeByScore,
            Command::ZPopFront { .. } => CommandType::ZPopFront,
            Command::ZPopBack { .. } => CommandType::ZPopBack,
        }
    }

    /// Wire name of the command
    pub fn name(&self) -> &'static str {
        self.command_type().as_str()
    }
}
