//! Protocol codec
//!
//! Encoding of commands into wire arguments and decoding of reply payloads.
//!
//! ## Argument Layout
//! ```text
//! zset        name key score
//! zscan       name key_start score_start score_end limit
//! zrange      name offset limit
//! multi_zset  name k1 s1 k2 s2 ...
//! multi_zget  name k1 k2 ...
//! zlist       name_start name_end limit
//! ```
//! An empty token in a bound position means unbounded.
//!
//! ## Payload Layout
//! ```text
//! scalar      <int>
//! pairs       k1 s1 k2 s2 ... [trailing token ignored]
//! keys        k1 k2 ...   (returned as-is)
//! ```

use std::collections::HashMap;

use crate::config::ScoreDecoding;
use crate::error::DecodeError;

use super::{Bound, Command, CommandType, Member};

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command into its ordered wire arguments (name excluded)
pub fn encode_command(command: &Command<'_>) -> Vec<String> {
    match command {
        Command::ZSet { name, key, score } => {
            vec![name.to_string(), key.to_string(), score.to_string()]
        }
        Command::ZGet { name, key }
        | Command::ZDel { name, key }
        | Command::ZExists { name, key }
        | Command::ZRank { name, key }
        | Command::ZRRank { name, key } => vec![name.to_string(), key.to_string()],
        Command::ZIncr { name, key, by } => {
            vec![name.to_string(), key.to_string(), by.to_string()]
        }
        Command::ZClear { name } | Command::ZSize { name } => vec![name.to_string()],
        Command::ZCount { name, start, end }
        | Command::ZSum { name, start, end }
        | Command::ZAvg { name, start, end }
        | Command::ZRemRangeByRank { name, start, end }
        | Command::ZRemRangeByScore { name, start, end } => {
            vec![name.to_string(), start.to_wire(), end.to_wire()]
        }
        Command::ZScan {
            name,
            key_start,
            start,
            end,
            limit,
        }
        | Command::ZrScan {
            name,
            key_start,
            start,
            end,
            limit,
        }
        | Command::ZKeys {
            name,
            key_start,
            start,
            end,
            limit,
        } => vec![
            name.to_string(),
            key_start.to_string(),
            start.to_wire(),
            end.to_wire(),
            limit.to_string(),
        ],
        Command::ZRange {
            name,
            offset,
            limit,
        }
        | Command::ZRRange {
            name,
            offset,
            limit,
        } => vec![name.to_string(), offset.to_string(), limit.to_string()],
        Command::ZPopFront { name, limit } | Command::ZPopBack { name, limit } => {
            vec![name.to_string(), limit.to_string()]
        }
        Command::ZList {
            name_start,
            name_end,
            limit,
        } => vec![
            name_start.to_string(),
            name_end.to_string(),
            limit.to_string(),
        ],
        Command::MultiZSet { name, entries } => {
            let mut args = Vec::with_capacity(1 + entries.len() * 2);
            args.push(name.to_string());
            for (key, score) in entries {
                args.push(key.to_string());
                args.push(score.to_string());
            }
            args
        }
        Command::MultiZGet { name, keys } | Command::MultiZDel { name, keys } => {
            let mut args = Vec::with_capacity(1 + keys.len());
            args.push(name.to_string());
            args.extend(keys.iter().map(|k| k.to_string()));
            args
        }
    }
}

/// Decode a command from its wire name and arguments
///
/// Used by the store side; integers are always parsed strictly here.
pub fn decode_command<'a>(name: &str, args: &'a [String]) -> Result<Command<'a>, DecodeError> {
    let kind = CommandType::from_name(name).ok_or_else(|| DecodeError::UnknownCommand {
        name: name.to_string(),
    })?;
    let a = Args { kind, args };

    let command = match kind {
        CommandType::ZSet => {
            a.exact(3)?;
            Command::ZSet {
                name: a.str(0),
                key: a.str(1),
                score: a.int(2)?,
            }
        }
        CommandType::ZGet => {
            a.exact(2)?;
            Command::ZGet {
                name: a.str(0),
                key: a.str(1),
            }
        }
        CommandType::ZDel => {
            a.exact(2)?;
            Command::ZDel {
                name: a.str(0),
                key: a.str(1),
            }
        }
        CommandType::ZExists => {
            a.exact(2)?;
            Command::ZExists {
                name: a.str(0),
                key: a.str(1),
            }
        }
        CommandType::ZRank => {
            a.exact(2)?;
            Command::ZRank {
                name: a.str(0),
                key: a.str(1),
            }
        }
        CommandType::ZRRank => {
            a.exact(2)?;
            Command::ZRRank {
                name: a.str(0),
                key: a.str(1),
            }
        }
        CommandType::ZIncr => {
            a.exact(3)?;
            Command::ZIncr {
                name: a.str(0),
                key: a.str(1),
                by: a.int(2)?,
            }
        }
        CommandType::ZClear => {
            a.exact(1)?;
            Command::ZClear { name: a.str(0) }
        }
        CommandType::ZSize => {
            a.exact(1)?;
            Command::ZSize { name: a.str(0) }
        }
        CommandType::ZCount => {
            a.exact(3)?;
            Command::ZCount {
                name: a.str(0),
                start: a.bound(1)?,
                end: a.bound(2)?,
            }
        }
        CommandType::ZSum => {
            a.exact(3)?;
            Command::ZSum {
                name: a.str(0),
                start: a.bound(1)?,
                end: a.bound(2)?,
            }
        }
        CommandType::ZAvg => {
            a.exact(3)?;
            Command::ZAvg {
                name: a.str(0),
                start: a.bound(1)?,
                end: a.bound(2)?,
            }
        }
        CommandType::ZRemRangeByRank => {
            a.exact(3)?;
            Command::ZRemRangeByRank {
                name: a.str(0),
                start: a.bound(1)?,
                end: a.bound(2)?,
            }
        }
        CommandType::ZRemRangeByScore => {
            a.exact(3)?;
            Command::ZRemRangeByScore {
                name: a.str(0),
                start: a.bound(1)?,
                end: a.bound(2)?,
            }
        }
        CommandType::ZScan => {
            a.exact(5)?;
            Command::ZScan {
                name: a.str(0),
                key_start: a.str(1),
                start: a.bound(2)?,
                end: a.bound(3)?,
                limit: a.uint(4)?,
            }
        }
        CommandType::ZrScan => {
            a.exact(5)?;
            Command::ZrScan {
                name: a.str(0),
                key_start: a.str(1),
                start: a.bound(2)?,
                end: a.bound(3)?,
                limit: a.uint(4)?,
            }
        }
        CommandType::ZKeys => {
            a.exact(5)?;
            Command::ZKeys {
                name: a.str(0),
                key_start: a.str(1),
                start: a.bound(2)?,
                end: a.bound(3)?,
                limit: a.uint(4)?,
            }
        }
        CommandType::ZRange => {
            a.exact(3)?;
            Command::ZRange {
                name: a.str(0),
                offset: a.uint(1)?,
                limit: a.uint(2)?,
            }
        }
        CommandType::ZRRange => {
            a.exact(3)?;
            Command::ZRRange {
                name: a.str(0),
                offset: a.uint(1)?,
                limit: a.uint(2)?,
            }
        }
        CommandType::ZPopFront => {
            a.exact(2)?;
            Command::ZPopFront {
                name: a.str(0),
                limit: a.uint(1)?,
            }
        }
        CommandType::ZPopBack => {
            a.exact(2)?;
            Command::ZPopBack {
                name: a.str(0),
                limit: a.uint(1)?,
            }
        }
        CommandType::ZList => {
            a.exact(3)?;
            Command::ZList {
                name_start: a.str(0),
                name_end: a.str(1),
                limit: a.uint(2)?,
            }
        }
        CommandType::MultiZSet => {
            a.at_least(1)?;
            let rest = &args[1..];
            if rest.len() % 2 != 0 {
                return Err(DecodeError::UnpairedArgument {
                    command: kind.as_str(),
                    key: rest[rest.len() - 1].clone(),
                });
            }
            let entries = rest
                .chunks_exact(2)
                .map(|pair| Ok((pair[0].as_str(), parse_int(&pair[1])?)))
                .collect::<Result<Vec<_>, DecodeError>>()?;
            Command::MultiZSet {
                name: a.str(0),
                entries,
            }
        }
        CommandType::MultiZGet => {
            a.at_least(1)?;
            Command::MultiZGet {
                name: a.str(0),
                keys: args[1..].iter().map(String::as_str).collect(),
            }
        }
        CommandType::MultiZDel => {
            a.at_least(1)?;
            Command::MultiZDel {
                name: a.str(0),
                keys: args[1..].iter().map(String::as_str).collect(),
            }
        }
    };

    Ok(command)
}

/// Positional argument access for `decode_command`
struct Args<'a> {
    kind: CommandType,
    args: &'a [String],
}

impl<'a> Args<'a> {
    fn exact(&self, n: usize) -> Result<(), DecodeError> {
        if self.args.len() != n {
            return Err(self.count_error(n));
        }
        Ok(())
    }

    fn at_least(&self, n: usize) -> Result<(), DecodeError> {
        if self.args.len() < n {
            return Err(self.count_error(n));
        }
        Ok(())
    }

    fn count_error(&self, expected: usize) -> DecodeError {
        DecodeError::ArgumentCount {
            command: self.kind.as_str(),
            expected,
            got: self.args.len(),
        }
    }

    // Callers check the count first.
    fn str(&self, i: usize) -> &'a str {
        self.args[i].as_str()
    }

    fn int(&self, i: usize) -> Result<i64, DecodeError> {
        parse_int(&self.args[i])
    }

    fn uint(&self, i: usize) -> Result<u64, DecodeError> {
        let token = &self.args[i];
        token.parse().map_err(|_| DecodeError::InvalidInteger {
            token: token.clone(),
        })
    }

    fn bound(&self, i: usize) -> Result<Bound, DecodeError> {
        let token = &self.args[i];
        Bound::from_wire(token).ok_or_else(|| DecodeError::InvalidInteger {
            token: token.clone(),
        })
    }
}

fn parse_int(token: &str) -> Result<i64, DecodeError> {
    token.parse().map_err(|_| DecodeError::InvalidInteger {
        token: token.to_string(),
    })
}

// =============================================================================
// Payload Decoding
// =============================================================================

/// Coerce a score token into an i64
///
/// In `Lenient` mode a malformed token decodes as zero.
pub fn parse_score(token: &str, mode: ScoreDecoding) -> Result<i64, DecodeError> {
    match token.trim().parse::<i64>() {
        Ok(score) => Ok(score),
        Err(_) if mode == ScoreDecoding::Lenient => Ok(0),
        Err(_) => Err(DecodeError::InvalidScore {
            token: token.to_string(),
        }),
    }
}

/// Decode the first payload token as an integer
pub fn decode_int(payload: &[String], mode: ScoreDecoding) -> Result<i64, DecodeError> {
    let token = payload
        .first()
        .ok_or(DecodeError::MissingToken { index: 0 })?;
    parse_score(token, mode)
}

/// Decode the first payload token as a `1`/`0` flag
pub fn decode_flag(payload: &[String]) -> Result<bool, DecodeError> {
    payload
        .first()
        .map(|token| token == "1")
        .ok_or(DecodeError::MissingToken { index: 0 })
}

/// Decode the first payload token as a decimal average
pub fn decode_average(payload: &[String], mode: ScoreDecoding) -> Result<f64, DecodeError> {
    let token = payload
        .first()
        .ok_or(DecodeError::MissingToken { index: 0 })?;
    match token.trim().parse::<f64>() {
        Ok(avg) => Ok(avg),
        Err(_) if mode == ScoreDecoding::Lenient => Ok(0.0),
        Err(_) => Err(DecodeError::InvalidScore {
            token: token.clone(),
        }),
    }
}

/// Decode `k1 s1 k2 s2 ...` into ordered members
///
/// Each score is read from the token paired with its key. A trailing
/// unpaired token is ignored.
pub fn decode_pairs(payload: &[String], mode: ScoreDecoding) -> Result<Vec<Member>, DecodeError> {
    payload
        .chunks_exact(2)
        .map(|pair| Ok(Member::new(pair[0].clone(), parse_score(&pair[1], mode)?)))
        .collect()
}

/// Decode `k1 s1 k2 s2 ...` into a key → score map
pub fn decode_pair_map(
    payload: &[String],
    mode: ScoreDecoding,
) -> Result<HashMap<String, i64>, DecodeError> {
    let mut map = HashMap::with_capacity(payload.len() / 2);
    for pair in payload.chunks_exact(2) {
        map.insert(pair[0].clone(), parse_score(&pair[1], mode)?);
    }
    Ok(map)
}

/// Decode `k1 s1 k2 s2 ...` into parallel key and score sequences
pub fn decode_columns(
    payload: &[String],
    mode: ScoreDecoding,
) -> Result<(Vec<String>, Vec<i64>), DecodeError> {
    let mut keys = Vec::with_capacity(payload.len() / 2);
    let mut scores = Vec::with_capacity(payload.len() / 2);
    for pair in payload.chunks_exact(2) {
        keys.push(pair[0].clone());
        scores.push(parse_score(&pair[1], mode)?);
    }
    Ok((keys, scores))
}
