//! Client Module
//!
//! The typed sorted-set API.
//!
//! ## Responsibilities
//! - Validate caller input and short-circuit empty batches
//! - Encode each operation into one wire command
//! - Run the round trip on the injected [`Transport`]
//! - Classify the status and decode the payload into a typed result
//!
//! Every call is a single synchronous round trip. Nothing is cached,
//! retried or pipelined here; timeouts belong to the transport.

use std::collections::HashMap;

use crate::config::{Config, ScoreDecoding};
use crate::error::{DecodeError, Result, ZSetError};
use crate::protocol::{
    classify, decode_average, decode_columns, decode_flag, decode_int, decode_pair_map,
    decode_pairs, encode_command, Bound, Command, CommandType, Member, Outcome,
};
use crate::transport::Transport;

/// Sorted-set client over an injected transport
///
/// ## Concurrency
/// The client holds no mutable state. Sharing one across threads is as safe
/// as sharing its transport.
pub struct ZSetClient<T> {
    /// The round-trip capability
    transport: T,

    /// Client configuration
    config: Config,
}

/// Successful reply awaiting payload decoding
struct Reply {
    op: &'static str,
    args: Vec<String>,
    payload: Vec<String>,
    mode: ScoreDecoding,
}

impl Reply {
    fn decode<V>(
        self,
        decoder: impl FnOnce(&[String], ScoreDecoding) -> std::result::Result<V, DecodeError>,
    ) -> Result<V> {
        decoder(&self.payload, self.mode).map_err(|source| ZSetError::Decode {
            op: self.op,
            args: describe(&self.args),
            source,
        })
    }
}

fn describe(args: &[String]) -> String {
    format!("{:?}", args)
}

fn require(op: CommandType, field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ZSetError::InvalidArgument {
            op: op.as_str(),
            reason: format!("{} must not be empty", field),
        });
    }
    Ok(())
}

impl<T: Transport> ZSetClient<T> {
    /// Create a client with the default configuration
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, Config::default())
    }

    /// Create a client with an explicit configuration
    pub fn with_config(transport: T, config: Config) -> Self {
        Self { transport, config }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Send one command and classify the reply
    fn call(&self, command: Command<'_>) -> Result<Reply> {
        let op = command.name();
        let args = encode_command(&command);

        tracing::debug!("Sending {} with {} args", op, args.len());

        let mut tokens = match self.transport.execute(op, &args) {
            Ok(tokens) => tokens,
            Err(source) => {
                tracing::warn!("{} failed in transport: {}", op, source);
                return Err(ZSetError::Transport {
                    op,
                    args: describe(&args),
                    source,
                });
            }
        };

        tracing::trace!("{} replied {:?}", op, tokens);

        if let Outcome::Failure { kind, detail } = classify(&tokens) {
            let detail = detail.map(str::to_owned);
            tracing::debug!("{} returned status {}", op, kind);
            return Err(ZSetError::Status {
                op,
                args: describe(&args),
                kind,
                detail,
            });
        }

        // Success guarantees a status token at index 0.
        let payload = tokens.split_off(1);
        Ok(Reply {
            op,
            args,
            payload,
            mode: self.config.score_decoding,
        })
    }

    // =========================================================================
    // Single-key Operations
    // =========================================================================

    /// Set the score of `key` in set `name`, creating the set if needed
    pub fn zset(&self, name: &str, key: &str, score: i64) -> Result<()> {
        require(CommandType::ZSet, "name", name)?;
        require(CommandType::ZSet, "key", key)?;
        self.call(Command::ZSet { name, key, score })?;
        Ok(())
    }

    /// Get the score of `key`
    ///
    /// A missing key is a `Status` error with kind `NotFound`; see
    /// [`ZSetError::is_not_found`].
    pub fn zget(&self, name: &str, key: &str) -> Result<i64> {
        require(CommandType::ZGet, "name", name)?;
        require(CommandType::ZGet, "key", key)?;
        self.call(Command::ZGet { name, key })?.decode(decode_int)
    }

    /// Delete `key` from set `name`
    pub fn zdel(&self, name: &str, key: &str) -> Result<()> {
        require(CommandType::ZDel, "name", name)?;
        require(CommandType::ZDel, "key", key)?;
        self.call(Command::ZDel { name, key })?;
        Ok(())
    }

    /// Whether `key` is a member of set `name`
    pub fn zexists(&self, name: &str, key: &str) -> Result<bool> {
        require(CommandType::ZExists, "name", name)?;
        require(CommandType::ZExists, "key", key)?;
        self.call(Command::ZExists { name, key })?
            .decode(|payload, _| decode_flag(payload))
    }

    /// Add `by` (may be negative) to the score of `key` and return the new score
    pub fn zincr(&self, name: &str, key: &str, by: i64) -> Result<i64> {
        require(CommandType::ZIncr, "name", name)?;
        require(CommandType::ZIncr, "key", key)?;
        self.call(Command::ZIncr { name, key, by })?.decode(decode_int)
    }

    /// Zero-based position of `key` in `(score, key)` ascending order
    ///
    /// The store computes this by walking the set, so the cost is linear in
    /// the set size. Keep it off latency-sensitive paths.
    pub fn zrank(&self, name: &str, key: &str) -> Result<i64> {
        require(CommandType::ZRank, "name", name)?;
        require(CommandType::ZRank, "key", key)?;
        self.call(Command::ZRank { name, key })?.decode(decode_int)
    }

    /// Zero-based position of `key` in descending order
    ///
    /// Linear in the set size, like [`zrank`](Self::zrank).
    pub fn zrrank(&self, name: &str, key: &str) -> Result<i64> {
        require(CommandType::ZRRank, "name", name)?;
        require(CommandType::ZRRank, "key", key)?;
        self.call(Command::ZRRank { name, key })?.decode(decode_int)
    }

    // =========================================================================
    // Whole-set Operations
    // =========================================================================

    /// Number of members in set `name`
    pub fn zsize(&self, name: &str) -> Result<i64> {
        self.call(Command::ZSize { name })?.decode(decode_int)
    }

    /// Remove every member of set `name`; clearing an empty set succeeds
    pub fn zclear(&self, name: &str) -> Result<()> {
        self.call(Command::ZClear { name })?;
        Ok(())
    }

    /// List set names in `(name_start, name_end]`; empty strings are open ends
    pub fn zlist(&self, name_start: &str, name_end: &str, limit: u64) -> Result<Vec<String>> {
        let reply = self.call(Command::ZList {
            name_start,
            name_end,
            limit,
        })?;
        Ok(reply.payload)
    }

    // =========================================================================
    // Interval Operations
    // =========================================================================

    /// Count members whose score lies in `[start, end]`
    pub fn zcount(&self, name: &str, start: impl Into<Bound>, end: impl Into<Bound>) -> Result<i64> {
        self.call(Command::ZCount {
            name,
            start: start.into(),
            end: end.into(),
        })?
        .decode(decode_int)
    }

    /// Sum of scores in `[start, end]`
    pub fn zsum(&self, name: &str, start: impl Into<Bound>, end: impl Into<Bound>) -> Result<i64> {
        self.call(Command::ZSum {
            name,
            start: start.into(),
            end: end.into(),
        })?
        .decode(decode_int)
    }

    /// Average of scores in `[start, end]`
    pub fn zavg(&self, name: &str, start: impl Into<Bound>, end: impl Into<Bound>) -> Result<f64> {
        self.call(Command::ZAvg {
            name,
            start: start.into(),
            end: end.into(),
        })?
        .decode(decode_average)
    }

    /// Forward scan of `(key, score)` pairs, at most `limit` of them
    ///
    /// With `key_start` empty, members with `start <= score <= end` are
    /// returned. With `key_start` set, members at exactly `start` are only
    /// returned when their key sorts after `key_start`, which makes the last
    /// member of one page a valid anchor for the next.
    pub fn zscan(
        &self,
        name: &str,
        key_start: &str,
        start: impl Into<Bound>,
        end: impl Into<Bound>,
        limit: u64,
    ) -> Result<Vec<Member>> {
        self.call(Command::ZScan {
            name,
            key_start,
            start: start.into(),
            end: end.into(),
            limit,
        })?
        .decode(decode_pairs)
    }

    /// Reverse scan; `start` is the upper bound and `end` the lower bound
    pub fn zrscan(
        &self,
        name: &str,
        key_start: &str,
        start: impl Into<Bound>,
        end: impl Into<Bound>,
        limit: u64,
    ) -> Result<Vec<Member>> {
        self.call(Command::ZrScan {
            name,
            key_start,
            start: start.into(),
            end: end.into(),
            limit,
        })?
        .decode(decode_pairs)
    }

    /// Keys only, under the same rule as [`zscan`](Self::zscan)
    pub fn zkeys(
        &self,
        name: &str,
        key_start: &str,
        start: impl Into<Bound>,
        end: impl Into<Bound>,
        limit: u64,
    ) -> Result<Vec<String>> {
        let reply = self.call(Command::ZKeys {
            name,
            key_start,
            start: start.into(),
            end: end.into(),
            limit,
        })?;
        Ok(reply.payload)
    }

    /// Remove members whose rank lies in `[start, end]`
    pub fn zremrangebyrank(
        &self,
        name: &str,
        start: impl Into<Bound>,
        end: impl Into<Bound>,
    ) -> Result<()> {
        self.call(Command::ZRemRangeByRank {
            name,
            start: start.into(),
            end: end.into(),
        })?;
        Ok(())
    }

    /// Remove members whose score lies in `[start, end]`
    pub fn zremrangebyscore(
        &self,
        name: &str,
        start: impl Into<Bound>,
        end: impl Into<Bound>,
    ) -> Result<()> {
        self.call(Command::ZRemRangeByScore {
            name,
            start: start.into(),
            end: end.into(),
        })?;
        Ok(())
    }

    // =========================================================================
    // Offset Operations
    // =========================================================================
    //
    // The store walks `offset` members before returning anything, so these
    // get slower as `offset` grows. Prefer zscan with an anchor for paging.

    /// Members at positions `[offset, offset + limit)` as a map
    pub fn zrange(&self, name: &str, offset: u64, limit: u64) -> Result<HashMap<String, i64>> {
        self.call(Command::ZRange {
            name,
            offset,
            limit,
        })?
        .decode(decode_pair_map)
    }

    /// Members at positions `[offset, offset + limit)` in order
    pub fn zrange_slice(&self, name: &str, offset: u64, limit: u64) -> Result<Vec<Member>> {
        self.call(Command::ZRange {
            name,
            offset,
            limit,
        })?
        .decode(decode_pairs)
    }

    /// Members at reverse positions `[offset, offset + limit)` as a map
    pub fn zrrange(&self, name: &str, offset: u64, limit: u64) -> Result<HashMap<String, i64>> {
        self.call(Command::ZRRange {
            name,
            offset,
            limit,
        })?
        .decode(decode_pair_map)
    }

    /// Members at reverse positions `[offset, offset + limit)` in order
    pub fn zrrange_slice(&self, name: &str, offset: u64, limit: u64) -> Result<Vec<Member>> {
        self.call(Command::ZRRange {
            name,
            offset,
            limit,
        })?
        .decode(decode_pairs)
    }

    /// Remove and return up to `limit` lowest members
    pub fn zpop_front(&self, name: &str, limit: u64) -> Result<Vec<Member>> {
        self.call(Command::ZPopFront { name, limit })?
            .decode(decode_pairs)
    }

    /// Remove and return up to `limit` highest members, highest first
    pub fn zpop_back(&self, name: &str, limit: u64) -> Result<Vec<Member>> {
        self.call(Command::ZPopBack { name, limit })?
            .decode(decode_pairs)
    }

    // =========================================================================
    // Batch Operations
    // =========================================================================
    //
    // An empty batch returns an empty result without a round trip. A batch
    // either succeeds as a whole or fails with one error.

    /// Set many scores in one command
    ///
    /// Entries travel in iteration order; do not rely on how the store
    /// orders the writes.
    pub fn multi_zset<K, I>(&self, name: &str, entries: I) -> Result<()>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, i64)>,
    {
        let owned: Vec<(K, i64)> = entries.into_iter().collect();
        if owned.is_empty() {
            return Ok(());
        }
        let entries = owned.iter().map(|(k, s)| (k.as_ref(), *s)).collect();
        self.call(Command::MultiZSet { name, entries })?;
        Ok(())
    }

    /// Scores of the given keys that exist, as a map
    pub fn multi_zget<K: AsRef<str>>(&self, name: &str, keys: &[K]) -> Result<HashMap<String, i64>> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }
        let keys = keys.iter().map(|k| k.as_ref()).collect();
        self.call(Command::MultiZGet { name, keys })?
            .decode(decode_pair_map)
    }

    /// Scores of the given keys that exist, as parallel key/score sequences
    /// in reply order
    pub fn multi_zget_slice<K: AsRef<str>>(
        &self,
        name: &str,
        keys: &[K],
    ) -> Result<(Vec<String>, Vec<i64>)> {
        if keys.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }
        let keys = keys.iter().map(|k| k.as_ref()).collect();
        self.call(Command::MultiZGet { name, keys })?
            .decode(decode_columns)
    }

    /// Delete many keys in one command
    pub fn multi_zdel<K: AsRef<str>>(&self, name: &str, keys: &[K]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let keys = keys.iter().map(|k| k.as_ref()).collect();
        self.call(Command::MultiZDel { name, keys })?;
        Ok(())
    }
}
