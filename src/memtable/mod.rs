//! MemTable Module
//!
//! In-memory sorted-set store speaking the same command set as the remote
//! store.
//!
//! ## Responsibilities
//! - Hold named sorted sets (created on first insert, dropped when empty)
//! - Execute decoded commands with the remote store's reply shapes
//! - Serve as a loopback [`Transport`] for tests and embedding
//! - Back the development TCP server
//!
//! ## Data Structure Choice
//! A `BTreeMap` of set name → [`ZSetTable`] behind a `RwLock`:
//! - Ordered names for `zlist`
//! - Many concurrent readers, one writer

mod table;

pub use table::ZSetTable;

use std::collections::BTreeMap;
use std::ops::Bound as RangeBound;

use parking_lot::RwLock;

use crate::error::TransportError;
use crate::protocol::{
    decode_command, Command, Direction, Member, Response, ScanRange, ScoreInterval,
};
use crate::transport::Transport;

/// Thread-safe in-memory sorted-set store
#[derive(Debug, Default)]
pub struct MemStore {
    sets: RwLock<BTreeMap<String, ZSetTable>>,
}

impl MemStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of non-empty sets
    pub fn set_count(&self) -> usize {
        self.sets.read().len()
    }

    /// Decode and execute one wire command, returning reply tokens
    pub fn dispatch(&self, name: &str, args: &[String]) -> Vec<String> {
        let response = match decode_command(name, args) {
            Ok(command) => self.apply(command),
            Err(e) => {
                tracing::debug!("Rejected {}: {}", name, e);
                Response::client_error(&e.to_string())
            }
        };
        response.into_tokens()
    }

    /// Apply a decoded command
    ///
    /// Routes commands to read or write handlers
    pub fn apply(&self, command: Command<'_>) -> Response {
        match command {
            // ----------------------------------------------------------------
            // Reads
            // ----------------------------------------------------------------
            Command::ZGet { name, key } => self
                .read(name, |t| t.get(key))
                .flatten()
                .map_or_else(Response::not_found, Response::ok_int),
            Command::ZExists { name, key } => {
                let found = self.read(name, |t| t.contains(key)).unwrap_or(false);
                Response::ok_int(found as i64)
            }
            Command::ZSize { name } => {
                let size = self.read(name, |t| t.len()).unwrap_or(0);
                Response::ok_int(size as i64)
            }
            Command::ZCount { name, start, end } => {
                let interval = ScoreInterval::new(start, end);
                let count = self
                    .read(name, |t| t.scores_in(&interval).count())
                    .unwrap_or(0);
                Response::ok_int(count as i64)
            }
            Command::ZSum { name, start, end } => {
                let interval = ScoreInterval::new(start, end);
                let sum = self
                    .read(name, |t| {
                        t.scores_in(&interval)
                            .fold(0i64, |acc, s| acc.saturating_add(s))
                    })
                    .unwrap_or(0);
                Response::ok_int(sum)
            }
            Command::ZAvg { name, start, end } => {
                let interval = ScoreInterval::new(start, end);
                let (sum, count) = self
                    .read(name, |t| {
                        t.scores_in(&interval)
                            .fold((0i128, 0u64), |(sum, n), s| (sum + s as i128, n + 1))
                    })
                    .unwrap_or((0, 0));
                let avg = if count == 0 {
                    0.0
                } else {
                    sum as f64 / count as f64
                };
                Response::ok(vec![avg.to_string()])
            }
            Command::ZScan {
                name,
                key_start,
                start,
                end,
                limit,
            } => {
                let range = ScanRange::forward(key_start, start, end);
                pairs(self.read(name, |t| t.scan(&range, limit)))
            }
            Command::ZrScan {
                name,
                key_start,
                start,
                end,
                limit,
            } => {
                let range = ScanRange::reverse(key_start, start, end);
                pairs(self.read(name, |t| t.scan(&range, limit)))
            }
            Command::ZKeys {
                name,
                key_start,
                start,
                end,
                limit,
            } => {
                let range = ScanRange::forward(key_start, start, end);
                let keys = self
                    .read(name, |t| t.scan(&range, limit))
                    .unwrap_or_default()
                    .into_iter()
                    .map(|m| m.key)
                    .collect();
                Response::ok(keys)
            }
            Command::ZRank { name, key } => self
                .read(name, |t| t.rank(key))
                .flatten()
                .map_or_else(Response::not_found, |r| Response::ok_int(r as i64)),
            Command::ZRRank { name, key } => self
                .read(name, |t| t.rrank(key))
                .flatten()
                .map_or_else(Response::not_found, |r| Response::ok_int(r as i64)),
            Command::ZRange {
                name,
                offset,
                limit,
            } => pairs(self.read(name, |t| {
                t.range_by_rank(offset, limit, Direction::Forward)
            })),
            Command::ZRRange {
                name,
                offset,
                limit,
            } => pairs(self.read(name, |t| {
                t.range_by_rank(offset, limit, Direction::Reverse)
            })),
            Command::MultiZGet { name, keys } => {
                let found = self
                    .read(name, |t| {
                        keys.iter()
                            .filter_map(|k| t.get(k).map(|s| Member::new(*k, s)))
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default();
                pairs(Some(found))
            }
            Command::ZList {
                name_start,
                name_end,
                limit,
            } => Response::ok(self.list(name_start, name_end, limit)),

            // ----------------------------------------------------------------
            // Writes
            // ----------------------------------------------------------------
            Command::ZSet { name, key, score } => {
                let created = self.write(name, |t| t.set(key, score));
                Response::ok_int(created as i64)
            }
            Command::ZIncr { name, key, by } => {
                Response::ok_int(self.write(name, |t| t.incr(key, by)))
            }
            Command::ZDel { name, key } => {
                let removed = self.write_existing(name, |t| t.remove(key)).unwrap_or(false);
                Response::ok_int(removed as i64)
            }
            Command::ZClear { name } => {
                let removed = self.sets.write().remove(name).map_or(0, |t| t.len());
                Response::ok_int(removed as i64)
            }
            Command::MultiZSet { name, entries } => {
                let created = self.write(name, |t| {
                    entries.iter().filter(|(k, s)| t.set(k, *s)).count()
                });
                Response::ok_int(created as i64)
            }
            Command::MultiZDel { name, keys } => {
                let removed = self
                    .write_existing(name, |t| keys.iter().filter(|k| t.remove(k)).count())
                    .unwrap_or(0);
                Response::ok_int(removed as i64)
            }
            Command::ZRemRangeByRank { name, start, end } => {
                let removed = self
                    .write_existing(name, |t| t.remove_rank_range(start, end))
                    .unwrap_or(0);
                Response::ok_int(removed as i64)
            }
            Command::ZRemRangeByScore { name, start, end } => {
                let interval = ScoreInterval::new(start, end);
                let removed = self
                    .write_existing(name, |t| t.remove_score_range(&interval))
                    .unwrap_or(0);
                Response::ok_int(removed as i64)
            }
            Command::ZPopFront { name, limit } => {
                pairs(self.write_existing(name, |t| t.pop(limit, Direction::Forward)))
            }
            Command::ZPopBack { name, limit } => {
                pairs(self.write_existing(name, |t| t.pop(limit, Direction::Reverse)))
            }
        }
    }

    /// Run `f` on an existing set under the read lock
    fn read<R>(&self, name: &str, f: impl FnOnce(&ZSetTable) -> R) -> Option<R> {
        self.sets.read().get(name).map(f)
    }

    /// Run `f` on a set, creating it if missing; drops it if left empty
    fn write<R>(&self, name: &str, f: impl FnOnce(&mut ZSetTable) -> R) -> R {
        let mut sets = self.sets.write();
        let table = sets.entry(name.to_string()).or_default();
        let result = f(table);
        if table.is_empty() {
            sets.remove(name);
        }
        result
    }

    /// Run `f` on an existing set only; drops it if left empty
    fn write_existing<R>(&self, name: &str, f: impl FnOnce(&mut ZSetTable) -> R) -> Option<R> {
        let mut sets = self.sets.write();
        let table = sets.get_mut(name)?;
        let result = f(table);
        if table.is_empty() {
            sets.remove(name);
        }
        Some(result)
    }

    /// Set names in `(name_start, name_end]`
    fn list(&self, name_start: &str, name_end: &str, limit: u64) -> Vec<String> {
        let lower = if name_start.is_empty() {
            RangeBound::Unbounded
        } else {
            RangeBound::Excluded(name_start)
        };
        let upper = if name_end.is_empty() {
            RangeBound::Unbounded
        } else {
            RangeBound::Included(name_end)
        };
        if let (RangeBound::Excluded(lo), RangeBound::Included(hi)) = (lower, upper) {
            if lo >= hi {
                return Vec::new();
            }
        }

        let sets = self.sets.read();
        sets.range::<str, _>((lower, upper))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .map(|(name, _)| name.clone())
            .collect()
    }
}

fn pairs(members: Option<Vec<Member>>) -> Response {
    let members = members.unwrap_or_default();
    let mut payload = Vec::with_capacity(members.len() * 2);
    for member in members {
        payload.push(member.key);
        payload.push(member.score.to_string());
    }
    Response::ok(payload)
}

impl Transport for MemStore {
    fn execute(&self, command: &str, args: &[String]) -> Result<Vec<String>, TransportError> {
        Ok(self.dispatch(command, args))
    }
}
