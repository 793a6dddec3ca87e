//! Sorted-set table
//!
//! One sorted set held in memory: a key → score index plus a
//! `(score, key)` ordered index kept in lockstep.

use std::collections::{BTreeSet, HashMap};

use crate::protocol::{Bound, Direction, Member, ScanRange, ScoreInterval};

/// In-memory sorted set
#[derive(Debug, Default, Clone)]
pub struct ZSetTable {
    /// key → score
    scores: HashMap<String, i64>,

    /// `(score, key)` ascending
    order: BTreeSet<(i64, String)>,
}

impl ZSetTable {
    /// Create a new empty table
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<i64> {
        self.scores.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.scores.contains_key(key)
    }

    /// Insert or update; returns true when the key is new
    pub fn set(&mut self, key: &str, score: i64) -> bool {
        match self.scores.insert(key.to_string(), score) {
            Some(old) => {
                self.order.remove(&(old, key.to_string()));
                self.order.insert((score, key.to_string()));
                false
            }
            None => {
                self.order.insert((score, key.to_string()));
                true
            }
        }
    }

    /// Remove a key; returns true when it existed
    pub fn remove(&mut self, key: &str) -> bool {
        match self.scores.remove(key) {
            Some(score) => {
                self.order.remove(&(score, key.to_string()));
                true
            }
            None => false,
        }
    }

    /// Add `by` to the score of `key` (missing keys start at 0)
    pub fn incr(&mut self, key: &str, by: i64) -> i64 {
        let score = self.get(key).unwrap_or(0).saturating_add(by);
        self.set(key, score);
        score
    }

    /// Members in `(score, key)` ascending order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, i64)> + '_ {
        self.order.iter().map(|(score, key)| (key.as_str(), *score))
    }

    fn walk(&self, direction: Direction) -> Box<dyn Iterator<Item = (&str, i64)> + '_> {
        match direction {
            Direction::Forward => Box::new(self.iter()),
            Direction::Reverse => Box::new(self.iter().rev()),
        }
    }

    // -------------------------------------------------------------------------
    // Rank
    // -------------------------------------------------------------------------

    /// Zero-based ascending position of `key`
    pub fn rank(&self, key: &str) -> Option<usize> {
        let score = self.get(key)?;
        Some(self.order.range(..(score, key.to_string())).count())
    }

    /// Zero-based descending position of `key`
    pub fn rrank(&self, key: &str) -> Option<usize> {
        self.rank(key).map(|rank| self.len() - 1 - rank)
    }

    /// Members at positions `[offset, offset + limit)` in the given direction
    pub fn range_by_rank(&self, offset: u64, limit: u64, direction: Direction) -> Vec<Member> {
        self.walk(direction)
            .skip(clamp(offset))
            .take(clamp(limit))
            .map(|(key, score)| Member::new(key, score))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Scans
    // -------------------------------------------------------------------------

    /// Members inside an anchored scan window, at most `limit`
    pub fn scan(&self, range: &ScanRange<'_>, limit: u64) -> Vec<Member> {
        let candidates: Box<dyn Iterator<Item = (&str, i64)> + '_> =
            match (range.direction, range.start.value()) {
                // Skip straight to the first score that can qualify.
                (Direction::Forward, Some(start)) => Box::new(
                    self.order
                        .range((start, String::new())..)
                        .map(|(score, key)| (key.as_str(), *score)),
                ),
                (direction, _) => self.walk(direction),
            };

        candidates
            .take_while(|(_, score)| !range.is_exhausted(*score))
            .filter(|(key, score)| range.admits(key, *score))
            .take(clamp(limit))
            .map(|(key, score)| Member::new(key, score))
            .collect()
    }

    /// Scores inside an inclusive interval, ascending
    pub fn scores_in(&self, interval: &ScoreInterval) -> impl Iterator<Item = i64> + '_ {
        let interval = *interval;
        self.iter()
            .map(|(_, score)| score)
            .filter(move |score| interval.contains(*score))
    }

    // -------------------------------------------------------------------------
    // Removal
    // -------------------------------------------------------------------------

    /// Remove and return up to `limit` members from one end
    pub fn pop(&mut self, limit: u64, direction: Direction) -> Vec<Member> {
        let popped = self.range_by_rank(0, limit, direction);
        for member in &popped {
            self.remove(&member.key);
        }
        popped
    }

    /// Remove members whose rank lies in `[start, end]`; returns the count
    pub fn remove_rank_range(&mut self, start: Bound, end: Bound) -> usize {
        let start = start.value().unwrap_or(0).max(0) as u64;
        let end = match end.value() {
            Some(end) if end < 0 => return 0,
            Some(end) => end as u64,
            None => u64::MAX,
        };
        if start > end {
            return 0;
        }
        let count = end.saturating_sub(start).saturating_add(1);
        let doomed = self.range_by_rank(start, count, Direction::Forward);
        for member in &doomed {
            self.remove(&member.key);
        }
        doomed.len()
    }

    /// Remove members whose score lies in `[start, end]`; returns the count
    pub fn remove_score_range(&mut self, interval: &ScoreInterval) -> usize {
        let doomed: Vec<String> = self
            .iter()
            .filter(|(_, score)| interval.contains(*score))
            .map(|(key, _)| key.to_string())
            .collect();
        for key in &doomed {
            self.remove(key);
        }
        doomed.len()
    }
}

fn clamp(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}
