//! Range semantics
//!
//! Membership rules for interval and anchored scan queries. Members are
//! ordered by `(score, key)` ascending.
//!
//! ## Anchored scan (forward)
//! A member `(k, s)` qualifies when `s <= end` and
//! - `key_start` empty: `s >= start`
//! - `key_start` set: `s > start`, or `s == start && k > key_start`
//!
//! Score bounds are applied first, then the key tie-break. A reverse scan
//! mirrors this: `start` is the upper bound, `end` the lower bound, and the
//! tie-break keeps keys strictly below `key_start`.

use super::Bound;

/// Walk direction over the `(score, key)` ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// Inclusive score interval `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreInterval {
    pub start: Bound,
    pub end: Bound,
}

impl ScoreInterval {
    pub fn new(start: Bound, end: Bound) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, score: i64) -> bool {
        let above = self.start.value().map_or(true, |s| score >= s);
        let below = self.end.value().map_or(true, |e| score <= e);
        above && below
    }
}

/// Anchored scan window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRange<'a> {
    pub key_start: &'a str,
    pub start: Bound,
    pub end: Bound,
    pub direction: Direction,
}

impl<'a> ScanRange<'a> {
    pub fn forward(key_start: &'a str, start: Bound, end: Bound) -> Self {
        Self {
            key_start,
            start,
            end,
            direction: Direction::Forward,
        }
    }

    pub fn reverse(key_start: &'a str, start: Bound, end: Bound) -> Self {
        Self {
            key_start,
            start,
            end,
            direction: Direction::Reverse,
        }
    }

    /// Whether `(key, score)` lies inside the window
    pub fn admits(&self, key: &str, score: i64) -> bool {
        match self.direction {
            Direction::Forward => {
                if let Some(end) = self.end.value() {
                    if score > end {
                        return false;
                    }
                }
                match self.start.value() {
                    None => true,
                    Some(start) if self.key_start.is_empty() => score >= start,
                    Some(start) => score > start || (score == start && key > self.key_start),
                }
            }
            Direction::Reverse => {
                if let Some(end) = self.end.value() {
                    if score < end {
                        return false;
                    }
                }
                match self.start.value() {
                    None => true,
                    Some(start) if self.key_start.is_empty() => score <= start,
                    Some(start) => score < start || (score == start && key < self.key_start),
                }
            }
        }
    }

    /// True once `score` has walked past the far end of the window
    pub fn is_exhausted(&self, score: i64) -> bool {
        match (self.direction, self.end.value()) {
            (_, None) => false,
            (Direction::Forward, Some(end)) => score > end,
            (Direction::Reverse, Some(end)) => score < end,
        }
    }
}
