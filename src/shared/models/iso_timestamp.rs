//! ISO-8601 timestamps that order the way their text orders.
//!
//! Stored records carry timestamps as strings and every range query compares
//! them lexicographically. That is only sound while all values share one
//! zero-padded, offset-free layout, which is what `from_naive` produces.

use std::{
    fmt,
    ops::{Bound, RangeBounds},
};

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IsoTimestamp(String);

impl IsoTimestamp {
    /// Wrap a client-supplied value as-is.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// `YYYY-MM-DDTHH:MM:SS`, with `.ffffff` appended only when the
    /// microsecond part is non-zero.
    pub fn from_naive(at: NaiveDateTime) -> Self {
        let layout = if at.nanosecond() / 1_000 == 0 {
            "%Y-%m-%dT%H:%M:%S"
        } else {
            "%Y-%m-%dT%H:%M:%S%.6f"
        };
        Self(at.format(layout).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<NaiveDateTime> for IsoTimestamp {
    fn from(at: NaiveDateTime) -> Self {
        Self::from_naive(at)
    }
}

impl fmt::Display for IsoTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A window over timestamps, used by store filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRange {
    start: Bound<IsoTimestamp>,
    end: Bound<IsoTimestamp>,
}

impl TimeRange {
    /// Everything strictly earlier than `end`.
    pub fn before(end: impl Into<IsoTimestamp>) -> Self {
        Self {
            start: Bound::Unbounded,
            end: Bound::Excluded(end.into()),
        }
    }

    /// `[start, end]`, both ends included.
    pub fn inclusive(start: impl Into<IsoTimestamp>, end: impl Into<IsoTimestamp>) -> Self {
        Self {
            start: Bound::Included(start.into()),
            end: Bound::Included(end.into()),
        }
    }

    /// The same bounds over plain string slices, for ordered-key lookups.
    pub fn as_str_bounds(&self) -> (Bound<&str>, Bound<&str>) {
        (
            self.start.as_ref().map(IsoTimestamp::as_str),
            self.end.as_ref().map(IsoTimestamp::as_str),
        )
    }
}

impl RangeBounds<IsoTimestamp> for TimeRange {
    fn start_bound(&self) -> Bound<&IsoTimestamp> {
        self.start.as_ref()
    }

    fn end_bound(&self) -> Bound<&IsoTimestamp> {
        self.end.as_ref()
    }
}
