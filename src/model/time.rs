//! Monotonic version tags for causally-ordered scene snapshots.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonic version tag identifying a causally-ordered state snapshot.
///
/// Once any consumer has observed a given `TimeStamp`, the state associated
/// with it never changes. The zero value is reserved: no [`FrameClock`] ever
/// produces it, so it can safely denote "never" (e.g. the initial
/// last-render-request watermark of a manager).
///
/// [`FrameClock`]: crate::model::FrameClock
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TimeStamp(u64);

impl TimeStamp {
    /// The reserved "never produced" tag.
    pub const ZERO: TimeStamp = TimeStamp(0);

    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for TimeStamp {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TimeStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Ascending, inclusive set of timestamps for which representations can be
/// displayed without blocking.
pub type TimeRange = Vec<TimeStamp>;
