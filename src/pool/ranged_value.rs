//! Time-indexed value store with an explicit valid range.
//!
//! Values are stored sparsely: only timestamps at which the value actually
//! changed hold an entry, while the ascending valid-times list records every
//! timestamp the stored values are known good for. Reads resolve to the entry
//! at the greatest stored time not newer than the requested one, which is
//! what gives consumers the "approximate, monotonic, never-regress" contract.

use crate::model::{TimeRange, TimeStamp};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub(crate) struct RangedValue<T> {
    /// Ascending timestamps the stored values are valid for.
    times: Vec<TimeStamp>,
    /// Values keyed by the timestamp at which they changed. Keys are a subset
    /// of `times`.
    values: BTreeMap<TimeStamp, T>,
}

impl<T: Clone> RangedValue<T> {
    pub(crate) fn new() -> Self {
        Self {
            times: Vec::new(),
            values: BTreeMap::new(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// The newest valid timestamp, or [`TimeStamp::ZERO`] if nothing was ever
    /// stored.
    pub(crate) fn last_time(&self) -> TimeStamp {
        self.times.last().copied().unwrap_or(TimeStamp::ZERO)
    }

    /// The most recently stored value.
    pub(crate) fn last(&self) -> Option<&T> {
        self.values.values().next_back()
    }

    pub(crate) fn time_range(&self) -> TimeRange {
        self.times.clone()
    }

    /// The value at the greatest stored timestamp not newer than `t`, if any.
    pub(crate) fn value_at(&self, t: TimeStamp) -> Option<&T> {
        self.values.range(..=t).next_back().map(|(_, value)| value)
    }

    /// Store a new value at `t`.
    ///
    /// `t` must be strictly newer than the current last time; the caller
    /// enforces this through its publication guard.
    pub(crate) fn add_value(&mut self, value: T, t: TimeStamp) {
        debug_assert!(t > self.last_time());
        self.times.push(t);
        self.values.insert(t, value);
    }

    /// Extend the valid range to `t` without storing a duplicate value.
    pub(crate) fn reuse_previous_value(&mut self, t: TimeStamp) {
        debug_assert!(!self.is_empty());
        if t > self.last_time() {
            self.times.push(t);
        }
    }

    /// Collapse every entry not newer than `t` into a single entry at `t`
    /// carrying the most recent of the collapsed values. Entries newer than
    /// `t` are untouched. A `t` older than everything stored is a no-op.
    pub(crate) fn invalidate_previous_values(&mut self, t: TimeStamp) {
        let Some(floor) = self.value_at(t).cloned() else {
            return;
        };

        self.times.retain(|&time| time > t);
        self.times.insert(0, t);

        let newer = self.values.split_off(&TimeStamp::from_raw(t.value() + 1));
        self.values = newer;
        self.values.insert(t, floor);
    }

    /// Collapse the oldest entries so that at most `max_entries` valid
    /// timestamps remain. A no-op when already within the bound.
    pub(crate) fn truncate_to(&mut self, max_entries: usize) {
        if max_entries == 0 || self.times.len() <= max_entries {
            return;
        }
        let floor = self.times[self.times.len() - max_entries];
        self.invalidate_previous_values(floor);
    }

    /// Drop everything.
    pub(crate) fn invalidate(&mut self) {
        self.times.clear();
        self.values.clear();
    }
}
