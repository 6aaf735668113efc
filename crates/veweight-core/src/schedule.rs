//! Scheduled slope changes.
//!
//! Maps a period-aligned timestamp to the signed delta added to a timeline's
//! slope when replay lands on that boundary. A contribution that stops
//! decaying at `end` is scheduled as `-slope` at `end`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlopeSchedule {
    changes: BTreeMap<u64, i128>,
}

impl SlopeSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delta scheduled at `t` (zero when nothing is scheduled).
    pub fn at(&self, t: u64) -> i128 {
        self.changes.get(&t).copied().unwrap_or(0)
    }

    /// Add `delta` to the entry at `t`.
    pub fn add(&mut self, t: u64, delta: i128) {
        let value = self.at(t).saturating_add(delta);
        self.set(t, value);
    }

    /// Overwrite the entry at `t`. Zero removes it.
    pub fn set(&mut self, t: u64, value: i128) {
        if value == 0 {
            self.changes.remove(&t);
        } else {
            self.changes.insert(t, value);
        }
    }

    /// Entries in `(from, to]`, in time order.
    pub fn range(&self, from: u64, to: u64) -> impl Iterator<Item = (u64, i128)> + '_ {
        self.changes
            .range(from.saturating_add(1)..=to)
            .map(|(t, d)| (*t, *d))
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
