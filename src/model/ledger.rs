// src/model/ledger.rs

use serde::Serialize;
use std::collections::BTreeMap;

/// Quantities keyed by the absolute time at which they land.
///
/// Unlike a fixed-length delay pipe, every entry carries its own arrival
/// time, so two shipments sampled with different lead times can land on
/// the same tick and simply add up.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeLedger {
    entries: BTreeMap<u64, i64>,
}

impl TimeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` to whatever is already booked at `time`.
    pub fn add(&mut self, time: u64, amount: i64) {
        *self.entries.entry(time).or_insert(0) += amount;
    }

    /// Overwrites the entry at `time`.
    pub fn set(&mut self, time: u64, amount: i64) {
        self.entries.insert(time, amount);
    }

    /// Quantity booked at `time`, 0 when nothing is.
    pub fn get(&self, time: u64) -> i64 {
        self.entries.get(&time).copied().unwrap_or(0)
    }

    pub fn contains(&self, time: u64) -> bool {
        self.entries.contains_key(&time)
    }

    /// Entries with `from <= t <= to`, in time order.
    pub fn window(&self, from: u64, to: u64) -> impl Iterator<Item = (u64, i64)> + '_ {
        self.entries.range(from..=to).map(|(t, q)| (*t, *q))
    }

    /// Entries in `(now, now + horizon]`, keyed by offset from `now`.
    pub fn upcoming(&self, now: u64, horizon: u64) -> BTreeMap<u64, i64> {
        self.entries
            .range(now + 1..=now + horizon)
            .map(|(t, q)| (t - now, *q))
            .collect()
    }

    /// Drops every entry strictly before `cutoff`.
    pub fn prune_before(&mut self, cutoff: u64) {
        self.entries = self.entries.split_off(&cutoff);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, i64)> + '_ {
        self.entries.iter().map(|(t, q)| (*t, *q))
    }
}
