//! `EventQueue`: time-ordered scheduled simulation events.
//!
//! Every timer in the simulation (traffic and visitor waves, the day
//! counter, pollution sampling, blocked-flag resets) is an entry here.
//! Recurring timers push their next occurrence when they fire, so there is
//! no hidden timer state outside the queue.
//!
//! `BTreeMap` keeps entries ordered by due time; events due at the same
//! instant fire in insertion order.

use std::collections::BTreeMap;

use mc_core::{SegmentId, SimTime};

/// Something the simulation must do at a given time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    /// Spawn one random-traffic vehicle.
    RandomTraffic,
    /// Roll every house for a visitor trip.
    VisitorWave,
    /// Advance the calendar by one day.
    DayElapsed,
    /// Emit pollution puffs from occupied segments.
    PollutionSample,
    /// Clear a segment's `blocked` display flag.
    ClearBlocked(SegmentId),
}

#[derive(Debug, Default)]
pub struct EventQueue {
    inner: BTreeMap<SimTime, Vec<SimEvent>>,
    /// Cached total event count for O(1) `len()`.
    total: usize,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` to fire at `at`.
    pub fn push(&mut self, at: SimTime, event: SimEvent) {
        self.inner.entry(at).or_default().push(event);
        self.total += 1;
    }

    /// Remove and return the earliest event due at or before `now`.
    ///
    /// Events pushed while draining are seen by later calls, so a recurring
    /// timer that re-schedules itself within `now` fires again in the same
    /// drain loop.
    pub fn pop_due(&mut self, now: SimTime) -> Option<(SimTime, SimEvent)> {
        let mut entry = self.inner.first_entry()?;
        let at = *entry.key();
        if at > now {
            return None;
        }
        let event = entry.get_mut().remove(0);
        if entry.get().is_empty() {
            entry.remove();
        }
        self.total -= 1;
        Some((at, event))
    }

    /// The earliest time with at least one queued event.
    pub fn next_time(&self) -> Option<SimTime> {
        self.inner.keys().next().copied()
    }

    /// `true` if an event equal to `event` is queued at any time.
    pub fn contains(&self, event: SimEvent) -> bool {
        self.inner.values().any(|v| v.contains(&event))
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of distinct future times that have at least one event.
    pub fn time_count(&self) -> usize {
        self.inner.len()
    }
}
