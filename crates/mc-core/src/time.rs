//! Simulation time model.
//!
//! # Design
//!
//! Time is a monotonically increasing millisecond counter, `SimTime`.  The
//! host calls `Sim::step(delta_ms)` once per frame; the clock accumulates
//! the deltas so that deadlines, timers, and claim timestamps all share one
//! exact integer time base (no floating-point drift).

use std::fmt;

// ── SimTime ──────────────────────────────────────────────────────────────────

/// Absolute simulated time in milliseconds since the simulation started.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    /// Return the time `ms` milliseconds after `self`.
    #[inline]
    pub fn offset(self, ms: u64) -> SimTime {
        SimTime(self.0 + ms)
    }

    /// Milliseconds elapsed from `earlier` to `self` (saturating).
    #[inline]
    pub fn since(self, earlier: SimTime) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    #[inline]
    pub fn as_secs_f32(self) -> f32 {
        self.0 as f32 / 1000.0
    }
}

impl std::ops::Add<u64> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: u64) -> SimTime {
        SimTime(self.0 + rhs)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}s", self.0 / 1000, self.0 % 1000)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Tracks the current simulated time and the number of ticks processed.
///
/// `SimClock` is cheap to copy and intentionally holds no heap data.
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Current simulated time.
    pub now: SimTime,
    /// Number of `advance` calls so far.
    pub ticks: u64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by one tick of `delta_ms` milliseconds.
    #[inline]
    pub fn advance(&mut self, delta_ms: u64) {
        self.now = self.now + delta_ms;
        self.ticks += 1;
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick {} @ {}", self.ticks, self.now)
    }
}
