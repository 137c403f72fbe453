//! Simulation observer trait for progress reporting and data collection.

use mc_core::{BuildingId, SimTime};
use mc_traffic::FleetTick;

use crate::spawner::Category;
use crate::visitor::Visitor;

/// Callbacks invoked by [`Sim::step`][crate::Sim::step] at key points in the
/// tick.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: score printer
///
/// ```rust,ignore
/// struct ScorePrinter;
///
/// impl SimObserver for ScorePrinter {
///     fn on_visitor_arrived(&mut self, now: SimTime, visitor: &Visitor, score: u32) {
///         println!("{now}: visitor {} arrived, score {score}", visitor.id);
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the start of each step, after the clock advanced.
    fn on_tick_start(&mut self, _now: SimTime) {}

    /// Called at the end of each step with the fleet's movement results.
    fn on_tick_end(&mut self, _now: SimTime, _fleet: &FleetTick) {}

    /// A visitor reached its city; `score` is the new total.
    fn on_visitor_arrived(&mut self, _now: SimTime, _visitor: &Visitor, _score: u32) {}

    /// A visitor ran out of time; `failures` is the new total.
    fn on_visitor_failed(&mut self, _now: SimTime, _visitor: &Visitor, _failures: u32) {}

    fn on_city_founded(&mut self, _now: SimTime, _city: BuildingId, _category: Category) {}

    /// Called when week `week` completes.
    fn on_week_end(&mut self, _now: SimTime, _week: u32) {}

    /// Called once, when the failure limit is reached.
    fn on_game_over(&mut self, _now: SimTime) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `step` but
/// don't want callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
