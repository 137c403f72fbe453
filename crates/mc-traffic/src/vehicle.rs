//! Per-vehicle motion along a flattened multi-leg route.
//!
//! # Route layout
//!
//! A route is flattened into one point list.  Each [`LegRange`] maps an
//! inclusive index range back to the segment it runs on; consecutive legs
//! share their junction point, so `legs[i].end == legs[i + 1].start`.
//!
//! # Occupancy
//!
//! A vehicle counts towards exactly one segment at a time: the segment of
//! its current leg.  [`Vehicle::board`] adds it to the first leg, each
//! junction crossing moves it from one leg to the next, and
//! [`Vehicle::destroy`] removes it once.

use rustc_hash::FxHashSet;
use tracing::trace;

use mc_core::{NodeId, Point, SegmentId, SimTime, VehicleId, VisitorId};
use mc_network::{Claim, RoadNetwork, RouteLeg};

use crate::arbitration::can_proceed;
use crate::{TrafficError, TrafficResult};

/// Congestion slowdown never goes below this factor.
pub const CONGESTION_FLOOR: f32 = 0.25;

/// Capacity assumed for segments whose capacity was never derived.
const FALLBACK_CAPACITY: u32 = 6;

/// Speed bonus on priority-3+ roads.
const FAST_LANE_BONUS: f32 = 1.25;

/// Speed multiplier for a segment with the given load and priority.
///
/// `max(0.25, 1 − 0.6 × min(1.5, occupancy / capacity))`, ×1.25 on
/// highways.
pub fn congestion_factor(occupancy: u32, capacity: u32, priority: u8) -> f32 {
    let capacity = if capacity == 0 { FALLBACK_CAPACITY } else { capacity };
    let util = (occupancy as f32 / capacity as f32).min(1.5);
    let factor = (1.0 - 0.6 * util).max(CONGESTION_FLOOR);
    if priority >= 3 { factor * FAST_LANE_BONUS } else { factor }
}

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VehicleState {
    Moving,
    /// Held at the end of a leg until arbitration grants the junction.
    Waiting,
}

/// Inclusive range of flattened path indices travelled on one segment.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LegRange {
    pub segment: SegmentId,
    pub start: usize,
    pub end: usize,
}

/// Spawn-time vehicle settings.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VehicleOptions {
    /// Units per second before congestion.
    pub speed: f32,
    /// Display colour, `0xRRGGBB`.
    pub color: u32,
    /// Keep the route overlay visible while travelling.
    pub show_route: bool,
    pub visitor: Option<VisitorId>,
}

impl Default for VehicleOptions {
    fn default() -> Self {
        Self { speed: 100.0, color: 0xffc107, show_route: false, visitor: None }
    }
}

/// What a single [`Vehicle::advance`] call did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Advance {
    /// Nothing to do: inert, retired, or already at the last point.
    Idle,
    Moved,
    /// Reached the end of a leg and was denied the junction this tick.
    Held { segment: SegmentId, node: NodeId },
    /// Still waiting on a junction from an earlier tick.
    Waiting,
    /// Reached the last point of the route this tick.
    Arrived,
}

/// A simulated vehicle.
#[derive(Clone, Debug)]
pub struct Vehicle {
    pub id: VehicleId,

    /// Flattened route points.
    pub path: Vec<Point>,
    pub legs: Vec<LegRange>,

    /// Index of the last path point reached.
    pub index: usize,
    /// Index into `legs` of the leg being travelled.
    pub leg: usize,

    pub pos: Point,
    /// Direction of travel in radians.
    pub heading: f32,
    pub speed: f32,
    pub color: u32,
    pub show_route: bool,
    pub visitor: Option<VisitorId>,

    pub state: VehicleState,
    pub waiting_on: Option<NodeId>,
    /// When the current wait started.
    pub waiting_since: Option<SimTime>,
    /// Path index at which the junction lock is released.
    pub release_at: Option<usize>,

    retired: bool,
}

impl Vehicle {
    /// Build a vehicle from router legs.
    ///
    /// Legs with fewer than two points are skipped.  Fewer than two route
    /// points yield an inert vehicle that never moves and occupies nothing.
    pub fn from_legs(id: VehicleId, legs: &[RouteLeg], opts: VehicleOptions) -> Self {
        let mut path: Vec<Point> = Vec::new();
        let mut ranges: Vec<LegRange> = Vec::new();

        for leg in legs {
            if leg.points.len() < 2 {
                continue;
            }
            let first = leg.points[0];
            let start = match path.last() {
                Some(&last) if last == first => {
                    path.extend_from_slice(&leg.points[1..]);
                    path.len() - leg.points.len()
                }
                _ => {
                    let start = path.len();
                    path.extend_from_slice(&leg.points);
                    start
                }
            };
            ranges.push(LegRange { segment: leg.segment, start, end: path.len() - 1 });
        }

        if path.len() < 2 {
            ranges.clear();
        }

        let pos = path.first().copied().unwrap_or_default();
        let heading = match (path.first(), path.get(1)) {
            (Some(&a), Some(&b)) => {
                let d = a.to(b);
                d.y.atan2(d.x)
            }
            _ => 0.0,
        };

        Self {
            id,
            path,
            legs: ranges,
            index: 0,
            leg: 0,
            pos,
            heading,
            speed: opts.speed,
            color: opts.color,
            show_route: opts.show_route,
            visitor: opts.visitor,
            state: VehicleState::Moving,
            waiting_on: None,
            waiting_since: None,
            release_at: None,
            retired: false,
        }
    }

    /// Build a vehicle that drives whole segments in order.
    ///
    /// Each segment is oriented to continue from the previous one; the
    /// first is reversed if that is what joins it to the second.
    /// Degenerate segments are left out.
    ///
    /// # Errors
    ///
    /// [`TrafficError::UnknownSegment`] if any id is missing from `network`.
    pub fn from_segments(
        id: VehicleId,
        network: &RoadNetwork,
        segments: &[SegmentId],
        opts: VehicleOptions,
    ) -> TrafficResult<Self> {
        let mut legs: Vec<RouteLeg> = Vec::with_capacity(segments.len());
        for &sid in segments {
            let seg = network.segment(sid).ok_or(TrafficError::UnknownSegment(sid))?;
            if seg.is_degenerate() {
                continue;
            }
            legs.push(RouteLeg { segment: sid, points: seg.points.clone() });
        }

        if let [first, second, ..] = legs.as_mut_slice() {
            let joins = |p: Option<&Point>| {
                p.is_some_and(|p| second.points.first() == Some(p) || second.points.last() == Some(p))
            };
            if !joins(first.points.last()) && joins(first.points.first()) {
                first.points.reverse();
            }
        }
        for i in 1..legs.len() {
            let tail = legs[i - 1].points.last().copied();
            let leg = &mut legs[i];
            if leg.points.first().copied() != tail && leg.points.last().copied() == tail {
                leg.points.reverse();
            }
        }

        Ok(Self::from_legs(id, &legs, opts))
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// A route with fewer than two points.
    #[inline]
    pub fn is_inert(&self) -> bool {
        self.path.len() < 2
    }

    #[inline]
    pub fn is_retired(&self) -> bool {
        self.retired
    }

    /// Sitting on the last point of its route.
    #[inline]
    pub fn is_finished(&self) -> bool {
        !self.is_inert() && self.index + 1 >= self.path.len()
    }

    /// Segment of the current leg.
    pub fn current_segment(&self) -> Option<SegmentId> {
        self.legs.get(self.leg).map(|l| l.segment)
    }

    /// The route still ahead passes over `segment`.
    pub fn routes_over(&self, segments: &FxHashSet<SegmentId>) -> bool {
        self.legs[self.leg.min(self.legs.len())..]
            .iter()
            .any(|l| segments.contains(&l.segment))
    }

    /// Direction from the current path point to the next one.
    ///
    /// A vehicle held at a junction sits on the end of its leg, so this is
    /// the first stretch past the junction.  The last point reuses the final
    /// stretch.
    pub fn approach(&self) -> Point {
        let i = self.index.min(self.path.len().saturating_sub(2));
        match (self.path.get(i), self.path.get(i + 1)) {
            (Some(&a), Some(&b)) if a != b => a.to(b),
            _ => Point::new(1.0, 0.0),
        }
    }

    /// Speed multiplier from the current segment's load.
    pub fn congestion_factor(&self, network: &RoadNetwork) -> f32 {
        self.current_segment()
            .and_then(|s| network.segment(s))
            .map_or(1.0, |s| congestion_factor(s.occupancy, s.capacity, s.meta.priority))
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Count this vehicle on its first leg.
    pub fn board(&self, network: &mut RoadNetwork) {
        if let Some(first) = self.legs.first() {
            network.occupy(first.segment);
        }
    }

    /// Release locks and claims and leave the current segment.
    ///
    /// Returns `false` if the vehicle was already destroyed.
    pub fn destroy(&mut self, network: &mut RoadNetwork) -> bool {
        if self.retired {
            return false;
        }
        self.retired = true;
        if let Some(seg) = self.current_segment() {
            network.vacate(seg);
        }
        network.release_locks_held_by(self.id);
        network.remove_claims_of(self.id);
        self.waiting_on = None;
        self.release_at = None;
        true
    }

    /// Re-attach a waiting vehicle to the node at its junction point after
    /// the graph was rebuilt.  Locks do not survive a rebuild.
    pub fn reattach(&mut self, network: &mut RoadNetwork) {
        self.release_at = None;
        if self.state != VehicleState::Waiting {
            return;
        }
        let junction = self.legs.get(self.leg).and_then(|l| self.path.get(l.end)).copied();
        let node = junction.and_then(|p| network.node_at(p));
        self.waiting_on = node;
        match node.and_then(|n| network.node_mut(n)) {
            Some(n) => n.enqueue(Claim {
                vehicle: self.id,
                approach: self.approach(),
                since: self.waiting_since.unwrap_or_default(),
            }),
            None => {
                self.state = VehicleState::Moving;
                self.waiting_since = None;
            }
        }
    }

    // ── Motion ────────────────────────────────────────────────────────────

    /// Move for `elapsed_ms`, crossing or queueing at junctions on the way.
    ///
    /// `live` is the set of vehicles present this tick; claims by anyone
    /// else are stale.
    pub fn advance(
        &mut self,
        network: &mut RoadNetwork,
        live: &FxHashSet<VehicleId>,
        now: SimTime,
        elapsed_ms: u64,
    ) -> Advance {
        if self.retired || self.is_inert() {
            return Advance::Idle;
        }

        if self.state == VehicleState::Waiting {
            let node = self.waiting_on;
            let granted = match node.and_then(|n| network.node_mut(n)) {
                Some(n) => can_proceed(n, self.id, self.approach(), live, now),
                None => true,
            };
            if !granted {
                return Advance::Waiting;
            }
            trace!(vehicle = %self.id, "junction granted after wait");
            self.cross_junction(network, node);
            self.state = VehicleState::Moving;
            self.waiting_on = None;
            self.waiting_since = None;
        }

        if self.is_finished() {
            return Advance::Idle;
        }

        let a = self.path[self.index];
        let b = self.path[self.index + 1];
        if a == b {
            self.index += 1;
            return Advance::Moved;
        }

        let factor = self.congestion_factor(network);
        let step = self.speed * factor * elapsed_ms as f32 / 1000.0;
        let dir = a.to(b);
        self.heading = dir.y.atan2(dir.x);

        let remaining = self.pos.distance(b);
        if step < remaining {
            let len = dir.length();
            self.pos = self.pos.offset(dir.x / len * step, dir.y / len * step);
            return Advance::Moved;
        }

        self.pos = b;
        self.index += 1;

        if self.release_at.is_some_and(|r| self.index >= r) {
            network.release_locks_held_by(self.id);
            self.release_at = None;
        }

        let at_leg_end = self.legs.get(self.leg).is_some_and(|l| self.index >= l.end);
        if at_leg_end && self.leg + 1 < self.legs.len() {
            if let Some(held) = self.enter_junction(network, live, now) {
                return held;
            }
        }

        if self.is_finished() { Advance::Arrived } else { Advance::Moved }
    }

    /// Ask for the junction at the end of the current leg.  Returns
    /// `Some(Advance::Held)` when denied.
    fn enter_junction(
        &mut self,
        network: &mut RoadNetwork,
        live: &FxHashSet<VehicleId>,
        now: SimTime,
    ) -> Option<Advance> {
        let cur = self.legs[self.leg];
        let node = network.node_at(self.path[cur.end]);
        let approach = self.approach();

        if let Some(n) = node.and_then(|n| network.node_mut(n)) {
            if !can_proceed(n, self.id, approach, live, now) {
                n.enqueue(Claim { vehicle: self.id, approach, since: now });
                self.state = VehicleState::Waiting;
                self.waiting_on = Some(n.id);
                self.waiting_since = Some(now);
                self.index = cur.end;
                trace!(vehicle = %self.id, node = %n.id, "held at junction");
                return Some(Advance::Held { segment: cur.segment, node: n.id });
            }
        }

        self.cross_junction(network, node);
        None
    }

    /// Take the junction lock and move occupancy onto the next leg.
    fn cross_junction(&mut self, network: &mut RoadNetwork, node: Option<NodeId>) {
        if let Some(n) = node.and_then(|n| network.node_mut(n)) {
            n.try_reserve(self.id);
            n.dequeue(self.id);
        }
        let Some(next) = self.legs.get(self.leg + 1).copied() else {
            return;
        };
        network.vacate(self.legs[self.leg].segment);
        network.occupy(next.segment);
        self.leg += 1;
        self.release_at = Some(next.start + 1);
    }
}
