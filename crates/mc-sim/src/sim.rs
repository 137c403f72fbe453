//! The `Sim` struct and its per-step loop.

use rustc_hash::FxHashMap;
use tracing::{debug, info};

use mc_core::{BuildingId, NodeId, Point, SegmentId, SimClock, SimConfig, SimRng, SimTime, VehicleId, VisitorId};
use mc_network::{RoadMeta, RoadNetwork, Router, WaterRect};
use mc_traffic::{Fleet, VehicleOptions};

use crate::calendar::{Calendar, DayChange};
use crate::events::{EventQueue, SimEvent};
use crate::observer::SimObserver;
use crate::pollution::Pollution;
use crate::snapshot::{SegmentRecord, WorldSnapshot};
use crate::spawner::{Building, Category, Spawner};
use crate::visitor::{VisitOutcome, Visitors};
use crate::SimResult;

/// Interval between pollution samples.
const POLLUTION_SAMPLE_MS: u64 = 800;

/// Colour of random-traffic vehicles.
const RANDOM_TRAFFIC_COLOR: u32 = 0x90caf9;

/// Base speed and random spread of random-traffic vehicles.
const RANDOM_TRAFFIC_SPEED: (f32, f32) = (50.0, 60.0);

/// Base speed and random spread of visitor vehicles.
const VISITOR_SPEED: (f32, f32) = (70.0, 60.0);

/// Offsets of the two houses placed beside the first city.
const STARTER_HOUSES: [(f32, f32); 2] = [(160.0, 60.0), (-160.0, 60.0)];

/// Mid-week cities keep this far from the left, right and top edges.
const CITY_MARGIN: (f32, f32) = (160.0, 120.0);

/// Mid-week cities keep this far from the bottom edge.
const CITY_MARGIN_BOTTOM: f32 = 160.0;

/// Week-end houses appear within this distance of a road midpoint.
const WEEK_END_SPREAD: i32 = 80;

// ── SimStats ──────────────────────────────────────────────────────────────────

/// Game counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimStats {
    pub score: u32,
    pub failures: u32,
    pub visits_completed: u32,
    /// Random-traffic vehicles spawned.
    pub random_trips: u32,
    /// Trips abandoned because no route existed.
    pub trips_skipped: u32,
    /// Set once `failures` reaches the limit; spawning stops and counters
    /// freeze.
    pub game_over: bool,
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The complete simulation state.
///
/// Create via [`SimBuilder`][crate::SimBuilder].  The host drives it with
/// [`step`](Self::step) once per frame, or [`run_for`](Self::run_for) for
/// headless runs, and applies player edits through the edit methods so
/// that vehicles are re-attached after every rebuild.
pub struct Sim<R: Router> {
    pub config: SimConfig,
    pub clock: SimClock,
    pub rng: SimRng,

    /// Road geometry and the derived graph.
    pub network: RoadNetwork,

    /// Every live vehicle.
    pub fleet: Fleet,

    /// Pending house → city visits.
    pub visitors: Visitors,

    /// Houses and cities.
    pub spawner: Spawner,

    pub calendar: Calendar,
    pub pollution: Pollution,

    /// Scheduled timers and flag resets.
    pub events: EventQueue,

    pub stats: SimStats,

    pub router: R,

    /// Separate stream so pollution sampling leaves trip rolls unchanged.
    pollution_rng: SimRng,

    /// Latest time each flagged segment should stay `blocked` until.
    blocked_until: FxHashMap<SegmentId, SimTime>,
    started: bool,
}

impl<R: Router> Sim<R> {
    pub(crate) fn assemble(
        config: SimConfig,
        network: RoadNetwork,
        spawner: Spawner,
        calendar: Calendar,
        stats: SimStats,
        router: R,
    ) -> Self {
        let mut rng = SimRng::new(config.seed);
        let pollution_rng = rng.child(1);
        Self {
            rng,
            config,
            clock: SimClock::new(),
            network,
            fleet: Fleet::new(),
            visitors: Visitors::new(),
            spawner,
            calendar,
            pollution: Pollution::new(),
            events: EventQueue::new(),
            stats,
            router,
            pollution_rng,
            blocked_until: FxHashMap::default(),
            started: false,
        }
    }

    pub fn now(&self) -> SimTime {
        self.clock.now
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Found the first city if none exists and schedule the recurring
    /// timers.  Calling it again does nothing.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        if self.spawner.cities.is_empty() {
            let center = self.config.world.center();
            let city = self.found_city(center, None);
            let category = self.spawner.city(city).map(|c| c.category);
            for (dx, dy) in STARTER_HOUSES {
                self.place_house(center.offset(dx, dy), category);
            }
        }

        let now = self.clock.now;
        self.events.push(now + self.config.random_traffic_every_ms, SimEvent::RandomTraffic);
        self.events.push(now + self.config.visitor_wave_every_ms, SimEvent::VisitorWave);
        self.events.push(now + self.config.day_ms, SimEvent::DayElapsed);
        self.events.push(now + POLLUTION_SAMPLE_MS, SimEvent::PollutionSample);
        info!(
            cities = self.spawner.cities.len(),
            houses = self.spawner.houses.len(),
            segments = self.network.segment_count(),
            "simulation started"
        );
    }

    // ── Tick loop ─────────────────────────────────────────────────────────

    /// Advance the simulation by `delta_ms`.
    pub fn step<O: SimObserver>(&mut self, delta_ms: u64, observer: &mut O) {
        self.clock.advance(delta_ms);
        let now = self.clock.now;
        observer.on_tick_start(now);

        // ── Phase 1: fire due events ──────────────────────────────────────
        while let Some((due, event)) = self.events.pop_due(now) {
            self.handle_event(due, event, observer);
        }

        // ── Phase 2: move vehicles ────────────────────────────────────────
        let tick = self.fleet.update(&mut self.network, delta_ms, now);
        for &segment in &tick.held {
            self.flag_blocked(segment, now);
        }

        // ── Phase 3: resolve visitors ─────────────────────────────────────
        for outcome in self.visitors.resolve(&self.fleet, now, self.config.arrival_radius) {
            self.apply_outcome(outcome, now, observer);
        }

        // ── Phase 4: pollution decay ──────────────────────────────────────
        self.pollution.decay(delta_ms);

        observer.on_tick_end(now, &tick);
    }

    /// Run fixed `config.tick_ms` steps until `duration_ms` has elapsed.
    /// A final shorter step covers any remainder.
    pub fn run_for<O: SimObserver>(&mut self, duration_ms: u64, observer: &mut O) {
        let tick_ms = self.config.tick_ms;
        let mut remaining = duration_ms;
        while remaining > 0 {
            let delta = remaining.min(tick_ms);
            self.step(delta, observer);
            remaining -= delta;
        }
    }

    /// Run exactly `n` steps of `config.tick_ms`.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            self.step(self.config.tick_ms, observer);
        }
    }

    fn handle_event<O: SimObserver>(&mut self, due: SimTime, event: SimEvent, observer: &mut O) {
        match event {
            SimEvent::RandomTraffic => {
                self.spawn_random_traffic();
                self.events.push(due + self.config.random_traffic_every_ms, event);
            }
            SimEvent::VisitorWave => {
                self.maybe_spawn_visitors(due);
                self.events.push(due + self.config.visitor_wave_every_ms, event);
            }
            SimEvent::DayElapsed => {
                self.advance_day(due, observer);
                self.events.push(due + self.config.day_ms, event);
            }
            SimEvent::PollutionSample => {
                self.pollution.sample(&self.network, &mut self.pollution_rng);
                self.events.push(due + POLLUTION_SAMPLE_MS, event);
            }
            SimEvent::ClearBlocked(segment) => match self.blocked_until.get(&segment).copied() {
                Some(until) if until > due => self.events.push(until, event),
                Some(_) => {
                    self.blocked_until.remove(&segment);
                    self.network.set_blocked(segment, false);
                }
                None => {}
            },
        }
    }

    /// Raise a segment's `blocked` flag for `config.blocked_flag_ms`.
    fn flag_blocked(&mut self, segment: SegmentId, now: SimTime) {
        self.network.set_blocked(segment, true);
        let until = now + self.config.blocked_flag_ms;
        if self.blocked_until.insert(segment, until).is_none() {
            self.events.push(until, SimEvent::ClearBlocked(segment));
        }
    }

    fn apply_outcome<O: SimObserver>(&mut self, outcome: VisitOutcome, now: SimTime, observer: &mut O) {
        match outcome {
            VisitOutcome::Arrived(visitor) => {
                self.fleet.despawn(&mut self.network, visitor.vehicle);
                if self.stats.game_over {
                    return;
                }
                self.stats.score += self.config.score_per_visit;
                self.stats.visits_completed += 1;
                info!(visitor = %visitor.id, score = self.stats.score, "visitor arrived");
                observer.on_visitor_arrived(now, &visitor, self.stats.score);
            }
            VisitOutcome::Failed(visitor) => {
                self.fleet.despawn(&mut self.network, visitor.vehicle);
                if self.stats.game_over {
                    return;
                }
                self.stats.failures += 1;
                info!(
                    visitor = %visitor.id,
                    failures = self.stats.failures,
                    limit = self.config.failure_limit,
                    "visitor failed"
                );
                observer.on_visitor_failed(now, &visitor, self.stats.failures);
                if self.stats.failures >= self.config.failure_limit {
                    self.stats.game_over = true;
                    info!(score = self.stats.score, week = self.calendar.week, "game over");
                    observer.on_game_over(now);
                }
            }
        }
    }

    // ── Calendar ──────────────────────────────────────────────────────────

    fn advance_day<O: SimObserver>(&mut self, now: SimTime, observer: &mut O) {
        match self.calendar.advance_day() {
            DayChange::Day => {}
            DayChange::MidWeek => {
                let w = self.config.world;
                let x = self.between(w.min.x + CITY_MARGIN.0, w.max.x - CITY_MARGIN.0);
                let y = self.between(w.min.y + CITY_MARGIN.1, w.max.y - CITY_MARGIN_BOTTOM);
                let city = self.found_city(Point::new(x, y), None);
                if let Some(c) = self.spawner.city(city) {
                    observer.on_city_founded(now, city, c.category);
                }
            }
            DayChange::WeekEnd { completed } => {
                self.place_week_end_houses();
                info!(week = completed, houses = self.spawner.houses.len(), "week completed");
                observer.on_week_end(now, completed);
            }
        }
    }

    /// Uniform whole-unit coordinate in `[lo, hi]`, or the midpoint if the
    /// range is empty.
    fn between(&mut self, lo: f32, hi: f32) -> f32 {
        if hi < lo {
            return (lo + hi) * 0.5;
        }
        self.rng.gen_range(lo.round() as i32..=hi.round() as i32) as f32
    }

    /// Place `max(1, segments / 2)` houses near the midpoints of random
    /// segments, each with the category of a random city.
    fn place_week_end_houses(&mut self) {
        let count = (self.network.segment_count() / 2).max(1);
        for _ in 0..count {
            let len = self.network.segment_count();
            if len == 0 {
                break;
            }
            let pick = self.rng.gen_range(0..len);
            let Some(mid) = self
                .network
                .segments
                .values()
                .nth(pick)
                .and_then(|s| s.points.get(s.points.len() / 2).copied())
            else {
                continue;
            };
            let dx = self.rng.gen_range(-WEEK_END_SPREAD..=WEEK_END_SPREAD) as f32;
            let dy = self.rng.gen_range(-WEEK_END_SPREAD..=WEEK_END_SPREAD) as f32;
            let category = self.rng.choose(&self.spawner.cities).map(|c| c.category);
            self.place_house(mid.offset(dx, dy), category);
        }
    }

    // ── Trips ─────────────────────────────────────────────────────────────

    /// Lowest-cost node path between two nodes of the current graph.
    pub fn find_path_nodes(&self, start: NodeId, goal: NodeId) -> Option<Vec<NodeId>> {
        self.router.find_path(&self.network, start, goal)
    }

    /// Route and spawn a vehicle between `start` and `goal`.
    ///
    /// Returns `None`, counting a skipped trip, if no route exists.
    pub fn spawn_trip(&mut self, start: NodeId, goal: NodeId, opts: VehicleOptions) -> Option<VehicleId> {
        let legs = self
            .find_path_nodes(start, goal)
            .map(|path| self.network.node_path_to_legs(&path))
            .unwrap_or_default();
        if legs.is_empty() {
            self.stats.trips_skipped += 1;
            debug!(%start, %goal, "no route, trip skipped");
            return None;
        }
        Some(self.fleet.spawn(&mut self.network, &legs, opts))
    }

    /// Spawn one vehicle between two distinct random nodes.
    pub fn spawn_random_traffic(&mut self) -> Option<VehicleId> {
        let n = self.network.node_count();
        if self.stats.game_over || n < 2 {
            return None;
        }
        let start = self.rng.gen_range(0..n);
        let mut goal = self.rng.gen_range(0..n);
        if goal == start {
            goal = (start + 1) % n;
        }
        let (start, goal) = (NodeId::try_from(start).ok()?, NodeId::try_from(goal).ok()?);
        let speed = RANDOM_TRAFFIC_SPEED.0 + self.rng.gen_range(0.0..RANDOM_TRAFFIC_SPEED.1);
        let opts = VehicleOptions { speed, color: RANDOM_TRAFFIC_COLOR, show_route: false, visitor: None };
        let id = self.spawn_trip(start, goal, opts)?;
        self.stats.random_trips += 1;
        Some(id)
    }

    /// Roll every house for a visitor.  Returns the visitors spawned.
    pub fn maybe_spawn_visitors(&mut self, now: SimTime) -> Vec<VisitorId> {
        if self.stats.game_over || self.spawner.houses.is_empty() || self.spawner.cities.is_empty() {
            return Vec::new();
        }
        let houses: Vec<Building> = self.spawner.houses.clone();
        let mut spawned = Vec::new();
        for house in houses {
            if self.rng.gen_bool(self.config.visitor_probability) {
                spawned.extend(self.spawn_visitor(house, now));
            }
        }
        spawned
    }

    /// Send a visitor from `house` to a random city of its category.
    pub fn spawn_visitor(&mut self, house: Building, now: SimTime) -> Option<VisitorId> {
        let cities: Vec<Building> = self.spawner.cities_of(house.category).copied().collect();
        let city = *self.rng.choose(&cities)?;
        let start = self.network.find_nearest_node(house.pos)?;
        let goal = self.network.find_nearest_node(city.pos)?;

        let speed = VISITOR_SPEED.0 + self.rng.gen_range(0.0..VISITOR_SPEED.1);
        let id = self.visitors.peek_id();
        let opts = VehicleOptions { speed, color: house.category.color(), show_route: true, visitor: Some(id) };
        let vehicle = self.spawn_trip(start, goal, opts)?;

        let deadline = now + self.config.visitor_time_limit_ms();
        debug!(visitor = %id, house = %house.id, city = %city.id, %deadline, "visitor spawned");
        Some(self.visitors.add(house.id, city.id, city.pos, vehicle, deadline))
    }

    // ── Buildings ─────────────────────────────────────────────────────────

    /// Found a city (plus its houses) and connect everything to the roads.
    pub fn found_city(&mut self, pos: Point, category: Option<Category>) -> BuildingId {
        let id = self.spawner.make_city(&mut self.network, &mut self.rng, pos, category);
        self.fleet.on_graph_rebuilt(&mut self.network);
        id
    }

    pub fn place_house(&mut self, pos: Point, category: Option<Category>) -> BuildingId {
        let id = self.spawner.make_house(&mut self.network, &mut self.rng, pos, category);
        self.fleet.on_graph_rebuilt(&mut self.network);
        id
    }

    // ── Edits ─────────────────────────────────────────────────────────────

    /// Draw a road.  See [`RoadNetwork::add_road`].
    pub fn add_road(&mut self, points: &[Point], meta: RoadMeta) -> SimResult<SegmentId> {
        let id = self.network.add_road(points, meta)?;
        self.fleet.on_graph_rebuilt(&mut self.network);
        Ok(id)
    }

    pub fn place_roundabout(&mut self, center: Point) -> Vec<SegmentId> {
        let ids = self.network.place_roundabout(center);
        self.fleet.on_graph_rebuilt(&mut self.network);
        ids
    }

    pub fn connect_building(&mut self, p: Point) -> Option<SegmentId> {
        let id = self.network.connect_building(p)?;
        self.fleet.on_graph_rebuilt(&mut self.network);
        Some(id)
    }

    pub fn add_lake(&mut self, center: Point) -> WaterRect {
        self.network.add_lake(center)
    }

    /// Remove roads near `p` and every vehicle routed over them.
    pub fn bulldoze_at(&mut self, p: Point) -> Vec<SegmentId> {
        let removed = self.network.bulldoze_at(p);
        if removed.is_empty() {
            return removed;
        }
        for id in &removed {
            self.blocked_until.remove(id);
        }
        self.fleet.remove_routed_over(&mut self.network, &removed);
        self.fleet.on_graph_rebuilt(&mut self.network);
        removed
    }

    // ── Persistence ───────────────────────────────────────────────────────

    /// Authored layout and progress, without vehicles or visitors.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            week: self.calendar.week,
            day_index: self.calendar.day_index,
            score: self.stats.score,
            segments: self
                .network
                .segments
                .values()
                .map(|s| SegmentRecord { points: s.points.clone(), meta: s.meta })
                .collect(),
            cities: self.spawner.cities.clone(),
            houses: self.spawner.houses.clone(),
            water: self.network.water.clone(),
        }
    }
}
