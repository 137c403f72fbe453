//! Unit tests for mc-sim.
//!
//! Most scenarios use a "quiet" sim built with `auto_start(false)`: no city,
//! no timers, so every vehicle and visitor in it was placed by the test.

#[cfg(test)]
mod helpers {
    use mc_core::{BuildingId, Point, SimConfig, SimTime};
    use mc_network::AStarRouter;
    use mc_traffic::FleetTick;

    use crate::{Building, Category, Sim, SimBuilder, SimObserver, Visitor};

    pub fn pt(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    pub fn quiet(config: SimConfig) -> Sim<AStarRouter> {
        SimBuilder::new(config, AStarRouter).auto_start(false).build().unwrap()
    }

    /// Quiet sim with one 512-unit street from (64,320) to (576,320), a red
    /// house at its west end and a red city at its east end.  Neither
    /// building has a driveway.
    pub fn commute(config: SimConfig) -> (Sim<AStarRouter>, Building) {
        let mut sim = quiet(config);
        sim.add_road(&[pt(64.0, 320.0), pt(576.0, 320.0)], Default::default()).unwrap();
        let house = Building { id: BuildingId(100), pos: pt(64.0, 320.0), category: Category::Red };
        let city = Building { id: BuildingId(101), pos: pt(576.0, 320.0), category: Category::Red };
        sim.spawner.houses.push(house);
        sim.spawner.cities.push(city);
        (sim, house)
    }

    pub fn total_occupancy(sim: &Sim<AStarRouter>) -> u32 {
        sim.network.segments.values().map(|s| s.occupancy).sum()
    }

    /// Records every observer callback.
    #[derive(Default)]
    pub struct Recorder {
        pub ticks: u64,
        pub arrived: Vec<u32>,
        pub failed: Vec<u32>,
        pub cities: usize,
        pub weeks: Vec<u32>,
        pub game_overs: usize,
    }

    impl SimObserver for Recorder {
        fn on_tick_end(&mut self, _now: SimTime, _fleet: &FleetTick) {
            self.ticks += 1;
        }
        fn on_visitor_arrived(&mut self, _now: SimTime, _visitor: &Visitor, score: u32) {
            self.arrived.push(score);
        }
        fn on_visitor_failed(&mut self, _now: SimTime, _visitor: &Visitor, failures: u32) {
            self.failed.push(failures);
        }
        fn on_city_founded(&mut self, _now: SimTime, _city: BuildingId, _category: Category) {
            self.cities += 1;
        }
        fn on_week_end(&mut self, _now: SimTime, week: u32) {
            self.weeks.push(week);
        }
        fn on_game_over(&mut self, _now: SimTime) {
            self.game_overs += 1;
        }
    }
}

// ── Event queue ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod events {
    use mc_core::{SegmentId, SimTime};

    use crate::{EventQueue, SimEvent};

    #[test]
    fn pops_by_time_then_insertion_order() {
        let mut q = EventQueue::new();
        q.push(SimTime(20), SimEvent::DayElapsed);
        q.push(SimTime(10), SimEvent::RandomTraffic);
        q.push(SimTime(10), SimEvent::VisitorWave);
        assert_eq!(q.len(), 3);
        assert_eq!(q.time_count(), 2);
        assert_eq!(q.next_time(), Some(SimTime(10)));

        assert_eq!(q.pop_due(SimTime(5)), None);
        assert_eq!(q.pop_due(SimTime(20)), Some((SimTime(10), SimEvent::RandomTraffic)));
        assert_eq!(q.pop_due(SimTime(20)), Some((SimTime(10), SimEvent::VisitorWave)));
        assert_eq!(q.pop_due(SimTime(20)), Some((SimTime(20), SimEvent::DayElapsed)));
        assert_eq!(q.pop_due(SimTime(20)), None);
        assert!(q.is_empty());
    }

    #[test]
    fn event_pushed_within_now_pops_in_same_drain() {
        let mut q = EventQueue::new();
        q.push(SimTime(10), SimEvent::PollutionSample);
        let mut fired = 0;
        while let Some((at, ev)) = q.pop_due(SimTime(35)) {
            fired += 1;
            q.push(at + 10, ev);
        }
        assert_eq!(fired, 3);
        assert_eq!(q.next_time(), Some(SimTime(40)));
        assert!(q.contains(SimEvent::PollutionSample));
        assert!(!q.contains(SimEvent::ClearBlocked(SegmentId(0))));
    }
}

// ── Calendar ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod calendar {
    use crate::{Calendar, DayChange};

    #[test]
    fn six_day_week_with_mid_week_on_day_three() {
        let mut c = Calendar::new();
        assert_eq!((c.week, c.day_index), (1, 0));
        let changes: Vec<DayChange> = (0..6).map(|_| c.advance_day()).collect();
        assert_eq!(
            changes,
            vec![
                DayChange::Day,
                DayChange::Day,
                DayChange::MidWeek,
                DayChange::Day,
                DayChange::Day,
                DayChange::WeekEnd { completed: 1 },
            ]
        );
        assert_eq!((c.week, c.day_index), (2, 0));
    }

    #[test]
    fn mid_week_fires_once_per_week() {
        let mut c = Calendar::new();
        let mid_weeks = (0..18).filter(|_| c.advance_day() == DayChange::MidWeek).count();
        assert_eq!(mid_weeks, 3);
        assert_eq!(c.week, 4);
    }

    #[test]
    fn resumed_after_mid_week_goes_straight_to_week_end() {
        let mut c = Calendar::at(2, 4);
        assert_eq!(c.advance_day(), DayChange::Day);
        assert_eq!(c.advance_day(), DayChange::WeekEnd { completed: 2 });
        assert_eq!(Calendar::at(0, 9), Calendar::at(1, 5));
    }
}

// ── Spawner ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod spawner {
    use mc_core::{BuildingId, SimConfig, SimRng, WorldBounds};
    use mc_network::RoadNetwork;

    use super::helpers::{pt, quiet};
    use crate::{Building, Category, Spawner};

    #[test]
    fn category_colours() {
        assert_eq!(Category::Yellow.color(), 0xfff176);
        assert_eq!(Category::Red.color(), 0xef5350);
        assert_eq!(Category::Blue.color(), 0x64b5f6);
        assert_eq!(Category::Green.color(), 0x81c784);
    }

    #[test]
    fn city_brings_houses_of_its_own_and_previous_category() {
        let mut net = RoadNetwork::new(32.0, 20.0);
        let mut rng = SimRng::new(3);
        let mut s = Spawner::new(WorldBounds::default());
        let center = pt(640.0, 360.0);

        s.make_city(&mut net, &mut rng, center, Some(Category::Red));
        assert_eq!(s.houses.len(), 2);
        for h in &s.houses {
            assert_eq!(h.category, Category::Red);
            assert!((h.pos.x - center.x).abs() <= 160.0);
            assert!((h.pos.y - center.y).abs() <= 120.0);
        }

        s.make_city(&mut net, &mut rng, pt(400.0, 300.0), Some(Category::Blue));
        let cats: Vec<Category> = s.houses[2..].iter().map(|h| h.category).collect();
        assert_eq!(cats, vec![Category::Blue, Category::Blue, Category::Red, Category::Red]);

        s.make_city(&mut net, &mut rng, pt(900.0, 300.0), Some(Category::Blue));
        assert_eq!(s.houses.len(), 8);
        assert_eq!(s.cities_of(Category::Blue).count(), 2);
        assert_eq!(s.last_city_category(), Some(Category::Blue));
    }

    #[test]
    fn buildings_are_clamped_into_the_world() {
        let mut net = RoadNetwork::new(32.0, 20.0);
        let mut rng = SimRng::new(3);
        let mut s = Spawner::new(WorldBounds::default());
        let id = s.make_house(&mut net, &mut rng, pt(-50.0, 900.0), None);
        assert_eq!(s.house(id).unwrap().pos, pt(0.0, 720.0));
    }

    #[test]
    fn house_near_a_road_gets_a_driveway() {
        let mut sim = quiet(SimConfig::default());
        sim.add_road(&[pt(0.0, 320.0), pt(640.0, 320.0)], Default::default()).unwrap();
        let before = sim.network.segment_count();

        sim.place_house(pt(320.0, 384.0), Some(Category::Green));
        assert_eq!(sim.network.segment_count(), before + 1);
        assert!(sim.network.segments.values().any(|s| s.meta.driveway));
        assert!(sim.network.node_at(pt(320.0, 384.0)).is_some());
    }

    #[test]
    fn far_house_stays_unconnected() {
        let mut sim = quiet(SimConfig::default());
        sim.add_road(&[pt(0.0, 0.0), pt(320.0, 0.0)], Default::default()).unwrap();
        sim.place_house(pt(320.0, 640.0), None);
        assert_eq!(sim.network.segment_count(), 1);
    }

    #[test]
    fn restore_continues_id_allocation() {
        let mut net = RoadNetwork::new(32.0, 20.0);
        let mut rng = SimRng::new(1);
        let city = Building { id: BuildingId(7), pos: pt(100.0, 100.0), category: Category::Yellow };
        let house = Building { id: BuildingId(4), pos: pt(200.0, 100.0), category: Category::Yellow };
        let mut s = Spawner::restore(WorldBounds::default(), vec![city], vec![house]);
        assert_eq!(s.last_city_category(), Some(Category::Yellow));
        let id = s.make_house(&mut net, &mut rng, pt(300.0, 100.0), None);
        assert_eq!(id, BuildingId(8));
    }
}

// ── Start-up and configuration ───────────────────────────────────────────────

#[cfg(test)]
mod startup {
    use mc_core::SimConfig;
    use mc_network::AStarRouter;

    use super::helpers::{pt, quiet};
    use crate::{SimBuilder, SimError};

    #[test]
    fn start_founds_first_city_with_starter_houses() {
        let sim = SimBuilder::new(SimConfig::default(), AStarRouter).build().unwrap();
        assert!(sim.is_started());
        assert_eq!(sim.spawner.cities.len(), 1);
        let city = sim.spawner.cities[0];
        assert_eq!(city.pos, pt(640.0, 360.0));

        assert_eq!(sim.spawner.houses.len(), 4);
        assert!(sim.spawner.houses.iter().all(|h| h.category == city.category));
        assert!(sim.spawner.houses.iter().any(|h| h.pos == pt(800.0, 420.0)));
        assert!(sim.spawner.houses.iter().any(|h| h.pos == pt(480.0, 420.0)));
        assert_eq!(sim.events.len(), 4);
    }

    #[test]
    fn start_is_idempotent_and_keeps_existing_cities() {
        let mut sim = quiet(SimConfig::default());
        assert!(sim.spawner.cities.is_empty());
        assert!(sim.events.is_empty());

        sim.found_city(pt(300.0, 300.0), None);
        sim.start();
        sim.start();
        assert_eq!(sim.spawner.cities.len(), 1);
        assert_eq!(sim.spawner.houses.len(), 2);
        assert_eq!(sim.events.len(), 4);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SimConfig { tick_ms: 0, ..SimConfig::default() };
        let err = SimBuilder::new(config, AStarRouter).build().err();
        assert!(matches!(err, Some(SimError::Config(_))));

        let config = SimConfig { visitor_probability: 1.5, ..SimConfig::default() };
        assert!(SimBuilder::new(config, AStarRouter).build().is_err());
    }
}

// ── Trips ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod trips {
    use mc_core::SimConfig;
    use mc_network::RoadMeta;
    use mc_traffic::VehicleOptions;

    use super::helpers::{pt, quiet, total_occupancy, Recorder};

    #[test]
    fn no_path_skips_the_trip() {
        let mut sim = quiet(SimConfig::default());
        sim.add_road(&[pt(0.0, 0.0), pt(64.0, 0.0)], RoadMeta::street()).unwrap();
        sim.add_road(&[pt(640.0, 640.0), pt(704.0, 640.0)], RoadMeta::street()).unwrap();
        let a = sim.network.node_at(pt(0.0, 0.0)).unwrap();
        let b = sim.network.node_at(pt(640.0, 640.0)).unwrap();

        assert_eq!(sim.find_path_nodes(a, b), None);
        assert_eq!(sim.spawn_trip(a, b, VehicleOptions::default()), None);
        assert_eq!(sim.stats.trips_skipped, 1);
        assert!(sim.fleet.is_empty());
        assert_eq!(total_occupancy(&sim), 0);
    }

    #[test]
    fn random_traffic_needs_two_nodes() {
        let mut sim = quiet(SimConfig::default());
        assert_eq!(sim.spawn_random_traffic(), None);

        sim.add_road(&[pt(0.0, 0.0), pt(320.0, 0.0)], RoadMeta::street()).unwrap();
        let id = sim.spawn_random_traffic().unwrap();
        let v = sim.fleet.get(id).unwrap();
        assert!((50.0..110.0).contains(&v.speed));
        assert_eq!(v.color, 0x90caf9);
        assert!(!v.show_route);
        assert_eq!(v.visitor, None);
        assert_eq!(sim.stats.random_trips, 1);
        assert_eq!(total_occupancy(&sim), 1);
    }

    #[test]
    fn random_traffic_timer_fires_every_period() {
        let mut sim = quiet(SimConfig::default());
        sim.add_road(&[pt(0.0, 0.0), pt(320.0, 0.0)], RoadMeta::street()).unwrap();
        sim.start();
        let mut rec = Recorder::default();

        sim.run_for(2_499, &mut rec);
        assert_eq!(sim.stats.random_trips, 0);
        sim.run_for(1, &mut rec);
        assert_eq!(sim.stats.random_trips, 1);
        assert_eq!(sim.fleet.len(), 1);
        assert_eq!(rec.ticks, sim.clock.ticks);
    }

    #[test]
    fn finished_random_vehicle_is_removed() {
        let mut sim = quiet(SimConfig::default());
        sim.add_road(&[pt(0.0, 0.0), pt(320.0, 0.0)], RoadMeta::street()).unwrap();
        sim.spawn_random_traffic().unwrap();
        sim.run_for(10_000, &mut Recorder::default());
        assert!(sim.fleet.is_empty());
        assert_eq!(total_occupancy(&sim), 0);
    }
}

// ── Visitors ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod visitors {
    use mc_core::{BuildingId, SimConfig, SimTime};

    use super::helpers::{commute, pt, total_occupancy, Recorder};
    use crate::{Building, Category};

    #[test]
    fn visitor_arrives_and_scores() {
        let (mut sim, house) = commute(SimConfig::default());
        let id = sim.spawn_visitor(house, SimTime::ZERO).unwrap();
        let visitor = sim.visitors.get(id).unwrap().clone();
        assert_eq!(visitor.deadline, SimTime(120_000));
        let v = sim.fleet.get(visitor.vehicle).unwrap();
        assert!((70.0..130.0).contains(&v.speed));
        assert_eq!(v.color, Category::Red.color());
        assert!(v.show_route);
        assert_eq!(v.visitor, Some(id));

        let mut rec = Recorder::default();
        sim.run_for(10_000, &mut rec);
        assert_eq!(sim.stats.score, 10);
        assert_eq!(sim.stats.visits_completed, 1);
        assert_eq!(rec.arrived, vec![10]);
        assert!(sim.visitors.is_empty());
        assert!(sim.fleet.is_empty());
        assert_eq!(total_occupancy(&sim), 0);
    }

    #[test]
    fn expired_visitors_fail_until_game_over() {
        let config = SimConfig {
            visitor_time_limit_secs: 1.0,
            failure_limit: 2,
            visitor_probability: 1.0,
            ..SimConfig::default()
        };
        let (mut sim, house) = commute(config);
        sim.spawn_visitor(house, SimTime::ZERO).unwrap();
        sim.spawn_visitor(house, SimTime::ZERO).unwrap();
        assert_eq!(sim.visitors.iter().next().unwrap().time_left_ms(SimTime(400)), 600);

        let mut rec = Recorder::default();
        sim.run_for(1_100, &mut rec);
        assert_eq!(sim.stats.failures, 2);
        assert_eq!(rec.failed, vec![1, 2]);
        assert!(sim.stats.game_over);
        assert_eq!(rec.game_overs, 1);
        assert_eq!(sim.stats.score, 0);
        assert!(sim.visitors.is_empty());
        assert!(sim.fleet.is_empty());

        // Spawning is suspended once the game is over.
        assert_eq!(sim.spawn_random_traffic(), None);
        assert!(sim.maybe_spawn_visitors(sim.now()).is_empty());
    }

    #[test]
    fn wave_only_sends_houses_with_a_matching_city() {
        let config = SimConfig { visitor_probability: 1.0, ..SimConfig::default() };
        let (mut sim, house) = commute(config);
        sim.spawner.houses.push(Building { id: BuildingId(102), ..house });
        sim.spawner.houses.push(Building { id: BuildingId(103), category: Category::Blue, ..house });

        let spawned = sim.maybe_spawn_visitors(SimTime::ZERO);
        assert_eq!(spawned.len(), 2);
        let houses: Vec<BuildingId> = sim.visitors.iter().map(|v| v.house).collect();
        assert_eq!(houses, vec![BuildingId(100), BuildingId(102)]);
        assert!(sim.visitors.iter().all(|v| v.city == BuildingId(101)));
    }

    #[test]
    fn visitor_without_route_is_not_created() {
        let (mut sim, _) = commute(SimConfig::default());
        let stranded = Building { id: BuildingId(200), pos: pt(1000.0, 600.0), category: Category::Red };
        sim.add_road(&[pt(960.0, 640.0), pt(1216.0, 640.0)], Default::default()).unwrap();
        assert_eq!(sim.spawn_visitor(stranded, SimTime::ZERO), None);
        assert!(sim.visitors.is_empty());
        assert_eq!(sim.stats.trips_skipped, 1);
    }
}

// ── Edits and flags ───────────────────────────────────────────────────────────

#[cfg(test)]
mod edits {
    use mc_core::{SimConfig, VehicleId};
    use mc_network::RoadMeta;
    use mc_traffic::VehicleOptions;

    use super::helpers::{pt, quiet, total_occupancy, Recorder};
    use crate::{SimError, MapKind, SimBuilder};
    use mc_network::{AStarRouter, NetworkError};

    #[test]
    fn held_segment_is_flagged_then_cleared() {
        let mut sim = quiet(SimConfig::default());
        let s1 = sim.add_road(&[pt(0.0, 0.0), pt(320.0, 0.0)], RoadMeta::street()).unwrap();
        sim.add_road(&[pt(320.0, 0.0), pt(640.0, 0.0)], RoadMeta::street()).unwrap();
        let start = sim.network.node_at(pt(0.0, 0.0)).unwrap();
        let junction = sim.network.node_at(pt(320.0, 0.0)).unwrap();
        let goal = sim.network.node_at(pt(640.0, 0.0)).unwrap();
        sim.spawn_trip(start, goal, VehicleOptions::default()).unwrap();

        sim.network.node_mut(junction).unwrap().locked_by = Some(VehicleId(999));
        let mut rec = Recorder::default();
        sim.run_for(5_000, &mut rec);
        assert!(sim.network.segment(s1).unwrap().blocked);

        // Still flagged while the vehicle keeps waiting.
        sim.run_for(1_000, &mut rec);
        assert!(sim.network.segment(s1).unwrap().blocked);

        sim.network.node_mut(junction).unwrap().locked_by = None;
        sim.run_for(1_000, &mut rec);
        assert!(!sim.network.segment(s1).unwrap().blocked);
        assert_eq!(total_occupancy(&sim), sim.fleet.len() as u32);
    }

    #[test]
    fn bulldoze_removes_vehicles_routed_over_it() {
        let mut sim = quiet(SimConfig::default());
        sim.add_road(&[pt(0.0, 0.0), pt(320.0, 0.0)], RoadMeta::street()).unwrap();
        sim.add_road(&[pt(320.0, 0.0), pt(640.0, 0.0)], RoadMeta::street()).unwrap();
        let a = sim.network.node_at(pt(0.0, 0.0)).unwrap();
        let b = sim.network.node_at(pt(320.0, 0.0)).unwrap();
        let c = sim.network.node_at(pt(640.0, 0.0)).unwrap();
        let through = sim.spawn_trip(a, c, VehicleOptions::default()).unwrap();
        let local = sim.spawn_trip(a, b, VehicleOptions::default()).unwrap();

        let removed = sim.bulldoze_at(pt(640.0, 0.0));
        assert_eq!(removed.len(), 1);
        assert!(sim.fleet.get(through).is_none());
        assert!(sim.fleet.get(local).is_some());
        assert_eq!(total_occupancy(&sim), 1);

        assert!(sim.bulldoze_at(pt(1000.0, 600.0)).is_empty());
    }

    #[test]
    fn river_blocks_streets_but_not_bridges() {
        let mut sim = SimBuilder::new(SimConfig::default(), AStarRouter)
            .map(MapKind::Rivers)
            .auto_start(false)
            .build()
            .unwrap();
        assert_eq!(sim.network.water.len(), 1);

        let crossing = [pt(480.0, 320.0), pt(736.0, 320.0)];
        let err = sim.add_road(&crossing, RoadMeta::street()).err();
        assert!(matches!(err, Some(SimError::Network(NetworkError::CrossesWater))));
        assert!(sim.add_road(&crossing, RoadMeta::bridge()).is_ok());
    }

    #[test]
    fn lake_blocks_later_roads() {
        let mut sim = quiet(SimConfig::default());
        let lake = sim.add_lake(pt(320.0, 320.0));
        assert!(lake.contains(pt(320.0, 320.0)));
        assert!(sim.add_road(&[pt(192.0, 320.0), pt(448.0, 320.0)], RoadMeta::street()).is_err());
    }
}

// ── Map kinds and pollution ───────────────────────────────────────────────────

#[cfg(test)]
mod world {
    use mc_core::{SimRng, WorldBounds};
    use mc_network::RoadNetwork;

    use super::helpers::pt;
    use crate::{MapKind, Pollution};

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn map_kind_water_layouts() {
        let bounds = WorldBounds::default();
        assert!(MapKind::Plains.water_rects(&bounds).is_empty());

        let river = MapKind::Rivers.water_rects(&bounds);
        assert_eq!(river.len(), 1);
        assert!(close(river[0].min.x, 537.6) && close(river[0].max.x, 691.2));
        assert!(close(river[0].min.y, 0.0) && close(river[0].max.y, 720.0));

        let coast = MapKind::Coasts.water_rects(&bounds);
        assert_eq!(coast.len(), 2);
        assert!(close(coast[0].min.y, 610.0) && close(coast[0].max.x, 1280.0));
        assert!(close(coast[1].min.x, 588.8) && close(coast[1].max.x, 691.2));
    }

    #[test]
    fn occupied_segments_emit_puffs_that_decay() {
        let mut net = RoadNetwork::new(32.0, 20.0);
        let busy = net.insert_segment(vec![pt(0.0, 0.0), pt(320.0, 0.0)], Default::default());
        net.insert_segment(vec![pt(0.0, 320.0), pt(320.0, 320.0)], Default::default());
        net.rebuild_graph();
        for _ in 0..7 {
            net.occupy(busy);
        }

        let mut rng = SimRng::new(9);
        let mut p = Pollution::new();
        p.sample(&net, &mut rng);
        assert_eq!(p.puffs.len(), 2);
        for puff in &p.puffs {
            assert_eq!(puff.value, 1.5);
            assert_eq!(puff.pos.y, 0.0);
            assert!((0.0..=320.0).contains(&puff.pos.x));
        }

        p.decay(16);
        assert!(close(p.puffs[0].value, 1.5 * 0.985));
        assert!(close(p.total(), 2.0 * 1.5 * 0.985));

        p.decay(16 * 200);
        assert!(p.puffs.is_empty());
    }

    #[test]
    fn puffs_per_segment_are_capped() {
        let mut net = RoadNetwork::new(32.0, 20.0);
        let id = net.insert_segment(vec![pt(0.0, 0.0), pt(320.0, 0.0)], Default::default());
        net.rebuild_graph();
        net.occupy(id);
        let mut rng = SimRng::new(1);
        let mut p = Pollution::new();
        p.sample(&net, &mut rng);
        assert_eq!(p.puffs.len(), 1);

        for _ in 0..20 {
            net.occupy(id);
        }
        p.clear();
        p.sample(&net, &mut rng);
        assert_eq!(p.puffs.len(), 3);
    }
}

// ── Calendar-driven growth ────────────────────────────────────────────────────

#[cfg(test)]
mod growth {
    use mc_core::SimConfig;
    use mc_network::{AStarRouter, RoadMeta};

    use super::helpers::{pt, Recorder};
    use crate::SimBuilder;

    #[test]
    fn mid_week_city_and_week_end_houses() {
        let mut sim = SimBuilder::new(SimConfig::default(), AStarRouter).auto_start(false).build().unwrap();
        sim.add_road(&[pt(64.0, 64.0), pt(1216.0, 64.0)], RoadMeta::street()).unwrap();
        sim.start();
        let mut rec = Recorder::default();

        sim.run_for(3 * 15_000, &mut rec);
        assert_eq!(sim.calendar.day_index, 3);
        assert_eq!(sim.spawner.cities.len(), 2);
        assert_eq!(rec.cities, 1);
        let city = sim.spawner.cities[1].pos;
        assert!((160.0..=1120.0).contains(&city.x));
        assert!((120.0..=560.0).contains(&city.y));

        let houses = sim.spawner.houses.len();
        sim.run_for(3 * 15_000, &mut rec);
        assert_eq!((sim.calendar.week, sim.calendar.day_index), (2, 0));
        assert_eq!(rec.weeks, vec![1]);
        assert!(sim.spawner.houses.len() > houses);
    }
}

// ── Snapshots and determinism ─────────────────────────────────────────────────

#[cfg(test)]
mod persistence {
    use mc_core::SimConfig;
    use mc_network::{AStarRouter, RoadMeta};

    use super::helpers::{pt, Recorder};
    use crate::{MapKind, Sim, SimBuilder, WorldSnapshot};

    fn town(seed: u64) -> Sim<AStarRouter> {
        let config = SimConfig { seed, visitor_probability: 0.5, ..SimConfig::default() };
        let mut sim = SimBuilder::new(config, AStarRouter).map(MapKind::Coasts).auto_start(false).build().unwrap();
        sim.add_road(&[pt(64.0, 320.0), pt(544.0, 320.0)], RoadMeta::street()).unwrap();
        sim.add_road(&[pt(544.0, 320.0), pt(736.0, 320.0)], RoadMeta::bridge()).unwrap();
        sim.add_road(&[pt(736.0, 320.0), pt(1216.0, 320.0)], RoadMeta::highway()).unwrap();
        sim.add_road(&[pt(320.0, 64.0), pt(320.0, 576.0)], RoadMeta::street()).unwrap();
        sim.add_road(&[pt(960.0, 64.0), pt(960.0, 576.0)], RoadMeta::street()).unwrap();
        sim.start();
        sim
    }

    #[test]
    fn snapshot_survives_json_and_rebuild() {
        let mut sim = town(5);
        sim.run_for(20_000, &mut Recorder::default());
        sim.stats.score = 30;
        let snap = sim.snapshot();
        assert_eq!(snap.water.len(), 2);

        let json = snap.to_json().unwrap();
        let parsed = WorldSnapshot::from_json_str(&json).unwrap();
        assert_eq!(parsed, snap);

        let restored = SimBuilder::from_snapshot(sim.config.clone(), AStarRouter, parsed).build().unwrap();
        assert_eq!(restored.network.segment_count(), sim.network.segment_count());
        assert_eq!(restored.network.node_count(), sim.network.node_count());
        assert_eq!(restored.spawner.cities, sim.spawner.cities);
        assert_eq!(restored.spawner.houses, sim.spawner.houses);
        assert_eq!(restored.calendar, sim.calendar);
        assert_eq!(restored.stats.score, 30);
        assert!(restored.fleet.is_empty());
    }

    #[test]
    fn missing_snapshot_fields_take_defaults() {
        let snap = WorldSnapshot::from_json_str(r#"{"score": 4}"#).unwrap();
        assert_eq!((snap.week, snap.day_index, snap.score), (1, 0, 4));
        assert!(snap.segments.is_empty());
        assert!(WorldSnapshot::from_json_str("not json").is_err());
    }

    #[test]
    fn same_seed_same_run() {
        let mut a = town(11);
        let mut b = town(11);
        a.run_for(60_000, &mut Recorder::default());
        b.run_for(60_000, &mut Recorder::default());
        assert_eq!(a.stats, b.stats);
        let pos = |s: &Sim<AStarRouter>| s.fleet.iter().map(|v| (v.id, v.pos)).collect::<Vec<_>>();
        assert_eq!(pos(&a), pos(&b));
        assert_eq!(a.spawner.houses, b.spawner.houses);
    }
}
