//! Unit tests for mc-core primitives.

#[cfg(test)]
mod ids {
    use crate::{NodeId, SegmentId, VehicleId};

    #[test]
    fn index_and_next() {
        let id = VehicleId(41);
        assert_eq!(id.next(), VehicleId(42));
        assert_eq!(id.index(), 41);
        assert_eq!(SegmentId::try_from(3usize).unwrap(), SegmentId(3));
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(NodeId::INVALID.0, u32::MAX);
        assert_eq!(NodeId::default(), NodeId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(VehicleId(7).to_string(), "VehicleId(7)");
    }
}

#[cfg(test)]
mod geo {
    use crate::Point;
    use crate::geo::polyline_length;

    #[test]
    fn negative_cross_means_right_hand_side() {
        let east = Point::new(1.0, 0.0);
        let right = Point::new(0.0, -1.0);
        let left = Point::new(0.0, 1.0);
        assert!(east.cross(right) < 0.0);
        assert!(east.cross(left) > 0.0);
    }

    #[test]
    fn proper_intersection_of_a_plus() {
        let hit = Point::proper_intersection(
            Point::new(-10.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, -10.0),
            Point::new(0.0, 10.0),
        )
        .expect("segments cross at the origin");
        assert!(hit.distance(Point::ZERO) < 1e-4);
    }

    #[test]
    fn touching_endpoints_do_not_intersect() {
        let hit = Point::proper_intersection(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn parallel_and_colinear_rejected() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!(Point::proper_intersection(a, b, Point::new(0.0, 5.0), Point::new(10.0, 5.0)).is_none());
        assert!(Point::proper_intersection(a, b, Point::new(2.0, 0.0), Point::new(8.0, 0.0)).is_none());
    }

    #[test]
    fn snapping() {
        let p = Point::new(47.0, 17.0);
        assert_eq!(p.snap_to_grid(32.0), Point::new(32.0, 32.0));
        assert_eq!(p.snap_key(6.0), (8, 3));
        // Near-duplicates share a key.
        assert_eq!(Point::new(100.0, 100.0).snap_key(6.0), Point::new(101.0, 100.5).snap_key(6.0));
    }

    #[test]
    fn projection_clamps_to_segment() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(Point::new(5.0, 3.0).project_onto_segment(a, b), Point::new(5.0, 0.0));
        assert_eq!(Point::new(-4.0, 3.0).project_onto_segment(a, b), a);
        assert_eq!(Point::new(3.0, 3.0).project_onto_segment(a, a), a);
    }

    #[test]
    fn polyline_lengths() {
        let pts = [Point::new(0.0, 0.0), Point::new(3.0, 4.0), Point::new(3.0, 10.0)];
        assert!((polyline_length(&pts) - 11.0).abs() < 1e-5);
        assert_eq!(polyline_length(&pts[..1]), 0.0);
    }
}

#[cfg(test)]
mod time {
    use crate::{SimClock, SimTime};

    #[test]
    fn clock_advances() {
        let mut c = SimClock::new();
        c.advance(16);
        c.advance(16);
        assert_eq!(c.now, SimTime(32));
        assert_eq!(c.ticks, 2);
    }

    #[test]
    fn since_saturates() {
        assert_eq!(SimTime(10).since(SimTime(25)), 0);
        assert_eq!(SimTime(25).since(SimTime(10)), 15);
        assert_eq!(SimTime(1_250).to_string(), "1.250s");
    }
}

#[cfg(test)]
mod config {
    use crate::SimConfig;

    #[test]
    fn defaults_are_valid() {
        let c = SimConfig::default();
        c.validate().unwrap();
        assert_eq!(c.visitor_time_limit_ms(), 120_000);
        assert_eq!(c.failure_limit, 8);
    }

    #[test]
    fn zero_tick_rejected() {
        let c = SimConfig { tick_ms: 0, ..SimConfig::default() };
        assert!(c.validate().is_err());
    }

    #[test]
    fn bad_probability_rejected() {
        let c = SimConfig { visitor_probability: 1.5, ..SimConfig::default() };
        assert!(c.validate().is_err());
    }
}

#[cfg(test)]
mod rng {
    use crate::SimRng;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SimRng::new(7);
        let mut b = SimRng::new(7);
        for _ in 0..16 {
            assert_eq!(a.gen_range(0..1000u32), b.gen_range(0..1000u32));
        }
    }

    #[test]
    fn choose_empty_is_none() {
        let mut r = SimRng::new(1);
        let empty: [u8; 0] = [];
        assert!(r.choose(&empty).is_none());
    }
}
