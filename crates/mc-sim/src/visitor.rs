//! House → city visitor trips and their deadlines.

use tracing::trace;

use mc_core::{BuildingId, Point, SimTime, VehicleId, VisitorId};
use mc_traffic::Fleet;

/// One pending visit.
#[derive(Debug, Clone, PartialEq)]
pub struct Visitor {
    pub id: VisitorId,
    pub house: BuildingId,
    pub city: BuildingId,
    /// Position the vehicle must come within `arrival_radius` of.
    pub city_pos: Point,
    pub vehicle: VehicleId,
    pub deadline: SimTime,
}

impl Visitor {
    /// Milliseconds left before the visit fails.
    pub fn time_left_ms(&self, now: SimTime) -> u64 {
        self.deadline.since(now)
    }
}

/// How a visit ended.
#[derive(Debug, Clone, PartialEq)]
pub enum VisitOutcome {
    Arrived(Visitor),
    Failed(Visitor),
}

/// Every pending visitor, in spawn order.
#[derive(Debug)]
pub struct Visitors {
    list: Vec<Visitor>,
    next_id: VisitorId,
}

impl Default for Visitors {
    fn default() -> Self {
        Self::new()
    }
}

impl Visitors {
    pub fn new() -> Self {
        Self { list: Vec::new(), next_id: VisitorId(0) }
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Visitor> {
        self.list.iter()
    }

    pub fn get(&self, id: VisitorId) -> Option<&Visitor> {
        self.list.iter().find(|v| v.id == id)
    }

    /// Id the next [`add`](Self::add) will use, so the vehicle can carry it.
    pub fn peek_id(&self) -> VisitorId {
        self.next_id
    }

    pub fn add(
        &mut self,
        house: BuildingId,
        city: BuildingId,
        city_pos: Point,
        vehicle: VehicleId,
        deadline: SimTime,
    ) -> VisitorId {
        let id = self.next_id;
        self.next_id = id.next();
        self.list.push(Visitor { id, house, city, city_pos, vehicle, deadline });
        id
    }

    /// Remove and return every visit that ended by `now`.
    ///
    /// An expired deadline fails the visit even if the vehicle is close.
    /// A visitor whose vehicle no longer exists can only fail.
    pub fn resolve(&mut self, fleet: &Fleet, now: SimTime, arrival_radius: f32) -> Vec<VisitOutcome> {
        let radius_sq = arrival_radius * arrival_radius;
        let mut outcomes = Vec::new();
        let mut i = 0;
        while i < self.list.len() {
            let v = &self.list[i];
            let ended = if now >= v.deadline {
                Some(false)
            } else {
                fleet
                    .position(v.vehicle)
                    .ok()
                    .filter(|p| p.distance_sq(v.city_pos) < radius_sq)
                    .map(|_| true)
            };
            match ended {
                Some(arrived) => {
                    let v = self.list.remove(i);
                    trace!(visitor = %v.id, arrived, "visit ended");
                    outcomes.push(if arrived { VisitOutcome::Arrived(v) } else { VisitOutcome::Failed(v) });
                }
                None => i += 1,
            }
        }
        outcomes
    }
}
