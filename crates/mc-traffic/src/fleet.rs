//! The `Fleet`: every live vehicle plus id allocation.

use rustc_hash::FxHashSet;
use tracing::debug;

use mc_core::{Point, SegmentId, SimTime, VehicleId};
use mc_network::{RoadNetwork, RouteLeg};

use crate::vehicle::{Advance, Vehicle, VehicleOptions, VehicleState};
use crate::{TrafficError, TrafficResult};

/// Per-tick results the simulation layer reacts to.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FleetTick {
    /// Visitor vehicles that reached their last point.
    pub arrived: Vec<VehicleId>,
    /// Non-visitor vehicles removed on reaching their last point.
    pub finished: Vec<VehicleId>,
    /// Segments whose end a vehicle was held or kept waiting at this tick.
    pub held: Vec<SegmentId>,
}

/// Owns all vehicles.
///
/// Vehicles are stored in spawn order, which is also the update order.
/// Removal is always collect-then-apply so no vehicle is dropped while the
/// update loop holds it.
#[derive(Debug)]
pub struct Fleet {
    vehicles: Vec<Vehicle>,
    next_id: VehicleId,
}

impl Default for Fleet {
    fn default() -> Self {
        Self::new()
    }
}

impl Fleet {
    pub fn new() -> Self {
        Self { vehicles: Vec::new(), next_id: VehicleId(0) }
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.iter()
    }

    pub fn get(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    pub fn get_mut(&mut self, id: VehicleId) -> Option<&mut Vehicle> {
        self.vehicles.iter_mut().find(|v| v.id == id)
    }

    /// Current position of a vehicle.
    pub fn position(&self, id: VehicleId) -> TrafficResult<Point> {
        self.get(id).map(|v| v.pos).ok_or(TrafficError::UnknownVehicle(id))
    }

    /// Ids of every vehicle present.
    pub fn live_ids(&self) -> FxHashSet<VehicleId> {
        self.vehicles.iter().map(|v| v.id).collect()
    }

    fn allocate(&mut self) -> VehicleId {
        let id = self.next_id;
        self.next_id = id.next();
        id
    }

    fn insert(&mut self, vehicle: Vehicle, network: &mut RoadNetwork) -> VehicleId {
        vehicle.board(network);
        let id = vehicle.id;
        self.vehicles.push(vehicle);
        id
    }

    // ── Spawning ──────────────────────────────────────────────────────────

    /// Spawn a vehicle along router legs and count it on its first segment.
    pub fn spawn(&mut self, network: &mut RoadNetwork, legs: &[RouteLeg], opts: VehicleOptions) -> VehicleId {
        let id = self.allocate();
        self.insert(Vehicle::from_legs(id, legs, opts), network)
    }

    /// Spawn a vehicle driving whole segments in order.
    ///
    /// # Errors
    ///
    /// [`TrafficError::UnknownSegment`] if a segment id is missing; no id
    /// is consumed in that case.
    pub fn spawn_segments(
        &mut self,
        network: &mut RoadNetwork,
        segments: &[SegmentId],
        opts: VehicleOptions,
    ) -> TrafficResult<VehicleId> {
        let vehicle = Vehicle::from_segments(self.next_id, network, segments, opts)?;
        self.allocate();
        Ok(self.insert(vehicle, network))
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Advance every vehicle by `delta_ms`.
    ///
    /// Non-visitor vehicles are destroyed on reaching their last point;
    /// visitor vehicles stay parked until the visitor is resolved.
    pub fn update(&mut self, network: &mut RoadNetwork, delta_ms: u64, now: SimTime) -> FleetTick {
        let live = self.live_ids();
        let mut tick = FleetTick::default();

        for v in self.vehicles.iter_mut() {
            match v.advance(network, &live, now, delta_ms) {
                Advance::Held { segment, .. } => tick.held.push(segment),
                Advance::Waiting => tick.held.extend(v.current_segment()),
                Advance::Arrived if v.visitor.is_some() => tick.arrived.push(v.id),
                Advance::Arrived => tick.finished.push(v.id),
                Advance::Idle | Advance::Moved => {}
            }
        }

        for &id in &tick.finished {
            self.despawn(network, id);
        }
        tick
    }

    // ── Removal ───────────────────────────────────────────────────────────

    /// Destroy and remove a vehicle.  Returns `false` for unknown ids.
    pub fn despawn(&mut self, network: &mut RoadNetwork, id: VehicleId) -> bool {
        let Some(i) = self.vehicles.iter().position(|v| v.id == id) else {
            return false;
        };
        let mut v = self.vehicles.remove(i);
        v.destroy(network);
        true
    }

    /// Force-remove every vehicle whose remaining route uses one of
    /// `segments`, typically the ids returned by a bulldoze.
    pub fn remove_routed_over(&mut self, network: &mut RoadNetwork, segments: &[SegmentId]) -> Vec<VehicleId> {
        if segments.is_empty() {
            return Vec::new();
        }
        let doomed: FxHashSet<SegmentId> = segments.iter().copied().collect();
        let ids: Vec<VehicleId> = self
            .vehicles
            .iter()
            .filter(|v| v.routes_over(&doomed))
            .map(|v| v.id)
            .collect();
        for &id in &ids {
            self.despawn(network, id);
        }
        if !ids.is_empty() {
            debug!(removed = ids.len(), "vehicles routed over bulldozed roads removed");
        }
        ids
    }

    /// Re-attach waiting vehicles to the freshly rebuilt nodes.
    pub fn on_graph_rebuilt(&mut self, network: &mut RoadNetwork) {
        for v in self.vehicles.iter_mut().filter(|v| v.state == VehicleState::Waiting || v.release_at.is_some()) {
            v.reattach(network);
        }
    }
}
