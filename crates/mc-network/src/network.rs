//! Road network: authored segments plus the derived node graph.
//!
//! # Data layout
//!
//! Segments live in a `BTreeMap<SegmentId, RoadSegment>` so that iteration
//! (and therefore splitting and node numbering) follows creation order and
//! is deterministic.  Nodes are a dense `Vec<Node>` indexed by `NodeId`,
//! rebuilt from scratch on every [`RoadNetwork::rebuild_graph`].
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(x, y)` to the nearest `NodeId`.  Used to
//! connect houses and cities, which sit off the road, into the graph.

use std::collections::BTreeMap;

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;
use tracing::debug;

use mc_core::{NodeId, Point, SegmentId, SimTime, VehicleId};

use crate::builder::{self, NODE_SNAP_CELL};
use crate::{RoadMeta, RoadSegment, RouteLeg, WaterRect};

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f32; 2],
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── Node ──────────────────────────────────────────────────────────────────────

/// A directed edge to `to`, owned by `segment`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    pub to: NodeId,
    pub segment: SegmentId,
}

/// A vehicle's pending request to enter a node.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Claim {
    pub vehicle: VehicleId,
    /// Direction the vehicle was travelling when it reached the node.
    pub approach: Point,
    /// When the vehicle started waiting.
    pub since: SimTime,
}

/// A graph vertex: road endpoint, bend, or intersection.
#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeId,
    pub pos: Point,
    pub edges: Vec<Edge>,
    /// Exclusive lock holder; at most one vehicle at a time.
    pub locked_by: Option<VehicleId>,
    /// Waiting claimants in arrival order.
    pub queue: Vec<Claim>,
}

impl Node {
    pub fn new(id: NodeId, pos: Point) -> Self {
        Self { id, pos, edges: Vec::new(), locked_by: None, queue: Vec::new() }
    }

    /// Take the lock if free; re-confirming one's own lock succeeds.
    pub fn try_reserve(&mut self, vehicle: VehicleId) -> bool {
        match self.locked_by {
            None => {
                self.locked_by = Some(vehicle);
                true
            }
            Some(holder) => holder == vehicle,
        }
    }

    /// Release the lock only if `vehicle` holds it.
    pub fn release(&mut self, vehicle: VehicleId) -> bool {
        if self.locked_by == Some(vehicle) {
            self.locked_by = None;
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.locked_by.is_none()
    }

    pub fn claim_of(&self, vehicle: VehicleId) -> Option<&Claim> {
        self.queue.iter().find(|c| c.vehicle == vehicle)
    }

    /// Queue a claim; an existing claim by the same vehicle is kept as is.
    pub fn enqueue(&mut self, claim: Claim) {
        if self.claim_of(claim.vehicle).is_none() {
            self.queue.push(claim);
        }
    }

    pub fn dequeue(&mut self, vehicle: VehicleId) {
        self.queue.retain(|c| c.vehicle != vehicle);
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Road segments, the graph derived from them, and the water areas that
/// constrain drawing.
///
/// Mutating `segments` directly is allowed for hosts that load saved
/// geometry; call [`rebuild_graph`](Self::rebuild_graph) afterwards.
pub struct RoadNetwork {
    /// Authored geometry, keyed by stable id.
    pub segments: BTreeMap<SegmentId, RoadSegment>,

    /// Derived nodes, indexed by `NodeId`.
    pub nodes: Vec<Node>,

    /// Blocking water; only bridges may cross.
    pub water: Vec<WaterRect>,

    /// Build grid side used by the drawing tools.
    pub grid: f32,

    /// Radius within which a drawn endpoint snaps onto an existing node.
    pub node_snap_tolerance: f32,

    next_segment: SegmentId,
    node_keys: FxHashMap<(i64, i64), NodeId>,
    edge_segments: FxHashMap<(NodeId, NodeId), SegmentId>,
    spatial_idx: RTree<NodeEntry>,
}

impl RoadNetwork {
    /// An empty network using the given build grid.
    pub fn new(grid: f32, node_snap_tolerance: f32) -> Self {
        Self {
            segments: BTreeMap::new(),
            nodes: Vec::new(),
            water: Vec::new(),
            grid,
            node_snap_tolerance,
            next_segment: SegmentId(0),
            node_keys: FxHashMap::default(),
            edge_segments: FxHashMap::default(),
            spatial_idx: RTree::new(),
        }
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Number of directed edges in the current graph.
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    // ── Segment storage ───────────────────────────────────────────────────

    /// Store a segment verbatim and return its id.  Does not rebuild.
    pub fn insert_segment(&mut self, points: Vec<Point>, meta: RoadMeta) -> SegmentId {
        let id = self.next_segment;
        self.next_segment = id.next();
        self.segments.insert(id, RoadSegment::new(id, points, meta));
        id
    }

    /// Remove a segment.  Does not rebuild.
    pub fn remove_segment(&mut self, id: SegmentId) -> Option<RoadSegment> {
        self.segments.remove(&id)
    }

    #[inline]
    pub fn segment(&self, id: SegmentId) -> Option<&RoadSegment> {
        self.segments.get(&id)
    }

    #[inline]
    pub fn segment_mut(&mut self, id: SegmentId) -> Option<&mut RoadSegment> {
        self.segments.get_mut(&id)
    }

    // ── Graph rebuild ─────────────────────────────────────────────────────

    /// Recompute nodes, edges, capacities, and the spatial index from the
    /// current segments.
    ///
    /// Crossings are first inserted into both polylines.  Occupancy counters
    /// and `blocked` flags on surviving segments keep their values; all node
    /// locks and claims are discarded with the old nodes.
    pub fn rebuild_graph(&mut self) {
        let mut lines: Vec<Vec<Point>> =
            self.segments.values_mut().map(|s| std::mem::take(&mut s.points)).collect();
        let inserted = builder::split_intersections(&mut lines);
        for (seg, pts) in self.segments.values_mut().zip(lines) {
            seg.points = pts;
        }

        let graph = builder::build_graph(&mut self.segments);
        self.nodes = graph.nodes;
        self.node_keys = graph.node_keys;
        self.edge_segments = graph.edge_segments;

        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .map(|n| NodeEntry { point: [n.pos.x, n.pos.y], id: n.id })
            .collect();
        self.spatial_idx = RTree::bulk_load(entries);

        debug!(
            segments = self.segments.len(),
            nodes = self.nodes.len(),
            edges = self.edge_count(),
            crossings_inserted = inserted,
            "road graph rebuilt"
        );
    }

    // ── Node queries ──────────────────────────────────────────────────────

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// The node a path point was merged into, if any.
    pub fn node_at(&self, p: Point) -> Option<NodeId> {
        self.node_keys.get(&p.snap_key(NODE_SNAP_CELL)).copied()
    }

    /// Nearest node to an arbitrary world point.
    ///
    /// Returns `None` only if the graph has no nodes.
    pub fn find_nearest_node(&self, p: Point) -> Option<NodeId> {
        self.spatial_idx.nearest_neighbor(&[p.x, p.y]).map(|e| e.id)
    }

    /// Nearest node within `radius` of `p`.
    pub fn nearest_node_within(&self, p: Point, radius: f32) -> Option<NodeId> {
        self.find_nearest_node(p)
            .filter(|&n| self.nodes[n.index()].pos.distance(p) < radius)
    }

    // ── Path reconstruction ───────────────────────────────────────────────

    /// Segment owning the edge between `a` and `b`, trying both directions.
    pub fn segment_between(&self, a: NodeId, b: NodeId) -> Option<SegmentId> {
        self.edge_segments
            .get(&(a, b))
            .or_else(|| self.edge_segments.get(&(b, a)))
            .copied()
    }

    /// Convert a node path into the list of segments it travels.
    ///
    /// Consecutive pairs inside the same segment collapse into one entry;
    /// pairs with no owning segment are skipped.
    pub fn node_path_to_segments(&self, path: &[NodeId]) -> Vec<SegmentId> {
        let mut segs: Vec<SegmentId> = Vec::new();
        for w in path.windows(2) {
            if let Some(seg) = self.segment_between(w[0], w[1]) {
                if segs.last() != Some(&seg) {
                    segs.push(seg);
                }
            }
        }
        segs
    }

    /// Convert a node path into legs carrying the exact points travelled on
    /// each segment, in travel direction.
    pub fn node_path_to_legs(&self, path: &[NodeId]) -> Vec<RouteLeg> {
        let mut legs: Vec<RouteLeg> = Vec::new();
        for w in path.windows(2) {
            let (Some(a), Some(b)) = (self.node(w[0]), self.node(w[1])) else {
                continue;
            };
            let Some(seg) = self.segment_between(a.id, b.id) else {
                continue;
            };
            match legs.last_mut() {
                Some(leg) if leg.segment == seg && leg.points.last() == Some(&a.pos) => {
                    leg.points.push(b.pos);
                }
                _ => legs.push(RouteLeg { segment: seg, points: vec![a.pos, b.pos] }),
            }
        }
        legs
    }

    // ── Live state helpers ────────────────────────────────────────────────

    /// Add one vehicle to a segment's occupancy.  No-op for unknown ids.
    pub fn occupy(&mut self, id: SegmentId) {
        if let Some(seg) = self.segments.get_mut(&id) {
            seg.occupancy += 1;
        }
    }

    /// Remove one vehicle from a segment's occupancy, never below zero.
    pub fn vacate(&mut self, id: SegmentId) {
        if let Some(seg) = self.segments.get_mut(&id) {
            seg.occupancy = seg.occupancy.saturating_sub(1);
        }
    }

    pub fn set_blocked(&mut self, id: SegmentId, blocked: bool) {
        if let Some(seg) = self.segments.get_mut(&id) {
            seg.blocked = blocked;
        }
    }

    /// Release every node lock held by `vehicle`.  Returns how many were held.
    pub fn release_locks_held_by(&mut self, vehicle: VehicleId) -> usize {
        let mut released = 0;
        for node in &mut self.nodes {
            if node.release(vehicle) {
                released += 1;
            }
        }
        released
    }

    /// Nodes currently locked by `vehicle`.
    pub fn locks_held_by(&self, vehicle: VehicleId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .filter(move |n| n.locked_by == Some(vehicle))
            .map(|n| n.id)
    }

    /// Drop every queued claim by `vehicle`.
    pub fn remove_claims_of(&mut self, vehicle: VehicleId) {
        for node in &mut self.nodes {
            node.dequeue(vehicle);
        }
    }
}
