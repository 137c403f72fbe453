//! Routing trait and default A* implementation.
//!
//! # Pluggability
//!
//! Trip spawning calls routing via the [`Router`] trait, so hosts can swap
//! in other search strategies without touching the simulation core.
//!
//! # Cost model
//!
//! The step cost from `cur` to `next` over a segment with metadata `meta`
//! blends distance, turning, and throughput:
//!
//! ```text
//! base    = |next - cur|
//! turn    = base * (angle / π)^1.5 * 0.6   (0 on the first step)
//! through = 0.7 / lanes + 0.3 / priority
//! cost    = base * through + turn
//! ```
//!
//! so multi-lane, high-priority roads are preferred and tight turns avoided.
//! The heuristic is plain Euclidean distance to the goal.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::f32::consts::PI;

use mc_core::{NodeId, Point, SegmentId};

use crate::network::RoadNetwork;
use crate::RoadMeta;

// ── RouteLeg ──────────────────────────────────────────────────────────────────

/// One segment's worth of a route: the segment and the points travelled on
/// it, in travel direction.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteLeg {
    pub segment: SegmentId,
    pub points: Vec<Point>,
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable path search over the current graph snapshot.
pub trait Router {
    /// Lowest-cost node path from `start` to `goal`, both inclusive.
    ///
    /// Returns `None` if either endpoint is unknown or the goal is
    /// unreachable.  `start == goal` yields a single-node path.
    fn find_path(&self, network: &RoadNetwork, start: NodeId, goal: NodeId) -> Option<Vec<NodeId>>;
}

// ── AStarRouter ───────────────────────────────────────────────────────────────

/// Best-first A* over nodes with turn- and throughput-aware step costs.
#[derive(Debug, Default, Clone, Copy)]
pub struct AStarRouter;

impl Router for AStarRouter {
    fn find_path(&self, network: &RoadNetwork, start: NodeId, goal: NodeId) -> Option<Vec<NodeId>> {
        astar(network, start, goal)
    }
}

const TURN_EXPONENT: f32 = 1.5;
const TURN_WEIGHT: f32 = 0.6;
const LANE_WEIGHT: f32 = 0.7;
const PRIORITY_WEIGHT: f32 = 0.3;

/// Cost of stepping `cur → next` having arrived at `cur` from `prev`.
pub fn step_cost(prev: Option<Point>, cur: Point, next: Point, meta: &RoadMeta) -> f32 {
    let base = cur.distance(next);

    let mut turn = 0.0;
    if let Some(prev) = prev {
        let v1 = prev.to(cur);
        let v2 = cur.to(next);
        let cos = v1.dot(v2) / (v1.length() * v2.length() + 1e-6);
        let angle = cos.clamp(-1.0, 1.0).acos();
        turn = base * (angle / PI).powf(TURN_EXPONENT) * TURN_WEIGHT;
    }

    let through = LANE_WEIGHT / meta.effective_lanes() as f32
        + PRIORITY_WEIGHT / meta.effective_priority() as f32;
    base * through + turn
}

/// Min-heap entry: lower `f` first, then lower `NodeId`.
#[derive(Copy, Clone, PartialEq)]
struct Frontier {
    f: f32,
    node: NodeId,
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap (max) pops the smallest f.
        other.f.total_cmp(&self.f).then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn astar(network: &RoadNetwork, start: NodeId, goal: NodeId) -> Option<Vec<NodeId>> {
    let goal_pos = network.node(goal)?.pos;
    let start_pos = network.node(start)?.pos;
    if start == goal {
        return Some(vec![start]);
    }

    let n = network.node_count();
    let mut g = vec![f32::INFINITY; n];
    let mut came = vec![NodeId::INVALID; n];
    let mut closed = vec![false; n];

    g[start.index()] = 0.0;
    let mut open = BinaryHeap::new();
    open.push(Frontier { f: start_pos.distance(goal_pos), node: start });

    while let Some(Frontier { node, .. }) = open.pop() {
        if closed[node.index()] {
            continue;
        }
        if node == goal {
            return Some(reconstruct(&came, goal));
        }
        closed[node.index()] = true;

        let current = &network.nodes[node.index()];
        let prev_pos = network.node(came[node.index()]).map(|p| p.pos);

        for edge in &current.edges {
            let neighbor = edge.to;
            if closed[neighbor.index()] {
                continue;
            }
            let meta = network.segment(edge.segment).map(|s| s.meta).unwrap_or_default();
            let next_pos = network.nodes[neighbor.index()].pos;
            let tentative = g[node.index()] + step_cost(prev_pos, current.pos, next_pos, &meta);
            if tentative < g[neighbor.index()] {
                g[neighbor.index()] = tentative;
                came[neighbor.index()] = node;
                open.push(Frontier { f: tentative + next_pos.distance(goal_pos), node: neighbor });
            }
        }
    }

    None
}

fn reconstruct(came: &[NodeId], goal: NodeId) -> Vec<NodeId> {
    let mut path = vec![goal];
    let mut cur = goal;
    while let Some(&prev) = came.get(cur.index()) {
        if prev == NodeId::INVALID {
            break;
        }
        path.push(prev);
        cur = prev;
    }
    path.reverse();
    path
}
