//! Geometric graph builder: polylines → planar node/edge graph.
//!
//! Two passes, both run by [`RoadNetwork::rebuild_graph`]:
//!
//! 1. [`split_intersections`] inserts every proper crossing between two
//!    segments into both polylines, so crossings become shared vertices.
//! 2. [`build_graph`] snaps every vertex onto a 6-unit cell key, merges
//!    vertices that share a key into one node, and emits directed edges
//!    between consecutive vertices.
//!
//! Splitting is O(S² · P²) for S segments of P points; interactive maps have
//! few segments, and the rebuild only runs on geometry edits.
//!
//! [`RoadNetwork::rebuild_graph`]: crate::RoadNetwork::rebuild_graph

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use mc_core::{NodeId, Point, SegmentId};

use crate::network::{Edge, Node};
use crate::RoadSegment;

/// Cell side used to merge near-identical vertices into one node.
pub const NODE_SNAP_CELL: f32 = 6.0;

/// Squared distance under which an inserted crossing is considered a
/// duplicate of an existing vertex.
pub const DUPLICATE_EPS_SQ: f32 = 1.0;

/// Derived graph produced by [`build_graph`].
pub(crate) struct Graph {
    pub nodes: Vec<Node>,
    pub node_keys: FxHashMap<(i64, i64), NodeId>,
    pub edge_segments: FxHashMap<(NodeId, NodeId), SegmentId>,
}

/// Insert each pairwise proper crossing into both polylines.
///
/// Returns the number of points inserted.
pub fn split_intersections(lines: &mut [Vec<Point>]) -> usize {
    let mut inserted = 0;
    for i in 0..lines.len() {
        let (head, tail) = lines.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            inserted += split_pair(a, b);
        }
    }
    inserted
}

fn split_pair(a: &mut Vec<Point>, b: &mut Vec<Point>) -> usize {
    let mut inserted = 0;
    let mut ai = 0;
    while ai + 1 < a.len() {
        let mut bi = 0;
        while bi + 1 < b.len() {
            if let Some(hit) = Point::proper_intersection(a[ai], a[ai + 1], b[bi], b[bi + 1]) {
                if insert_after(a, ai, hit) {
                    inserted += 1;
                }
                if insert_after(b, bi, hit) {
                    inserted += 1;
                    // Resume after the inserted point.
                    bi += 1;
                }
            }
            bi += 1;
        }
        ai += 1;
    }
    inserted
}

/// Insert `p` after index `at` unless a vertex already lies within
/// [`DUPLICATE_EPS_SQ`].
pub(crate) fn insert_after(points: &mut Vec<Point>, at: usize, p: Point) -> bool {
    if points.iter().any(|q| q.distance_sq(p) < DUPLICATE_EPS_SQ) {
        return false;
    }
    points.insert(at + 1, p);
    true
}

/// Unify vertices into nodes, emit edges, and derive `from`/`to`/`capacity`
/// on every segment.
pub(crate) fn build_graph(segments: &mut BTreeMap<SegmentId, RoadSegment>) -> Graph {
    let mut nodes: Vec<Node> = Vec::new();
    let mut node_keys: FxHashMap<(i64, i64), NodeId> = FxHashMap::default();
    let mut edge_segments: FxHashMap<(NodeId, NodeId), SegmentId> = FxHashMap::default();

    for seg in segments.values_mut() {
        if seg.is_degenerate() {
            seg.from = NodeId::INVALID;
            seg.to = NodeId::INVALID;
            seg.capacity = 0;
            continue;
        }

        let last = seg.points.len() - 1;
        let mut prev: Option<NodeId> = None;
        for (i, &p) in seg.points.iter().enumerate() {
            let n = *node_keys.entry(p.snap_key(NODE_SNAP_CELL)).or_insert_with(|| {
                let id = NodeId(nodes.len() as u32);
                nodes.push(Node::new(id, p));
                id
            });
            if i == 0 {
                seg.from = n;
            }
            if i == last {
                seg.to = n;
            }
            match prev {
                Some(prev) if prev != n => {
                    nodes[prev.index()].edges.push(Edge { to: n, segment: seg.id });
                    edge_segments.insert((prev, n), seg.id);
                    if !seg.meta.one_way {
                        nodes[n.index()].edges.push(Edge { to: prev, segment: seg.id });
                        edge_segments.insert((n, prev), seg.id);
                    }
                }
                _ => {}
            }
            prev = Some(n);
        }

        seg.capacity = seg.derived_capacity();
    }

    Graph { nodes, node_keys, edge_segments }
}
