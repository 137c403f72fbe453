//! Geometry edits: the drawing tools that mutate a [`RoadNetwork`].
//!
//! Every public edit finishes with [`RoadNetwork::rebuild_graph`], so callers
//! always observe a graph consistent with the segments.  Attachment points
//! (driveways, roundabout connectors, T-junctions) are inserted into the
//! target polyline so the new piece shares a vertex with it and the graph
//! builder merges them into one node.

use tracing::debug;

use mc_core::{Point, SegmentId};

use crate::builder::{insert_after, DUPLICATE_EPS_SQ};
use crate::network::RoadNetwork;
use crate::{NetworkError, NetworkResult, RoadMeta};

/// Multiple of the grid within which a building connects to a road.
const BUILDING_CONNECT_CELLS: f32 = 3.0;

/// Roundabout half-size, in grid cells.
const ROUNDABOUT_HALF_CELLS: f32 = 1.5;

/// Endpoints within this many half-sizes of a roundabout centre get a connector.
const ROUNDABOUT_REACH: f32 = 2.5;

// ── WaterRect ─────────────────────────────────────────────────────────────────

/// Axis-aligned blocking water area.  Only bridges may cross it.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WaterRect {
    pub min: Point,
    pub max: Point,
}

impl WaterRect {
    /// Rectangle spanning two opposite corners in any order.
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Rectangle from a top-left corner and a size.
    pub fn from_origin(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(Point::new(x, y), Point::new(x + w, y + h))
    }

    pub fn square(center: Point, half: f32) -> Self {
        Self::new(center.offset(-half, -half), center.offset(half, half))
    }

    /// Closed containment test.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// True when either endpoint is inside or the segment crosses an edge.
    pub fn intersects_segment(&self, a: Point, b: Point) -> bool {
        if self.contains(a) || self.contains(b) {
            return true;
        }
        let corners = [
            self.min,
            Point::new(self.max.x, self.min.y),
            self.max,
            Point::new(self.min.x, self.max.y),
        ];
        (0..4).any(|i| Point::proper_intersection(a, b, corners[i], corners[(i + 1) % 4]).is_some())
    }
}

// ── Pure helpers ──────────────────────────────────────────────────────────────

/// Snap to the build grid and replace diagonal steps with an axis-aligned
/// corner on the dominant axis first.  Consecutive duplicates are removed.
pub fn orthogonalize(points: &[Point], grid: f32) -> Vec<Point> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    let mut out = vec![first.snap_to_grid(grid)];
    for &raw in &points[1..] {
        let prev = out[out.len() - 1];
        let p = raw.snap_to_grid(grid);
        let dx = (p.x - prev.x).abs();
        let dy = (p.y - prev.y).abs();
        if dx > 0.0 && dy > 0.0 {
            if dx > dy {
                out.push(Point::new(p.x, prev.y));
            } else {
                out.push(Point::new(prev.x, p.y));
            }
        }
        out.push(p);
    }
    out.dedup();
    out
}

/// Closest point to `p` on a polyline, with the index of the sub-segment it
/// lies on and its distance.
fn closest_on_polyline(points: &[Point], p: Point) -> Option<(usize, Point, f32)> {
    points
        .windows(2)
        .enumerate()
        .map(|(i, w)| {
            let q = p.project_onto_segment(w[0], w[1]);
            (i, q, q.distance(p))
        })
        .min_by(|a, b| a.2.total_cmp(&b.2))
}

// ── Edits ─────────────────────────────────────────────────────────────────────

impl RoadNetwork {
    /// True if any sub-segment of `points` touches a water area.
    pub fn crosses_water(&self, points: &[Point]) -> bool {
        points
            .windows(2)
            .any(|w| self.water.iter().any(|r| r.intersects_segment(w[0], w[1])))
    }

    /// Add a blocking water rectangle.  Existing roads are left in place.
    pub fn add_water(&mut self, rect: WaterRect) {
        self.water.push(rect);
    }

    /// Add a lake: a square of half-size `grid` around `center`.
    pub fn add_lake(&mut self, center: Point) -> WaterRect {
        let rect = WaterRect::square(center, self.grid);
        self.water.push(rect);
        rect
    }

    /// Nearest point on any road to `p`, skipping `exclude`.
    ///
    /// Returns the owning segment, the point, and its distance.
    pub fn nearest_point_on_roads(
        &self,
        p: Point,
        exclude: Option<SegmentId>,
    ) -> Option<(SegmentId, Point, f32)> {
        self.segments
            .values()
            .filter(|s| Some(s.id) != exclude)
            .filter_map(|s| closest_on_polyline(&s.points, p).map(|(_, q, d)| (s.id, q, d)))
            .min_by(|a, b| a.2.total_cmp(&b.2))
    }

    /// Make `p` a vertex of segment `id`, inserted on its closest sub-segment.
    ///
    /// Returns the vertex actually used: an existing vertex within the
    /// duplicate epsilon, or the projection of `p` onto the polyline.
    fn attach_to_segment(&mut self, id: SegmentId, p: Point) -> Option<Point> {
        let seg = self.segment_mut(id)?;
        if let Some(&v) = seg.points.iter().find(|q| q.distance_sq(p) < DUPLICATE_EPS_SQ) {
            return Some(v);
        }
        let (i, q, _) = closest_on_polyline(&seg.points, p)?;
        if let Some(&v) = seg.points.iter().find(|v| v.distance_sq(q) < DUPLICATE_EPS_SQ) {
            return Some(v);
        }
        insert_after(&mut seg.points, i, q);
        Some(q)
    }

    /// Attach a drawn endpoint that lies on another road's interior.
    fn attach_t_junction(&mut self, p: Point, own: SegmentId) {
        if let Some((target, _, d)) = self.nearest_point_on_roads(p, Some(own)) {
            if d * d < DUPLICATE_EPS_SQ {
                self.attach_to_segment(target, p);
            }
        }
    }

    fn snap_to_nearby_node(&self, p: Point) -> Point {
        self.nearest_node_within(p, self.node_snap_tolerance)
            .and_then(|n| self.node(n))
            .map_or(p, |n| n.pos)
    }

    /// Draw a road through `points`.
    ///
    /// The path is grid-snapped and orthogonalised, its endpoints snap onto
    /// nodes within `node_snap_tolerance`, and endpoints landing on another
    /// road's interior become T-junctions.
    ///
    /// # Errors
    ///
    /// [`NetworkError::Degenerate`] when fewer than two distinct points
    /// remain, [`NetworkError::CrossesWater`] when a non-bridge road would
    /// touch water.
    pub fn add_road(&mut self, points: &[Point], meta: RoadMeta) -> NetworkResult<SegmentId> {
        let mut pts = orthogonalize(points, self.grid);
        if pts.len() < 2 {
            return Err(NetworkError::Degenerate { points: pts.len() });
        }
        let last = pts.len() - 1;
        pts[0] = self.snap_to_nearby_node(pts[0]);
        pts[last] = self.snap_to_nearby_node(pts[last]);
        pts.dedup();
        if pts.len() < 2 {
            return Err(NetworkError::Degenerate { points: pts.len() });
        }

        if !meta.bridge && self.crosses_water(&pts) {
            return Err(NetworkError::CrossesWater);
        }

        let (start, end) = (pts[0], pts[pts.len() - 1]);
        let id = self.insert_segment(pts, meta);
        self.attach_t_junction(start, id);
        self.attach_t_junction(end, id);
        self.rebuild_graph();
        debug!(segment = %id, "road added");
        Ok(id)
    }

    /// Place a one-way square roundabout centred on `center` and connect
    /// nearby road endpoints to it.
    ///
    /// Returns the loop id followed by the connector ids.
    pub fn place_roundabout(&mut self, center: Point) -> Vec<SegmentId> {
        let r = self.grid * ROUNDABOUT_HALF_CELLS;
        let ring: Vec<Point> = [(-r, -r), (r, -r), (r, r), (-r, r), (-r, -r)]
            .iter()
            .map(|&(dx, dy)| center.offset(dx, dy).snap_to_grid(self.grid))
            .collect();

        let endpoints: Vec<Point> = self
            .segments
            .values()
            .filter(|s| !s.is_degenerate())
            .flat_map(|s| [s.points[0], s.points[s.points.len() - 1]])
            .filter(|p| p.distance(center) <= r * ROUNDABOUT_REACH)
            .collect();

        let ring_id = self.insert_segment(ring, RoadMeta::roundabout());
        let mut placed = vec![ring_id];

        for p in endpoints {
            let Some((_, hit, gap)) = self
                .segment(ring_id)
                .and_then(|s| closest_on_polyline(&s.points, p))
            else {
                continue;
            };
            if gap <= self.grid * 0.5 {
                continue;
            }
            let Some(hit) = self.attach_to_segment(ring_id, hit) else {
                continue;
            };
            placed.push(self.insert_segment(vec![p, hit], RoadMeta::street()));
        }

        self.rebuild_graph();
        debug!(center = %center, connectors = placed.len() - 1, "roundabout placed");
        placed
    }

    /// Connect a building at `p` to the nearest road with a short driveway.
    ///
    /// Returns `None` if no road lies within three grid cells, or the
    /// building already sits on the road.
    pub fn connect_building(&mut self, p: Point) -> Option<SegmentId> {
        let (target, _, d) = self.nearest_point_on_roads(p, None)?;
        if d > self.grid * BUILDING_CONNECT_CELLS {
            return None;
        }
        let from = p.snap_to_grid(self.grid);
        let (_, q, _) = self
            .segment(target)
            .and_then(|s| closest_on_polyline(&s.points, from))?;
        if from.distance_sq(q) < DUPLICATE_EPS_SQ {
            return None;
        }
        let hit = self.attach_to_segment(target, q)?;
        let id = self.insert_segment(vec![from, hit], RoadMeta::driveway());
        self.rebuild_graph();
        Some(id)
    }

    /// Remove every segment with a vertex within one grid cell of `p`.
    ///
    /// Returns the removed ids; the caller is responsible for vehicles
    /// routed over them.
    pub fn bulldoze_at(&mut self, p: Point) -> Vec<SegmentId> {
        let radius = self.grid;
        let doomed: Vec<SegmentId> = self
            .segments
            .values()
            .filter(|s| s.points.iter().any(|q| q.distance(p) < radius))
            .map(|s| s.id)
            .collect();
        for id in &doomed {
            self.remove_segment(*id);
        }
        if !doomed.is_empty() {
            self.rebuild_graph();
            debug!(at = %p, removed = doomed.len(), "bulldozed");
        }
        doomed
    }
}
