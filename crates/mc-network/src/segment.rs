//! Road segments and their metadata.

use mc_core::geo::polyline_length;
use mc_core::{NodeId, Point, SegmentId};

/// Polyline length that adds one unit of per-lane capacity.
const LENGTH_PER_CAPACITY_UNIT: f32 = 120.0;

/// Minimum per-lane capacity of any segment.
const MIN_CAPACITY_PER_LANE: u32 = 4;

/// Static configuration of a road segment.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RoadMeta {
    /// Traffic may only flow from the first point to the last.
    pub one_way: bool,
    /// Lane count; values below 1 are treated as 1.
    pub lanes: u8,
    /// Priority tier; 3 and above is a highway.
    pub priority: u8,
    /// Drawn with the bridge tool; may cross water.
    pub bridge: bool,
    /// Auto-generated building connector.
    pub driveway: bool,
}

impl Default for RoadMeta {
    fn default() -> Self {
        Self { one_way: false, lanes: 1, priority: 1, bridge: false, driveway: false }
    }
}

impl RoadMeta {
    /// Plain two-way street.
    pub fn street() -> Self {
        Self::default()
    }

    /// At least three lanes, priority three.
    pub fn highway() -> Self {
        Self { lanes: 3, priority: 3, ..Self::default() }
    }

    /// One-way loop used by roundabouts.
    pub fn roundabout() -> Self {
        Self { one_way: true, lanes: 1, priority: 2, ..Self::default() }
    }

    pub fn driveway() -> Self {
        Self { driveway: true, ..Self::default() }
    }

    pub fn bridge() -> Self {
        Self { bridge: true, ..Self::default() }
    }

    pub fn one_way(mut self, one_way: bool) -> Self {
        self.one_way = one_way;
        self
    }

    pub fn lanes(mut self, lanes: u8) -> Self {
        self.lanes = lanes;
        self
    }

    pub fn priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    #[inline]
    pub fn effective_lanes(&self) -> u32 {
        u32::from(self.lanes.max(1))
    }

    #[inline]
    pub fn effective_priority(&self) -> u32 {
        u32::from(self.priority.max(1))
    }
}

/// A drawn or generated polyline road piece.
///
/// `points`, `meta` and `id` are authored; `from`, `to` and `capacity` are
/// derived by the graph rebuild; `occupancy` and `blocked` are live
/// simulation state.
#[derive(Clone, Debug)]
pub struct RoadSegment {
    pub id: SegmentId,
    pub points: Vec<Point>,
    pub meta: RoadMeta,

    /// Node at the first point.  `NodeId::INVALID` before the first rebuild
    /// or for degenerate geometry.
    pub from: NodeId,
    /// Node at the last point.
    pub to: NodeId,
    /// Throughput limit used by the congestion model.
    pub capacity: u32,
    /// Vehicles currently on this segment.
    pub occupancy: u32,
    /// A vehicle is being held at the end of this segment.
    pub blocked: bool,
}

impl RoadSegment {
    pub fn new(id: SegmentId, points: Vec<Point>, meta: RoadMeta) -> Self {
        Self {
            id,
            points,
            meta,
            from: NodeId::INVALID,
            to: NodeId::INVALID,
            capacity: 0,
            occupancy: 0,
            blocked: false,
        }
    }

    /// Fewer than two points cannot carry traffic.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 2
    }

    pub fn length(&self) -> f32 {
        polyline_length(&self.points)
    }

    /// `max(4, floor(length / 120)) × lanes`.
    pub fn derived_capacity(&self) -> u32 {
        let by_length = (self.length() / LENGTH_PER_CAPACITY_UNIT).floor() as u32;
        by_length.max(MIN_CAPACITY_PER_LANE) * self.meta.effective_lanes()
    }
}
