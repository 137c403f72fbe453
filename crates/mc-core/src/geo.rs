//! Plane coordinate type and the geometric primitives used by the graph
//! builder, router, and arbitration.
//!
//! Right-hand tests use the y-up convention: a vector `b` lies to the right
//! of a vector `a` when `a.cross(b) < 0`.

/// A 2-D point (or direction vector) in simulation units.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Parametric tolerance for [`Point::proper_intersection`].
const PARAM_EPS: f32 = 1e-6;

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance.
    #[inline]
    pub fn distance(self, other: Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    #[inline]
    pub fn distance_sq(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Vector from `self` to `other`.
    #[inline]
    pub fn to(self, other: Point) -> Point {
        Point::new(other.x - self.x, other.y - self.y)
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    #[inline]
    pub fn dot(self, other: Point) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// 2-D cross product (z component of the 3-D cross product).
    #[inline]
    pub fn cross(self, other: Point) -> f32 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    pub fn offset(self, dx: f32, dy: f32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Round onto a square grid of side `grid`.
    #[inline]
    pub fn snap_to_grid(self, grid: f32) -> Point {
        Point::new((self.x / grid).round() * grid, (self.y / grid).round() * grid)
    }

    /// Integer cell key used to merge near-identical points.
    #[inline]
    pub fn snap_key(self, cell: f32) -> (i64, i64) {
        ((self.x / cell).round() as i64, (self.y / cell).round() as i64)
    }

    /// Closest point to `self` on the closed segment `a`–`b`.
    pub fn project_onto_segment(self, a: Point, b: Point) -> Point {
        let ab = a.to(b);
        let len_sq = ab.dot(ab);
        let len_sq = if len_sq > 0.0 { len_sq } else { 1.0 };
        let t = (a.to(self).dot(ab) / len_sq).clamp(0.0, 1.0);
        Point::new(a.x + ab.x * t, a.y + ab.y * t)
    }

    /// Intersection of segments `p`–`p2` and `q`–`q2` strictly inside both.
    ///
    /// Parallel and colinear pairs return `None`, as do crossings within a
    /// parametric epsilon of either segment's endpoints.
    pub fn proper_intersection(p: Point, p2: Point, q: Point, q2: Point) -> Option<Point> {
        let r = p.to(p2);
        let s = q.to(q2);
        let rxs = r.cross(s);
        if rxs.abs() < PARAM_EPS {
            return None;
        }
        let qp = p.to(q);
        let t = qp.cross(s) / rxs;
        let u = qp.cross(r) / rxs;
        let inside = |v: f32| v > PARAM_EPS && v < 1.0 - PARAM_EPS;
        if inside(t) && inside(u) {
            Some(Point::new(p.x + t * r.x, p.y + t * r.y))
        } else {
            None
        }
    }
}

/// Total length of a polyline.
pub fn polyline_length(points: &[Point]) -> f32 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}
