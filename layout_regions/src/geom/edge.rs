use std::fmt;

use super::{Area, BBox, Coord, CplxTrans, Point, Vector, sign128};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A directed edge from `p1` to `p2`. Both points may be equal, such a "dot" edge is a valid
/// point marker.
///
/// For edges taken from polygon contours the polygon interior lies on the left side of the edge.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Edge {
    pub p1: Point,
    pub p2: Point,
}

impl Edge {
    #[inline]
    pub const fn new(p1: Point, p2: Point) -> Self {
        Edge { p1, p2 }
    }

    /// Edge from coordinate values.
    #[inline]
    pub const fn from_coords(x1: Coord, y1: Coord, x2: Coord, y2: Coord) -> Self {
        Edge::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    /// Direction vector (`p2 - p1`).
    #[inline]
    pub fn d(&self) -> Vector {
        self.p2 - self.p1
    }

    #[inline]
    pub fn dx(&self) -> Coord {
        self.p2.x - self.p1.x
    }

    #[inline]
    pub fn dy(&self) -> Coord {
        self.p2.y - self.p1.y
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.p1 == self.p2
    }

    #[inline]
    pub fn is_ortho(&self) -> bool {
        self.p1.x == self.p2.x || self.p1.y == self.p2.y
    }

    #[inline]
    pub fn sq_length(&self) -> Area {
        self.d().sq_length()
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.d().length()
    }

    /// Manhattan length (`|dx| + |dy|`).
    #[inline]
    pub fn ortho_length(&self) -> Area {
        (self.dx() as Area).abs() + (self.dy() as Area).abs()
    }

    #[inline]
    pub fn bbox(&self) -> BBox {
        BBox::from_points(self.p1, self.p2)
    }

    #[inline]
    pub fn reversed(&self) -> Edge {
        Edge::new(self.p2, self.p1)
    }

    #[inline]
    pub fn moved(&self, v: Vector) -> Edge {
        Edge::new(self.p1 + v, self.p2 + v)
    }

    #[inline]
    pub fn transformed(&self, t: &CplxTrans) -> Edge {
        Edge::new(t.apply(self.p1), t.apply(self.p2))
    }

    /// Side of `p` relative to the infinite line through this edge: `1` left, `-1` right, `0` on
    /// the line.
    #[inline]
    pub fn side_of(&self, p: Point) -> i32 {
        sign128(self.d().cross(p - self.p1))
    }

    /// True if the edges are parallel or anti-parallel (degenerate edges are parallel to
    /// anything).
    #[inline]
    pub fn is_parallel(&self, other: &Edge) -> bool {
        self.d().cross(other.d()) == 0
    }

    /// True if `p` lies on the edge, end points included.
    pub fn contains(&self, p: Point) -> bool {
        if self.is_degenerate() {
            return p == self.p1;
        }
        self.side_of(p) == 0 && self.bbox().contains_point(p)
    }

    /// True if `p` lies on the edge but is neither end point.
    pub fn contains_excl(&self, p: Point) -> bool {
        p != self.p1 && p != self.p2 && self.contains(p)
    }

    /// True if both edges lie on the same infinite line.
    pub fn is_collinear(&self, other: &Edge) -> bool {
        if self.is_degenerate() {
            return other.is_degenerate() && other.p1 == self.p1
                || !other.is_degenerate() && other.side_of(self.p1) == 0;
        }
        self.side_of(other.p1) == 0 && self.side_of(other.p2) == 0
    }

    /// True if the edges are collinear and share a segment of non-zero length.
    pub fn coincident(&self, other: &Edge) -> bool {
        if self.is_degenerate() || other.is_degenerate() || !self.is_collinear(other) {
            return false;
        }
        let d = self.d();
        let (a0, a1) = (0i128, d.dot(d));
        let (b0, b1) = {
            let u = d.dot(other.p1 - self.p1);
            let v = d.dot(other.p2 - self.p1);
            if u < v { (u, v) } else { (v, u) }
        };
        a0.max(b0) < a1.min(b1)
    }

    /// True if the edges have at least one point in common.
    pub fn intersects(&self, other: &Edge) -> bool {
        if !self.bbox().touches(&other.bbox()) {
            return false;
        }
        if self.is_degenerate() {
            return other.contains(self.p1);
        }
        if other.is_degenerate() {
            return self.contains(other.p1);
        }

        let s1 = self.side_of(other.p1);
        let s2 = self.side_of(other.p2);
        let s3 = other.side_of(self.p1);
        let s4 = other.side_of(self.p2);
        if s1 == 0 && s2 == 0 {
            // collinear, bounding boxes touch
            return true;
        }
        s1 * s2 <= 0 && s3 * s4 <= 0
    }

    /// True if the edges cross in a single point that is interior to both edges.
    pub fn crosses(&self, other: &Edge) -> bool {
        if !self.bbox().touches(&other.bbox()) || self.is_parallel(other) {
            return false;
        }
        self.side_of(other.p1) * self.side_of(other.p2) < 0
            && other.side_of(self.p1) * other.side_of(self.p2) < 0
    }

    /// Intersection point of two non-parallel intersecting edges, rounded to the grid.
    ///
    /// Returns `None` if the edges do not intersect or are parallel.
    pub fn crossing_point(&self, other: &Edge) -> Option<Point> {
        if self.is_parallel(other) || !self.intersects(other) {
            return None;
        }
        Some(self.line_intersection_unchecked(other))
    }

    /// Intersection of the infinite lines through both edges, rounded to the grid. The edges must
    /// not be parallel.
    pub(crate) fn line_intersection_unchecked(&self, other: &Edge) -> Point {
        let d1 = self.d();
        let d2 = other.d();
        let den = d1.cross(d2);
        let num = (other.p1 - self.p1).cross(d2);
        // p = self.p1 + d1 * num / den, rounded half away from zero
        let px = self.p1.x as i128 * den + d1.x as i128 * num;
        let py = self.p1.y as i128 * den + d1.y as i128 * num;
        Point::new(div_round(px, den) as Coord, div_round(py, den) as Coord)
    }

    /// Perpendicular distance of `p` from the infinite line through the edge.
    pub fn distance_abs(&self, p: Point) -> f64 {
        if self.is_degenerate() {
            return self.p1.distance(p);
        }
        (self.d().cross(p - self.p1) as f64).abs() / self.length()
    }

    /// Euclidean distance of `p` from the edge segment.
    pub fn euclidian_distance(&self, p: Point) -> f64 {
        crate::core::math::point_segment_distance(
            self.p1.to_vector2(),
            self.p2.to_vector2(),
            p.to_vector2(),
        )
    }

    /// The edge shifted perpendicular by `d` to its left side (right side for negative `d`).
    pub fn shifted(&self, d: Coord) -> Edge {
        if self.is_degenerate() || d == 0 {
            return *self;
        }
        let n = self.d().to_vector2().unit_perp().scale(d as f64);
        let v = Vector::from_vector2(n);
        self.moved(v)
    }
}

/// Integer division of `num / den` rounded half away from zero.
pub(crate) fn div_round(num: i128, den: i128) -> i128 {
    let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
    if num >= 0 {
        (2 * num + den) / (2 * den)
    } else {
        -((-2 * num + den) / (2 * den))
    }
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({};{})", self.p1, self.p2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(x1: Coord, y1: Coord, x2: Coord, y2: Coord) -> Edge {
        Edge::from_coords(x1, y1, x2, y2)
    }

    #[test]
    fn side_and_containment() {
        let a = e(0, 0, 10, 0);
        assert_eq!(a.side_of(Point::new(5, 5)), 1);
        assert_eq!(a.side_of(Point::new(5, -5)), -1);
        assert!(a.contains(Point::new(10, 0)));
        assert!(!a.contains_excl(Point::new(10, 0)));
        assert!(!a.contains(Point::new(11, 0)));
    }

    #[test]
    fn crossing_and_touching() {
        let a = e(0, 0, 10, 10);
        let b = e(0, 10, 10, 0);
        assert!(a.crosses(&b));
        assert_eq!(a.crossing_point(&b), Some(Point::new(5, 5)));

        let c = e(10, 10, 20, 0);
        assert!(a.intersects(&c));
        assert!(!a.crosses(&c));

        // rounding of non-grid crossing points
        let d = e(0, 0, 3, 1);
        let f = e(0, 1, 3, 0);
        assert_eq!(d.crossing_point(&f), Some(Point::new(2, 1)));
    }

    #[test]
    fn coincidence() {
        assert!(e(0, 0, 10, 0).coincident(&e(20, 0, 5, 0)));
        assert!(!e(0, 0, 10, 0).coincident(&e(10, 0, 20, 0)));
        assert!(!e(0, 0, 10, 0).coincident(&e(0, 1, 10, 1)));
    }

    #[test]
    fn div_round_half_away() {
        assert_eq!(div_round(3, 2), 2);
        assert_eq!(div_round(-3, 2), -2);
        assert_eq!(div_round(1, 3), 0);
        assert_eq!(div_round(5, -2), -3);
    }
}
