//! Geometric relation between two edges.

use super::{EdgesCheckOptions, Metrics};
use crate::{
    core::math::{Vector2, angle_between, clip_interval_half_plane, line_circle_interval},
    geom::{Coord, Edge, EdgePair, Point},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Distances within this tolerance of the threshold do not count as violations.
const DIST_EPS: f64 = 1e-7;

/// Side of an edge, the interior of polygon contours lies on the left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Inside,
    Outside,
}

/// Kind of relation checked between two edges.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeRelation {
    /// Inside sides facing each other (same layer).
    Width,
    /// Outside sides facing each other (same layer).
    Space,
    /// The inside of the first faces the inside of the second layer.
    Overlap,
    /// The inside of the first faces the outside of the second layer.
    Enclosing,
    /// The outside of the first faces the inside of the second layer.
    Inside,
    /// Outside sides facing each other (two layers).
    Separation,
}

impl EdgeRelation {
    fn sides(self) -> (Side, Side) {
        match self {
            EdgeRelation::Width | EdgeRelation::Overlap => (Side::Inside, Side::Inside),
            EdgeRelation::Space | EdgeRelation::Separation => (Side::Outside, Side::Outside),
            EdgeRelation::Enclosing => (Side::Inside, Side::Outside),
            EdgeRelation::Inside => (Side::Outside, Side::Inside),
        }
    }

    /// True for relations between two inputs.
    pub fn is_two_layer(self) -> bool {
        !matches!(self, EdgeRelation::Width | EdgeRelation::Space)
    }
}

/// Evaluates one [EdgeRelation] with a threshold distance for pairs of edges.
///
/// A pair violates the relation when the sides of the edges given by the relation face each
/// other, the angle between their facing directions is below the ignore angle, and the edges come
/// closer than the threshold (strictly) under the chosen metric. The result carries the parts of
/// both edges that are closer than the threshold to the other edge (or the whole edges).
#[derive(Debug, Clone, Copy)]
pub struct EdgeRelationFilter {
    relation: EdgeRelation,
    distance: Coord,
    options: EdgesCheckOptions,
}

impl EdgeRelationFilter {
    pub fn new(relation: EdgeRelation, distance: Coord, options: EdgesCheckOptions) -> Self {
        EdgeRelationFilter {
            relation,
            distance,
            options,
        }
    }

    #[inline]
    pub fn relation(&self) -> EdgeRelation {
        self.relation
    }

    #[inline]
    pub fn distance(&self) -> Coord {
        self.distance
    }

    #[inline]
    pub fn options(&self) -> &EdgesCheckOptions {
        &self.options
    }

    /// Check the pair `a` (first input) and `b` (second input or same layer).
    pub fn check(&self, a: &Edge, b: &Edge) -> Option<EdgePair> {
        if self.distance <= 0 || a.is_degenerate() || b.is_degenerate() {
            return None;
        }
        let (side_a, side_b) = self.relation.sides();

        let na = side_normal(a, side_a);
        let nb = side_normal(b, side_b);
        if angle_between(na, -nb) >= self.options.ignore_angle - 1e-9 {
            return None;
        }

        let b_facing = clip_to_side(b, a, side_a)?;
        let a_facing = clip_to_side(a, b, side_b)?;
        let dist = self.distance as f64 - DIST_EPS;
        let ia = near_interval(a_facing, b_facing, dist, self.options.metrics)?;
        let ib = near_interval(b_facing, a_facing, dist, self.options.metrics)?;
        let a_near = sub_segment(a_facing, ia);
        let b_near = sub_segment(b_facing, ib);

        if self.options.min_projection > 0 || self.options.max_projection < Coord::MAX {
            let p = projected_length(a_near, b_near);
            if p < self.options.min_projection as f64 - DIST_EPS
                || p >= self.options.max_projection as f64
            {
                return None;
            }
        }

        let (first, second) = if self.options.whole_edges {
            (*a, *b)
        } else {
            (to_edge(a_near), to_edge(b_near))
        };

        Some(if self.relation.is_two_layer() {
            EdgePair::new(first, second)
        } else {
            EdgePair::new_symmetric(first, second).normalized()
        })
    }
}

type Segment = (Vector2, Vector2);

fn side_normal(e: &Edge, side: Side) -> Vector2 {
    let t = e.d().to_vector2();
    match side {
        Side::Inside => Vector2::new(-t.y, t.x),
        Side::Outside => Vector2::new(t.y, -t.x),
    }
}

/// Part of `e` on the given side of the line through `reference` (line included).
///
/// `None` if nothing or only a single point of `e` is on that side, e.g. for the neighbour of a
/// convex corner.
fn clip_to_side(e: &Edge, reference: &Edge, side: Side) -> Option<Segment> {
    let sign: i128 = if side == Side::Inside { 1 } else { -1 };
    let d = reference.d();
    let s1 = sign * d.cross(e.p1 - reference.p1);
    let s2 = sign * d.cross(e.p2 - reference.p1);
    let p1 = e.p1.to_vector2();
    let p2 = e.p2.to_vector2();
    match (s1 >= 0, s2 >= 0) {
        (true, true) => Some((p1, p2)),
        (false, false) => None,
        (true, false) if s1 == 0 => None,
        (false, true) if s2 == 0 => None,
        _ => {
            let t = s1 as f64 / (s1 - s2) as f64;
            let x = p1 + (p2 - p1).scale(t);
            if s1 >= 0 { Some((p1, x)) } else { Some((x, p2)) }
        }
    }
}

fn sub_segment(s: Segment, (t0, t1): (f64, f64)) -> Segment {
    let d = s.1 - s.0;
    (s.0 + d.scale(t0), s.0 + d.scale(t1))
}

fn to_edge(s: Segment) -> Edge {
    Edge::new(Point::from_vector2(s.0), Point::from_vector2(s.1))
}

fn union(a: Option<(f64, f64)>, b: Option<(f64, f64)>) -> Option<(f64, f64)> {
    match (a, b) {
        (Some(a), Some(b)) => Some((a.0.min(b.0), a.1.max(b.1))),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Parameter interval of segment `a` closer than `dist` to segment `b` under `metrics`.
fn near_interval(a: Segment, b: Segment, dist: f64, metrics: Metrics) -> Option<(f64, f64)> {
    let origin = a.0;
    let dir = a.1 - a.0;
    let bd = b.1 - b.0;

    let band = if bd.length_squared() > DIST_EPS {
        let u = bd.normalize();
        let n = Vector2::new(-u.y, u.x);
        [
            (-u, b.0, DIST_EPS),
            (u, b.1, DIST_EPS),
            (n, b.0, dist),
            (-n, b.0, dist),
        ]
        .into_iter()
        .try_fold((0.0, 1.0), |iv, (normal, at, limit)| {
            clip_interval_half_plane(iv, origin, dir, normal, at, limit)
        })
    } else {
        None
    };

    let hit = match metrics {
        Metrics::Projection => band,
        Metrics::Euclidian => {
            let c0 = line_circle_interval(origin, dir, b.0, dist);
            let c1 = line_circle_interval(origin, dir, b.1, dist);
            union(band, union(c0, c1))
        }
        Metrics::Square => square_sum_interval(origin, dir, b, dist),
    }?;

    let (t0, t1) = (hit.0.max(0.0), hit.1.min(1.0));
    if t1 - t0 > 1e-12 { Some((t0, t1)) } else { None }
}

/// Interval of the line within the Minkowski sum of segment `b` and the square of half size
/// `dist`.
fn square_sum_interval(origin: Vector2, dir: Vector2, b: Segment, dist: f64) -> Option<(f64, f64)> {
    let mut pts = Vec::with_capacity(8);
    for c in [b.0, b.1] {
        for (sx, sy) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            pts.push(c + Vector2::new(sx * dist, sy * dist));
        }
    }
    let hull = convex_hull(pts);
    let n = hull.len();
    let mut iv = (f64::MIN, f64::MAX);
    for i in 0..n {
        let v = hull[i];
        let e = hull[(i + 1) % n] - v;
        // outward normal of a counter clockwise hull edge
        let outward = Vector2::new(e.y, -e.x);
        iv = clip_interval_half_plane(iv, origin, dir, outward, v, 0.0)?;
    }
    Some(iv)
}

/// Counter clockwise convex hull (monotone chain).
fn convex_hull(mut pts: Vec<Vector2>) -> Vec<Vector2> {
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    let cross = |o: Vector2, a: Vector2, b: Vector2| (a - o).perp_dot(b - o);
    let mut lower: Vec<Vector2> = Vec::new();
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }
    let mut upper: Vec<Vector2> = Vec::new();
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Length of the projection of `b` onto the direction of `a`, clipped to `a`.
fn projected_length(a: Segment, b: Segment) -> f64 {
    let ad = a.1 - a.0;
    let l = ad.length();
    if l <= DIST_EPS {
        return 0.0;
    }
    let u = ad.scale(1.0 / l);
    let p0 = (b.0 - a.0).dot(u);
    let p1 = (b.1 - a.0).dot(u);
    let (lo, hi) = if p0 < p1 { (p0, p1) } else { (p1, p0) };
    (hi.min(l) - lo.max(0.0)).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(relation: EdgeRelation, d: Coord) -> EdgeRelationFilter {
        EdgeRelationFilter::new(relation, d, EdgesCheckOptions::new())
    }

    #[test]
    fn width_of_parallel_edges() {
        // left and right edge of a 100 wide box, interior in between
        let left = Edge::from_coords(0, 200, 0, 0);
        let right = Edge::from_coords(100, 0, 100, 200);
        assert!(filter(EdgeRelation::Width, 100).check(&left, &right).is_none());
        let ep = filter(EdgeRelation::Width, 101).check(&left, &right).unwrap();
        assert!(ep.symmetric);
        assert_eq!(ep.distance(), 100);
        assert_eq!(ep.first, left);
        assert_eq!(ep.second, right);
        // outside sides do not face each other
        assert!(filter(EdgeRelation::Space, 500).check(&left, &right).is_none());
    }

    #[test]
    fn partial_overlap_reports_near_parts() {
        let a = Edge::from_coords(0, 0, 100, 0);
        let b = Edge::from_coords(150, 10, 50, 10);
        let ep = filter(EdgeRelation::Width, 20)
            .check(&a, &b)
            .unwrap()
            .normalized();
        // euclidian: the near part of `a` extends beyond the projection by the corner radius
        assert_eq!(ep.first.p1.y, 0);
        assert!(ep.first.p1.x < 50 && ep.first.p1.x > 30);
        assert_eq!(ep.first.p2, Point::new(100, 0));

        let proj = EdgeRelationFilter::new(
            EdgeRelation::Width,
            20,
            EdgesCheckOptions::new().with_metrics(Metrics::Projection),
        );
        let ep = proj.check(&a, &b).unwrap();
        assert_eq!(ep.first, Edge::from_coords(50, 0, 100, 0));
        assert_eq!(ep.second, Edge::from_coords(100, 10, 50, 10));
    }

    #[test]
    fn convex_corner_neighbours_do_not_face() {
        // edges of a triangle meeting in an acute corner
        let a = Edge::from_coords(0, 14, 25, 14);
        let b = Edge::from_coords(25, 14, 12, 30);
        assert!(filter(EdgeRelation::Space, 8).check(&a, &b).is_none());
        assert!(filter(EdgeRelation::Space, 8).check(&b, &a).is_none());

        // inside sides face each other at the corner
        let ep = filter(EdgeRelation::Width, 8).check(&a, &b).unwrap();
        assert!(!ep.first.is_degenerate());
        assert!(!ep.second.is_degenerate());
    }

    #[test]
    fn perpendicular_edges_ignored() {
        let a = Edge::from_coords(0, 0, 100, 0);
        let b = Edge::from_coords(100, 0, 100, 100);
        assert!(filter(EdgeRelation::Width, 50).check(&a, &b).is_none());
    }

    #[test]
    fn enclosing_same_direction_edges() {
        // left edges of an outer box (0..100) and an inner box (10..90), both going down
        let outer = Edge::from_coords(0, 100, 0, 0);
        let inner = Edge::from_coords(10, 90, 10, 10);
        let ep = filter(EdgeRelation::Enclosing, 20)
            .check(&outer, &inner)
            .unwrap();
        assert!(!ep.symmetric);
        // the corner radius around the inner edge's end points covers the full outer edge
        assert_eq!(ep.first, outer);
        assert_eq!(ep.second, inner);
        assert!(filter(EdgeRelation::Enclosing, 10).check(&outer, &inner).is_none());
        assert!(filter(EdgeRelation::Inside, 20).check(&inner, &outer).is_some());
    }

    #[test]
    fn square_metric_corner() {
        // two edges meeting diagonally near a corner
        let a = Edge::from_coords(0, -100, 0, 0);
        let b = Edge::from_coords(10, 10, 110, 10);
        let opts = EdgesCheckOptions {
            ignore_angle: 91.0,
            ..EdgesCheckOptions::new()
        };
        // euclidian distance of the corners is ~14.1, chebyshev is 10
        let eu = EdgeRelationFilter::new(EdgeRelation::Space, 12, opts);
        assert!(eu.check(&a, &b).is_none());
        let sq = EdgeRelationFilter::new(EdgeRelation::Space, 12, opts.with_metrics(Metrics::Square));
        assert!(sq.check(&a, &b).is_some());
    }
}
