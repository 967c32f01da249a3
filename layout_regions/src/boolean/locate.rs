//! Point location against edge sets using a downward ray and half-open x ranges.
//!
//! Query points are given in doubled coordinates so that edge midpoints can be located exactly.

use static_aabb2d_index::StaticAABB2DIndex;

use crate::{
    core::spatial::extents_index,
    geom::{Edge, Point, PointLocation, Polygon},
};

/// Doubled coordinates of the midpoint of `e`.
#[inline]
pub(crate) fn midpoint2(e: &Edge) -> (i64, i64) {
    (
        e.p1.x as i64 + e.p2.x as i64,
        e.p1.y as i64 + e.p2.y as i64,
    )
}

/// Doubled coordinates of a point.
#[inline]
pub(crate) fn point2(p: Point) -> (i64, i64) {
    (2 * p.x as i64, 2 * p.y as i64)
}

/// Cross product of the edge direction with the vector from the (doubled) edge start to the
/// doubled point `q`. Positive if `q` is left of the edge.
#[inline]
pub(crate) fn side2(e: &Edge, q: (i64, i64)) -> i128 {
    let dx = e.dx() as i128;
    let dy = e.dy() as i128;
    let qx = q.0 as i128 - 2 * e.p1.x as i128;
    let qy = q.1 as i128 - 2 * e.p1.y as i128;
    dx * qy - dy * qx
}

/// True if the doubled point `q` lies on the edge.
pub(crate) fn on_edge2(e: &Edge, q: (i64, i64)) -> bool {
    let (x1, y1) = point2(e.p1);
    let (x2, y2) = point2(e.p2);
    if q.0 < x1.min(x2) || q.0 > x1.max(x2) || q.1 < y1.min(y2) || q.1 > y1.max(y2) {
        return false;
    }
    side2(e, q) == 0
}

/// Winding contribution of `e` for a downward ray from the doubled point `q`.
#[inline]
pub(crate) fn ray_contribution2(e: &Edge, q: (i64, i64)) -> i32 {
    let (x1, _) = point2(e.p1);
    let (x2, _) = point2(e.p2);
    if x1 == x2 {
        return 0;
    }
    let (lo, hi, dir) = if x1 < x2 { (x1, x2, 1) } else { (x2, x1, -1) };
    if q.0 < lo || q.0 >= hi {
        return 0;
    }
    // q strictly above the edge
    let s = side2(e, q) * dir as i128;
    if s > 0 { dir } else { 0 }
}

/// True if the doubled point `q` is inside the closed contour (boundary excluded).
pub(crate) fn contour_contains2(pts: &[Point], q: (i64, i64)) -> bool {
    let n = pts.len();
    let mut wn = 0;
    for i in 0..n {
        let e = Edge::new(pts[i], pts[(i + 1) % n]);
        wn += ray_contribution2(&e, q);
    }
    wn != 0
}

/// Spatial lookup structure for locating points relative to the union of a set of polygons.
pub(crate) struct RegionLocator {
    edges: Vec<Edge>,
    index: StaticAABB2DIndex<i64>,
}

impl RegionLocator {
    pub(crate) fn new<'a, I>(polygons: I) -> Self
    where
        I: IntoIterator<Item = &'a Polygon>,
    {
        let edges: Vec<Edge> = polygons.into_iter().flat_map(|p| p.edges()).collect();
        Self::from_edges(edges)
    }

    /// Locator over raw contour edges (interior on the left side).
    pub(crate) fn from_edges(edges: Vec<Edge>) -> Self {
        let index = extents_index(edges.iter().map(|e| {
            let b = e.bbox();
            (
                2 * b.left as i64,
                2 * b.bottom as i64,
                2 * b.right as i64,
                2 * b.top as i64,
            )
        }));
        RegionLocator { edges, index }
    }

    #[inline]
    pub(crate) fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[inline]
    pub(crate) fn index(&self) -> &StaticAABB2DIndex<i64> {
        &self.index
    }

    /// Location of the doubled point `q`.
    pub(crate) fn locate2(&self, q: (i64, i64), stack: &mut Vec<usize>) -> PointLocation {
        if self.edges.is_empty() {
            return PointLocation::Outside;
        }
        let mut wn = 0;
        let mut boundary = false;
        let edges = &self.edges;
        let mut visitor = |i: usize| {
            let e = &edges[i];
            if on_edge2(e, q) {
                boundary = true;
            } else {
                wn += ray_contribution2(e, q);
            }
        };
        self.index
            .visit_query_with_stack(q.0, i64::MIN / 4, q.0, q.1, &mut visitor, stack);
        if boundary {
            PointLocation::Boundary
        } else if wn > 0 {
            PointLocation::Inside
        } else {
            PointLocation::Outside
        }
    }

    #[inline]
    pub(crate) fn locate(&self, p: Point, stack: &mut Vec<usize>) -> PointLocation {
        self.locate2(point2(p), stack)
    }
}
