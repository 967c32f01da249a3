//! Edge versus region operations.

use super::locate::{RegionLocator, midpoint2, point2};
use crate::{
    geom::{Edge, PointLocation, Polygon},
    properties::WithProperties,
};

/// Which parts of edges to keep when clipping against a region.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EdgeRegionMode {
    /// Parts strictly inside the region.
    Inside,
    /// Parts strictly outside the region.
    Outside,
    /// Parts inside the region or on its boundary.
    InsideOrBoundary,
    /// Parts on the region boundary.
    Boundary,
    /// Parts outside the region or on its boundary.
    OutsideOrBoundary,
}

impl EdgeRegionMode {
    #[inline]
    fn accepts(self, loc: PointLocation) -> bool {
        match self {
            EdgeRegionMode::Inside => loc == PointLocation::Inside,
            EdgeRegionMode::Outside => loc == PointLocation::Outside,
            EdgeRegionMode::InsideOrBoundary => loc != PointLocation::Outside,
            EdgeRegionMode::Boundary => loc == PointLocation::Boundary,
            EdgeRegionMode::OutsideOrBoundary => loc != PointLocation::Inside,
        }
    }
}

/// Splits edges at a region's boundary and classifies the pieces.
///
/// The region polygons are expected to be merged; overlapping polygons would report their inner
/// edges as boundary.
pub struct EdgeClipper {
    locator: RegionLocator,
}

impl EdgeClipper {
    pub fn new<'a, I>(polygons: I) -> Self
    where
        I: IntoIterator<Item = &'a Polygon>,
    {
        EdgeClipper {
            locator: RegionLocator::new(polygons),
        }
    }

    /// Pieces of `e` with their location. Consecutive pieces with the same location are joined.
    pub fn classify(&self, e: &Edge, stack: &mut Vec<usize>) -> Vec<(Edge, PointLocation)> {
        if e.is_degenerate() {
            return vec![(*e, self.locator.locate(e.p1, stack))];
        }

        let mut pts = Vec::new();
        let b = e.bbox();
        let edges = self.locator.edges();
        let mut visitor = |i: usize| {
            let r = &edges[i];
            for p in [r.p1, r.p2] {
                if e.contains_excl(p) {
                    pts.push(p);
                }
            }
            if e.crosses(r) {
                let p = e.line_intersection_unchecked(r);
                if p != e.p1 && p != e.p2 {
                    pts.push(p);
                }
            }
        };
        self.locator.index().visit_query_with_stack(
            2 * b.left as i64,
            2 * b.bottom as i64,
            2 * b.right as i64,
            2 * b.top as i64,
            &mut visitor,
            stack,
        );

        let d = e.d();
        pts.sort_by_key(|p| d.dot(*p - e.p1));
        pts.dedup();

        let mut pieces: Vec<(Edge, PointLocation)> = Vec::with_capacity(pts.len() + 1);
        let mut last = e.p1;
        for p in pts.into_iter().chain(std::iter::once(e.p2)) {
            if p == last {
                continue;
            }
            let piece = Edge::new(last, p);
            let loc = self.locator.locate2(midpoint2(&piece), stack);
            match pieces.last_mut() {
                Some((prev, prev_loc)) if *prev_loc == loc && prev.is_parallel(&piece) => {
                    prev.p2 = p;
                }
                _ => pieces.push((piece, loc)),
            }
            last = p;
        }
        pieces
    }

    /// Location of a single point.
    pub fn locate_point(&self, p: crate::geom::Point, stack: &mut Vec<usize>) -> PointLocation {
        self.locator.locate2(point2(p), stack)
    }

    /// Pieces of `edges` accepted by `mode`.
    pub fn clip(
        &self,
        edges: &[WithProperties<Edge>],
        mode: EdgeRegionMode,
    ) -> Vec<WithProperties<Edge>> {
        let mut stack = Vec::new();
        let mut result = Vec::new();
        for e in edges {
            result.extend(
                self.classify(&e.shape, &mut stack)
                    .into_iter()
                    .filter(|(_, loc)| mode.accepts(*loc))
                    .map(|(piece, _)| WithProperties::new(piece, e.prop_id)),
            );
        }
        result
    }

    /// Inside-or-boundary and outside parts in one pass.
    pub fn split(
        &self,
        edges: &[WithProperties<Edge>],
    ) -> (Vec<WithProperties<Edge>>, Vec<WithProperties<Edge>>) {
        let mut stack = Vec::new();
        let mut inside = Vec::new();
        let mut outside = Vec::new();
        for e in edges {
            for (piece, loc) in self.classify(&e.shape, &mut stack) {
                let piece = WithProperties::new(piece, e.prop_id);
                if loc == PointLocation::Outside {
                    outside.push(piece);
                } else {
                    inside.push(piece);
                }
            }
        }
        (inside, outside)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::BBox;

    #[test]
    fn classify_through_box() {
        let b = Polygon::from_box(BBox::new(0, 0, 10, 10));
        let clipper = EdgeClipper::new([&b]);
        let mut stack = Vec::new();
        let pieces = clipper.classify(&Edge::from_coords(-5, 5, 15, 5), &mut stack);
        assert_eq!(
            pieces,
            vec![
                (Edge::from_coords(-5, 5, 0, 5), PointLocation::Outside),
                (Edge::from_coords(0, 5, 10, 5), PointLocation::Inside),
                (Edge::from_coords(10, 5, 15, 5), PointLocation::Outside),
            ]
        );

        let along = clipper.classify(&Edge::from_coords(-5, 0, 5, 0), &mut stack);
        assert_eq!(
            along,
            vec![
                (Edge::from_coords(-5, 0, 0, 0), PointLocation::Outside),
                (Edge::from_coords(0, 0, 5, 0), PointLocation::Boundary),
            ]
        );
    }

    #[test]
    fn clip_modes() {
        let b = Polygon::from_box(BBox::new(0, 0, 10, 10));
        let clipper = EdgeClipper::new([&b]);
        let edges = vec![
            WithProperties::plain(Edge::from_coords(-5, 5, 15, 5)),
            WithProperties::plain(Edge::from_coords(0, 0, 0, 20)),
        ];
        let inside = clipper.clip(&edges, EdgeRegionMode::Inside);
        assert_eq!(inside.len(), 1);
        let and = clipper.clip(&edges, EdgeRegionMode::InsideOrBoundary);
        assert_eq!(and.len(), 2);
        let (a, n) = clipper.split(&edges);
        assert_eq!(a, and);
        assert_eq!(n, clipper.clip(&edges, EdgeRegionMode::Outside));
    }
}
