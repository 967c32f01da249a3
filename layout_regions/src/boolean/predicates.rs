//! Pairwise interaction predicates between polygons and edges.

use super::{
    BooleanEngine, BooleanEvaluator, BooleanOp, EdgeClipper,
    locate::{RegionLocator, point2},
};
use crate::geom::{Edge, PointLocation, Polygon};

fn boolean_is_empty(a: &Polygon, b: &Polygon, op: BooleanOp) -> bool {
    let mut engine = BooleanEngine::new(2);
    engine.insert_polygon(a, 0);
    engine.insert_polygon(b, 1);
    engine
        .process(&[&BooleanEvaluator(op)], None)
        .pop()
        .is_none_or(|r| r.is_empty())
}

/// True if the polygons share at least one point (touching counts).
pub fn polygons_interact(a: &Polygon, b: &Polygon) -> bool {
    if a.is_empty() || b.is_empty() || !a.bbox().touches(&b.bbox()) {
        return false;
    }
    let b_edges: Vec<Edge> = b.edges().collect();
    let bb = b.bbox();
    for ea in a.edges() {
        if !ea.bbox().touches(&bb) {
            continue;
        }
        if b_edges.iter().any(|eb| ea.intersects(eb)) {
            return true;
        }
    }
    // no boundary contact: one contains the other or they are disjoint
    let mut stack = Vec::new();
    RegionLocator::new([b]).locate(a.hull()[0], &mut stack) != PointLocation::Outside
        || RegionLocator::new([a]).locate(b.hull()[0], &mut stack) != PointLocation::Outside
}

/// True if the polygons share an area of non-zero size.
pub fn polygons_overlap(a: &Polygon, b: &Polygon) -> bool {
    if a.is_empty() || b.is_empty() || !a.bbox().overlaps(&b.bbox()) {
        return false;
    }
    !boolean_is_empty(a, b, BooleanOp::And)
}

/// True if `a` is completely inside `b` (boundaries may touch).
pub fn polygon_inside(a: &Polygon, b: &Polygon) -> bool {
    if a.is_empty() || b.is_empty() || !b.bbox().contains_box(&a.bbox()) {
        return false;
    }
    boolean_is_empty(a, b, BooleanOp::Not)
}

/// True if the edge shares at least one point with the polygon.
pub fn edge_interacts_polygon(e: &Edge, p: &Polygon) -> bool {
    if p.is_empty() || !e.bbox().touches(&p.bbox()) {
        return false;
    }
    if p.edges().any(|pe| pe.intersects(e)) {
        return true;
    }
    let mut stack = Vec::new();
    RegionLocator::new([p]).locate2(point2(e.p1), &mut stack) != PointLocation::Outside
}

/// True if no part of the edge is outside the polygon.
pub fn edge_inside_polygon(e: &Edge, p: &Polygon) -> bool {
    if p.is_empty() || !p.bbox().contains_box(&e.bbox()) {
        return false;
    }
    let mut stack = Vec::new();
    EdgeClipper::new([p])
        .classify(e, &mut stack)
        .iter()
        .all(|(_, loc)| *loc != PointLocation::Outside)
}

/// True if no part of the edge is strictly inside the polygon.
pub fn edge_outside_polygon(e: &Edge, p: &Polygon) -> bool {
    if p.is_empty() || !e.bbox().touches(&p.bbox()) {
        return true;
    }
    let mut stack = Vec::new();
    EdgeClipper::new([p])
        .classify(e, &mut stack)
        .iter()
        .all(|(_, loc)| *loc != PointLocation::Inside)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::BBox;

    #[test]
    fn polygon_relations() {
        let a = Polygon::from_box(BBox::new(0, 0, 10, 10));
        let touching = Polygon::from_box(BBox::new(10, 0, 20, 10));
        let inner = Polygon::from_box(BBox::new(2, 2, 8, 8));
        let far = Polygon::from_box(BBox::new(50, 50, 60, 60));

        assert!(polygons_interact(&a, &touching));
        assert!(!polygons_overlap(&a, &touching));
        assert!(polygons_interact(&a, &inner));
        assert!(polygons_overlap(&a, &inner));
        assert!(polygon_inside(&inner, &a));
        assert!(!polygon_inside(&a, &inner));
        assert!(!polygons_interact(&a, &far));
    }

    #[test]
    fn edge_relations() {
        let a = Polygon::from_box(BBox::new(0, 0, 10, 10));
        let inside = Edge::from_coords(1, 1, 9, 9);
        let on_boundary = Edge::from_coords(0, 0, 10, 0);
        let crossing = Edge::from_coords(-5, 5, 5, 5);
        let outside = Edge::from_coords(20, 0, 30, 0);

        assert!(edge_inside_polygon(&inside, &a));
        assert!(edge_inside_polygon(&on_boundary, &a));
        assert!(edge_outside_polygon(&on_boundary, &a));
        assert!(!edge_inside_polygon(&crossing, &a));
        assert!(!edge_outside_polygon(&crossing, &a));
        assert!(edge_interacts_polygon(&inside, &a));
        assert!(!edge_interacts_polygon(&outside, &a));
        assert!(edge_outside_polygon(&outside, &a));
    }
}
