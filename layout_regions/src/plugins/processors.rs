//! Library processors.

use super::{ShapeProcessor, TransformClass};
use crate::{
    boolean::size_polygons,
    geom::{Coord, Edge, EdgePair, Point, Polygon},
    properties::WithProperties,
    scan::extended_edge,
};

/// Replaces each polygon by its bounding box enlarged by `dx`, `dy`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtentsProcessor {
    pub dx: Coord,
    pub dy: Coord,
}

impl ShapeProcessor<Polygon, Polygon> for ExtentsProcessor {
    fn process(&self, shape: &WithProperties<Polygon>, out: &mut Vec<WithProperties<Polygon>>) {
        let b = shape.shape.bbox();
        if b.is_empty() {
            return;
        }
        let b = crate::geom::BBox::new(
            b.left - self.dx,
            b.bottom - self.dy,
            b.right + self.dx,
            b.top + self.dy,
        );
        out.push(WithProperties::new(Polygon::from_box(b), shape.prop_id));
    }

    fn reducer(&self) -> TransformClass {
        TransformClass::ScaleAndOrientation
    }
}

/// Drops the holes of polygons.
#[derive(Debug, Clone, Copy, Default)]
pub struct HullsProcessor;

impl ShapeProcessor<Polygon, Polygon> for HullsProcessor {
    fn process(&self, shape: &WithProperties<Polygon>, out: &mut Vec<WithProperties<Polygon>>) {
        out.push(WithProperties::new(
            Polygon::new(shape.shape.hull().to_vec()),
            shape.prop_id,
        ));
    }

    fn reducer(&self) -> TransformClass {
        TransformClass::Invariant
    }
}

/// Turns the holes of polygons into polygons.
#[derive(Debug, Clone, Copy, Default)]
pub struct HolesProcessor;

impl ShapeProcessor<Polygon, Polygon> for HolesProcessor {
    fn process(&self, shape: &WithProperties<Polygon>, out: &mut Vec<WithProperties<Polygon>>) {
        for h in shape.shape.holes() {
            out.push(WithProperties::new(Polygon::new(h.clone()), shape.prop_id));
        }
    }

    fn reducer(&self) -> TransformClass {
        TransformClass::Invariant
    }

    fn result_is_merged(&self) -> bool {
        true
    }
}

/// Sizes each polygon individually by `d`.
#[derive(Debug, Clone, Copy)]
pub struct SizingProcessor {
    pub d: Coord,
}

impl ShapeProcessor<Polygon, Polygon> for SizingProcessor {
    fn process(&self, shape: &WithProperties<Polygon>, out: &mut Vec<WithProperties<Polygon>>) {
        out.extend(size_polygons(std::slice::from_ref(shape), self.d, false, None));
    }

    fn reducer(&self) -> TransformClass {
        TransformClass::ScaleOnly
    }
}

/// Decomposes polygons into their contour edges.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolygonEdgesProcessor;

impl ShapeProcessor<Polygon, Edge> for PolygonEdgesProcessor {
    fn process(&self, shape: &WithProperties<Polygon>, out: &mut Vec<WithProperties<Edge>>) {
        out.extend(shape.shape.edges().map(|e| WithProperties::new(e, shape.prop_id)));
    }

    fn reducer(&self) -> TransformClass {
        TransformClass::MirrorOnly
    }
}

/// Extends edges along their direction by `ext_b` at the start and `ext_e` at the end.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeExtensionProcessor {
    pub ext_b: Coord,
    pub ext_e: Coord,
}

impl ShapeProcessor<Edge, Edge> for EdgeExtensionProcessor {
    fn process(&self, shape: &WithProperties<Edge>, out: &mut Vec<WithProperties<Edge>>) {
        let e = shape.shape;
        if e.is_degenerate() {
            out.push(shape.clone());
            return;
        }
        let t = e.d().to_vector2().normalize();
        let p1 = Point::from_vector2(e.p1.to_vector2() - t.scale(self.ext_b as f64));
        let p2 = Point::from_vector2(e.p2.to_vector2() + t.scale(self.ext_e as f64));
        out.push(WithProperties::new(Edge::new(p1, p2), shape.prop_id));
    }

    fn reducer(&self) -> TransformClass {
        TransformClass::ScaleOnly
    }
}

/// Turns every edge into a box-like polygon, see [extended_edge].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtendedEdgeProcessor {
    pub ext_b: Coord,
    pub ext_e: Coord,
    pub ext_o: Coord,
    pub ext_i: Coord,
}

impl ShapeProcessor<Edge, Polygon> for ExtendedEdgeProcessor {
    fn process(&self, shape: &WithProperties<Edge>, out: &mut Vec<WithProperties<Polygon>>) {
        if let Some(p) = extended_edge(&shape.shape, self.ext_b, self.ext_e, self.ext_o, self.ext_i) {
            out.push(WithProperties::new(p, shape.prop_id));
        }
    }

    fn reducer(&self) -> TransformClass {
        TransformClass::ScaleAndOrientation
    }

    fn requires_raw_input(&self) -> bool {
        true
    }
}

/// Converts edge pairs into polygons (see [EdgePair::to_polygon]).
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgePairPolygonsProcessor {
    pub enlargement: Coord,
}

impl ShapeProcessor<EdgePair, Polygon> for EdgePairPolygonsProcessor {
    fn process(&self, shape: &WithProperties<EdgePair>, out: &mut Vec<WithProperties<Polygon>>) {
        let p = shape.shape.to_polygon(self.enlargement);
        if !p.is_empty() {
            out.push(WithProperties::new(p, shape.prop_id));
        }
    }

    fn reducer(&self) -> TransformClass {
        if self.enlargement == 0 {
            TransformClass::Invariant
        } else {
            TransformClass::ScaleAndOrientation
        }
    }
}

/// Which edges of an edge pair to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgePairSide {
    First,
    Second,
    #[default]
    Both,
}

/// Extracts the edges of edge pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgePairEdgesProcessor {
    pub side: EdgePairSide,
}

impl ShapeProcessor<EdgePair, Edge> for EdgePairEdgesProcessor {
    fn process(&self, shape: &WithProperties<EdgePair>, out: &mut Vec<WithProperties<Edge>>) {
        let ep = &shape.shape;
        if self.side != EdgePairSide::Second {
            out.push(WithProperties::new(ep.first, shape.prop_id));
        }
        if self.side != EdgePairSide::First {
            out.push(WithProperties::new(ep.second, shape.prop_id));
        }
    }

    fn reducer(&self) -> TransformClass {
        TransformClass::Invariant
    }
}
