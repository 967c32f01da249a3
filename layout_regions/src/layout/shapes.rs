use crate::{
    geom::{BBox, CplxTrans, Edge, EdgePair, Polygon},
    properties::WithProperties,
};

/// Per-layer shape container of a cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shapes {
    pub polygons: Vec<WithProperties<Polygon>>,
    pub edges: Vec<WithProperties<Edge>>,
    pub edge_pairs: Vec<WithProperties<EdgePair>>,
}

impl Shapes {
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty() && self.edges.is_empty() && self.edge_pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.polygons.len() + self.edges.len() + self.edge_pairs.len()
    }

    pub fn bbox(&self) -> BBox {
        let mut b = BBox::empty();
        for p in &self.polygons {
            b = b.union(&p.shape.bbox());
        }
        for e in &self.edges {
            b = b.union(&e.shape.bbox());
        }
        for ep in &self.edge_pairs {
            b = b.union(&ep.shape.bbox());
        }
        b
    }

    pub fn clear(&mut self) {
        self.polygons.clear();
        self.edges.clear();
        self.edge_pairs.clear();
    }
}

/// A shape kind that can be stored in a [Shapes] container.
///
/// This is the bridge that lets the hierarchy code (iteration, deep storage, insertion) be written
/// once for polygons, edges and edge pairs.
pub trait LayoutShape: Clone + PartialEq + Ord + std::fmt::Debug + 'static {
    fn container(shapes: &Shapes) -> &Vec<WithProperties<Self>>;
    fn container_mut(shapes: &mut Shapes) -> &mut Vec<WithProperties<Self>>;
    fn bbox(&self) -> BBox;
    fn transformed(&self, t: &CplxTrans) -> Self;
}

impl LayoutShape for Polygon {
    #[inline]
    fn container(shapes: &Shapes) -> &Vec<WithProperties<Self>> {
        &shapes.polygons
    }

    #[inline]
    fn container_mut(shapes: &mut Shapes) -> &mut Vec<WithProperties<Self>> {
        &mut shapes.polygons
    }

    #[inline]
    fn bbox(&self) -> BBox {
        Polygon::bbox(self)
    }

    #[inline]
    fn transformed(&self, t: &CplxTrans) -> Self {
        Polygon::transformed(self, t)
    }
}

impl LayoutShape for Edge {
    #[inline]
    fn container(shapes: &Shapes) -> &Vec<WithProperties<Self>> {
        &shapes.edges
    }

    #[inline]
    fn container_mut(shapes: &mut Shapes) -> &mut Vec<WithProperties<Self>> {
        &mut shapes.edges
    }

    #[inline]
    fn bbox(&self) -> BBox {
        Edge::bbox(self)
    }

    #[inline]
    fn transformed(&self, t: &CplxTrans) -> Self {
        Edge::transformed(self, t)
    }
}

impl LayoutShape for EdgePair {
    #[inline]
    fn container(shapes: &Shapes) -> &Vec<WithProperties<Self>> {
        &shapes.edge_pairs
    }

    #[inline]
    fn container_mut(shapes: &mut Shapes) -> &mut Vec<WithProperties<Self>> {
        &mut shapes.edge_pairs
    }

    #[inline]
    fn bbox(&self) -> BBox {
        EdgePair::bbox(self)
    }

    #[inline]
    fn transformed(&self, t: &CplxTrans) -> Self {
        EdgePair::transformed(self, t)
    }
}
