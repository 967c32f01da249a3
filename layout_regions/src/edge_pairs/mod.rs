//! Edge pair collections, mostly the output of DRC checks.
mod deep;
mod delegate;
mod empty;
mod flat;
mod original;

pub use deep::DeepEdgePairs;
pub use delegate::{EdgePairsBox, EdgePairsDelegate};
pub use empty::EmptyEdgePairs;
pub use flat::FlatEdgePairs;
pub use original::OriginalLayerEdgePairs;

use std::{
    fmt,
    ops::{Add, AddAssign},
};

use crate::{
    DelegateKind,
    deep::{DeepLayer, DeepShapeStore},
    edges::Edges,
    errors::RegionResult,
    geom::{BBox, Coord, EdgePair},
    layout::{CellIndex, LayerIndex, Layout, RecursiveShapeIterator},
    plugins::{
        EdgePairDistanceFilter, EdgePairEdgesProcessor, EdgePairFilter, EdgePairPolygonsProcessor,
        EdgePairProcessor, EdgePairSide, EdgePairToEdgeProcessor, EdgePairToPolygonProcessor,
    },
    properties::WithProperties,
    region::Region,
};

/// A set of edge pairs.
pub struct EdgePairs<'s> {
    delegate: EdgePairsBox<'s>,
}

impl<'s> EdgePairs<'s> {
    pub fn new() -> Self {
        EdgePairs {
            delegate: Box::new(EmptyEdgePairs),
        }
    }

    pub fn from_delegate(delegate: EdgePairsBox<'s>) -> Self {
        EdgePairs { delegate }
    }

    pub fn from_shapes(shapes: Vec<WithProperties<EdgePair>>) -> Self {
        EdgePairs {
            delegate: Box::new(FlatEdgePairs::new(shapes)),
        }
    }

    pub fn from_original(iter: RecursiveShapeIterator<'s>) -> Self {
        EdgePairs {
            delegate: Box::new(OriginalLayerEdgePairs::new(iter)),
        }
    }

    pub fn new_deep(iter: &RecursiveShapeIterator<'_>, store: &'s DeepShapeStore) -> RegionResult<Self> {
        Ok(Self::from_deep(store.create_layer::<EdgePair>(iter)?))
    }

    pub fn from_deep(layer: DeepLayer<'s>) -> Self {
        EdgePairs {
            delegate: Box::new(DeepEdgePairs::new(layer)),
        }
    }

    pub fn delegate(&self) -> &dyn EdgePairsDelegate<'s> {
        self.delegate.as_ref()
    }

    pub fn kind(&self) -> DelegateKind {
        self.delegate.kind()
    }

    pub fn deep_layer(&self) -> Option<&DeepLayer<'s>> {
        self.delegate.deep_layer()
    }

    pub fn is_empty(&self) -> bool {
        self.delegate.is_empty()
    }

    pub fn count(&self) -> usize {
        self.delegate.count()
    }

    pub fn hier_count(&self) -> usize {
        self.delegate.hier_count()
    }

    pub fn bbox(&self) -> BBox {
        self.delegate.bbox()
    }

    pub fn iter(&self) -> impl Iterator<Item = WithProperties<EdgePair>> + '_ {
        self.delegate.iter()
    }

    fn replace(&mut self, f: impl FnOnce(EdgePairsBox<'s>) -> EdgePairsBox<'s>) {
        let d = std::mem::replace(&mut self.delegate, Box::new(EmptyEdgePairs));
        self.delegate = f(d);
    }

    fn flat_mut(&mut self) -> &mut FlatEdgePairs {
        if self.delegate.as_flat_mut().is_none() {
            self.delegate = Box::new(FlatEdgePairs::new(self.delegate.shapes().into_owned()));
        }
        match self.delegate.as_flat_mut() {
            Some(f) => f,
            None => unreachable!("internal library error: flat delegate expected"),
        }
    }

    pub fn insert(&mut self, edge_pair: impl Into<WithProperties<EdgePair>>) {
        self.flat_mut().insert(edge_pair.into());
    }

    pub fn clear(&mut self) {
        self.delegate = Box::new(EmptyEdgePairs);
    }

    pub fn swap(&mut self, other: &mut EdgePairs<'s>) {
        std::mem::swap(&mut self.delegate, &mut other.delegate);
    }

    pub fn filter(&mut self, filter: &dyn EdgePairFilter) -> &mut Self {
        self.replace(|d| d.filter_in_place(filter));
        self
    }

    pub fn filtered(&self, filter: &dyn EdgePairFilter) -> EdgePairs<'s> {
        EdgePairs::from_delegate(self.delegate.filtered(filter))
    }

    /// Edge pairs with `min <= distance < max`.
    pub fn with_distance(&self, min: Coord, max: Coord, inverse: bool) -> EdgePairs<'s> {
        self.filtered(&EdgePairDistanceFilter::new(min, max, inverse))
    }

    pub fn processed(&self, processor: &EdgePairProcessor) -> EdgePairs<'s> {
        EdgePairs::from_delegate(self.delegate.processed(processor))
    }

    pub fn processed_to_polygons(&self, processor: &EdgePairToPolygonProcessor) -> Region<'s> {
        Region::from_delegate(self.delegate.processed_to_polygons(processor))
    }

    pub fn processed_to_edges(&self, processor: &EdgePairToEdgeProcessor) -> Edges<'s> {
        Edges::from_delegate(self.delegate.processed_to_edges(processor))
    }

    pub fn first_edges(&self) -> Edges<'s> {
        self.processed_to_edges(&EdgePairEdgesProcessor {
            side: EdgePairSide::First,
        })
    }

    pub fn second_edges(&self) -> Edges<'s> {
        self.processed_to_edges(&EdgePairEdgesProcessor {
            side: EdgePairSide::Second,
        })
    }

    /// Both edges of every pair.
    pub fn edges(&self) -> Edges<'s> {
        self.processed_to_edges(&EdgePairEdgesProcessor::default())
    }

    /// The quadrilaterals spanned by the pairs, enlarged by `e`.
    pub fn polygons(&self, e: Coord) -> Region<'s> {
        self.processed_to_polygons(&EdgePairPolygonsProcessor { enlargement: e })
    }

    pub fn add_edge_pairs(&mut self, other: &EdgePairs<'s>) -> &mut Self {
        self.replace(|d| d.add_in_place(other.delegate()));
        self
    }

    pub fn insert_into(&self, layout: &mut Layout, cell: CellIndex, layer: LayerIndex) -> RegionResult<()> {
        self.delegate.insert_into(layout, cell, layer)
    }
}

impl Default for EdgePairs<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EdgePairs<'_> {
    fn clone(&self) -> Self {
        EdgePairs {
            delegate: self.delegate.clone_delegate(),
        }
    }
}

impl fmt::Debug for EdgePairs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EdgePairs")
            .field("kind", &self.kind())
            .field("delegate", &self.delegate)
            .finish()
    }
}

impl<'s> Add for &EdgePairs<'s> {
    type Output = EdgePairs<'s>;

    fn add(self, rhs: Self) -> EdgePairs<'s> {
        EdgePairs::from_delegate(self.delegate.add_with(rhs.delegate()))
    }
}

impl<'s> AddAssign<&EdgePairs<'s>> for EdgePairs<'s> {
    fn add_assign(&mut self, rhs: &EdgePairs<'s>) {
        self.add_edge_pairs(rhs);
    }
}

impl FromIterator<EdgePair> for EdgePairs<'_> {
    fn from_iter<T: IntoIterator<Item = EdgePair>>(iter: T) -> Self {
        EdgePairs::from_shapes(iter.into_iter().map(WithProperties::plain).collect())
    }
}

impl FromIterator<WithProperties<EdgePair>> for EdgePairs<'_> {
    fn from_iter<T: IntoIterator<Item = WithProperties<EdgePair>>>(iter: T) -> Self {
        EdgePairs::from_shapes(iter.into_iter().collect())
    }
}

impl<E: Into<WithProperties<EdgePair>>> Extend<E> for EdgePairs<'_> {
    fn extend<T: IntoIterator<Item = E>>(&mut self, iter: T) {
        let flat = self.flat_mut();
        for e in iter {
            flat.insert(e.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Edge, Point};

    fn pair(x: Coord, w: Coord, d: Coord) -> EdgePair {
        EdgePair::new(
            Edge::new(Point::new(x, 0), Point::new(x + w, 0)),
            Edge::new(Point::new(x + w, d), Point::new(x, d)),
        )
    }

    #[test]
    fn edges_and_polygons() {
        let ep: EdgePairs = [pair(0, 10, 5), pair(100, 10, 20)].into_iter().collect();
        assert_eq!(ep.first_edges().count(), 2);
        assert_eq!(ep.second_edges().count(), 2);
        assert_eq!(ep.edges().count(), 4);

        let mut polygons = ep.polygons(0);
        polygons.set_merged_semantics(false);
        assert_eq!(polygons.count(), 2);
        assert_eq!(polygons.area(), 10 * 5 + 10 * 20);
    }

    #[test]
    fn distance_filter() {
        let ep: EdgePairs = [pair(0, 10, 5), pair(100, 10, 20)].into_iter().collect();
        assert_eq!(ep.with_distance(0, 10, false).count(), 1);
        assert_eq!(ep.with_distance(0, 10, true).count(), 1);
    }

    #[test]
    fn add_and_clear() {
        let mut a: EdgePairs = [pair(0, 10, 5)].into_iter().collect();
        let b: EdgePairs = [pair(100, 10, 20)].into_iter().collect();
        a += &b;
        assert_eq!(a.count(), 2);
        a.clear();
        assert_eq!(a.kind(), DelegateKind::Empty);
    }
}
