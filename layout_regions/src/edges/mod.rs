//! Edge collections.
//!
//! Edges are directed segments; the left side of an edge counts as its inside. Merged semantics
//! join collinear edges that overlap or touch (antiparallel edges are not joined).
mod deep;
mod delegate;
mod empty;
mod flat;
mod original;

pub use deep::DeepEdges;
pub use delegate::{EdgesBox, EdgesDelegate, EdgesFlags};
pub use empty::EmptyEdges;
pub use flat::FlatEdges;
pub use original::OriginalLayerEdges;

use std::{
    fmt,
    ops::{Add, AddAssign, BitAnd, BitOr, BitXor, Sub},
};

use crate::{
    DelegateKind,
    deep::{DeepLayer, DeepShapeStore},
    drc::{EdgeRelation, EdgesCheckOptions},
    edge_pairs::EdgePairs,
    errors::RegionResult,
    geom::{BBox, Coord, Edge},
    layout::{CellIndex, LayerIndex, Layout, RecursiveShapeIterator},
    plugins::{EdgeExtensionProcessor, EdgeFilter, EdgeProcessor, EdgeToPolygonProcessor},
    properties::WithProperties,
    region::Region,
    scan::{CountBounds, InteractionMode},
};

/// A set of edges.
///
/// # Examples
///
/// ```
/// use layout_regions::prelude::*;
///
/// let r = Region::from_iter([Polygon::from_box(BBox::new(0, 0, 100, 200))]);
/// let edges = r.edges();
/// assert_eq!(edges.count(), 4);
/// assert_eq!(edges.length(), 600.0);
///
/// let markers = edges.width_check(150, &EdgesCheckOptions::new());
/// assert_eq!(markers.count(), 1);
/// ```
pub struct Edges<'s> {
    delegate: EdgesBox<'s>,
}

impl<'s> Edges<'s> {
    pub fn new() -> Self {
        Edges {
            delegate: Box::new(EmptyEdges::new()),
        }
    }

    pub fn from_delegate(delegate: EdgesBox<'s>) -> Self {
        Edges { delegate }
    }

    pub fn from_shapes(shapes: Vec<WithProperties<Edge>>) -> Self {
        Edges {
            delegate: Box::new(FlatEdges::new(shapes, EdgesFlags::new())),
        }
    }

    /// Read only collection over the edges delivered by `iter`.
    pub fn from_original(iter: RecursiveShapeIterator<'s>) -> Self {
        Edges {
            delegate: Box::new(OriginalLayerEdges::new(iter)),
        }
    }

    /// Deep collection holding the edges delivered by `iter` in `store`.
    pub fn new_deep(iter: &RecursiveShapeIterator<'_>, store: &'s DeepShapeStore) -> RegionResult<Self> {
        Ok(Self::from_deep(store.create_layer::<Edge>(iter)?))
    }

    pub fn from_deep(layer: DeepLayer<'s>) -> Self {
        Edges {
            delegate: Box::new(DeepEdges::new(layer)),
        }
    }

    pub fn delegate(&self) -> &dyn EdgesDelegate<'s> {
        self.delegate.as_ref()
    }

    pub fn kind(&self) -> DelegateKind {
        self.delegate.kind()
    }

    pub fn deep_layer(&self) -> Option<&DeepLayer<'s>> {
        self.delegate.deep_layer()
    }

    pub fn merged_semantics(&self) -> bool {
        self.delegate.flags().merged_semantics
    }

    pub fn set_merged_semantics(&mut self, value: bool) {
        self.delegate.flags_mut().merged_semantics = value;
    }

    pub fn strict_handling(&self) -> bool {
        self.delegate.flags().strict_handling
    }

    pub fn set_strict_handling(&mut self, value: bool) {
        self.delegate.flags_mut().strict_handling = value;
    }

    pub fn is_merged(&self) -> bool {
        self.delegate.is_merged()
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

    pub fn length(&self) -> f64 {
        self.delegate.length()
    }

    pub fn iter(&self) -> impl Iterator<Item = WithProperties<Edge>> + '_ {
        self.delegate.iter()
    }

    pub fn iter_merged(&self) -> impl Iterator<Item = WithProperties<Edge>> + '_ {
        self.delegate.iter_merged()
    }

    fn replace(&mut self, f: impl FnOnce(EdgesBox<'s>) -> EdgesBox<'s>) {
        let d = std::mem::replace(&mut self.delegate, Box::new(EmptyEdges::new()));
        self.delegate = f(d);
    }

    fn flat_mut(&mut self) -> &mut FlatEdges {
        if self.delegate.as_flat_mut().is_none() {
            let flat = FlatEdges::new(self.delegate.shapes().into_owned(), *self.delegate.flags());
            self.delegate = Box::new(flat);
        }
        match self.delegate.as_flat_mut() {
            Some(f) => f,
            None => unreachable!("internal library error: flat delegate expected"),
        }
    }

    pub fn insert(&mut self, edge: impl Into<WithProperties<Edge>>) {
        self.flat_mut().insert(edge.into());
    }

    pub fn flatten(&mut self) -> &mut Self {
        self.flat_mut();
        self
    }

    pub fn clear(&mut self) {
        let flags = *self.delegate.flags();
        self.delegate = Box::new(EmptyEdges::with_flags(flags));
    }

    pub fn swap(&mut self, other: &mut Edges<'s>) {
        std::mem::swap(&mut self.delegate, &mut other.delegate);
    }

    pub fn merge(&mut self) -> &mut Self {
        self.replace(|d| d.merged_in_place());
        self
    }

    pub fn merged(&self) -> Edges<'s> {
        Edges::from_delegate(self.delegate.merged())
    }

    pub fn and(&self, other: &Edges<'s>) -> Edges<'s> {
        Edges::from_delegate(self.delegate.and_with(other.delegate()))
    }

    pub fn or(&self, other: &Edges<'s>) -> Edges<'s> {
        Edges::from_delegate(self.delegate.or_with(other.delegate()))
    }

    pub fn xor(&self, other: &Edges<'s>) -> Edges<'s> {
        Edges::from_delegate(self.delegate.xor_with(other.delegate()))
    }

    pub fn not(&self, other: &Edges<'s>) -> Edges<'s> {
        Edges::from_delegate(self.delegate.not_with(other.delegate()))
    }

    pub fn andnot(&self, other: &Edges<'s>) -> (Edges<'s>, Edges<'s>) {
        let (a, n) = self.delegate.andnot_with(other.delegate());
        (Edges::from_delegate(a), Edges::from_delegate(n))
    }

    /// Common segments and crossing points (dot edges).
    pub fn intersections(&self, other: &Edges<'s>) -> Edges<'s> {
        Edges::from_delegate(self.delegate.intersections(other.delegate()))
    }

    pub fn add_edges(&mut self, other: &Edges<'s>) -> &mut Self {
        self.replace(|d| d.add_in_place(other.delegate()));
        self
    }

    /// Parts inside the polygons of `region`, including parts on their boundary.
    pub fn and_region(&self, region: &Region<'s>) -> Edges<'s> {
        Edges::from_delegate(self.delegate.and_with_region(region.delegate()))
    }

    /// Parts outside the polygons of `region`.
    pub fn not_region(&self, region: &Region<'s>) -> Edges<'s> {
        Edges::from_delegate(self.delegate.not_with_region(region.delegate()))
    }

    pub fn andnot_region(&self, region: &Region<'s>) -> (Edges<'s>, Edges<'s>) {
        let (a, n) = self.delegate.andnot_with_region(region.delegate());
        (Edges::from_delegate(a), Edges::from_delegate(n))
    }

    /// Parts strictly inside the polygons of `region`.
    pub fn inside_part(&self, region: &Region<'s>) -> Edges<'s> {
        Edges::from_delegate(self.delegate.inside_part(region.delegate()))
    }

    /// Parts not strictly inside the polygons of `region`.
    pub fn outside_part(&self, region: &Region<'s>) -> Edges<'s> {
        Edges::from_delegate(self.delegate.outside_part(region.delegate()))
    }

    pub fn filter(&mut self, filter: &dyn EdgeFilter) -> &mut Self {
        self.replace(|d| d.filter_in_place(filter));
        self
    }

    pub fn filtered(&self, filter: &dyn EdgeFilter) -> Edges<'s> {
        Edges::from_delegate(self.delegate.filtered(filter))
    }

    pub fn process(&mut self, processor: &EdgeProcessor) -> &mut Self {
        self.replace(|d| d.process_in_place(processor));
        self
    }

    pub fn processed(&self, processor: &EdgeProcessor) -> Edges<'s> {
        Edges::from_delegate(self.delegate.processed(processor))
    }

    pub fn processed_to_polygons(&self, processor: &EdgeToPolygonProcessor) -> Region<'s> {
        Region::from_delegate(self.delegate.processed_to_polygons(processor))
    }

    /// Edges lengthened by `ext_b` at the start and `ext_e` at the end.
    pub fn extended_edges(&self, ext_b: Coord, ext_e: Coord) -> Edges<'s> {
        self.processed(&EdgeExtensionProcessor { ext_b, ext_e })
    }

    /// Polygons covering the edges, see [EdgesDelegate::extended].
    pub fn extended(&self, ext_b: Coord, ext_e: Coord, ext_o: Coord, ext_i: Coord, join: bool) -> Region<'s> {
        Region::from_delegate(self.delegate.extended(ext_b, ext_e, ext_o, ext_i, join))
    }

    fn check(
        &self,
        relation: EdgeRelation,
        other: Option<&Edges<'s>>,
        d: Coord,
        options: &EdgesCheckOptions,
    ) -> EdgePairs<'s> {
        EdgePairs::from_delegate(self.delegate.check(relation, other.map(|o| o.delegate()), d, options))
    }

    pub fn width_check(&self, d: Coord, options: &EdgesCheckOptions) -> EdgePairs<'s> {
        self.check(EdgeRelation::Width, None, d, options)
    }

    pub fn space_check(&self, d: Coord, options: &EdgesCheckOptions) -> EdgePairs<'s> {
        self.check(EdgeRelation::Space, None, d, options)
    }

    pub fn overlap_check(&self, other: &Edges<'s>, d: Coord, options: &EdgesCheckOptions) -> EdgePairs<'s> {
        self.check(EdgeRelation::Overlap, Some(other), d, options)
    }

    pub fn enclosing_check(&self, other: &Edges<'s>, d: Coord, options: &EdgesCheckOptions) -> EdgePairs<'s> {
        self.check(EdgeRelation::Enclosing, Some(other), d, options)
    }

    pub fn separation_check(&self, other: &Edges<'s>, d: Coord, options: &EdgesCheckOptions) -> EdgePairs<'s> {
        self.check(EdgeRelation::Separation, Some(other), d, options)
    }

    pub fn inside_check(&self, other: &Edges<'s>, d: Coord, options: &EdgesCheckOptions) -> EdgePairs<'s> {
        self.check(EdgeRelation::Inside, Some(other), d, options)
    }

    /// Edges touching or crossing edges of `other`, with the partner count inside `bounds`.
    pub fn selected_interacting_by(&self, other: &Edges<'s>, bounds: CountBounds, inverse: bool) -> Edges<'s> {
        Edges::from_delegate(
            self.delegate
                .selected_interacting(other.delegate(), bounds, inverse),
        )
    }

    pub fn selected_interacting(&self, other: &Edges<'s>) -> Edges<'s> {
        self.selected_interacting_by(other, CountBounds::any(), false)
    }

    pub fn selected_not_interacting(&self, other: &Edges<'s>) -> Edges<'s> {
        self.selected_interacting_by(other, CountBounds::any(), true)
    }

    pub fn pull_interacting(&self, other: &Edges<'s>) -> Edges<'s> {
        Edges::from_delegate(self.delegate.pull_interacting(other.delegate()))
    }

    /// Edges related to the polygons of `region` by `mode`.
    pub fn selected_by_region(
        &self,
        region: &Region<'s>,
        mode: InteractionMode,
        bounds: CountBounds,
        inverse: bool,
    ) -> Edges<'s> {
        Edges::from_delegate(
            self.delegate
                .selected_interacting_region(region.delegate(), mode, bounds, inverse),
        )
    }

    pub fn selected_interacting_region(&self, region: &Region<'s>) -> Edges<'s> {
        self.selected_by_region(region, InteractionMode::Interacting, CountBounds::any(), false)
    }

    pub fn selected_inside_region(&self, region: &Region<'s>) -> Edges<'s> {
        self.selected_by_region(region, InteractionMode::Inside, CountBounds::any(), false)
    }

    pub fn selected_outside_region(&self, region: &Region<'s>) -> Edges<'s> {
        self.selected_by_region(region, InteractionMode::Outside, CountBounds::any(), false)
    }

    /// Polygons of `region` interacting with these edges.
    pub fn pull_interacting_region(&self, region: &Region<'s>) -> Region<'s> {
        Region::from_delegate(
            self.delegate
                .pull_interacting_region(region.delegate(), InteractionMode::Interacting),
        )
    }

    pub fn insert_into(&self, layout: &mut Layout, cell: CellIndex, layer: LayerIndex) -> RegionResult<()> {
        self.delegate.insert_into(layout, cell, layer)
    }
}

impl Default for Edges<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Edges<'_> {
    fn clone(&self) -> Self {
        Edges {
            delegate: self.delegate.clone_delegate(),
        }
    }
}

impl fmt::Debug for Edges<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Edges")
            .field("kind", &self.kind())
            .field("delegate", &self.delegate)
            .finish()
    }
}

impl<'s> BitAnd for &Edges<'s> {
    type Output = Edges<'s>;

    fn bitand(self, rhs: Self) -> Edges<'s> {
        self.and(rhs)
    }
}

impl<'s> BitOr for &Edges<'s> {
    type Output = Edges<'s>;

    fn bitor(self, rhs: Self) -> Edges<'s> {
        self.or(rhs)
    }
}

impl<'s> BitXor for &Edges<'s> {
    type Output = Edges<'s>;

    fn bitxor(self, rhs: Self) -> Edges<'s> {
        self.xor(rhs)
    }
}

impl<'s> Sub for &Edges<'s> {
    type Output = Edges<'s>;

    fn sub(self, rhs: Self) -> Edges<'s> {
        self.not(rhs)
    }
}

impl<'s> Add for &Edges<'s> {
    type Output = Edges<'s>;

    fn add(self, rhs: Self) -> Edges<'s> {
        Edges::from_delegate(self.delegate.add_with(rhs.delegate()))
    }
}

impl<'s> AddAssign<&Edges<'s>> for Edges<'s> {
    fn add_assign(&mut self, rhs: &Edges<'s>) {
        self.add_edges(rhs);
    }
}

impl FromIterator<Edge> for Edges<'_> {
    fn from_iter<T: IntoIterator<Item = Edge>>(iter: T) -> Self {
        Edges::from_shapes(iter.into_iter().map(WithProperties::plain).collect())
    }
}

impl FromIterator<WithProperties<Edge>> for Edges<'_> {
    fn from_iter<T: IntoIterator<Item = WithProperties<Edge>>>(iter: T) -> Self {
        Edges::from_shapes(iter.into_iter().collect())
    }
}

impl<E: Into<WithProperties<Edge>>> Extend<E> for Edges<'_> {
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
    use crate::geom::{Point, Polygon};

    fn edge(x1: Coord, y1: Coord, x2: Coord, y2: Coord) -> Edge {
        Edge::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    #[test]
    fn merged_joins_collinear() {
        let e: Edges = [edge(0, 0, 10, 0), edge(5, 0, 20, 0), edge(20, 0, 30, 0)]
            .into_iter()
            .collect();
        assert_eq!(e.length(), 30.0);
        let m = e.merged();
        assert_eq!(m.count(), 1);
        assert!(m.is_merged());
    }

    #[test]
    fn booleans_on_collinear_edges() {
        let a: Edges = [edge(0, 0, 20, 0)].into_iter().collect();
        let b: Edges = [edge(10, 0, 30, 0)].into_iter().collect();
        assert_eq!((&a & &b).length(), 10.0);
        assert_eq!((&a - &b).length(), 10.0);
        assert_eq!((&a | &b).length(), 30.0);
        assert_eq!((&a ^ &b).length(), 20.0);
    }

    #[test]
    fn edges_versus_region() {
        let r = Region::from_iter([Polygon::from_box(BBox::new(0, 0, 10, 10))]);
        let e: Edges = [edge(-5, 5, 15, 5), edge(0, 0, 10, 0)].into_iter().collect();
        assert_eq!(e.and_region(&r).length(), 20.0);
        assert_eq!(e.not_region(&r).length(), 10.0);
        assert_eq!(e.inside_part(&r).length(), 10.0);
        assert_eq!(e.outside_part(&r).length(), 20.0);

        let (inside, outside) = e.andnot_region(&r);
        assert_eq!(inside.length(), 20.0);
        assert_eq!(outside.length(), 10.0);
    }

    #[test]
    fn extended_joined_loop() {
        let r = Region::from_iter([Polygon::from_box(BBox::new(0, 0, 10, 10))]);
        let frame = r.edges().extended(0, 0, 1, 1, true);
        assert_eq!(frame.count(), 1);
        assert_eq!(frame.area(), 12 * 12 - 8 * 8);
    }

    #[test]
    fn insert_upgrades_empty() {
        let mut e = Edges::new();
        assert_eq!(e.kind(), DelegateKind::Empty);
        e.insert(edge(0, 0, 10, 0));
        assert_eq!(e.kind(), DelegateKind::Flat);
        assert_eq!(e.count(), 1);
    }
}
