//! Polygon collections.
//!
//! [Region] is the value type users work with. It owns one boxed [RegionDelegate] that decides
//! how the polygons are stored ([EmptyRegion], [FlatRegion], [OriginalLayerRegion] or
//! [DeepRegion]). Operations returning a new region pick the delegate of the result; in place
//! operations replace the delegate. Mutating a region whose delegate is read only turns it into a
//! flat region first.
mod deep;
mod delegate;
mod empty;
mod flat;
mod original;

pub use deep::DeepRegion;
pub use delegate::{RegionBox, RegionDelegate, RegionFlags};
pub use empty::EmptyRegion;
pub use flat::FlatRegion;
pub use original::OriginalLayerRegion;

pub(crate) use delegate::masked;

use std::{
    fmt,
    ops::{Add, AddAssign, BitAnd, BitOr, BitXor, Sub},
};

use crate::{
    DelegateKind,
    deep::{DeepLayer, DeepShapeStore},
    drc::{CheckScope, EdgeRelation, RegionCheckOptions},
    edge_pairs::EdgePairs,
    edges::Edges,
    errors::RegionResult,
    geom::{Area, BBox, Coord, Polygon},
    layout::{CellIndex, LayerIndex, Layout, RecursiveShapeIterator},
    plugins::{
        ExtentsProcessor, HolesProcessor, HullsProcessor, PolygonFilter, PolygonProcessor,
        PolygonToEdgePairProcessor, PolygonToEdgeProcessor,
    },
    properties::WithProperties,
    scan::{CountBounds, InteractionMode},
};

/// A set of polygons.
///
/// # Examples
///
/// ```
/// use layout_regions::prelude::*;
///
/// let mut r = Region::new();
/// r.insert(Polygon::from_box(BBox::new(0, 0, 100, 100)));
/// r.insert(Polygon::from_box(BBox::new(100, 0, 200, 100)));
/// assert_eq!(r.count(), 2);
///
/// r.merge();
/// assert_eq!(r.count(), 1);
/// assert!(r.is_merged());
/// ```
pub struct Region<'s> {
    delegate: RegionBox<'s>,
}

impl<'s> Region<'s> {
    /// Empty region.
    pub fn new() -> Self {
        Region {
            delegate: Box::new(EmptyRegion::new()),
        }
    }

    pub fn from_delegate(delegate: RegionBox<'s>) -> Self {
        Region { delegate }
    }

    /// Flat region holding `shapes`.
    pub fn from_shapes(shapes: Vec<WithProperties<Polygon>>) -> Self {
        Region {
            delegate: Box::new(FlatRegion::new(shapes, RegionFlags::new())),
        }
    }

    /// Read only region over the polygons delivered by `iter`.
    pub fn from_original(iter: RecursiveShapeIterator<'s>) -> Self {
        Region {
            delegate: Box::new(OriginalLayerRegion::new(iter)),
        }
    }

    /// Deep region holding the polygons delivered by `iter` in `store`.
    pub fn new_deep(iter: &RecursiveShapeIterator<'_>, store: &'s DeepShapeStore) -> RegionResult<Self> {
        Ok(Self::from_deep(store.create_layer::<Polygon>(iter)?))
    }

    pub fn from_deep(layer: DeepLayer<'s>) -> Self {
        Region {
            delegate: Box::new(DeepRegion::new(layer)),
        }
    }

    pub fn delegate(&self) -> &dyn RegionDelegate<'s> {
        self.delegate.as_ref()
    }

    pub fn kind(&self) -> DelegateKind {
        self.delegate.kind()
    }

    pub fn deep_layer(&self) -> Option<&DeepLayer<'s>> {
        self.delegate.deep_layer()
    }

    pub fn flags(&self) -> RegionFlags {
        *self.delegate.flags()
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

    pub fn min_coherence(&self) -> bool {
        self.delegate.flags().min_coherence
    }

    pub fn set_min_coherence(&mut self, value: bool) {
        self.delegate.flags_mut().min_coherence = value;
    }

    pub fn join_properties_on_merge(&self) -> bool {
        self.delegate.flags().join_properties_on_merge
    }

    pub fn set_join_properties_on_merge(&mut self, value: bool) {
        self.delegate.flags_mut().join_properties_on_merge = value;
    }

    pub fn is_merged(&self) -> bool {
        self.delegate.is_merged()
    }

    pub fn is_empty(&self) -> bool {
        self.delegate.is_empty()
    }

    /// Number of polygons as seen flat.
    pub fn count(&self) -> usize {
        self.delegate.count()
    }

    /// Number of polygons as stored, counting polygons of a cell once.
    pub fn hier_count(&self) -> usize {
        self.delegate.hier_count()
    }

    pub fn bbox(&self) -> BBox {
        self.delegate.bbox()
    }

    /// Area of the polygons (merged if merged semantics apply).
    pub fn area(&self) -> Area {
        self.delegate.area()
    }

    pub fn perimeter(&self) -> f64 {
        self.delegate.perimeter()
    }

    /// Raw polygons.
    pub fn iter(&self) -> impl Iterator<Item = WithProperties<Polygon>> + '_ {
        self.delegate.iter()
    }

    /// Polygons as operations see them.
    pub fn iter_merged(&self) -> impl Iterator<Item = WithProperties<Polygon>> + '_ {
        self.delegate.iter_merged()
    }

    fn replace(&mut self, f: impl FnOnce(RegionBox<'s>) -> RegionBox<'s>) {
        let d = std::mem::replace(&mut self.delegate, Box::new(EmptyRegion::new()));
        self.delegate = f(d);
    }

    fn flat_mut(&mut self) -> &mut FlatRegion {
        if self.delegate.as_flat_mut().is_none() {
            let flat = FlatRegion::new(self.delegate.shapes().into_owned(), *self.delegate.flags());
            self.delegate = Box::new(flat);
        }
        match self.delegate.as_flat_mut() {
            Some(f) => f,
            None => unreachable!("internal library error: flat delegate expected"),
        }
    }

    pub fn insert(&mut self, polygon: impl Into<WithProperties<Polygon>>) {
        self.flat_mut().insert(polygon.into());
    }

    /// Turn the region into a flat one.
    pub fn flatten(&mut self) -> &mut Self {
        self.flat_mut();
        self
    }

    pub fn clear(&mut self) {
        let flags = *self.delegate.flags();
        self.delegate = Box::new(EmptyRegion::with_flags(flags));
    }

    pub fn swap(&mut self, other: &mut Region<'s>) {
        std::mem::swap(&mut self.delegate, &mut other.delegate);
    }

    pub fn merge(&mut self) -> &mut Self {
        let min_coherence = self.min_coherence();
        self.replace(|d| d.merged_in_place(min_coherence, 0));
        self
    }

    pub fn merged(&self) -> Region<'s> {
        self.merged_with(self.min_coherence(), 0)
    }

    /// Merged polygons keeping only areas covered by more than `min_wc` polygons.
    pub fn merged_with(&self, min_coherence: bool, min_wc: u32) -> Region<'s> {
        Region::from_delegate(self.delegate.merged(min_coherence, min_wc))
    }

    pub fn and(&self, other: &Region<'s>) -> Region<'s> {
        Region::from_delegate(self.delegate.and_with(other.delegate()))
    }

    pub fn or(&self, other: &Region<'s>) -> Region<'s> {
        Region::from_delegate(self.delegate.or_with(other.delegate()))
    }

    pub fn xor(&self, other: &Region<'s>) -> Region<'s> {
        Region::from_delegate(self.delegate.xor_with(other.delegate()))
    }

    pub fn not(&self, other: &Region<'s>) -> Region<'s> {
        Region::from_delegate(self.delegate.not_with(other.delegate()))
    }

    /// `(self AND other, self NOT other)`.
    pub fn andnot(&self, other: &Region<'s>) -> (Region<'s>, Region<'s>) {
        let (a, n) = self.delegate.andnot_with(other.delegate());
        (Region::from_delegate(a), Region::from_delegate(n))
    }

    /// Adds the polygons of `other` without merging.
    pub fn add_region(&mut self, other: &Region<'s>) -> &mut Self {
        self.replace(|d| d.add_in_place(other.delegate()));
        self
    }

    pub fn filter(&mut self, filter: &dyn PolygonFilter) -> &mut Self {
        self.replace(|d| d.filter_in_place(filter));
        self
    }

    pub fn filtered(&self, filter: &dyn PolygonFilter) -> Region<'s> {
        Region::from_delegate(self.delegate.filtered(filter))
    }

    pub fn process(&mut self, processor: &PolygonProcessor) -> &mut Self {
        self.replace(|d| d.process_in_place(processor));
        self
    }

    pub fn processed(&self, processor: &PolygonProcessor) -> Region<'s> {
        Region::from_delegate(self.delegate.processed(processor))
    }

    pub fn processed_to_edges(&self, processor: &PolygonToEdgeProcessor) -> Edges<'s> {
        Edges::from_delegate(self.delegate.processed_to_edges(processor))
    }

    pub fn processed_to_edge_pairs(&self, processor: &PolygonToEdgePairProcessor) -> EdgePairs<'s> {
        EdgePairs::from_delegate(self.delegate.processed_to_edge_pairs(processor))
    }

    pub fn sized(&self, d: Coord) -> Region<'s> {
        Region::from_delegate(self.delegate.sized(d))
    }

    pub fn size(&mut self, d: Coord) -> &mut Self {
        self.delegate = self.delegate.sized(d);
        self
    }

    /// Outline edges of the (merged) polygons.
    pub fn edges(&self) -> Edges<'s> {
        Edges::from_delegate(self.delegate.edges())
    }

    pub fn hulls(&self) -> Region<'s> {
        self.processed(&HullsProcessor)
    }

    pub fn holes(&self) -> Region<'s> {
        self.processed(&HolesProcessor)
    }

    /// Bounding boxes of the polygons, enlarged by `dx`, `dy`.
    pub fn extents(&self, dx: Coord, dy: Coord) -> Region<'s> {
        self.processed(&ExtentsProcessor { dx, dy })
    }

    fn check(
        &self,
        relation: EdgeRelation,
        other: Option<&Region<'s>>,
        scope: CheckScope,
        d: Coord,
        options: &RegionCheckOptions,
    ) -> EdgePairs<'s> {
        EdgePairs::from_delegate(self.delegate.check(
            relation,
            other.map(|o| o.delegate()),
            scope,
            d,
            options,
        ))
    }

    /// Places where a polygon is narrower than `d`.
    pub fn width_check(&self, d: Coord, options: &RegionCheckOptions) -> EdgePairs<'s> {
        self.check(EdgeRelation::Width, None, CheckScope::SameSubject, d, options)
    }

    /// Places where polygons or parts of one polygon are closer than `d`.
    pub fn space_check(&self, d: Coord, options: &RegionCheckOptions) -> EdgePairs<'s> {
        self.check(EdgeRelation::Space, None, CheckScope::Any, d, options)
    }

    /// Space violations within single polygons.
    pub fn notch_check(&self, d: Coord, options: &RegionCheckOptions) -> EdgePairs<'s> {
        self.check(EdgeRelation::Space, None, CheckScope::SameSubject, d, options)
    }

    /// Space violations between different polygons.
    pub fn isolated_check(&self, d: Coord, options: &RegionCheckOptions) -> EdgePairs<'s> {
        self.check(EdgeRelation::Space, None, CheckScope::OtherSubject, d, options)
    }

    pub fn overlap_check(&self, other: &Region<'s>, d: Coord, options: &RegionCheckOptions) -> EdgePairs<'s> {
        self.check(EdgeRelation::Overlap, Some(other), CheckScope::Any, d, options)
    }

    /// Places where `other` is enclosed by these polygons by less than `d`.
    pub fn enclosing_check(&self, other: &Region<'s>, d: Coord, options: &RegionCheckOptions) -> EdgePairs<'s> {
        self.check(EdgeRelation::Enclosing, Some(other), CheckScope::Any, d, options)
    }

    pub fn separation_check(&self, other: &Region<'s>, d: Coord, options: &RegionCheckOptions) -> EdgePairs<'s> {
        self.check(EdgeRelation::Separation, Some(other), CheckScope::Any, d, options)
    }

    /// Places where these polygons are inside `other` with a margin below `d`.
    pub fn inside_check(&self, other: &Region<'s>, d: Coord, options: &RegionCheckOptions) -> EdgePairs<'s> {
        self.check(EdgeRelation::Inside, Some(other), CheckScope::Any, d, options)
    }

    /// Polygons related to `other` by `mode` with a partner count inside `bounds` (or the
    /// complement if `inverse` is set).
    pub fn selected_by(
        &self,
        other: &Region<'s>,
        mode: InteractionMode,
        bounds: CountBounds,
        inverse: bool,
    ) -> Region<'s> {
        Region::from_delegate(
            self.delegate
                .selected_interacting(other.delegate(), mode, bounds, inverse),
        )
    }

    pub fn selected_interacting(&self, other: &Region<'s>) -> Region<'s> {
        self.selected_by(other, InteractionMode::Interacting, CountBounds::any(), false)
    }

    pub fn selected_not_interacting(&self, other: &Region<'s>) -> Region<'s> {
        self.selected_by(other, InteractionMode::Interacting, CountBounds::any(), true)
    }

    pub fn selected_overlapping(&self, other: &Region<'s>) -> Region<'s> {
        self.selected_by(other, InteractionMode::Overlapping, CountBounds::any(), false)
    }

    pub fn selected_not_overlapping(&self, other: &Region<'s>) -> Region<'s> {
        self.selected_by(other, InteractionMode::Overlapping, CountBounds::any(), true)
    }

    pub fn selected_inside(&self, other: &Region<'s>) -> Region<'s> {
        self.selected_by(other, InteractionMode::Inside, CountBounds::any(), false)
    }

    pub fn selected_not_inside(&self, other: &Region<'s>) -> Region<'s> {
        self.selected_by(other, InteractionMode::Inside, CountBounds::any(), true)
    }

    pub fn selected_outside(&self, other: &Region<'s>) -> Region<'s> {
        self.selected_by(other, InteractionMode::Outside, CountBounds::any(), false)
    }

    pub fn selected_not_outside(&self, other: &Region<'s>) -> Region<'s> {
        self.selected_by(other, InteractionMode::Outside, CountBounds::any(), true)
    }

    pub fn selected_enclosing(&self, other: &Region<'s>) -> Region<'s> {
        self.selected_by(other, InteractionMode::Enclosing, CountBounds::any(), false)
    }

    pub fn selected_not_enclosing(&self, other: &Region<'s>) -> Region<'s> {
        self.selected_by(other, InteractionMode::Enclosing, CountBounds::any(), true)
    }

    /// Polygons of `other` related to these polygons by `mode`.
    pub fn pulled(&self, other: &Region<'s>, mode: InteractionMode) -> Region<'s> {
        Region::from_delegate(self.delegate.pull_interacting(other.delegate(), mode))
    }

    pub fn pull_interacting(&self, other: &Region<'s>) -> Region<'s> {
        self.pulled(other, InteractionMode::Interacting)
    }

    pub fn pull_overlapping(&self, other: &Region<'s>) -> Region<'s> {
        self.pulled(other, InteractionMode::Overlapping)
    }

    pub fn pull_inside(&self, other: &Region<'s>) -> Region<'s> {
        self.pulled(other, InteractionMode::Inside)
    }

    pub fn pull_enclosing(&self, other: &Region<'s>) -> Region<'s> {
        self.pulled(other, InteractionMode::Enclosing)
    }

    /// Polygons touching or crossed by edges of `other`, with the edge count inside `bounds`.
    pub fn selected_interacting_edges(&self, other: &Edges<'s>, bounds: CountBounds, inverse: bool) -> Region<'s> {
        Region::from_delegate(
            self.delegate
                .selected_interacting_edges(other.delegate(), bounds, inverse),
        )
    }

    /// Edges of `other` interacting with these polygons.
    pub fn pull_interacting_edges(&self, other: &Edges<'s>) -> Edges<'s> {
        Edges::from_delegate(
            self.delegate
                .pull_interacting_edges(other.delegate(), InteractionMode::Interacting),
        )
    }

    /// Write the raw polygons into `layer` of `cell`. Deep regions recreate their hierarchy
    /// below `cell`.
    pub fn insert_into(&self, layout: &mut Layout, cell: CellIndex, layer: LayerIndex) -> RegionResult<()> {
        self.delegate.insert_into(layout, cell, layer)
    }
}

impl Default for Region<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Region<'_> {
    fn clone(&self) -> Self {
        Region {
            delegate: self.delegate.clone_delegate(),
        }
    }
}

impl fmt::Debug for Region<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("kind", &self.kind())
            .field("delegate", &self.delegate)
            .finish()
    }
}

impl<'s> BitAnd for &Region<'s> {
    type Output = Region<'s>;

    fn bitand(self, rhs: Self) -> Region<'s> {
        self.and(rhs)
    }
}

impl<'s> BitOr for &Region<'s> {
    type Output = Region<'s>;

    fn bitor(self, rhs: Self) -> Region<'s> {
        self.or(rhs)
    }
}

impl<'s> BitXor for &Region<'s> {
    type Output = Region<'s>;

    fn bitxor(self, rhs: Self) -> Region<'s> {
        self.xor(rhs)
    }
}

impl<'s> Sub for &Region<'s> {
    type Output = Region<'s>;

    fn sub(self, rhs: Self) -> Region<'s> {
        self.not(rhs)
    }
}

impl<'s> Add for &Region<'s> {
    type Output = Region<'s>;

    fn add(self, rhs: Self) -> Region<'s> {
        Region::from_delegate(self.delegate.add_with(rhs.delegate()))
    }
}

impl<'s> AddAssign<&Region<'s>> for Region<'s> {
    fn add_assign(&mut self, rhs: &Region<'s>) {
        self.add_region(rhs);
    }
}

impl FromIterator<Polygon> for Region<'_> {
    fn from_iter<T: IntoIterator<Item = Polygon>>(iter: T) -> Self {
        Region::from_shapes(iter.into_iter().map(WithProperties::plain).collect())
    }
}

impl FromIterator<WithProperties<Polygon>> for Region<'_> {
    fn from_iter<T: IntoIterator<Item = WithProperties<Polygon>>>(iter: T) -> Self {
        Region::from_shapes(iter.into_iter().collect())
    }
}

impl<P: Into<WithProperties<Polygon>>> Extend<P> for Region<'_> {
    fn extend<T: IntoIterator<Item = P>>(&mut self, iter: T) {
        let flat = self.flat_mut();
        for p in iter {
            flat.insert(p.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::CplxTrans;

    fn boxes(b: &[(Coord, Coord, Coord, Coord)]) -> Region<'static> {
        b.iter()
            .map(|&(x1, y1, x2, y2)| Polygon::from_box(BBox::new(x1, y1, x2, y2)))
            .collect()
    }

    #[test]
    fn empty_operand_shortcuts() {
        let a = boxes(&[(0, 0, 10, 10)]);
        let e = Region::new();
        assert_eq!((&a & &e).kind(), DelegateKind::Empty);
        assert_eq!((&e - &a).kind(), DelegateKind::Empty);
        assert_eq!((&e | &a).area(), 100);
        assert_eq!((&a - &e).area(), 100);

        let mut strict = Region::new();
        strict.set_strict_handling(true);
        assert_eq!((&strict | &a).kind(), DelegateKind::Flat);
    }

    #[test]
    fn andnot_matches_separate_booleans() {
        let a = boxes(&[(0, 0, 100, 100), (200, 0, 300, 100)]);
        let b = boxes(&[(50, 50, 250, 150)]);
        let (and, not) = a.andnot(&b);
        assert_eq!(and.area(), (&a & &b).area());
        assert_eq!(not.area(), (&a - &b).area());
        assert_eq!(and.area() + not.area(), a.area());
    }

    #[test]
    fn merged_semantics_switch() {
        let mut r = boxes(&[(0, 0, 10, 10), (5, 0, 15, 10)]);
        assert_eq!(r.area(), 150);
        r.set_merged_semantics(false);
        assert_eq!(r.area(), 200);
    }

    #[test]
    fn insert_upgrades_original_layer() {
        let mut ly = Layout::new();
        let l1 = ly.insert_layer("1/0");
        let top = ly.add_cell("TOP");
        let child = ly.add_cell("A");
        ly.insert(child, l1, Polygon::from_box(BBox::new(0, 0, 10, 10)));
        ly.add_instance(top, child, CplxTrans::displacement(100, 0));
        ly.add_instance(top, child, CplxTrans::displacement(200, 0));

        let iter = RecursiveShapeIterator::new(&ly, top, l1).unwrap();
        let mut r = Region::from_original(iter);
        assert_eq!(r.kind(), DelegateKind::OriginalLayer);
        assert_eq!(r.count(), 2);
        assert_eq!(r.hier_count(), 1);
        assert_eq!(r.bbox(), BBox::new(100, 0, 210, 10));

        r.insert(Polygon::from_box(BBox::new(0, 0, 5, 5)));
        assert_eq!(r.kind(), DelegateKind::Flat);
        assert_eq!(r.count(), 3);
    }

    #[test]
    fn clone_is_independent() {
        let a = boxes(&[(0, 0, 10, 10)]);
        let mut b = a.clone();
        b.insert(Polygon::from_box(BBox::new(20, 0, 30, 10)));
        assert_eq!(a.count(), 1);
        assert_eq!(b.count(), 2);

        let mut c = Region::new();
        c.swap(&mut b);
        assert!(b.is_empty());
        assert_eq!(c.count(), 2);
    }

    #[test]
    fn merged_with_min_wc() {
        let r = boxes(&[(0, 0, 20, 10), (10, 0, 30, 10)]);
        let overlap = r.merged_with(false, 1);
        assert_eq!(overlap.area(), 100);
        assert!(overlap.is_merged());
    }

    #[test]
    fn sized_and_extents() {
        let r = boxes(&[(0, 0, 10, 10)]);
        assert_eq!(r.sized(5).bbox(), BBox::new(-5, -5, 15, 15));
        assert!(r.sized(-5).is_empty());
        assert_eq!(r.extents(1, 2).bbox(), BBox::new(-1, -2, 11, 12));
    }

    #[test]
    fn interactions() {
        let a = boxes(&[(0, 0, 10, 10), (100, 0, 110, 10)]);
        let b = boxes(&[(10, 0, 20, 10)]);
        assert_eq!(a.selected_interacting(&b).count(), 1);
        assert_eq!(a.selected_not_interacting(&b).count(), 1);
        assert_eq!(a.selected_overlapping(&b).count(), 0);
        assert_eq!(a.pull_interacting(&b).count(), 1);
    }
}
