use std::{borrow::Cow, fmt};

use super::{EmptyRegion, FlatRegion};
use crate::{
    DelegateKind,
    boolean::{BooleanOp, MergeOptions, and_not_polygons, boolean_polygons, merge_polygons, size_polygons},
    deep::DeepLayer,
    drc::{CheckScope, EdgeRelation, RegionCheckOptions, region_check},
    edge_pairs::{EdgePairsBox, FlatEdgePairs},
    edges::{EdgesBox, EdgesDelegate, FlatEdges},
    errors::RegionResult,
    geom::{Area, BBox, Coord, Polygon},
    layout::{CellIndex, LayerIndex, Layout},
    plugins::{
        PolygonEdgesProcessor, PolygonFilter, PolygonProcessor, PolygonToEdgePairProcessor,
        PolygonToEdgeProcessor, process_all,
    },
    properties::WithProperties,
    scan::{
        CountBounds, InteractionMode, pull_edges_by_polygons, pull_polygons,
        select_polygons, select_polygons_by_edges,
    },
};

/// Owned polygon delegate.
pub type RegionBox<'s> = Box<dyn RegionDelegate<'s> + 's>;

/// Tunable behavior carried by every polygon delegate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionFlags {
    /// Operations see the polygons merged.
    pub merged_semantics: bool,
    /// Booleans with an empty operand are computed instead of short cut.
    pub strict_handling: bool,
    /// Polygons touching in a single point stay separate when merging.
    pub min_coherence: bool,
    /// Polygons with different properties are merged together.
    pub join_properties_on_merge: bool,
}

impl RegionFlags {
    pub fn new() -> Self {
        RegionFlags {
            merged_semantics: true,
            strict_handling: false,
            min_coherence: false,
            join_properties_on_merge: true,
        }
    }

    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            min_coherence: self.min_coherence,
            min_wc: 0,
            join_properties: self.join_properties_on_merge,
        }
    }
}

impl Default for RegionFlags {
    fn default() -> Self {
        Self::new()
    }
}

/// Storage strategy behind a [Region](crate::Region).
///
/// Only iteration and bookkeeping are required. Every operation has a default implementation that
/// works on the flat shape list and returns a flat delegate; strategies override what they can do
/// better. In place operations consume the boxed delegate and return the one replacing it.
pub trait RegionDelegate<'s>: fmt::Debug {
    fn kind(&self) -> DelegateKind;

    fn clone_delegate(&self) -> RegionBox<'s>;

    fn flags(&self) -> &RegionFlags;

    fn flags_mut(&mut self) -> &mut RegionFlags;

    /// Raw polygons in top level coordinates.
    fn iter(&self) -> Box<dyn Iterator<Item = WithProperties<Polygon>> + '_>;

    /// The deep layer if the delegate is hierarchical.
    fn deep_layer(&self) -> Option<&DeepLayer<'s>> {
        None
    }

    /// The deep layer holding the polygons as operations see them (merged if merged semantics
    /// apply), if the delegate is hierarchical.
    fn deep_effective_layer(&self) -> Option<DeepLayer<'s>> {
        None
    }

    /// Mutable flat storage, `None` for read only strategies.
    fn as_flat_mut(&mut self) -> Option<&mut FlatRegion> {
        None
    }

    fn shapes(&self) -> Cow<'_, [WithProperties<Polygon>]> {
        Cow::Owned(self.iter().collect())
    }

    /// True if the polygons are known to be merged already.
    fn is_merged(&self) -> bool {
        false
    }

    /// Polygons as seen by operations: merged if merged semantics apply.
    fn effective_shapes(&self) -> Cow<'_, [WithProperties<Polygon>]> {
        if !self.flags().merged_semantics || self.is_merged() {
            self.shapes()
        } else {
            Cow::Owned(merge_polygons(&self.shapes(), &self.flags().merge_options(), None))
        }
    }

    fn iter_merged(&self) -> Box<dyn Iterator<Item = WithProperties<Polygon>> + '_> {
        Box::new(self.effective_shapes().into_owned().into_iter())
    }

    fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Number of polygons as seen flat.
    fn count(&self) -> usize {
        self.iter().count()
    }

    /// Number of polygons as stored.
    fn hier_count(&self) -> usize {
        self.count()
    }

    fn bbox(&self) -> BBox {
        self.iter()
            .fold(BBox::empty(), |b, p| b.union(&p.shape.bbox()))
    }

    fn area(&self) -> Area {
        self.effective_shapes().iter().map(|p| p.shape.area()).sum()
    }

    fn perimeter(&self) -> f64 {
        self.effective_shapes()
            .iter()
            .map(|p| p.shape.perimeter())
            .sum()
    }

    fn merged(&self, min_coherence: bool, min_wc: u32) -> RegionBox<'s> {
        let options = MergeOptions {
            min_coherence,
            min_wc,
            ..self.flags().merge_options()
        };
        let merged = merge_polygons(&self.shapes(), &options, None);
        FlatRegion::boxed(merged, *self.flags(), true)
    }

    fn merged_in_place(self: Box<Self>, min_coherence: bool, min_wc: u32) -> RegionBox<'s> {
        self.merged(min_coherence, min_wc)
    }

    fn and_with(&self, other: &dyn RegionDelegate<'s>) -> RegionBox<'s> {
        flat_boolean(self, other, BooleanOp::And)
    }

    fn or_with(&self, other: &dyn RegionDelegate<'s>) -> RegionBox<'s> {
        flat_boolean(self, other, BooleanOp::Or)
    }

    fn xor_with(&self, other: &dyn RegionDelegate<'s>) -> RegionBox<'s> {
        flat_boolean(self, other, BooleanOp::Xor)
    }

    fn not_with(&self, other: &dyn RegionDelegate<'s>) -> RegionBox<'s> {
        flat_boolean(self, other, BooleanOp::Not)
    }

    /// `self AND other` and `self NOT other`.
    fn andnot_with(&self, other: &dyn RegionDelegate<'s>) -> (RegionBox<'s>, RegionBox<'s>) {
        if let (Some(and), Some(not)) = (
            boolean_shortcut(self, other, BooleanOp::And),
            boolean_shortcut(self, other, BooleanOp::Not),
        ) {
            return (and, not);
        }
        let (and, not) = and_not_polygons(
            &self.shapes(),
            &other.shapes(),
            self.flags().min_coherence,
            None,
        );
        let flags = *self.flags();
        (
            FlatRegion::boxed(and, flags, false),
            FlatRegion::boxed(not, flags, false),
        )
    }

    /// Both polygon sets in one, without merging.
    fn add_with(&self, other: &dyn RegionDelegate<'s>) -> RegionBox<'s> {
        let mut shapes = self.shapes().into_owned();
        shapes.extend(other.iter());
        FlatRegion::boxed(shapes, *self.flags(), false)
    }

    fn add_in_place(self: Box<Self>, other: &dyn RegionDelegate<'s>) -> RegionBox<'s> {
        self.add_with(other)
    }

    fn filtered(&self, filter: &dyn PolygonFilter) -> RegionBox<'s> {
        let raw = filter.requires_raw_input();
        let input = if raw {
            self.shapes()
        } else {
            self.effective_shapes()
        };
        let selected = input
            .iter()
            .filter(|p| filter.selected(&p.shape, p.prop_id))
            .cloned()
            .collect();
        let merged = !raw && (self.flags().merged_semantics || self.is_merged());
        FlatRegion::boxed(selected, *self.flags(), merged)
    }

    fn filter_in_place(self: Box<Self>, filter: &dyn PolygonFilter) -> RegionBox<'s> {
        self.filtered(filter)
    }

    fn processed(&self, processor: &PolygonProcessor) -> RegionBox<'s> {
        let input = if processor.requires_raw_input() {
            self.shapes()
        } else {
            self.effective_shapes()
        };
        FlatRegion::boxed(
            process_all(&input, processor),
            *self.flags(),
            processor.result_is_merged(),
        )
    }

    fn process_in_place(self: Box<Self>, processor: &PolygonProcessor) -> RegionBox<'s> {
        self.processed(processor)
    }

    fn processed_to_edges(&self, processor: &PolygonToEdgeProcessor) -> EdgesBox<'s> {
        let input = if processor.requires_raw_input() {
            self.shapes()
        } else {
            self.effective_shapes()
        };
        FlatEdges::boxed(process_all(&input, processor), processor.result_is_merged())
    }

    fn processed_to_edge_pairs(&self, processor: &PolygonToEdgePairProcessor) -> EdgePairsBox<'s> {
        let input = if processor.requires_raw_input() {
            self.shapes()
        } else {
            self.effective_shapes()
        };
        FlatEdgePairs::boxed(process_all(&input, processor))
    }

    /// Polygons grown (positive `d`) or shrunk (negative `d`) isotropically.
    fn sized(&self, d: Coord) -> RegionBox<'s> {
        let sized = size_polygons(&self.effective_shapes(), d, self.flags().min_coherence, None);
        FlatRegion::boxed(sized, *self.flags(), true)
    }

    /// Outline edges of the polygons.
    fn edges(&self) -> EdgesBox<'s> {
        self.processed_to_edges(&PolygonEdgesProcessor)
    }

    /// Relation check. `other` is used by two layer relations only.
    fn check(
        &self,
        relation: EdgeRelation,
        other: Option<&dyn RegionDelegate<'s>>,
        scope: CheckScope,
        d: Coord,
        options: &RegionCheckOptions,
    ) -> EdgePairsBox<'s> {
        let subjects = self.effective_shapes();
        let others = other.map(|o| o.effective_shapes());
        FlatEdgePairs::boxed(region_check(
            &subjects,
            others.as_deref(),
            relation,
            scope,
            d,
            options,
        ))
    }

    /// Polygons whose relation to `other` matches `mode` (and `bounds` for counting modes).
    fn selected_interacting(
        &self,
        other: &dyn RegionDelegate<'s>,
        mode: InteractionMode,
        bounds: CountBounds,
        inverse: bool,
    ) -> RegionBox<'s> {
        let subjects = self.effective_shapes();
        let others = other.effective_shapes();
        let mask = select_polygons(
            &subjects.iter().map(|p| &p.shape).collect::<Vec<_>>(),
            &others.iter().map(|p| &p.shape).collect::<Vec<_>>(),
            mode,
            bounds,
            inverse,
        );
        let merged = self.flags().merged_semantics || self.is_merged();
        FlatRegion::boxed(masked(&subjects, &mask), *self.flags(), merged)
    }

    /// Polygons of `other` related to these ones by `mode`.
    fn pull_interacting(&self, other: &dyn RegionDelegate<'s>, mode: InteractionMode) -> RegionBox<'s> {
        let subjects = self.effective_shapes();
        let others = other.effective_shapes();
        let mask = pull_polygons(
            &subjects.iter().map(|p| &p.shape).collect::<Vec<_>>(),
            &others.iter().map(|p| &p.shape).collect::<Vec<_>>(),
            mode,
        );
        let merged = other.flags().merged_semantics || other.is_merged();
        FlatRegion::boxed(masked(&others, &mask), *self.flags(), merged)
    }

    /// Polygons interacting with edges, with the partner count in `bounds`.
    fn selected_interacting_edges(
        &self,
        other: &dyn EdgesDelegate<'s>,
        bounds: CountBounds,
        inverse: bool,
    ) -> RegionBox<'s> {
        let subjects = self.effective_shapes();
        let edges = other.effective_shapes();
        let mask = select_polygons_by_edges(
            &subjects.iter().map(|p| &p.shape).collect::<Vec<_>>(),
            &edges.iter().map(|e| &e.shape).collect::<Vec<_>>(),
            bounds,
            inverse,
        );
        let merged = self.flags().merged_semantics || self.is_merged();
        FlatRegion::boxed(masked(&subjects, &mask), *self.flags(), merged)
    }

    /// Edges related to these polygons by `mode`.
    fn pull_interacting_edges(
        &self,
        other: &dyn EdgesDelegate<'s>,
        mode: InteractionMode,
    ) -> EdgesBox<'s> {
        let subjects = self.effective_shapes();
        let edges = other.effective_shapes();
        let mask = pull_edges_by_polygons(
            &subjects.iter().map(|p| &p.shape).collect::<Vec<_>>(),
            &edges.iter().map(|e| &e.shape).collect::<Vec<_>>(),
            mode,
        );
        FlatEdges::boxed(masked(&edges, &mask), other.is_merged())
    }

    /// Write the raw polygons into `cell` of `layout` on `layer`.
    fn insert_into(&self, layout: &mut Layout, cell: CellIndex, layer: LayerIndex) -> RegionResult<()> {
        layout.check_cell(cell)?;
        layout.check_layer(layer)?;
        layout
            .cell_mut(cell)
            .shapes_mut(layer)
            .polygons
            .extend(self.iter());
        Ok(())
    }
}

pub(crate) fn masked<S: Clone>(shapes: &[WithProperties<S>], mask: &[bool]) -> Vec<WithProperties<S>> {
    shapes
        .iter()
        .zip(mask)
        .filter(|(_, keep)| **keep)
        .map(|(s, _)| s.clone())
        .collect()
}

/// Result of a boolean with an empty operand, unless strict handling is requested.
pub(crate) fn boolean_shortcut<'s, A>(
    a: &A,
    b: &dyn RegionDelegate<'s>,
    op: BooleanOp,
) -> Option<RegionBox<'s>>
where
    A: RegionDelegate<'s> + ?Sized,
{
    let flags = *a.flags();
    if flags.strict_handling {
        return None;
    }
    let empty = || -> RegionBox<'s> { Box::new(EmptyRegion::with_flags(flags)) };
    match (a.is_empty(), b.is_empty()) {
        (false, false) => None,
        (true, _) => Some(match op {
            BooleanOp::And | BooleanOp::Not => empty(),
            BooleanOp::Or | BooleanOp::Xor => {
                let mut r = b.clone_delegate();
                *r.flags_mut() = flags;
                r
            }
        }),
        (false, true) => Some(match op {
            BooleanOp::And => empty(),
            BooleanOp::Or | BooleanOp::Xor | BooleanOp::Not => a.clone_delegate(),
        }),
    }
}

pub(crate) fn flat_boolean<'s, A>(a: &A, b: &dyn RegionDelegate<'s>, op: BooleanOp) -> RegionBox<'s>
where
    A: RegionDelegate<'s> + ?Sized,
{
    if let Some(r) = boolean_shortcut(a, b, op) {
        return r;
    }
    let result = boolean_polygons(&a.shapes(), &b.shapes(), op, a.flags().min_coherence, None);
    FlatRegion::boxed(result, *a.flags(), false)
}
