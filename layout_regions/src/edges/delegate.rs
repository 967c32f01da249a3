use std::{borrow::Cow, fmt};

use super::{EmptyEdges, FlatEdges};
use crate::{
    DelegateKind,
    boolean::{
        BooleanOp, EdgeClipper, EdgeRegionMode, boolean_edges, edge_intersections, merge_edges,
        merge_polygons,
    },
    deep::DeepLayer,
    drc::{EdgeRelation, EdgesCheckOptions, edges_check},
    edge_pairs::{EdgePairsBox, FlatEdgePairs},
    errors::RegionResult,
    geom::{BBox, Coord, Edge, Polygon},
    layout::{CellIndex, LayerIndex, Layout},
    plugins::{EdgeFilter, EdgeProcessor, EdgeToPolygonProcessor, process_all},
    properties::WithProperties,
    region::{FlatRegion, RegionBox, RegionDelegate, RegionFlags, masked},
    scan::{
        CountBounds, InteractionMode, extended_edges, pull_edges_by_edges, pull_polygons_by_edges,
        select_edges_by_edges, select_edges_by_polygons,
    },
};

/// Owned edge delegate.
pub type EdgesBox<'s> = Box<dyn EdgesDelegate<'s> + 's>;

/// Tunable behavior carried by every edge delegate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgesFlags {
    /// Operations see the edges merged: collinear overlapping or touching edges joined.
    pub merged_semantics: bool,
    /// Booleans with an empty operand are computed instead of short cut.
    pub strict_handling: bool,
}

impl EdgesFlags {
    pub fn new() -> Self {
        EdgesFlags {
            merged_semantics: true,
            strict_handling: false,
        }
    }
}

impl Default for EdgesFlags {
    fn default() -> Self {
        Self::new()
    }
}

/// Storage strategy behind [Edges](crate::Edges). Works like
/// [RegionDelegate](crate::region::RegionDelegate): everything but iteration has an as-if-flat
/// default.
pub trait EdgesDelegate<'s>: fmt::Debug {
    fn kind(&self) -> DelegateKind;

    fn clone_delegate(&self) -> EdgesBox<'s>;

    fn flags(&self) -> &EdgesFlags;

    fn flags_mut(&mut self) -> &mut EdgesFlags;

    /// Raw edges in top level coordinates.
    fn iter(&self) -> Box<dyn Iterator<Item = WithProperties<Edge>> + '_>;

    fn deep_layer(&self) -> Option<&DeepLayer<'s>> {
        None
    }

    /// The deep layer holding the edges as operations see them.
    fn deep_effective_layer(&self) -> Option<DeepLayer<'s>> {
        None
    }

    fn as_flat_mut(&mut self) -> Option<&mut FlatEdges> {
        None
    }

    fn shapes(&self) -> Cow<'_, [WithProperties<Edge>]> {
        Cow::Owned(self.iter().collect())
    }

    fn is_merged(&self) -> bool {
        false
    }

    fn effective_shapes(&self) -> Cow<'_, [WithProperties<Edge>]> {
        if !self.flags().merged_semantics || self.is_merged() {
            self.shapes()
        } else {
            Cow::Owned(merge_edges(&self.shapes()))
        }
    }

    fn iter_merged(&self) -> Box<dyn Iterator<Item = WithProperties<Edge>> + '_> {
        Box::new(self.effective_shapes().into_owned().into_iter())
    }

    fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    fn count(&self) -> usize {
        self.iter().count()
    }

    fn hier_count(&self) -> usize {
        self.count()
    }

    fn bbox(&self) -> BBox {
        self.iter()
            .fold(BBox::empty(), |b, e| b.union(&e.shape.bbox()))
    }

    /// Total length (of the merged edges if merged semantics apply).
    fn length(&self) -> f64 {
        self.effective_shapes().iter().map(|e| e.shape.length()).sum()
    }

    fn merged(&self) -> EdgesBox<'s> {
        FlatEdges::boxed(merge_edges(&self.shapes()), true)
    }

    fn merged_in_place(self: Box<Self>) -> EdgesBox<'s> {
        self.merged()
    }

    fn and_with(&self, other: &dyn EdgesDelegate<'s>) -> EdgesBox<'s> {
        flat_boolean(self, other, BooleanOp::And)
    }

    fn or_with(&self, other: &dyn EdgesDelegate<'s>) -> EdgesBox<'s> {
        flat_boolean(self, other, BooleanOp::Or)
    }

    fn xor_with(&self, other: &dyn EdgesDelegate<'s>) -> EdgesBox<'s> {
        flat_boolean(self, other, BooleanOp::Xor)
    }

    fn not_with(&self, other: &dyn EdgesDelegate<'s>) -> EdgesBox<'s> {
        flat_boolean(self, other, BooleanOp::Not)
    }

    fn andnot_with(&self, other: &dyn EdgesDelegate<'s>) -> (EdgesBox<'s>, EdgesBox<'s>) {
        (self.and_with(other), self.not_with(other))
    }

    /// Overlapping parts plus crossing points (as dot edges) of both edge sets.
    fn intersections(&self, other: &dyn EdgesDelegate<'s>) -> EdgesBox<'s> {
        FlatEdges::boxed(edge_intersections(&self.shapes(), &other.shapes()), false)
    }

    fn add_with(&self, other: &dyn EdgesDelegate<'s>) -> EdgesBox<'s> {
        let mut shapes = self.shapes().into_owned();
        shapes.extend(other.iter());
        FlatEdges::boxed(shapes, false)
    }

    fn add_in_place(self: Box<Self>, other: &dyn EdgesDelegate<'s>) -> EdgesBox<'s> {
        self.add_with(other)
    }

    /// Parts of the edges selected by `mode` against the polygons of `region`.
    fn clipped(&self, region: &dyn RegionDelegate<'s>, mode: EdgeRegionMode) -> EdgesBox<'s> {
        let polygons = clip_polygons(region);
        let clipper = EdgeClipper::new(polygons.iter().map(|p| &p.shape));
        FlatEdges::boxed(clipper.clip(&self.effective_shapes(), mode), false)
    }

    /// Parts inside the polygons or on their boundary.
    fn and_with_region(&self, region: &dyn RegionDelegate<'s>) -> EdgesBox<'s> {
        self.clipped(region, EdgeRegionMode::InsideOrBoundary)
    }

    /// Parts outside the polygons.
    fn not_with_region(&self, region: &dyn RegionDelegate<'s>) -> EdgesBox<'s> {
        self.clipped(region, EdgeRegionMode::Outside)
    }

    fn andnot_with_region(&self, region: &dyn RegionDelegate<'s>) -> (EdgesBox<'s>, EdgesBox<'s>) {
        let polygons = clip_polygons(region);
        let clipper = EdgeClipper::new(polygons.iter().map(|p| &p.shape));
        let (inside, outside) = clipper.split(&self.effective_shapes());
        (FlatEdges::boxed(inside, false), FlatEdges::boxed(outside, false))
    }

    /// Parts strictly inside the polygons.
    fn inside_part(&self, region: &dyn RegionDelegate<'s>) -> EdgesBox<'s> {
        self.clipped(region, EdgeRegionMode::Inside)
    }

    /// Parts not strictly inside the polygons.
    fn outside_part(&self, region: &dyn RegionDelegate<'s>) -> EdgesBox<'s> {
        self.clipped(region, EdgeRegionMode::OutsideOrBoundary)
    }

    fn filtered(&self, filter: &dyn EdgeFilter) -> EdgesBox<'s> {
        let raw = filter.requires_raw_input();
        let input = if raw {
            self.shapes()
        } else {
            self.effective_shapes()
        };
        let selected = input
            .iter()
            .filter(|e| filter.selected(&e.shape, e.prop_id))
            .cloned()
            .collect();
        let merged = !raw && (self.flags().merged_semantics || self.is_merged());
        FlatEdges::boxed(selected, merged)
    }

    fn filter_in_place(self: Box<Self>, filter: &dyn EdgeFilter) -> EdgesBox<'s> {
        self.filtered(filter)
    }

    fn processed(&self, processor: &EdgeProcessor) -> EdgesBox<'s> {
        let input = if processor.requires_raw_input() {
            self.shapes()
        } else {
            self.effective_shapes()
        };
        FlatEdges::boxed(process_all(&input, processor), processor.result_is_merged())
    }

    fn process_in_place(self: Box<Self>, processor: &EdgeProcessor) -> EdgesBox<'s> {
        self.processed(processor)
    }

    fn processed_to_polygons(&self, processor: &EdgeToPolygonProcessor) -> RegionBox<'s> {
        let input = if processor.requires_raw_input() {
            self.shapes()
        } else {
            self.effective_shapes()
        };
        FlatRegion::boxed(
            process_all(&input, processor),
            RegionFlags::new(),
            processor.result_is_merged(),
        )
    }

    /// Polygons covering the edges extended by `ext_b` at the start, `ext_e` at the end, `ext_o`
    /// to the outside (right) and `ext_i` to the inside (left). With `join` set, connected edge
    /// chains give one polygon each.
    fn extended(&self, ext_b: Coord, ext_e: Coord, ext_o: Coord, ext_i: Coord, join: bool) -> RegionBox<'s> {
        let edges: Vec<Edge> = self.effective_shapes().iter().map(|e| e.shape).collect();
        let polygons = extended_edges(&edges, ext_b, ext_e, ext_o, ext_i, join)
            .into_iter()
            .map(WithProperties::plain)
            .collect();
        FlatRegion::boxed(polygons, RegionFlags::new(), false)
    }

    /// Relation check. Edges have no inside, the edge orientation tells which side is the inside
    /// (left) of an edge. `other` is used by two layer relations only.
    fn check(
        &self,
        relation: EdgeRelation,
        other: Option<&dyn EdgesDelegate<'s>>,
        d: Coord,
        options: &EdgesCheckOptions,
    ) -> EdgePairsBox<'s> {
        let subjects = self.effective_shapes();
        let others = other.map(|o| o.effective_shapes());
        FlatEdgePairs::boxed(edges_check(&subjects, others.as_deref(), relation, d, options))
    }

    /// Edges touching or crossing edges of `other`, with the partner count inside `bounds`.
    fn selected_interacting(
        &self,
        other: &dyn EdgesDelegate<'s>,
        bounds: CountBounds,
        inverse: bool,
    ) -> EdgesBox<'s> {
        let subjects = self.effective_shapes();
        let others = other.effective_shapes();
        let mask = select_edges_by_edges(
            &subjects.iter().map(|e| &e.shape).collect::<Vec<_>>(),
            &others.iter().map(|e| &e.shape).collect::<Vec<_>>(),
            bounds,
            inverse,
        );
        let merged = self.flags().merged_semantics || self.is_merged();
        FlatEdges::boxed(masked(&subjects, &mask), merged)
    }

    /// Edges of `other` touching or crossing these edges.
    fn pull_interacting(&self, other: &dyn EdgesDelegate<'s>) -> EdgesBox<'s> {
        let subjects = self.effective_shapes();
        let others = other.effective_shapes();
        let mask = pull_edges_by_edges(
            &subjects.iter().map(|e| &e.shape).collect::<Vec<_>>(),
            &others.iter().map(|e| &e.shape).collect::<Vec<_>>(),
        );
        let merged = other.flags().merged_semantics || other.is_merged();
        FlatEdges::boxed(masked(&others, &mask), merged)
    }

    /// Edges related to the polygons of `region` by `mode` (`Interacting`, `Inside` or
    /// `Outside`).
    fn selected_interacting_region(
        &self,
        region: &dyn RegionDelegate<'s>,
        mode: InteractionMode,
        bounds: CountBounds,
        inverse: bool,
    ) -> EdgesBox<'s> {
        let subjects = self.effective_shapes();
        let polygons = region.effective_shapes();
        let mask = select_edges_by_polygons(
            &subjects.iter().map(|e| &e.shape).collect::<Vec<_>>(),
            &polygons.iter().map(|p| &p.shape).collect::<Vec<_>>(),
            mode,
            bounds,
            inverse,
        );
        let merged = self.flags().merged_semantics || self.is_merged();
        FlatEdges::boxed(masked(&subjects, &mask), merged)
    }

    /// Polygons of `region` related to these edges by `mode`.
    fn pull_interacting_region(&self, region: &dyn RegionDelegate<'s>, mode: InteractionMode) -> RegionBox<'s> {
        let subjects = self.effective_shapes();
        let polygons = region.effective_shapes();
        let mask = pull_polygons_by_edges(
            &subjects.iter().map(|e| &e.shape).collect::<Vec<_>>(),
            &polygons.iter().map(|p| &p.shape).collect::<Vec<_>>(),
            mode,
        );
        let merged = region.flags().merged_semantics || region.is_merged();
        FlatRegion::boxed(masked(&polygons, &mask), *region.flags(), merged)
    }

    /// Write the raw edges into `cell` of `layout` on `layer`.
    fn insert_into(&self, layout: &mut Layout, cell: CellIndex, layer: LayerIndex) -> RegionResult<()> {
        layout.check_cell(cell)?;
        layout.check_layer(layer)?;
        layout
            .cell_mut(cell)
            .shapes_mut(layer)
            .edges
            .extend(self.iter());
        Ok(())
    }
}

/// Polygons of `region` merged, as edge clipping needs them regardless of merged semantics.
pub(crate) fn clip_polygons<'a, 's>(region: &'a dyn RegionDelegate<'s>) -> Cow<'a, [WithProperties<Polygon>]> {
    if region.is_merged() {
        region.shapes()
    } else {
        Cow::Owned(merge_polygons(&region.shapes(), &region.flags().merge_options(), None))
    }
}

/// Result of a boolean with an empty operand, unless strict handling is requested.
pub(crate) fn boolean_shortcut<'s, A>(a: &A, b: &dyn EdgesDelegate<'s>, op: BooleanOp) -> Option<EdgesBox<'s>>
where
    A: EdgesDelegate<'s> + ?Sized,
{
    let flags = *a.flags();
    if flags.strict_handling {
        return None;
    }
    let empty = || -> EdgesBox<'s> { Box::new(EmptyEdges::with_flags(flags)) };
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

pub(crate) fn flat_boolean<'s, A>(a: &A, b: &dyn EdgesDelegate<'s>, op: BooleanOp) -> EdgesBox<'s>
where
    A: EdgesDelegate<'s> + ?Sized,
{
    if let Some(r) = boolean_shortcut(a, b, op) {
        return r;
    }
    FlatEdges::boxed(boolean_edges(&a.shapes(), &b.shapes(), op), false)
}
