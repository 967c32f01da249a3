use std::{borrow::Cow, cell::OnceCell};

use super::{
    EdgesBox, EdgesDelegate, EdgesFlags, FlatEdges,
    delegate::{boolean_shortcut, clip_polygons, flat_boolean},
};
use crate::{
    DelegateKind,
    boolean::{BooleanOp, EdgeClipper, EdgeRegionMode, boolean_edges, edge_intersections, merge_edges},
    deep::{
        DeepLayer, Decomposition,
        ops::{bbox, concat_layers, counts, flatten, insert_hierarchy, run_cells, run_cells2},
    },
    drc::{EdgeRelation, EdgesCheckOptions, edges_check},
    edge_pairs::{DeepEdgePairs, EdgePairsBox},
    errors::RegionResult,
    geom::{BBox, Coord, Edge, EdgePair, Polygon},
    layout::{CellIndex, LayerIndex, Layout},
    plugins::{EdgeFilter, EdgeProcessor, EdgeToPolygonProcessor, TransformClass, process_all},
    properties::WithProperties,
    region::{DeepRegion, RegionBox, RegionDelegate, RegionFlags},
    scan::extended_edges,
};

/// Edges held in a deep shape store layer.
#[derive(Debug, Clone)]
pub struct DeepEdges<'s> {
    layer: DeepLayer<'s>,
    flags: EdgesFlags,
    merged: bool,
    merged_layer: OnceCell<DeepLayer<'s>>,
}

impl<'s> DeepEdges<'s> {
    pub fn new(layer: DeepLayer<'s>) -> Self {
        DeepEdges {
            layer,
            flags: EdgesFlags::new(),
            merged: false,
            merged_layer: OnceCell::new(),
        }
    }

    pub(crate) fn boxed(layer: DeepLayer<'s>, merged: bool) -> EdgesBox<'s> {
        Box::new(DeepEdges {
            layer,
            flags: EdgesFlags::new(),
            merged,
            merged_layer: OnceCell::new(),
        })
    }

    pub fn layer(&self) -> &DeepLayer<'s> {
        &self.layer
    }

    fn merged_layer(&self) -> &DeepLayer<'s> {
        if self.merged {
            return &self.layer;
        }
        self.merged_layer.get_or_init(|| {
            run_cells::<Edge, Edge, _>(
                &[&self.layer],
                Decomposition::non_local(0, TransformClass::Invariant),
                |c| merge_edges(&c.concat()),
            )
        })
    }

    fn effective_layer(&self) -> &DeepLayer<'s> {
        if self.flags.merged_semantics {
            self.merged_layer()
        } else {
            &self.layer
        }
    }

    fn input_layer(&self, raw: bool) -> &DeepLayer<'s> {
        if raw { &self.layer } else { self.effective_layer() }
    }

    fn compatible_raw<'a>(&self, other: &'a dyn EdgesDelegate<'s>) -> Option<&'a DeepLayer<'s>> {
        other.deep_layer().filter(|l| self.layer.is_compatible(l))
    }

    fn compatible_region(&self, region: &dyn RegionDelegate<'s>) -> Option<DeepLayer<'s>> {
        if region.is_merged() {
            return region.deep_layer().filter(|l| self.layer.is_compatible(l)).cloned();
        }
        if !region.flags().merged_semantics {
            return None;
        }
        region
            .deep_effective_layer()
            .filter(|l| self.layer.is_compatible(l))
    }

    fn boolean(&self, other: &dyn EdgesDelegate<'s>, op: BooleanOp) -> EdgesBox<'s> {
        if let Some(r) = boolean_shortcut(self, other, op) {
            return r;
        }
        match self.compatible_raw(other) {
            Some(o) => {
                let result = run_cells::<Edge, Edge, _>(
                    &[&self.layer, o],
                    Decomposition::non_local(0, TransformClass::Invariant),
                    |c| boolean_edges(&c[0], &c[1], op),
                );
                DeepEdges::boxed(result, false)
            }
            None => flat_boolean(self, other, op),
        }
    }

    fn deep_clip(&self, region: &DeepLayer<'s>, mode: EdgeRegionMode) -> DeepLayer<'s> {
        run_cells2::<Edge, Polygon, Edge, _>(
            self.effective_layer(),
            region,
            Decomposition::non_local(0, TransformClass::Invariant),
            |edges, polygons| {
                if edges.is_empty() {
                    return Vec::new();
                }
                EdgeClipper::new(polygons.iter().map(|p| &p.shape)).clip(&edges, mode)
            },
        )
    }

    fn clip_or_flat(&self, region: &dyn RegionDelegate<'s>, mode: EdgeRegionMode) -> EdgesBox<'s> {
        match self.compatible_region(region) {
            Some(r) => DeepEdges::boxed(self.deep_clip(&r, mode), false),
            None => {
                let polygons = clip_polygons(region);
                let clipper = EdgeClipper::new(polygons.iter().map(|p| &p.shape));
                FlatEdges::boxed(clipper.clip(&self.effective_shapes(), mode), false)
            }
        }
    }
}

impl<'s> EdgesDelegate<'s> for DeepEdges<'s> {
    fn kind(&self) -> DelegateKind {
        DelegateKind::Deep
    }

    fn clone_delegate(&self) -> EdgesBox<'s> {
        Box::new(self.clone())
    }

    fn flags(&self) -> &EdgesFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut EdgesFlags {
        &mut self.flags
    }

    fn iter(&self) -> Box<dyn Iterator<Item = WithProperties<Edge>> + '_> {
        Box::new(flatten::<Edge>(&self.layer).into_iter())
    }

    fn deep_layer(&self) -> Option<&DeepLayer<'s>> {
        Some(&self.layer)
    }

    fn deep_effective_layer(&self) -> Option<DeepLayer<'s>> {
        Some(self.effective_layer().clone())
    }

    fn is_merged(&self) -> bool {
        self.merged
    }

    fn effective_shapes(&self) -> Cow<'_, [WithProperties<Edge>]> {
        Cow::Owned(flatten(self.effective_layer()))
    }

    fn is_empty(&self) -> bool {
        self.hier_count() == 0
    }

    fn count(&self) -> usize {
        counts::<Edge>(&self.layer).0
    }

    fn hier_count(&self) -> usize {
        counts::<Edge>(&self.layer).1
    }

    fn bbox(&self) -> BBox {
        bbox::<Edge>(&self.layer)
    }

    fn merged(&self) -> EdgesBox<'s> {
        DeepEdges::boxed(self.merged_layer().clone(), true)
    }

    fn and_with(&self, other: &dyn EdgesDelegate<'s>) -> EdgesBox<'s> {
        self.boolean(other, BooleanOp::And)
    }

    fn or_with(&self, other: &dyn EdgesDelegate<'s>) -> EdgesBox<'s> {
        self.boolean(other, BooleanOp::Or)
    }

    fn xor_with(&self, other: &dyn EdgesDelegate<'s>) -> EdgesBox<'s> {
        self.boolean(other, BooleanOp::Xor)
    }

    fn not_with(&self, other: &dyn EdgesDelegate<'s>) -> EdgesBox<'s> {
        self.boolean(other, BooleanOp::Not)
    }

    fn intersections(&self, other: &dyn EdgesDelegate<'s>) -> EdgesBox<'s> {
        match self.compatible_raw(other) {
            Some(o) => {
                let result = run_cells::<Edge, Edge, _>(
                    &[&self.layer, o],
                    Decomposition::non_local(0, TransformClass::Invariant),
                    |c| edge_intersections(&c[0], &c[1]),
                );
                DeepEdges::boxed(result, false)
            }
            None => FlatEdges::boxed(edge_intersections(&self.shapes(), &other.shapes()), false),
        }
    }

    fn add_with(&self, other: &dyn EdgesDelegate<'s>) -> EdgesBox<'s> {
        match self.compatible_raw(other) {
            Some(o) => DeepEdges::boxed(concat_layers::<Edge>(&self.layer, o), false),
            None => {
                let mut shapes = self.shapes().into_owned();
                shapes.extend(other.iter());
                FlatEdges::boxed(shapes, false)
            }
        }
    }

    fn clipped(&self, region: &dyn RegionDelegate<'s>, mode: EdgeRegionMode) -> EdgesBox<'s> {
        self.clip_or_flat(region, mode)
    }

    fn andnot_with_region(&self, region: &dyn RegionDelegate<'s>) -> (EdgesBox<'s>, EdgesBox<'s>) {
        (
            self.clip_or_flat(region, EdgeRegionMode::InsideOrBoundary),
            self.clip_or_flat(region, EdgeRegionMode::Outside),
        )
    }

    fn filtered(&self, filter: &dyn EdgeFilter) -> EdgesBox<'s> {
        let raw = filter.requires_raw_input();
        let result = run_cells::<Edge, Edge, _>(
            &[self.input_layer(raw)],
            Decomposition::local(filter.reducer(), filter.wants_variants()),
            |c| {
                c.concat()
                    .into_iter()
                    .filter(|e| filter.selected(&e.shape, e.prop_id))
                    .collect()
            },
        );
        DeepEdges::boxed(result, !raw && (self.flags.merged_semantics || self.merged))
    }

    fn processed(&self, processor: &EdgeProcessor) -> EdgesBox<'s> {
        let result = run_cells::<Edge, Edge, _>(
            &[self.input_layer(processor.requires_raw_input())],
            Decomposition::local(processor.reducer(), processor.wants_variants()),
            |c| process_all(&c.concat(), processor),
        );
        DeepEdges::boxed(result, processor.result_is_merged())
    }

    fn processed_to_polygons(&self, processor: &EdgeToPolygonProcessor) -> RegionBox<'s> {
        let result = run_cells::<Edge, Polygon, _>(
            &[self.input_layer(processor.requires_raw_input())],
            Decomposition::local(processor.reducer(), processor.wants_variants()),
            |c| process_all(&c.concat(), processor),
        );
        DeepRegion::boxed(result, RegionFlags::new(), processor.result_is_merged())
    }

    fn extended(&self, ext_b: Coord, ext_e: Coord, ext_o: Coord, ext_i: Coord, join: bool) -> RegionBox<'s> {
        let mode = if join {
            Decomposition::non_local(0, TransformClass::ScaleAndOrientation)
        } else {
            Decomposition::local(TransformClass::ScaleAndOrientation, true)
        };
        let result = run_cells::<Edge, Polygon, _>(&[self.effective_layer()], mode, |c| {
            let edges: Vec<Edge> = c.concat().into_iter().map(|e| e.shape).collect();
            extended_edges(&edges, ext_b, ext_e, ext_o, ext_i, join)
                .into_iter()
                .map(WithProperties::plain)
                .collect()
        });
        DeepRegion::boxed(result, RegionFlags::new(), false)
    }

    fn check(
        &self,
        relation: EdgeRelation,
        other: Option<&dyn EdgesDelegate<'s>>,
        d: Coord,
        options: &EdgesCheckOptions,
    ) -> EdgePairsBox<'s> {
        let mode = Decomposition::non_local(d, TransformClass::ScaleAndOrientation);
        let other_layer = match other {
            Some(o) if relation.is_two_layer() => match o
                .deep_effective_layer()
                .filter(|l| self.layer.is_compatible(l))
            {
                Some(l) => Some(l),
                None => {
                    let subjects = self.effective_shapes();
                    let others = o.effective_shapes();
                    return crate::edge_pairs::FlatEdgePairs::boxed(edges_check(
                        &subjects,
                        Some(&others),
                        relation,
                        d,
                        options,
                    ));
                }
            },
            _ => None,
        };
        let result = match &other_layer {
            Some(o) => run_cells::<Edge, EdgePair, _>(&[self.effective_layer(), o], mode, |c| {
                edges_check(&c[0], Some(&c[1]), relation, d, options)
            }),
            None => run_cells::<Edge, EdgePair, _>(&[self.effective_layer()], mode, |c| {
                edges_check(&c[0], None, relation, d, options)
            }),
        };
        DeepEdgePairs::boxed(result)
    }

    fn insert_into(&self, layout: &mut Layout, cell: CellIndex, layer: LayerIndex) -> RegionResult<()> {
        insert_hierarchy::<Edge>(&self.layer, layout, cell, layer)
    }
}
