use std::{borrow::Cow, cell::OnceCell};

use super::{
    FlatRegion, RegionBox, RegionDelegate, RegionFlags,
    delegate::{boolean_shortcut, flat_boolean, masked},
};
use crate::{
    DelegateKind,
    boolean::{BooleanOp, MergeOptions, boolean_polygons, merge_polygons, size_polygons},
    deep::{
        DeepLayer, Decomposition,
        ops::{bbox, concat_layers, counts, flatten, insert_hierarchy, run_cells},
    },
    drc::{CheckScope, EdgeRelation, RegionCheckOptions, region_check},
    edge_pairs::{DeepEdgePairs, EdgePairsBox},
    edges::{DeepEdges, EdgesBox},
    errors::RegionResult,
    geom::{BBox, Coord, Edge, EdgePair, Polygon},
    layout::{CellIndex, LayerIndex, Layout},
    plugins::{
        PolygonFilter, PolygonProcessor, PolygonToEdgePairProcessor, PolygonToEdgeProcessor,
        TransformClass, process_all,
    },
    properties::WithProperties,
    scan::{CountBounds, InteractionMode, pull_polygons, select_polygons},
};

fn merge_layer<'s>(layer: &DeepLayer<'s>, options: MergeOptions) -> DeepLayer<'s> {
    run_cells::<Polygon, Polygon, _>(
        &[layer],
        Decomposition::non_local(0, TransformClass::Invariant),
        |c| merge_polygons(&c.concat(), &options, None),
    )
}

/// Polygons held in a deep shape store layer.
#[derive(Debug, Clone)]
pub struct DeepRegion<'s> {
    layer: DeepLayer<'s>,
    flags: RegionFlags,
    merged: bool,
    merged_layer: OnceCell<DeepLayer<'s>>,
}

impl<'s> DeepRegion<'s> {
    pub fn new(layer: DeepLayer<'s>) -> Self {
        DeepRegion {
            layer,
            flags: RegionFlags::new(),
            merged: false,
            merged_layer: OnceCell::new(),
        }
    }

    pub(crate) fn boxed(layer: DeepLayer<'s>, flags: RegionFlags, merged: bool) -> RegionBox<'s> {
        Box::new(DeepRegion {
            layer,
            flags,
            merged,
            merged_layer: OnceCell::new(),
        })
    }

    pub fn layer(&self) -> &DeepLayer<'s> {
        &self.layer
    }

    /// The merged polygons, computed once.
    fn merged_layer(&self) -> &DeepLayer<'s> {
        if self.merged {
            return &self.layer;
        }
        self.merged_layer
            .get_or_init(|| merge_layer(&self.layer, self.flags.merge_options()))
    }

    fn effective_layer(&self) -> &DeepLayer<'s> {
        if self.flags.merged_semantics {
            self.merged_layer()
        } else {
            &self.layer
        }
    }

    fn compatible_raw<'a>(&self, other: &'a dyn RegionDelegate<'s>) -> Option<&'a DeepLayer<'s>> {
        other.deep_layer().filter(|l| self.layer.is_compatible(l))
    }

    fn compatible_effective(&self, other: &dyn RegionDelegate<'s>) -> Option<DeepLayer<'s>> {
        other
            .deep_effective_layer()
            .filter(|l| self.layer.is_compatible(l))
    }

    fn deep_boolean(&self, other: &dyn RegionDelegate<'s>, op: BooleanOp) -> Option<RegionBox<'s>> {
        let other_layer = self.compatible_raw(other)?;
        let min_coherence = self.flags.min_coherence;
        let result = run_cells::<Polygon, Polygon, _>(
            &[&self.layer, other_layer],
            Decomposition::non_local(0, TransformClass::Invariant),
            |c| boolean_polygons(&c[0], &c[1], op, min_coherence, None),
        );
        Some(DeepRegion::boxed(result, self.flags, false))
    }

    fn boolean(&self, other: &dyn RegionDelegate<'s>, op: BooleanOp) -> RegionBox<'s> {
        boolean_shortcut(self, other, op)
            .or_else(|| self.deep_boolean(other, op))
            .unwrap_or_else(|| flat_boolean(self, other, op))
    }

    fn input_layer(&self, raw: bool) -> &DeepLayer<'s> {
        if raw { &self.layer } else { self.effective_layer() }
    }
}

impl<'s> RegionDelegate<'s> for DeepRegion<'s> {
    fn kind(&self) -> DelegateKind {
        DelegateKind::Deep
    }

    fn clone_delegate(&self) -> RegionBox<'s> {
        Box::new(self.clone())
    }

    fn flags(&self) -> &RegionFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut RegionFlags {
        &mut self.flags
    }

    fn iter(&self) -> Box<dyn Iterator<Item = WithProperties<Polygon>> + '_> {
        Box::new(flatten::<Polygon>(&self.layer).into_iter())
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

    fn effective_shapes(&self) -> Cow<'_, [WithProperties<Polygon>]> {
        Cow::Owned(flatten(self.effective_layer()))
    }

    fn is_empty(&self) -> bool {
        self.hier_count() == 0
    }

    fn count(&self) -> usize {
        counts::<Polygon>(&self.layer).0
    }

    fn hier_count(&self) -> usize {
        counts::<Polygon>(&self.layer).1
    }

    fn bbox(&self) -> BBox {
        bbox::<Polygon>(&self.layer)
    }

    fn merged(&self, min_coherence: bool, min_wc: u32) -> RegionBox<'s> {
        let options = MergeOptions {
            min_coherence,
            min_wc,
            ..self.flags.merge_options()
        };
        if options == self.flags.merge_options() {
            return DeepRegion::boxed(self.merged_layer().clone(), self.flags, true);
        }
        DeepRegion::boxed(merge_layer(&self.layer, options), self.flags, true)
    }

    fn and_with(&self, other: &dyn RegionDelegate<'s>) -> RegionBox<'s> {
        self.boolean(other, BooleanOp::And)
    }

    fn or_with(&self, other: &dyn RegionDelegate<'s>) -> RegionBox<'s> {
        self.boolean(other, BooleanOp::Or)
    }

    fn xor_with(&self, other: &dyn RegionDelegate<'s>) -> RegionBox<'s> {
        self.boolean(other, BooleanOp::Xor)
    }

    fn not_with(&self, other: &dyn RegionDelegate<'s>) -> RegionBox<'s> {
        self.boolean(other, BooleanOp::Not)
    }

    fn andnot_with(&self, other: &dyn RegionDelegate<'s>) -> (RegionBox<'s>, RegionBox<'s>) {
        if self.compatible_raw(other).is_some() {
            (self.and_with(other), self.not_with(other))
        } else {
            FlatRegion::new(self.shapes().into_owned(), self.flags).andnot_with(other)
        }
    }

    fn add_with(&self, other: &dyn RegionDelegate<'s>) -> RegionBox<'s> {
        match self.compatible_raw(other) {
            Some(o) => DeepRegion::boxed(concat_layers::<Polygon>(&self.layer, o), self.flags, false),
            None => {
                let mut shapes = self.shapes().into_owned();
                shapes.extend(other.iter());
                FlatRegion::boxed(shapes, self.flags, false)
            }
        }
    }

    fn filtered(&self, filter: &dyn PolygonFilter) -> RegionBox<'s> {
        let raw = filter.requires_raw_input();
        let result = run_cells::<Polygon, Polygon, _>(
            &[self.input_layer(raw)],
            Decomposition::local(filter.reducer(), filter.wants_variants()),
            |c| {
                c.concat()
                    .into_iter()
                    .filter(|p| filter.selected(&p.shape, p.prop_id))
                    .collect()
            },
        );
        let merged = !raw && (self.flags.merged_semantics || self.merged);
        DeepRegion::boxed(result, self.flags, merged)
    }

    fn processed(&self, processor: &PolygonProcessor) -> RegionBox<'s> {
        let result = run_cells::<Polygon, Polygon, _>(
            &[self.input_layer(processor.requires_raw_input())],
            Decomposition::local(processor.reducer(), processor.wants_variants()),
            |c| process_all(&c.concat(), processor),
        );
        DeepRegion::boxed(result, self.flags, processor.result_is_merged())
    }

    fn processed_to_edges(&self, processor: &PolygonToEdgeProcessor) -> EdgesBox<'s> {
        let result = run_cells::<Polygon, Edge, _>(
            &[self.input_layer(processor.requires_raw_input())],
            Decomposition::local(processor.reducer(), processor.wants_variants()),
            |c| process_all(&c.concat(), processor),
        );
        DeepEdges::boxed(result, processor.result_is_merged())
    }

    fn processed_to_edge_pairs(&self, processor: &PolygonToEdgePairProcessor) -> EdgePairsBox<'s> {
        let result = run_cells::<Polygon, EdgePair, _>(
            &[self.input_layer(processor.requires_raw_input())],
            Decomposition::local(processor.reducer(), processor.wants_variants()),
            |c| process_all(&c.concat(), processor),
        );
        DeepEdgePairs::boxed(result)
    }

    fn sized(&self, d: Coord) -> RegionBox<'s> {
        let min_coherence = self.flags.min_coherence;
        let result = run_cells::<Polygon, Polygon, _>(
            &[self.effective_layer()],
            Decomposition::non_local(d.saturating_abs(), TransformClass::ScaleOnly),
            |c| size_polygons(&c.concat(), d, min_coherence, None),
        );
        DeepRegion::boxed(result, self.flags, true)
    }

    fn check(
        &self,
        relation: EdgeRelation,
        other: Option<&dyn RegionDelegate<'s>>,
        scope: CheckScope,
        d: Coord,
        options: &RegionCheckOptions,
    ) -> EdgePairsBox<'s> {
        let mode = Decomposition::non_local(d, TransformClass::ScaleAndOrientation);
        let subjects = self.effective_layer();
        let result = match other {
            Some(o) if relation.is_two_layer() => {
                let Some(other_layer) = self.compatible_effective(o) else {
                    let subjects = self.effective_shapes();
                    let others = o.effective_shapes();
                    return crate::edge_pairs::FlatEdgePairs::boxed(region_check(
                        &subjects,
                        Some(&others),
                        relation,
                        scope,
                        d,
                        options,
                    ));
                };
                run_cells::<Polygon, EdgePair, _>(&[subjects, &other_layer], mode, |c| {
                    region_check(&c[0], Some(&c[1]), relation, scope, d, options)
                })
            }
            _ => run_cells::<Polygon, EdgePair, _>(&[subjects], mode, |c| {
                region_check(&c[0], None, relation, scope, d, options)
            }),
        };
        DeepEdgePairs::boxed(result)
    }

    fn selected_interacting(
        &self,
        other: &dyn RegionDelegate<'s>,
        mode: InteractionMode,
        bounds: CountBounds,
        inverse: bool,
    ) -> RegionBox<'s> {
        let merged = self.flags.merged_semantics || self.merged;
        let Some(other_layer) = self.compatible_effective(other) else {
            let subjects = self.effective_shapes();
            let others = other.effective_shapes();
            let mask = select_polygons(
                &subjects.iter().map(|p| &p.shape).collect::<Vec<_>>(),
                &others.iter().map(|p| &p.shape).collect::<Vec<_>>(),
                mode,
                bounds,
                inverse,
            );
            return FlatRegion::boxed(masked(&subjects, &mask), self.flags, merged);
        };
        let result = run_cells::<Polygon, Polygon, _>(
            &[self.effective_layer(), &other_layer],
            Decomposition::non_local(0, TransformClass::Invariant),
            |c| {
                let mask = select_polygons(
                    &c[0].iter().map(|p| &p.shape).collect::<Vec<_>>(),
                    &c[1].iter().map(|p| &p.shape).collect::<Vec<_>>(),
                    mode,
                    bounds,
                    inverse,
                );
                masked(&c[0], &mask)
            },
        );
        DeepRegion::boxed(result, self.flags, merged)
    }

    fn pull_interacting(&self, other: &dyn RegionDelegate<'s>, mode: InteractionMode) -> RegionBox<'s> {
        let merged = other.flags().merged_semantics || other.is_merged();
        let Some(other_layer) = self.compatible_effective(other) else {
            let subjects = self.effective_shapes();
            let others = other.effective_shapes();
            let mask = pull_polygons(
                &subjects.iter().map(|p| &p.shape).collect::<Vec<_>>(),
                &others.iter().map(|p| &p.shape).collect::<Vec<_>>(),
                mode,
            );
            return FlatRegion::boxed(masked(&others, &mask), self.flags, merged);
        };
        let result = run_cells::<Polygon, Polygon, _>(
            &[self.effective_layer(), &other_layer],
            Decomposition::non_local(0, TransformClass::Invariant),
            |c| {
                let mask = pull_polygons(
                    &c[0].iter().map(|p| &p.shape).collect::<Vec<_>>(),
                    &c[1].iter().map(|p| &p.shape).collect::<Vec<_>>(),
                    mode,
                );
                masked(&c[1], &mask)
            },
        );
        DeepRegion::boxed(result, self.flags, merged)
    }

    fn insert_into(&self, layout: &mut Layout, cell: CellIndex, layer: LayerIndex) -> RegionResult<()> {
        insert_hierarchy::<Polygon>(&self.layer, layout, cell, layer)
    }
}
