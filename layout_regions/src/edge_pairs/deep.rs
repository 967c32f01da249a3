use super::{EdgePairsBox, EdgePairsDelegate, FlatEdgePairs};
use crate::{
    DelegateKind,
    deep::{
        DeepLayer, Decomposition,
        ops::{bbox, concat_layers, counts, flatten, insert_hierarchy, run_cells},
    },
    edges::{DeepEdges, EdgesBox},
    errors::RegionResult,
    geom::{BBox, Edge, EdgePair, Polygon},
    layout::{CellIndex, LayerIndex, Layout},
    plugins::{
        EdgePairFilter, EdgePairProcessor, EdgePairToEdgeProcessor, EdgePairToPolygonProcessor,
        process_all,
    },
    properties::WithProperties,
    region::{DeepRegion, RegionBox, RegionFlags},
};

/// Edge pairs held in a deep shape store layer.
#[derive(Debug, Clone)]
pub struct DeepEdgePairs<'s> {
    layer: DeepLayer<'s>,
}

impl<'s> DeepEdgePairs<'s> {
    pub fn new(layer: DeepLayer<'s>) -> Self {
        DeepEdgePairs { layer }
    }

    pub(crate) fn boxed(layer: DeepLayer<'s>) -> EdgePairsBox<'s> {
        Box::new(DeepEdgePairs { layer })
    }

    pub fn layer(&self) -> &DeepLayer<'s> {
        &self.layer
    }
}

impl<'s> EdgePairsDelegate<'s> for DeepEdgePairs<'s> {
    fn kind(&self) -> DelegateKind {
        DelegateKind::Deep
    }

    fn clone_delegate(&self) -> EdgePairsBox<'s> {
        Box::new(self.clone())
    }

    fn iter(&self) -> Box<dyn Iterator<Item = WithProperties<EdgePair>> + '_> {
        Box::new(flatten::<EdgePair>(&self.layer).into_iter())
    }

    fn deep_layer(&self) -> Option<&DeepLayer<'s>> {
        Some(&self.layer)
    }

    fn is_empty(&self) -> bool {
        self.hier_count() == 0
    }

    fn count(&self) -> usize {
        counts::<EdgePair>(&self.layer).0
    }

    fn hier_count(&self) -> usize {
        counts::<EdgePair>(&self.layer).1
    }

    fn bbox(&self) -> BBox {
        bbox::<EdgePair>(&self.layer)
    }

    fn filtered(&self, filter: &dyn EdgePairFilter) -> EdgePairsBox<'s> {
        let result = run_cells::<EdgePair, EdgePair, _>(
            &[&self.layer],
            Decomposition::local(filter.reducer(), filter.wants_variants()),
            |c| {
                c.concat()
                    .into_iter()
                    .filter(|e| filter.selected(&e.shape, e.prop_id))
                    .collect()
            },
        );
        DeepEdgePairs::boxed(result)
    }

    fn processed(&self, processor: &EdgePairProcessor) -> EdgePairsBox<'s> {
        let result = run_cells::<EdgePair, EdgePair, _>(
            &[&self.layer],
            Decomposition::local(processor.reducer(), processor.wants_variants()),
            |c| process_all(&c.concat(), processor),
        );
        DeepEdgePairs::boxed(result)
    }

    fn processed_to_polygons(&self, processor: &EdgePairToPolygonProcessor) -> RegionBox<'s> {
        let result = run_cells::<EdgePair, Polygon, _>(
            &[&self.layer],
            Decomposition::local(processor.reducer(), processor.wants_variants()),
            |c| process_all(&c.concat(), processor),
        );
        DeepRegion::boxed(result, RegionFlags::new(), processor.result_is_merged())
    }

    fn processed_to_edges(&self, processor: &EdgePairToEdgeProcessor) -> EdgesBox<'s> {
        let result = run_cells::<EdgePair, Edge, _>(
            &[&self.layer],
            Decomposition::local(processor.reducer(), processor.wants_variants()),
            |c| process_all(&c.concat(), processor),
        );
        DeepEdges::boxed(result, processor.result_is_merged())
    }

    fn add_with(&self, other: &dyn EdgePairsDelegate<'s>) -> EdgePairsBox<'s> {
        match other.deep_layer().filter(|l| self.layer.is_compatible(l)) {
            Some(o) => DeepEdgePairs::boxed(concat_layers::<EdgePair>(&self.layer, o)),
            None => {
                let mut shapes = self.shapes().into_owned();
                shapes.extend(other.iter());
                FlatEdgePairs::boxed(shapes)
            }
        }
    }

    fn insert_into(&self, layout: &mut Layout, cell: CellIndex, layer: LayerIndex) -> RegionResult<()> {
        insert_hierarchy::<EdgePair>(&self.layer, layout, cell, layer)
    }
}
