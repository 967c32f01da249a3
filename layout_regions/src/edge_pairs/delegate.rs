use std::{borrow::Cow, fmt};

use super::FlatEdgePairs;
use crate::{
    DelegateKind,
    deep::DeepLayer,
    edges::{EdgesBox, FlatEdges},
    errors::RegionResult,
    geom::{BBox, EdgePair},
    layout::{CellIndex, LayerIndex, Layout},
    plugins::{
        EdgePairFilter, EdgePairProcessor, EdgePairToEdgeProcessor, EdgePairToPolygonProcessor,
        process_all,
    },
    properties::WithProperties,
    region::{FlatRegion, RegionBox, RegionFlags},
};

/// Owned edge pair delegate.
pub type EdgePairsBox<'s> = Box<dyn EdgePairsDelegate<'s> + 's>;

/// Storage strategy behind [EdgePairs](crate::EdgePairs). Edge pairs are never merged, so there
/// are no flags and no merged view.
pub trait EdgePairsDelegate<'s>: fmt::Debug {
    fn kind(&self) -> DelegateKind;

    fn clone_delegate(&self) -> EdgePairsBox<'s>;

    fn iter(&self) -> Box<dyn Iterator<Item = WithProperties<EdgePair>> + '_>;

    fn deep_layer(&self) -> Option<&DeepLayer<'s>> {
        None
    }

    fn as_flat_mut(&mut self) -> Option<&mut FlatEdgePairs> {
        None
    }

    fn shapes(&self) -> Cow<'_, [WithProperties<EdgePair>]> {
        Cow::Owned(self.iter().collect())
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

    fn filtered(&self, filter: &dyn EdgePairFilter) -> EdgePairsBox<'s> {
        FlatEdgePairs::boxed(
            self.iter()
                .filter(|e| filter.selected(&e.shape, e.prop_id))
                .collect(),
        )
    }

    fn filter_in_place(self: Box<Self>, filter: &dyn EdgePairFilter) -> EdgePairsBox<'s> {
        self.filtered(filter)
    }

    fn processed(&self, processor: &EdgePairProcessor) -> EdgePairsBox<'s> {
        FlatEdgePairs::boxed(process_all(&self.shapes(), processor))
    }

    fn processed_to_polygons(&self, processor: &EdgePairToPolygonProcessor) -> RegionBox<'s> {
        FlatRegion::boxed(
            process_all(&self.shapes(), processor),
            RegionFlags::new(),
            processor.result_is_merged(),
        )
    }

    fn processed_to_edges(&self, processor: &EdgePairToEdgeProcessor) -> EdgesBox<'s> {
        FlatEdges::boxed(process_all(&self.shapes(), processor), processor.result_is_merged())
    }

    fn add_with(&self, other: &dyn EdgePairsDelegate<'s>) -> EdgePairsBox<'s> {
        let mut shapes = self.shapes().into_owned();
        shapes.extend(other.iter());
        FlatEdgePairs::boxed(shapes)
    }

    fn add_in_place(self: Box<Self>, other: &dyn EdgePairsDelegate<'s>) -> EdgePairsBox<'s> {
        self.add_with(other)
    }

    fn insert_into(&self, layout: &mut Layout, cell: CellIndex, layer: LayerIndex) -> RegionResult<()> {
        layout.check_cell(cell)?;
        layout.check_layer(layer)?;
        layout
            .cell_mut(cell)
            .shapes_mut(layer)
            .edge_pairs
            .extend(self.iter());
        Ok(())
    }
}
