use std::borrow::Cow;

use super::{EdgePairsBox, EdgePairsDelegate};
use crate::{
    DelegateKind,
    geom::{BBox, EdgePair},
    plugins::EdgePairFilter,
    properties::WithProperties,
};

/// Edge pairs held in a plain list.
#[derive(Debug, Clone, Default)]
pub struct FlatEdgePairs {
    shapes: Vec<WithProperties<EdgePair>>,
}

impl FlatEdgePairs {
    pub fn new(shapes: Vec<WithProperties<EdgePair>>) -> Self {
        FlatEdgePairs { shapes }
    }

    pub(crate) fn boxed<'s>(shapes: Vec<WithProperties<EdgePair>>) -> EdgePairsBox<'s> {
        Box::new(FlatEdgePairs { shapes })
    }

    pub fn insert(&mut self, edge_pair: WithProperties<EdgePair>) {
        self.shapes.push(edge_pair);
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }
}

impl<'s> EdgePairsDelegate<'s> for FlatEdgePairs {
    fn kind(&self) -> DelegateKind {
        DelegateKind::Flat
    }

    fn clone_delegate(&self) -> EdgePairsBox<'s> {
        Box::new(self.clone())
    }

    fn iter(&self) -> Box<dyn Iterator<Item = WithProperties<EdgePair>> + '_> {
        Box::new(self.shapes.iter().cloned())
    }

    fn as_flat_mut(&mut self) -> Option<&mut FlatEdgePairs> {
        Some(self)
    }

    fn shapes(&self) -> Cow<'_, [WithProperties<EdgePair>]> {
        Cow::Borrowed(&self.shapes)
    }

    fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    fn count(&self) -> usize {
        self.shapes.len()
    }

    fn bbox(&self) -> BBox {
        self.shapes
            .iter()
            .fold(BBox::empty(), |b, e| b.union(&e.shape.bbox()))
    }

    fn filter_in_place(mut self: Box<Self>, filter: &dyn EdgePairFilter) -> EdgePairsBox<'s> {
        self.shapes.retain(|e| filter.selected(&e.shape, e.prop_id));
        self
    }

    fn add_in_place(mut self: Box<Self>, other: &dyn EdgePairsDelegate<'s>) -> EdgePairsBox<'s> {
        self.shapes.extend(other.iter());
        self
    }
}
