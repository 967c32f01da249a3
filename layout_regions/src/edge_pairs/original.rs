use super::{EdgePairsBox, EdgePairsDelegate};
use crate::{
    DelegateKind,
    geom::EdgePair,
    layout::RecursiveShapeIterator,
    properties::WithProperties,
};

/// Read only view of the edge pairs delivered by a hierarchy iterator.
#[derive(Debug, Clone)]
pub struct OriginalLayerEdgePairs<'s> {
    iter: RecursiveShapeIterator<'s>,
}

impl<'s> OriginalLayerEdgePairs<'s> {
    pub fn new(iter: RecursiveShapeIterator<'s>) -> Self {
        OriginalLayerEdgePairs { iter }
    }
}

impl<'s> EdgePairsDelegate<'s> for OriginalLayerEdgePairs<'s> {
    fn kind(&self) -> DelegateKind {
        DelegateKind::OriginalLayer
    }

    fn clone_delegate(&self) -> EdgePairsBox<'s> {
        Box::new(self.clone())
    }

    fn iter(&self) -> Box<dyn Iterator<Item = WithProperties<EdgePair>> + '_> {
        Box::new(self.iter.shapes::<EdgePair>().map(|s| s.to_owned_shape()))
    }
}
