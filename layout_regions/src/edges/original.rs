use super::{EdgesBox, EdgesDelegate, EdgesFlags};
use crate::{
    DelegateKind,
    geom::Edge,
    layout::RecursiveShapeIterator,
    properties::WithProperties,
};

/// Read only view of the edges delivered by a hierarchy iterator.
#[derive(Debug, Clone)]
pub struct OriginalLayerEdges<'s> {
    iter: RecursiveShapeIterator<'s>,
    flags: EdgesFlags,
}

impl<'s> OriginalLayerEdges<'s> {
    pub fn new(iter: RecursiveShapeIterator<'s>) -> Self {
        OriginalLayerEdges {
            iter,
            flags: EdgesFlags::new(),
        }
    }
}

impl<'s> EdgesDelegate<'s> for OriginalLayerEdges<'s> {
    fn kind(&self) -> DelegateKind {
        DelegateKind::OriginalLayer
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
        Box::new(self.iter.shapes::<Edge>().map(|s| s.to_owned_shape()))
    }
}
