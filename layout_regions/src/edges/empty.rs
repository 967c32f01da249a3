use super::{EdgesBox, EdgesDelegate, EdgesFlags};
use crate::{DelegateKind, geom::Edge, properties::WithProperties};

/// Delegate of an edge collection without edges.
#[derive(Debug, Clone, Default)]
pub struct EmptyEdges {
    flags: EdgesFlags,
}

impl EmptyEdges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flags(flags: EdgesFlags) -> Self {
        EmptyEdges { flags }
    }
}

impl<'s> EdgesDelegate<'s> for EmptyEdges {
    fn kind(&self) -> DelegateKind {
        DelegateKind::Empty
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
        Box::new(std::iter::empty())
    }

    fn is_merged(&self) -> bool {
        true
    }

    fn is_empty(&self) -> bool {
        true
    }

    fn count(&self) -> usize {
        0
    }
}
