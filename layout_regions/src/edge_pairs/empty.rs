use super::{EdgePairsBox, EdgePairsDelegate};
use crate::{DelegateKind, geom::EdgePair, properties::WithProperties};

/// Delegate of an edge pair collection without edge pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyEdgePairs;

impl<'s> EdgePairsDelegate<'s> for EmptyEdgePairs {
    fn kind(&self) -> DelegateKind {
        DelegateKind::Empty
    }

    fn clone_delegate(&self) -> EdgePairsBox<'s> {
        Box::new(*self)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = WithProperties<EdgePair>> + '_> {
        Box::new(std::iter::empty())
    }

    fn is_empty(&self) -> bool {
        true
    }

    fn count(&self) -> usize {
        0
    }
}
