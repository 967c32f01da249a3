//! Error type for the few usage errors that cannot be ruled out by construction.

use crate::layout::{CellIndex, LayerIndex};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegionError {
    /// A cell index does not exist in the layout it was used with.
    #[error("cell index {0:?} does not exist in the target layout")]
    UnknownCell(CellIndex),
    /// A layer index does not exist in the layout it was used with.
    #[error("layer index {0:?} does not exist in the target layout")]
    UnknownLayer(LayerIndex),
    /// A layout index does not exist in the deep shape store.
    #[error("layout index {0} does not exist in the deep shape store")]
    UnknownLayout(usize),
    /// A store with more or less than one layout was used where a singular store is required.
    #[error("deep shape store holds {0} layouts, expected exactly one")]
    NotSingular(usize),
    /// The hierarchy contains an instance cycle.
    #[error("recursive instantiation of cell {0:?}")]
    RecursiveHierarchy(CellIndex),
}

pub type RegionResult<T> = Result<T, RegionError>;
