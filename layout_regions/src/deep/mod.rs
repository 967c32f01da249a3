//! Hierarchical ("deep") shape storage and processing.
//!
//! A [DeepShapeStore] keeps a copy of the cell tree of each source layout. Deep collections refer
//! to one layer of such a tree through a [DeepLayer] and run their operations cell by cell: every
//! cell is computed once per distinct placement class (as told by the operation's
//! [TransformClass](crate::plugins::TransformClass)) and the results go into a new layer with the
//! same instance structure. Cells whose placements need different results are either duplicated
//! into variants or their shapes are propagated into the parent cells. Operations that look
//! beyond single shapes (merge, booleans, checks, interactions) additionally flatten cells whose
//! placements are not isolated from their surroundings.

mod hier;
pub(crate) mod ops;
mod store;

pub(crate) use hier::Decomposition;
pub use store::{DeepLayer, DeepShapeStore};
