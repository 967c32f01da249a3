//! Shape collections for integrated circuit layout processing.
//!
//! The crate provides three collection kinds, [Region] (polygons), [Edges] and [EdgePairs], each
//! backed by an interchangeable storage strategy: a flat list, a reference to an original layout
//! layer, or a deep representation held in a [DeepShapeStore] that reuses the cell hierarchy of a
//! layout. On top of them sit boolean operations and merging, DRC checks, interaction queries,
//! and a plugin framework for filters and processors.
//!
//! # Examples
//!
//! ```
//! use layout_regions::prelude::*;
//!
//! let a = Region::from_iter([Polygon::from_box(BBox::new(0, 0, 100, 100))]);
//! let b = Region::from_iter([Polygon::from_box(BBox::new(50, 50, 150, 150))]);
//!
//! let both = &a & &b;
//! assert_eq!(both.area(), 2500);
//! let union = &a | &b;
//! assert_eq!(union.count(), 1);
//! assert_eq!(union.area(), 17500);
//! ```
#[macro_use]
pub mod core;
#[macro_use]
mod macros;

pub mod boolean;
pub mod deep;
pub mod drc;
pub mod edge_pairs;
pub mod edges;
pub mod errors;
pub mod geom;
pub mod layout;
pub mod plugins;
pub mod progress;
pub mod properties;
pub mod region;
pub mod scan;

pub use crate::deep::DeepShapeStore;
pub use crate::edge_pairs::EdgePairs;
pub use crate::edges::Edges;
pub use crate::errors::{RegionError, RegionResult};
pub use crate::region::Region;

/// Delegate kind of a shape collection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DelegateKind {
    /// No shapes at all.
    Empty,
    /// Materialized flat list of shapes.
    Flat,
    /// Reference to a layer of an original layout (read-only).
    OriginalLayer,
    /// Hierarchical representation inside a deep shape store.
    Deep,
}

/// Commonly used types.
pub mod prelude {
    pub use crate::drc::{EdgesCheckOptions, Metrics, OppositeFilter, RectFilter, RegionCheckOptions};
    pub use crate::geom::*;
    pub use crate::layout::{CellIndex, LayerIndex, Layout, RecursiveShapeIterator};
    pub use crate::plugins::{EdgeFilter, EdgePairFilter, PolygonFilter, ShapeProcessor, TransformClass};
    pub use crate::properties::{PropertiesId, WithProperties};
    pub use crate::{DeepShapeStore, DelegateKind, EdgePairs, Edges, Region};
}
