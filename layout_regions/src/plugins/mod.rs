//! Filter and processor plugins.
//!
//! Plugins are small strategy objects passed by reference into collection operations. Besides
//! their actual work (`selected` or `process`) they declare three hints that drive hierarchical
//! processing:
//!
//! - [PolygonFilter::reducer] etc.: the [TransformClass] the plugin is invariant under. Instances
//!   whose transformations reduce to the same value share one result.
//! - `requires_raw_input`: the plugin wants the shapes as stored instead of merged ones.
//! - `wants_variants`: in hierarchical mode prefer creating cell variants over propagating shapes
//!   into the parent cells.
//!
//! The hints are an unchecked contract. A plugin declaring an invariance it does not have
//! produces silently wrong results in hierarchical mode. The defaults are the conservative
//! answers (everything but displacement matters, merged input, variants wanted).

mod filters;
mod processors;
mod reducers;

pub use filters::*;
pub use processors::*;
pub use reducers::TransformClass;

use crate::{
    geom::{Edge, EdgePair, Polygon},
    properties::{PropertiesId, WithProperties},
};

/// Selects polygons.
pub trait PolygonFilter {
    fn selected(&self, polygon: &Polygon, prop_id: PropertiesId) -> bool;

    fn reducer(&self) -> TransformClass {
        TransformClass::default()
    }

    fn requires_raw_input(&self) -> bool {
        false
    }

    fn wants_variants(&self) -> bool {
        true
    }
}

/// Selects edges.
pub trait EdgeFilter {
    fn selected(&self, edge: &Edge, prop_id: PropertiesId) -> bool;

    fn reducer(&self) -> TransformClass {
        TransformClass::default()
    }

    fn requires_raw_input(&self) -> bool {
        false
    }

    fn wants_variants(&self) -> bool {
        true
    }
}

/// Selects edge pairs.
pub trait EdgePairFilter {
    fn selected(&self, edge_pair: &EdgePair, prop_id: PropertiesId) -> bool;

    fn reducer(&self) -> TransformClass {
        TransformClass::default()
    }

    fn wants_variants(&self) -> bool {
        true
    }
}

/// Turns one shape into any number of shapes of possibly another kind.
pub trait ShapeProcessor<In, Out> {
    /// Append the results for `shape` to `out`.
    fn process(&self, shape: &WithProperties<In>, out: &mut Vec<WithProperties<Out>>);

    fn reducer(&self) -> TransformClass {
        TransformClass::default()
    }

    fn requires_raw_input(&self) -> bool {
        false
    }

    fn wants_variants(&self) -> bool {
        true
    }

    /// The results are known to be merged already.
    fn result_is_merged(&self) -> bool {
        false
    }
}

pub type PolygonProcessor = dyn ShapeProcessor<Polygon, Polygon>;
pub type PolygonToEdgeProcessor = dyn ShapeProcessor<Polygon, Edge>;
pub type PolygonToEdgePairProcessor = dyn ShapeProcessor<Polygon, EdgePair>;
pub type EdgeProcessor = dyn ShapeProcessor<Edge, Edge>;
pub type EdgeToPolygonProcessor = dyn ShapeProcessor<Edge, Polygon>;
pub type EdgePairToPolygonProcessor = dyn ShapeProcessor<EdgePair, Polygon>;
pub type EdgePairToEdgeProcessor = dyn ShapeProcessor<EdgePair, Edge>;
pub type EdgePairProcessor = dyn ShapeProcessor<EdgePair, EdgePair>;

/// Apply a processor to a list of shapes.
pub(crate) fn process_all<In, Out, P>(
    shapes: &[WithProperties<In>],
    processor: &P,
) -> Vec<WithProperties<Out>>
where
    P: ShapeProcessor<In, Out> + ?Sized,
{
    let mut out = Vec::new();
    for s in shapes {
        processor.process(s, &mut out);
    }
    out
}

impl<F> PolygonFilter for F
where
    F: Fn(&Polygon) -> bool,
{
    fn selected(&self, polygon: &Polygon, _prop_id: PropertiesId) -> bool {
        self(polygon)
    }
}

impl<F> EdgeFilter for F
where
    F: Fn(&Edge) -> bool,
{
    fn selected(&self, edge: &Edge, _prop_id: PropertiesId) -> bool {
        self(edge)
    }
}

impl<F> EdgePairFilter for F
where
    F: Fn(&EdgePair) -> bool,
{
    fn selected(&self, edge_pair: &EdgePair, _prop_id: PropertiesId) -> bool {
        self(edge_pair)
    }
}
