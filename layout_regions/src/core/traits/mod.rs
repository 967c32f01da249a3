//! Core/common traits for use in layout_regions.
mod control_flow;
mod fuzzy_eq;
mod real;

pub use control_flow::ControlFlow;
pub use fuzzy_eq::FuzzyEq;
pub use real::Real;
