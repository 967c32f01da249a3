use std::ops;

use crate::geom::Coord;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Distance measure used by the relation checks.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Metrics {
    /// Euclidian distance, corners are checked with a round "radius".
    #[default]
    Euclidian,
    /// Chebyshev distance: corners are checked with a square of size `d`.
    Square,
    /// Only the parts of the edges which project onto each other are checked.
    Projection,
}

/// Post filter on markers lying on opposite sides of a subject polygon.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OppositeFilter {
    /// Keep all markers.
    #[default]
    NoOppositeFilter,
    /// Keep only markers which have a counterpart on the opposite side.
    OnlyOpposite,
    /// Drop markers which have a counterpart on the opposite side.
    NotOpposite,
}

/// Set of rectangle error patterns to waive. Errors on a rectangular subject polygon are dropped
/// if the pattern of its sides carrying errors is contained in the set.
///
/// # Examples
///
/// ```
/// # use layout_regions::drc::*;
/// let f = RectFilter::ONE_SIDE | RectFilter::TWO_OPPOSITE_SIDES;
/// assert!(f.contains(RectFilter::ONE_SIDE));
/// assert!(!f.contains(RectFilter::FOUR_SIDES));
/// assert!(RectFilter::NONE.is_empty());
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RectFilter(u8);

impl RectFilter {
    pub const NONE: RectFilter = RectFilter(0);
    /// Errors on exactly one side.
    pub const ONE_SIDE: RectFilter = RectFilter(1);
    /// Errors on two sides meeting in a corner.
    pub const TWO_CONNECTED_SIDES: RectFilter = RectFilter(2);
    /// Errors on two opposite sides.
    pub const TWO_OPPOSITE_SIDES: RectFilter = RectFilter(4);
    /// Errors on three sides.
    pub const THREE_SIDES: RectFilter = RectFilter(8);
    /// Errors on all four sides.
    pub const FOUR_SIDES: RectFilter = RectFilter(16);
    /// Modifier: waive only for squares.
    pub const SQUARE: RectFilter = RectFilter(32);

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 & !Self::SQUARE.0 == 0
    }

    #[inline]
    pub fn contains(self, other: RectFilter) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }
}

impl ops::BitOr for RectFilter {
    type Output = RectFilter;

    fn bitor(self, rhs: RectFilter) -> RectFilter {
        RectFilter(self.0 | rhs.0)
    }
}

impl ops::BitOrAssign for RectFilter {
    fn bitor_assign(&mut self, rhs: RectFilter) {
        self.0 |= rhs.0;
    }
}

impl std::fmt::Debug for RectFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const NAMES: [&str; 6] = [
            "ONE_SIDE",
            "TWO_CONNECTED_SIDES",
            "TWO_OPPOSITE_SIDES",
            "THREE_SIDES",
            "FOUR_SIDES",
            "SQUARE",
        ];
        let names: Vec<&str> = NAMES
            .iter()
            .enumerate()
            .filter(|(i, _)| self.0 & (1 << i) != 0)
            .map(|(_, n)| *n)
            .collect();
        if names.is_empty() {
            write!(f, "RectFilter(NONE)")
        } else {
            write!(f, "RectFilter({})", names.join(" | "))
        }
    }
}

/// Options for DRC checks on polygon collections.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionCheckOptions {
    /// Report the full edges instead of the violating parts.
    pub whole_edges: bool,
    pub metrics: Metrics,
    /// Edge pairs enclosing an angle of at least this value (degrees) are not checked.
    pub ignore_angle: f64,
    /// Lower bound (inclusive) on the projected length of the edges onto each other.
    pub min_projection: Coord,
    /// Upper bound (exclusive) on the projected length, `Coord::MAX` for no bound.
    pub max_projection: Coord,
    /// Suppress markers when another edge lies between the two edges.
    pub shielded: bool,
    pub opposite_filter: OppositeFilter,
    pub rect_filter: RectFilter,
}

impl RegionCheckOptions {
    pub fn new() -> Self {
        Self {
            whole_edges: false,
            metrics: Metrics::Euclidian,
            ignore_angle: 90.0,
            min_projection: 0,
            max_projection: Coord::MAX,
            shielded: true,
            opposite_filter: OppositeFilter::NoOppositeFilter,
            rect_filter: RectFilter::NONE,
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_whole_edges(mut self, whole_edges: bool) -> Self {
        self.whole_edges = whole_edges;
        self
    }

    pub fn with_shielded(mut self, shielded: bool) -> Self {
        self.shielded = shielded;
        self
    }

    pub fn with_projection_limits(mut self, min: Coord, max: Coord) -> Self {
        self.min_projection = min;
        self.max_projection = max;
        self
    }

    pub fn with_opposite_filter(mut self, filter: OppositeFilter) -> Self {
        self.opposite_filter = filter;
        self
    }

    pub fn with_rect_filter(mut self, filter: RectFilter) -> Self {
        self.rect_filter = filter;
        self
    }

    /// The options shared with edge checks.
    pub fn edges_options(&self) -> EdgesCheckOptions {
        EdgesCheckOptions {
            whole_edges: self.whole_edges,
            metrics: self.metrics,
            ignore_angle: self.ignore_angle,
            min_projection: self.min_projection,
            max_projection: self.max_projection,
            shielded: self.shielded,
        }
    }
}

impl Default for RegionCheckOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Options for DRC checks on edge collections.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgesCheckOptions {
    pub whole_edges: bool,
    pub metrics: Metrics,
    pub ignore_angle: f64,
    pub min_projection: Coord,
    pub max_projection: Coord,
    pub shielded: bool,
}

impl EdgesCheckOptions {
    pub fn new() -> Self {
        RegionCheckOptions::new().edges_options()
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_whole_edges(mut self, whole_edges: bool) -> Self {
        self.whole_edges = whole_edges;
        self
    }

    pub fn with_shielded(mut self, shielded: bool) -> Self {
        self.shielded = shielded;
        self
    }
}

impl Default for EdgesCheckOptions {
    fn default() -> Self {
        Self::new()
    }
}
