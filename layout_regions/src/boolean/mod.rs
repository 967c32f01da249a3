//! Boolean and merge engine for polygons and edges.
//!
//! Polygon operations run through one generic [BooleanEngine]: all input edges are split at their
//! mutual intersections, coincident segments are collapsed, the winding number of every input
//! layer is determined on both sides of each segment by a ray scan against a spatial index, and
//! a [WindingEvaluator] decides which segments form the boundary of the result. The boundary is
//! then linked into hulls and holes.
//!
//! Edge operations work on the coverage of edges along their supporting lines.

mod clip;
mod edge_booleans;
mod engine;
mod link;
pub(crate) mod locate;
mod predicates;
mod sizing;

pub use clip::{EdgeClipper, EdgeRegionMode};
pub use edge_booleans::{boolean_edges, edge_intersections, merge_edges};
pub use engine::{BooleanEngine, BooleanEvaluator, MergeEvaluator, WindingEvaluator};
pub use predicates::{
    edge_inside_polygon, edge_interacts_polygon, edge_outside_polygon, polygon_inside,
    polygons_interact, polygons_overlap,
};
pub use sizing::{offset_band, size_polygons, sized_contours};

use std::collections::BTreeMap;

use crate::{
    core::spatial::{box_index, query_box},
    geom::Polygon,
    progress::Progress,
    properties::{PropertiesId, WithProperties},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Boolean operation between two shape sets.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BooleanOp {
    /// Return the union of the shapes.
    Or,
    /// Return the intersection of the shapes.
    And,
    /// Return the parts of the first set not covered by the second one.
    Not,
    /// Exclusive OR between the shapes.
    Xor,
}

/// Options controlling a merge.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    /// Keep polygons touching in a single point separate.
    pub min_coherence: bool,
    /// Minimum number of overlapping shapes minus one required for area to survive (0 is a plain
    /// union).
    pub min_wc: u32,
    /// Merge shapes with different properties together (the result takes the structurally
    /// largest property set). If false, each property group is merged separately.
    pub join_properties: bool,
}

impl MergeOptions {
    #[inline]
    pub fn new() -> Self {
        Self {
            min_coherence: false,
            min_wc: 0,
            join_properties: true,
        }
    }
}

impl Default for MergeOptions {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Merge polygons.
pub fn merge_polygons(
    polygons: &[WithProperties<Polygon>],
    options: &MergeOptions,
    progress: Option<&Progress>,
) -> Vec<WithProperties<Polygon>> {
    if polygons.is_empty() {
        return Vec::new();
    }
    if !options.join_properties {
        let mut groups: BTreeMap<PropertiesId, Vec<&Polygon>> = BTreeMap::new();
        for p in polygons {
            groups.entry(p.prop_id).or_default().push(&p.shape);
        }
        let mut result = Vec::new();
        for (id, group) in groups {
            result.extend(
                merge_plain(group.into_iter(), options, progress)
                    .into_iter()
                    .map(|p| WithProperties::new(p, id)),
            );
        }
        return result;
    }

    let merged = merge_plain(polygons.iter().map(|p| &p.shape), options, progress);
    assign_properties(merged, &[polygons])
}

/// Merge polygons without property handling.
pub fn merge_plain<'a, I>(polygons: I, options: &MergeOptions, progress: Option<&Progress>) -> Vec<Polygon>
where
    I: Iterator<Item = &'a Polygon>,
{
    let mut engine = BooleanEngine::new(1);
    engine.set_min_coherence(options.min_coherence);
    for p in polygons {
        engine.insert_polygon(p, 0);
    }
    let evaluator = MergeEvaluator {
        min_wc: options.min_wc as i32,
    };
    engine.process(&[&evaluator], progress).pop().unwrap_or_default()
}

/// Two layer boolean between polygon sets.
pub fn boolean_polygons(
    a: &[WithProperties<Polygon>],
    b: &[WithProperties<Polygon>],
    op: BooleanOp,
    min_coherence: bool,
    progress: Option<&Progress>,
) -> Vec<WithProperties<Polygon>> {
    let engine = two_layer_engine(a, b, min_coherence);
    let result = engine
        .process(&[&BooleanEvaluator(op)], progress)
        .pop()
        .unwrap_or_default();
    match op {
        BooleanOp::And | BooleanOp::Not => assign_properties(result, &[a]),
        BooleanOp::Or | BooleanOp::Xor => assign_properties(result, &[a, b]),
    }
}

/// `a AND b` and `a NOT b` computed in a single pass.
pub fn and_not_polygons(
    a: &[WithProperties<Polygon>],
    b: &[WithProperties<Polygon>],
    min_coherence: bool,
    progress: Option<&Progress>,
) -> (Vec<WithProperties<Polygon>>, Vec<WithProperties<Polygon>>) {
    let engine = two_layer_engine(a, b, min_coherence);
    let mut results = engine.process(
        &[
            &BooleanEvaluator(BooleanOp::And),
            &BooleanEvaluator(BooleanOp::Not),
        ],
        progress,
    );
    let not_part = results.pop().unwrap_or_default();
    let and_part = results.pop().unwrap_or_default();
    (
        assign_properties(and_part, &[a]),
        assign_properties(not_part, &[a]),
    )
}

fn two_layer_engine(
    a: &[WithProperties<Polygon>],
    b: &[WithProperties<Polygon>],
    min_coherence: bool,
) -> BooleanEngine {
    let mut engine = BooleanEngine::new(2);
    engine.set_min_coherence(min_coherence);
    for p in a {
        engine.insert_polygon(&p.shape, 0);
    }
    for p in b {
        engine.insert_polygon(&p.shape, 1);
    }
    engine
}

/// Give every result polygon the structurally largest property set of the source polygons
/// overlapping it.
pub(crate) fn assign_properties(
    results: Vec<Polygon>,
    sources: &[&[WithProperties<Polygon>]],
) -> Vec<WithProperties<Polygon>> {
    let mut ids = sources.iter().flat_map(|s| s.iter().map(|p| p.prop_id));
    let first = ids.next().unwrap_or(PropertiesId::NONE);
    if ids.all(|id| id == first) {
        return results
            .into_iter()
            .map(|p| WithProperties::new(p, first))
            .collect();
    }

    let all: Vec<&WithProperties<Polygon>> = sources.iter().flat_map(|s| s.iter()).collect();
    let index = box_index(all.iter().map(|p| p.shape.bbox()));
    let mut stack = Vec::new();
    results
        .into_iter()
        .map(|r| {
            let id = query_box(&index, &r.bbox(), &mut stack)
                .into_iter()
                .map(|i| all[i])
                .filter(|s| polygons_overlap(&s.shape, &r))
                .fold(PropertiesId::NONE, |acc, s| acc.max_content(s.prop_id));
            WithProperties::new(r, id)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geom::BBox,
        properties::{PropertiesId, property_set},
    };

    fn plain(b: BBox) -> WithProperties<Polygon> {
        WithProperties::plain(Polygon::from_box(b))
    }

    #[test]
    fn and_not_legs() {
        let a = [plain(BBox::new(0, 0, 20, 10))];
        let b = [plain(BBox::new(10, 0, 30, 10))];
        let (and, not) = and_not_polygons(&a, &b, false, None);
        assert_eq!(and, vec![plain(BBox::new(10, 0, 20, 10))]);
        assert_eq!(not, vec![plain(BBox::new(0, 0, 10, 10))]);
        let xor = boolean_polygons(&a, &b, BooleanOp::Xor, false, None);
        assert_eq!(xor.len(), 2);
    }

    #[test]
    fn merge_joins_properties() {
        let p1 = PropertiesId::intern(property_set([("n", 1i64)]));
        let p2 = PropertiesId::intern(property_set([("n", 2i64)]));
        let polys = [
            WithProperties::new(Polygon::from_box(BBox::new(0, 0, 10, 10)), p1),
            WithProperties::new(Polygon::from_box(BBox::new(5, 0, 15, 10)), p2),
        ];
        let joined = merge_polygons(&polys, &MergeOptions::new(), None);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].prop_id, p2);

        let options = MergeOptions {
            join_properties: false,
            ..MergeOptions::new()
        };
        let separate = merge_polygons(&polys, &options, None);
        assert_eq!(separate.len(), 2);
    }
}
