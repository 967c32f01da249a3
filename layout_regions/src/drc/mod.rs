//! DRC relation checks.
//!
//! Checks turn relations between edges into [EdgePair] markers. The edges of the subject shapes
//! are fed into a box scanner with the check distance as enlargement, every candidate pair is
//! evaluated by an [EdgeRelationFilter], shielded markers are dropped and finally the opposite
//! and rectangle filters see the complete marker set of each subject polygon.

mod check;
mod filters;
mod options;
mod relations;

pub use check::{CheckEdge, CheckScope, DrcCollector, Marker};
pub use filters::{apply_opposite_filter, apply_rect_filter};
pub use options::{EdgesCheckOptions, Metrics, OppositeFilter, RectFilter, RegionCheckOptions};
pub use relations::{EdgeRelation, EdgeRelationFilter};

use crate::{
    geom::{Coord, Edge, EdgePair, Polygon},
    properties::WithProperties,
};

fn polygon_check_edges(polygons: &[WithProperties<Polygon>]) -> Vec<CheckEdge> {
    polygons
        .iter()
        .enumerate()
        .flat_map(|(i, p)| p.shape.edges().map(move |e| CheckEdge::new(e, i)))
        .collect()
}

/// Run a relation check on polygons. For single layer relations `others` is ignored and `scope`
/// selects the pairs considered; two layer relations check `subjects` against `others`.
///
/// Markers carry the properties of the subject polygon their first edge belongs to.
pub fn region_check(
    subjects: &[WithProperties<Polygon>],
    others: Option<&[WithProperties<Polygon>]>,
    relation: EdgeRelation,
    scope: CheckScope,
    d: Coord,
    options: &RegionCheckOptions,
) -> Vec<WithProperties<EdgePair>> {
    let filter = EdgeRelationFilter::new(relation, d, options.edges_options());
    let collector = DrcCollector::new(&filter, scope);
    let a = polygon_check_edges(subjects);
    let markers = match others {
        Some(others) if relation.is_two_layer() => {
            collector.collect_two(&a, &polygon_check_edges(others))
        }
        _ => collector.collect_single(&a),
    };

    let markers = apply_opposite_filter(markers, options.opposite_filter);
    let subject_shapes: Vec<&Polygon> = subjects.iter().map(|p| &p.shape).collect();
    let markers = apply_rect_filter(markers, &subject_shapes, options.rect_filter);

    markers
        .into_iter()
        .map(|m| WithProperties::new(m.pair, subjects[m.subject].prop_id))
        .collect()
}

/// Run a relation check on edges. Every edge is its own subject.
pub fn edges_check(
    subjects: &[WithProperties<Edge>],
    others: Option<&[WithProperties<Edge>]>,
    relation: EdgeRelation,
    d: Coord,
    options: &EdgesCheckOptions,
) -> Vec<WithProperties<EdgePair>> {
    let filter = EdgeRelationFilter::new(relation, d, *options);
    let collector = DrcCollector::new(&filter, CheckScope::Any);
    let to_check = |edges: &[WithProperties<Edge>]| -> Vec<CheckEdge> {
        edges
            .iter()
            .enumerate()
            .map(|(i, e)| CheckEdge::new(e.shape, i))
            .collect()
    };
    let a = to_check(subjects);
    let markers = match others {
        Some(others) if relation.is_two_layer() => collector.collect_two(&a, &to_check(others)),
        _ => collector.collect_single(&a),
    };
    markers
        .into_iter()
        .map(|m| WithProperties::new(m.pair, subjects[m.subject].prop_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::BBox;

    fn boxes(b: &[BBox]) -> Vec<WithProperties<Polygon>> {
        b.iter()
            .map(|b| WithProperties::plain(Polygon::from_box(*b)))
            .collect()
    }

    #[test]
    fn width_and_notch() {
        let u = vec![WithProperties::plain(Polygon::from_coords(&[
            (0, 0),
            (30, 0),
            (30, 20),
            (20, 20),
            (20, 5),
            (10, 5),
            (10, 20),
            (0, 20),
        ]))];
        let opts = RegionCheckOptions::new();
        let width = region_check(&u, None, EdgeRelation::Width, CheckScope::SameSubject, 6, &opts);
        assert_eq!(width.len(), 1);
        assert_eq!(width[0].shape.distance(), 5);

        let notch = region_check(&u, None, EdgeRelation::Space, CheckScope::SameSubject, 11, &opts);
        assert_eq!(notch.len(), 1);
        assert_eq!(notch[0].shape.distance(), 10);
    }

    #[test]
    fn isolated_vs_space() {
        let r = boxes(&[BBox::new(0, 0, 10, 10), BBox::new(15, 0, 25, 10)]);
        let opts = RegionCheckOptions::new();
        assert_eq!(
            region_check(&r, None, EdgeRelation::Space, CheckScope::OtherSubject, 6, &opts).len(),
            1
        );
        assert!(
            region_check(&r, None, EdgeRelation::Space, CheckScope::SameSubject, 6, &opts)
                .is_empty()
        );
    }

    #[test]
    fn enclosing_with_rect_filter() {
        let metal = boxes(&[BBox::new(0, 0, 100, 100)]);
        let via = boxes(&[BBox::new(5, 40, 95, 60)]);
        let opts = RegionCheckOptions::new();
        let markers = region_check(
            &metal,
            Some(&via),
            EdgeRelation::Enclosing,
            CheckScope::Any,
            10,
            &opts,
        );
        assert_eq!(markers.len(), 2);

        let waived = region_check(
            &metal,
            Some(&via),
            EdgeRelation::Enclosing,
            CheckScope::Any,
            10,
            &opts.with_rect_filter(RectFilter::TWO_OPPOSITE_SIDES),
        );
        assert!(waived.is_empty());

        let one_sided = region_check(
            &metal,
            Some(&via),
            EdgeRelation::Enclosing,
            CheckScope::Any,
            10,
            &opts.with_opposite_filter(OppositeFilter::NotOpposite),
        );
        assert!(one_sided.is_empty());
    }

    #[test]
    fn edges_width_of_box_outline() {
        let outline: Vec<WithProperties<Edge>> = Polygon::from_box(BBox::new(0, 0, 100, 200))
            .edges()
            .map(WithProperties::plain)
            .collect();
        let opts = EdgesCheckOptions::new();
        assert!(edges_check(&outline, None, EdgeRelation::Width, 90, &opts).is_empty());
        let w = edges_check(&outline, None, EdgeRelation::Width, 150, &opts);
        assert_eq!(w.len(), 1);
        assert_eq!(w[0].shape.distance(), 100);
        assert_eq!(edges_check(&outline, None, EdgeRelation::Width, 250, &opts).len(), 2);
    }
}
