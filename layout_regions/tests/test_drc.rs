mod test_utils;

use layout_regions::prelude::*;
use test_utils::{box_region, distances, pair_keys};

fn sorted_pairs(ep: &EdgePairs<'_>) -> Vec<EdgePair> {
    let mut pairs: Vec<_> = ep.iter().map(|p| p.shape).collect();
    pairs.sort();
    pairs
}

const BOXES: [(Coord, Coord, Coord, Coord); 5] = [
    (0, 0, 100, 20),
    (0, 35, 100, 60),
    (110, 0, 130, 60),
    (-100, -100, -60, -60),
    (300, 300, 400, 400),
];

#[test]
fn space_check_ignores_insertion_order() {
    let options = RegionCheckOptions::new();
    let forward = box_region(&BOXES);
    let mut reversed_boxes = BOXES;
    reversed_boxes.reverse();
    let reversed = box_region(&reversed_boxes);

    let a = forward.space_check(20, &options);
    let b = reversed.space_check(20, &options);
    assert_eq!(sorted_pairs(&a), sorted_pairs(&b));
    assert_eq!(distances(&a), vec![10, 10, 15]);
}

#[test]
fn swapped_separation_swaps_pairs() {
    let options = RegionCheckOptions::new();
    let a = box_region(&[(0, 0, 100, 100), (0, 200, 50, 250)]);
    let b = box_region(&[(110, 0, 200, 100), (60, 200, 100, 230)]);

    let ab = a.separation_check(&b, 20, &options);
    let ba = b.separation_check(&a, 20, &options);
    assert_eq!(ab.count(), 2);
    assert_eq!(distances(&ab), vec![10, 10]);

    let mut swapped: Vec<EdgePair> = ba.iter().map(|p| p.shape.swapped()).collect();
    swapped.sort();
    assert_eq!(sorted_pairs(&ab), swapped);
}

#[test]
fn width_and_notch() {
    let options = RegionCheckOptions::new();
    let u: Region = [Polygon::from_coords(&[
        (0, 0),
        (100, 0),
        (100, 100),
        (60, 100),
        (60, 20),
        (50, 20),
        (50, 100),
        (0, 100),
    ])]
    .into_iter()
    .collect();

    // the notch is 10 wide, the bottom bar 20 high and the right arm 40 wide
    assert_eq!(distances(&u.notch_check(15, &options)), vec![10]);
    assert_eq!(distances(&u.width_check(25, &options)), vec![20]);
    assert!(u.isolated_check(15, &options).is_empty());
    assert_eq!(u.space_check(15, &options).count(), 1);
}

#[test]
fn isolation_between_polygons() {
    let options = RegionCheckOptions::new();
    let r = box_region(&[(0, 0, 100, 100), (110, 0, 200, 100)]);
    assert_eq!(distances(&r.isolated_check(20, &options)), vec![10]);
    assert!(r.notch_check(20, &options).is_empty());
}

#[test]
fn two_layer_relations() {
    let options = RegionCheckOptions::new();
    let outer = box_region(&[(0, 0, 100, 100)]);
    let inner = box_region(&[(10, 10, 90, 95)]);

    let enc = outer.enclosing_check(&inner, 20, &options);
    assert_eq!(distances(&enc), vec![5, 10, 10, 10]);
    let ins = inner.inside_check(&outer, 20, &options);
    assert_eq!(pair_keys(&ins), pair_keys(&enc));
    assert_eq!(distances(&outer.enclosing_check(&inner, 8, &options)), vec![5]);

    let right = box_region(&[(90, 0, 200, 100)]);
    assert_eq!(distances(&outer.overlap_check(&right, 20, &options)), vec![10]);
}

#[test]
fn corner_metrics() {
    let a = box_region(&[(0, 0, 10, 10)]);
    let b = box_region(&[(15, 15, 25, 25)]);
    let options = RegionCheckOptions::new();

    let projection = a.separation_check(&b, 10, &options.with_metrics(Metrics::Projection));
    assert!(projection.is_empty());
    let euclidian = a.separation_check(&b, 10, &options);
    assert!(!euclidian.is_empty());
    let square = a.separation_check(&b, 10, &options.with_metrics(Metrics::Square));
    assert!(square.count() >= euclidian.count());

    // corners 7.07 apart
    assert!(a.separation_check(&b, 7, &options).is_empty());
}

#[test]
fn rectangle_errors_waived() {
    let bar = box_region(&[(0, 0, 100, 20)]);
    let options = RegionCheckOptions::new();
    assert_eq!(bar.width_check(30, &options).count(), 1);

    let waive = options.with_rect_filter(RectFilter::TWO_OPPOSITE_SIDES);
    assert!(bar.width_check(30, &waive).is_empty());

    let waive_one = options.with_rect_filter(RectFilter::ONE_SIDE);
    assert_eq!(bar.width_check(30, &waive_one).count(), 1);
}

#[test]
fn whole_edges_and_projection_limits() {
    let r = box_region(&[(0, 0, 100, 100), (110, 40, 200, 60)]);
    let options = RegionCheckOptions::new().with_metrics(Metrics::Projection);

    let parts = r.space_check(20, &options);
    assert_eq!(parts.count(), 1);
    let p = parts.iter().next().unwrap().shape;
    assert_eq!(p.first.length().max(p.second.length()), 20.0);

    let whole = r.space_check(20, &options.with_whole_edges(true));
    let p = whole.iter().next().unwrap().shape;
    assert_eq!(p.first.length().max(p.second.length()), 100.0);

    assert!(r.space_check(20, &options.with_projection_limits(30, Coord::MAX)).is_empty());
}

#[test]
fn edge_pairs_as_polygons() {
    let r = box_region(&[(0, 0, 100, 20), (0, 30, 100, 50)]);
    let markers = r.space_check(20, &RegionCheckOptions::new());
    let area = markers.polygons(0);
    assert_eq!(area.area(), 100 * 10);
    assert_eq!(markers.edges().count(), 2);
}

#[test]
fn convex_corners_are_not_spacing_errors() {
    let options = RegionCheckOptions::new();
    let r: Region = [Polygon::from_coords(&[(0, 14), (25, 14), (12, 30)])]
        .into_iter()
        .collect();
    assert!(r.space_check(8, &options).is_empty());
    assert!(r.notch_check(8, &options).is_empty());

    let width = r.width_check(8, &options);
    assert!(!width.is_empty());
    for p in width.iter() {
        assert!(!p.shape.first.is_degenerate(), "{:?}", p.shape);
        assert!(!p.shape.second.is_degenerate(), "{:?}", p.shape);
    }
}

#[test]
fn narrow_v_notch() {
    let options = RegionCheckOptions::new();
    let r: Region = [Polygon::from_coords(&[
        (0, 0),
        (100, 0),
        (100, 50),
        (52, 50),
        (50, 10),
        (48, 50),
        (0, 50),
    ])]
    .into_iter()
    .collect();
    assert!(!r.notch_check(5, &options).is_empty());
    assert!(r.width_check(5, &options).is_empty());
}
