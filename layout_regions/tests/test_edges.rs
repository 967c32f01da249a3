mod test_utils;

use layout_regions::{prelude::*, scan::CountBounds};
use test_utils::{assert_same_edges, box_outline, box_region, distances, edge};

#[test]
fn width_of_box_outline() {
    let outline = box_outline(BBox::new(0, 0, 100, 200));
    let options = EdgesCheckOptions::new();

    assert!(outline.width_check(90, &options).is_empty());

    let narrow = outline.width_check(150, &options);
    assert_eq!(narrow.count(), 1);
    assert_eq!(distances(&narrow), vec![100]);

    let both = outline.width_check(250, &options);
    assert_eq!(both.count(), 2);
    assert_eq!(distances(&both), vec![100, 200]);
}

#[test]
fn outline_booleans() {
    let a = box_region(&[(0, 0, 100, 100)]).edges();
    let b = box_region(&[(50, 50, 150, 150)]).edges();
    assert_eq!(a.count(), 4);
    assert_eq!(a.length(), 400.0);

    // outlines only share their crossing points, which have no length
    assert_eq!((&a & &b).length(), 0.0);
    assert_eq!((&a | &b).length(), 800.0);
    assert_eq!((&a - &b).length(), 400.0);

    let crossings = a.intersections(&b);
    assert_eq!(crossings.count(), 2);
    assert!(crossings.iter().all(|e| e.shape.is_degenerate()));
}

#[test]
fn edge_boolean_laws() {
    let a: Edges = [edge(0, 0, 100, 0), edge(0, 10, 0, 60), edge(50, 50, 90, 90)]
        .into_iter()
        .collect();
    let b: Edges = [edge(40, 0, 140, 0), edge(0, 30, 0, 40), edge(70, 70, 100, 100)]
        .into_iter()
        .collect();

    let both = &a & &b;
    let expected = 60.0 + 10.0 + 800.0f64.sqrt();
    assert!((both.length() - expected).abs() < 1e-9);
    assert_same_edges(&(&both | &(&a - &b)), &a, "and plus not restores a");
    assert_same_edges(&(&a ^ &b), &(&(&a | &b) - &both), "xor is union minus intersection");

    let (inside, outside) = a.andnot(&b);
    assert_same_edges(&inside, &both, "first leg");
    assert_same_edges(&outside, &(&a - &b), "second leg");
}

#[test]
fn antiparallel_edges_stay_apart() {
    let e: Edges = [edge(0, 0, 10, 0), edge(10, 0, 0, 0)].into_iter().collect();
    assert_eq!(e.merged().count(), 2);

    // coverage by the other operand does not care about orientation
    let forward = Edges::from_iter([edge(0, 0, 10, 0)]);
    assert_eq!((&e & &forward).count(), 2);
    assert!((&e - &forward).is_empty());
}

#[test]
fn clipping_by_region() {
    let r = box_region(&[(0, 0, 100, 100)]);
    let e: Edges = [edge(-50, 50, 150, 50), edge(0, 0, 100, 0), edge(200, 0, 300, 0)]
        .into_iter()
        .collect();

    assert_eq!(e.and_region(&r).length(), 200.0);
    assert_eq!(e.not_region(&r).length(), 200.0);
    assert_eq!(e.inside_part(&r).length(), 100.0);
    assert_eq!(e.outside_part(&r).length(), 300.0);

    assert_eq!(e.selected_interacting_region(&r).count(), 2);
    assert_eq!(e.selected_inside_region(&r).count(), 1);
    // the edge on the boundary is both inside and outside
    assert_eq!(e.selected_outside_region(&r).count(), 2);
    assert_eq!(e.pull_interacting_region(&r).count(), 1);
}

#[test]
fn open_chain_joins_into_one_polygon() {
    let u: Edges = [edge(0, 100, 0, 0), edge(0, 0, 100, 0), edge(100, 0, 100, 100)]
        .into_iter()
        .collect();
    let joined = u.extended(0, 0, 10, 0, true);
    assert_eq!(joined.count(), 1);
    let p = joined.iter().next().unwrap().shape;
    assert_eq!(p.hole_count(), 0);

    // without joining every edge becomes a box of its own
    let mut single = u.extended(0, 0, 10, 0, false);
    single.set_merged_semantics(false);
    assert_eq!(single.count(), 3);
}

#[test]
fn closed_loop_joins_into_ring() {
    let ring = box_outline(BBox::new(0, 0, 100, 100));

    let framed = ring.extended(0, 0, 10, 10, true);
    assert_eq!(framed.count(), 1);
    let p = framed.iter().next().unwrap().shape;
    assert_eq!(p.hole_count(), 1);
    assert_eq!(framed.area(), 120 * 120 - 80 * 80);

    let filled = ring.extended(0, 0, 10, 0, true);
    assert_eq!(filled.count(), 1);
    assert_eq!(filled.iter().next().unwrap().shape.hole_count(), 0);
    assert_eq!(filled.area(), 120 * 120);
}

#[test]
fn edge_to_edge_interactions() {
    let e: Edges = [edge(0, 0, 10, 0), edge(0, 20, 10, 20), edge(0, 40, 10, 40)]
        .into_iter()
        .collect();
    let cutters: Edges = [edge(5, -5, 5, 25), edge(8, 15, 8, 25)].into_iter().collect();

    assert_eq!(e.selected_interacting(&cutters).count(), 2);
    assert_eq!(e.selected_not_interacting(&cutters).count(), 1);
    let twice = e.selected_interacting_by(&cutters, CountBounds::new(2, 2), false);
    assert_eq!(twice.count(), 1);
    assert_eq!(e.pull_interacting(&cutters).count(), 2);
}
