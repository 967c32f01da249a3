mod test_utils;

use layout_regions::{plugins::AreaFilter, prelude::*};
use test_utils::{
    TestLayout, assert_same_edges, assert_same_region, box_region, edge, flat_copy, pair_keys,
};

fn target() -> (Layout, CellIndex, LayerIndex) {
    let mut ly = Layout::new();
    let layer = ly.insert_layer("100/0");
    let top = ly.add_cell("OUT");
    (ly, top, layer)
}

#[test]
fn flat_round_trip() {
    let r = box_region(&[(0, 0, 100, 100), (50, 50, 150, 150), (300, 0, 310, 10)]);
    let (mut ly, top, layer) = target();
    r.insert_into(&mut ly, top, layer).unwrap();

    let back = Region::from_original(RecursiveShapeIterator::new(&ly, top, layer).unwrap());
    assert_eq!(back.kind(), DelegateKind::OriginalLayer);
    assert_eq!(back.count(), 3);
    assert_same_region(&back, &r, "flat round trip");

    let e: Edges = [edge(0, 0, 10, 0), edge(0, 5, 0, 50)].into_iter().collect();
    let (mut ly, top, layer) = target();
    e.insert_into(&mut ly, top, layer).unwrap();
    let back = Edges::from_original(RecursiveShapeIterator::new(&ly, top, layer).unwrap());
    assert_same_edges(&back, &e, "edges round trip");

    let markers = r.space_check(20, &RegionCheckOptions::new());
    let (mut ly, top, layer) = target();
    markers.insert_into(&mut ly, top, layer).unwrap();
    let back = EdgePairs::from_original(RecursiveShapeIterator::new(&ly, top, layer).unwrap());
    assert_eq!(pair_keys(&back), pair_keys(&markers));
}

#[test]
fn deep_round_trip() {
    let t = TestLayout::new();
    let store = DeepShapeStore::new();
    let deep = t.deep_region(t.l1, &store);
    assert_eq!(deep.kind(), DelegateKind::Deep);
    assert!(deep.hier_count() < deep.count());

    let (mut ly, top, layer) = target();
    deep.insert_into(&mut ly, top, layer).unwrap();
    // the hierarchy comes along
    assert!(ly.cell_count() > 1);

    let back = Region::from_original(RecursiveShapeIterator::new(&ly, top, layer).unwrap());
    assert_eq!(back.count(), deep.count());
    assert_same_region(&back, &t.flat_region(t.l1), "deep round trip");
}

#[test]
fn deep_merge_and_booleans() {
    let t = TestLayout::new();
    let store = DeepShapeStore::new();
    let (a, b) = (t.deep_region(t.l1, &store), t.deep_region(t.l2, &store));
    let (fa, fb) = (t.flat_region(t.l1), t.flat_region(t.l2));

    assert_same_region(&a, &fa, "raw");
    assert_eq!(a.area(), fa.area());

    let merged = a.merged();
    assert_eq!(merged.kind(), DelegateKind::Deep);
    assert!(merged.is_merged());
    assert_same_region(&merged, &fa.merged(), "merged");

    assert_same_region(&(&a & &b), &(&fa & &fb), "and");
    assert_same_region(&(&a | &b), &(&fa | &fb), "or");
    assert_same_region(&(&a ^ &b), &(&fa ^ &fb), "xor");
    assert_same_region(&(&a - &b), &(&fa - &fb), "not");
    assert_eq!((&a & &b).kind(), DelegateKind::Deep);

    let (inside, outside) = a.andnot(&b);
    assert_same_region(&inside, &(&fa & &fb), "andnot first leg");
    assert_same_region(&outside, &(&fa - &fb), "andnot second leg");
}

#[test]
fn deep_mixed_with_flat_operand() {
    let t = TestLayout::new();
    let store = DeepShapeStore::new();
    let a = t.deep_region(t.l1, &store);
    let fa = t.flat_region(t.l1);
    let cut = box_region(&[(-1000, -1000, 130, 150)]);

    assert_same_region(&(&a & &cut), &(&fa & &cut), "deep and flat");
    assert_same_region(&(&cut - &a), &(&cut - &fa), "flat not deep");
}

#[test]
fn deep_sizing_and_processors() {
    let t = TestLayout::new();
    let store = DeepShapeStore::new();
    let a = t.deep_region(t.l1, &store);
    let fa = t.flat_region(t.l1);

    assert_same_region(&a.sized(10), &fa.sized(10), "sized up");
    assert_same_region(&a.sized(-4), &fa.sized(-4), "sized down");
    assert_same_region(&a.hulls(), &fa.hulls(), "hulls");
    assert_same_region(&a.holes(), &fa.holes(), "holes");
    assert_same_region(&a.extents(6, 0), &fa.extents(6, 0), "extents");

    let small = AreaFilter::new(0, 5000, false);
    assert_same_region(&a.filtered(&small), &fa.filtered(&small), "area filter");

    // the hulls of all placements of a cell are shared
    let hulls = a.hulls();
    assert!(hulls.hier_count() < hulls.count());
}

#[test]
fn deep_edges() {
    let t = TestLayout::new();
    let store = DeepShapeStore::new();
    let a = t.deep_region(t.l1, &store);
    let fa = t.flat_region(t.l1);

    let edges = a.edges();
    assert_eq!(edges.kind(), DelegateKind::Deep);
    assert_same_edges(&edges, &fa.edges(), "outline edges");

    let options = EdgesCheckOptions::new().with_metrics(Metrics::Projection);
    assert_eq!(
        pair_keys(&edges.width_check(25, &options)),
        pair_keys(&fa.edges().width_check(25, &options)),
    );
    assert_same_region(
        &edges.extended(0, 0, 4, 2, true),
        &fa.edges().extended(0, 0, 4, 2, true),
        "joined outlines",
    );
    let b = t.deep_region(t.l2, &store);
    let fb = t.flat_region(t.l2);
    assert_same_edges(&edges.inside_part(&b), &fa.edges().inside_part(&fb), "inside part");
    assert_same_edges(&edges.outside_part(&b), &fa.edges().outside_part(&fb), "outside part");
}

#[test]
fn deep_checks() {
    let t = TestLayout::new();
    let store = DeepShapeStore::new();
    let (a, b) = (t.deep_region(t.l1, &store), t.deep_region(t.l2, &store));
    let (fa, fb) = (t.flat_region(t.l1), t.flat_region(t.l2));
    // projected markers stay on the grid in magnified placements
    let options = RegionCheckOptions::new().with_metrics(Metrics::Projection);

    let width = a.width_check(25, &options);
    assert_eq!(width.kind(), DelegateKind::Deep);
    assert_eq!(pair_keys(&width), pair_keys(&fa.width_check(25, &options)));
    assert_eq!(pair_keys(&a.space_check(30, &options)), pair_keys(&fa.space_check(30, &options)));
    assert_eq!(
        pair_keys(&a.separation_check(&b, 15, &options)),
        pair_keys(&fa.separation_check(&fb, 15, &options)),
    );
    assert_eq!(
        pair_keys(&a.overlap_check(&b, 15, &options)),
        pair_keys(&fa.overlap_check(&fb, 15, &options)),
    );

    let width_polygons = width.polygons(0);
    assert_same_region(
        &width_polygons,
        &fa.width_check(25, &options).polygons(0),
        "marker polygons",
    );
}

#[test]
fn deep_interactions() {
    let t = TestLayout::new();
    let store = DeepShapeStore::new();
    let (a, b) = (t.deep_region(t.l1, &store), t.deep_region(t.l2, &store));
    let (fa, fb) = (t.flat_region(t.l1), t.flat_region(t.l2));

    assert_same_region(&a.selected_interacting(&b), &fa.selected_interacting(&fb), "interacting");
    assert_same_region(
        &a.selected_not_interacting(&b),
        &fa.selected_not_interacting(&fb),
        "not interacting",
    );
    assert_same_region(&a.pull_interacting(&b), &fa.pull_interacting(&fb), "pull");
    assert!(!a.selected_interacting(&b).is_empty());
}

#[test]
fn deep_layers_stay_independent() {
    let t = TestLayout::new();
    let store = DeepShapeStore::new();
    let a = t.deep_region(t.l1, &store);
    let before = flat_copy(&a);

    // operations create variants inside the store, the source layer reads the same afterwards
    let _ = a.sized(10);
    let _ = a.width_check(25, &RegionCheckOptions::new());
    assert_same_region(&a, &before, "source layer");
    assert_eq!(a.count(), before.count());
}

#[test]
fn layers_imported_after_variants() {
    let t = TestLayout::new();
    let store = DeepShapeStore::new();
    let a = t.deep_region(t.l1, &store);
    let (fa, fb) = (t.flat_region(t.l1), t.flat_region(t.l2));

    // sizing and checks split cells by placement before the second layer arrives
    let _ = a.sized(10);
    let _ = a.edges();
    let _ = a.width_check(25, &RegionCheckOptions::new());
    let layouts = store.layout_count();

    let b = t.deep_region(t.l2, &store);
    assert_eq!(store.layout_count(), layouts);
    assert_eq!(b.count(), fb.count());
    assert_same_region(&b, &fb, "late layer");
    assert_same_region(&(&a & &b), &(&fa & &fb), "and with late layer");
    assert_same_region(&(&a - &b), &(&fa - &fb), "not with late layer");
    assert_same_region(&b.sized(3), &fb.sized(3), "late layer sized");
}
