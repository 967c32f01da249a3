mod test_utils;

use layout_regions::prelude::*;
use test_utils::{assert_same_region, box_region};

fn operands<'s>() -> (Region<'s>, Region<'s>) {
    let a = box_region(&[(0, 0, 100, 100), (80, 80, 200, 120), (300, 0, 350, 50)]);
    let b = box_region(&[(50, 50, 150, 150), (310, 10, 320, 20), (400, 400, 450, 450)]);
    (a, b)
}

#[test]
fn boolean_laws() {
    let (a, b) = operands();

    assert_same_region(&(&a & &b), &(&b & &a), "and commutes");
    assert_same_region(&(&a | &b), &(&b | &a), "or commutes");
    assert_same_region(&(&a ^ &b), &(&b ^ &a), "xor commutes");

    let union = &a | &b;
    let both = &a & &b;
    assert_same_region(&(&a ^ &b), &(&union - &both), "xor is union minus intersection");
    assert_same_region(&(&both | &(&a - &b)), &a, "and plus not restores a");
    assert_eq!(union.area(), a.area() + b.area() - both.area());

    assert_same_region(&(&a & &a), &a, "and with itself");
    assert!((&a - &a).is_empty());
    assert!((&a ^ &a).is_empty());
}

#[test]
fn andnot_in_one_pass() {
    let (a, b) = operands();
    let (inside, outside) = a.andnot(&b);
    assert_same_region(&inside, &(&a & &b), "first leg");
    assert_same_region(&outside, &(&a - &b), "second leg");
}

#[test]
fn merge_is_idempotent() {
    let (a, _) = operands();
    let m = a.merged();
    assert!(m.is_merged());
    assert_eq!(m.count(), 2);

    let mm = m.merged();
    assert_eq!(mm.count(), m.count());
    assert_eq!(mm.area(), m.area());
    assert_same_region(&mm, &a, "merge keeps the covered area");
}

#[test]
fn overlapping_boxes() {
    let a = box_region(&[(0, 0, 100, 100)]);
    let b = box_region(&[(50, 50, 150, 150)]);

    let both = (&a & &b).merged();
    assert_eq!(both.count(), 1);
    assert_eq!(both.bbox(), BBox::new(50, 50, 100, 100));
    assert_eq!(both.area(), 2500);
    assert_same_region(&both, &box_region(&[(50, 50, 100, 100)]), "intersection");

    let diff = (&a ^ &b).merged();
    assert_eq!(diff.area(), 15000);
    let expected: Region = [
        Polygon::from_coords(&[(0, 0), (100, 0), (100, 50), (50, 50), (50, 100), (0, 100)]),
        Polygon::from_coords(&[(100, 50), (150, 50), (150, 150), (50, 150), (50, 100), (100, 100)]),
    ]
    .into_iter()
    .collect();
    assert_same_region(&diff, &expected, "symmetric difference");
}

#[test]
fn raw_semantics_keep_overlaps() {
    let mut a = box_region(&[(0, 0, 10, 10), (5, 0, 15, 10)]);
    assert_eq!(a.area(), 150);
    a.set_merged_semantics(false);
    assert_eq!(a.area(), 200);
    assert_eq!(a.iter_merged().count(), 2);
}

#[test]
fn empty_operands() {
    let (a, _) = operands();
    let empty = Region::new();

    assert_eq!((&a & &empty).kind(), DelegateKind::Empty);
    assert_eq!((&empty - &a).kind(), DelegateKind::Empty);
    assert_same_region(&(&a | &empty), &a, "or with nothing");
    assert_same_region(&(&a - &empty), &a, "not with nothing");

    // the shortcut hands back the raw operand, the strict path runs the merge engine
    assert_eq!((&a | &empty).count(), 3);
    let mut strict = a.clone();
    strict.set_strict_handling(true);
    let r = &strict | &empty;
    assert_eq!(r.kind(), DelegateKind::Flat);
    assert_eq!(r.count(), 2);
}

#[test]
fn overlap_count_merge() {
    let a = box_region(&[(0, 0, 20, 10), (10, 0, 30, 10), (15, 0, 25, 10)]);
    let twice = a.merged_with(false, 1);
    assert_eq!(twice.area(), 15 * 10);
    let thrice = a.merged_with(false, 2);
    assert_eq!(thrice.area(), 5 * 10);
}

#[test]
fn sizing() {
    let a = box_region(&[(0, 0, 100, 100)]);
    assert_eq!(a.sized(10).bbox(), BBox::new(-10, -10, 110, 110));
    assert_eq!(a.sized(10).area(), 120 * 120);
    assert_eq!(a.sized(-10).area(), 80 * 80);
    assert!(a.sized(-50).is_empty());

    // two boxes with a gap of 20 join when sized by 10
    let b = box_region(&[(0, 0, 100, 100), (120, 0, 220, 100)]);
    assert_eq!(b.sized(10).merged().count(), 1);
    assert_eq!(b.sized(9).merged().count(), 2);
}

fn triangle(p: [(Coord, Coord); 3]) -> Polygon {
    Polygon::from_coords(&p)
}

#[test]
fn slanted_boolean_laws() {
    for k in 0..40 {
        let a: Region = [
            triangle([(10 + k % 13, 31), (115, 7 + k % 11), (41 + k % 7, 54 + k % 5)]),
            triangle([(60, 90 - k % 9), (15 + k % 17, 70), (100 - k % 5, 110)]),
        ]
        .into_iter()
        .collect();
        let b: Region = [
            triangle([(5, 5 + k % 19), (120 - k % 3, 40 + k % 13), (30 + k % 23, 100)]),
            triangle([(70 + k % 11, 0), (118, 90 - k % 7), (50, 60 + k % 29)]),
        ]
        .into_iter()
        .collect();

        let and = &a & &b;
        let not = &a - &b;
        let rnot = &b - &a;
        let or = &a | &b;
        let context = format!("k = {k}");
        assert_same_region(&(&(&and | &not) | &rnot), &or, &context);
        assert_eq!(and.area() + not.area() + rnot.area(), or.area(), "{context}");

        let merged = a.merged();
        assert_same_region(&merged.merged(), &merged, &context);
        assert_eq!(merged.merged().area(), merged.area(), "{context}");
    }
}
