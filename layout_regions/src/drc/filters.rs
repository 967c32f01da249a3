//! Post filters applied to the markers of each subject polygon.

use std::collections::BTreeMap;

use super::{Marker, OppositeFilter, RectFilter};
use crate::geom::{Edge, Polygon};

/// True if the edges run in opposite directions and their projections overlap.
fn opposite_edges(a: &Edge, b: &Edge) -> bool {
    let da = a.d();
    if da.dot(b.d()) >= 0 {
        return false;
    }
    let l = da.dot(da);
    let p1 = da.dot(b.p1 - a.p1);
    let p2 = da.dot(b.p2 - a.p1);
    let (lo, hi) = if p1 < p2 { (p1, p2) } else { (p2, p1) };
    lo.max(0) < hi.min(l)
}

fn group_by_subject(markers: &[Marker]) -> BTreeMap<usize, Vec<usize>> {
    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, m) in markers.iter().enumerate() {
        groups.entry(m.subject).or_default().push(i);
    }
    groups
}

/// Apply the opposite filter: a marker is "opposite" when another marker of the same subject
/// polygon has its first edge running the other way with overlapping projection.
pub fn apply_opposite_filter(markers: Vec<Marker>, filter: OppositeFilter) -> Vec<Marker> {
    if filter == OppositeFilter::NoOppositeFilter {
        return markers;
    }
    let mut keep = vec![true; markers.len()];
    for group in group_by_subject(&markers).values() {
        for &i in group {
            let opposite = group
                .iter()
                .any(|&j| j != i && opposite_edges(&markers[i].pair.first, &markers[j].pair.first));
            keep[i] = match filter {
                OppositeFilter::OnlyOpposite => opposite,
                OppositeFilter::NotOpposite => !opposite,
                OppositeFilter::NoOppositeFilter => true,
            };
        }
    }
    markers
        .into_iter()
        .zip(keep)
        .filter_map(|(m, k)| k.then_some(m))
        .collect()
}

/// Side of a box (0 bottom, 1 right, 2 top, 3 left) an edge lies on.
fn box_side(p: &Polygon, e: &Edge) -> Option<usize> {
    let b = p.bbox();
    if e.p1.y == b.bottom && e.p2.y == b.bottom {
        Some(0)
    } else if e.p1.x == b.right && e.p2.x == b.right {
        Some(1)
    } else if e.p1.y == b.top && e.p2.y == b.top {
        Some(2)
    } else if e.p1.x == b.left && e.p2.x == b.left {
        Some(3)
    } else {
        None
    }
}

/// Error pattern of a rectangle from the set of sides carrying markers.
fn side_pattern(sides: u8) -> RectFilter {
    match sides.count_ones() {
        0 => RectFilter::NONE,
        1 => RectFilter::ONE_SIDE,
        2 if sides == 0b0101 || sides == 0b1010 => RectFilter::TWO_OPPOSITE_SIDES,
        2 => RectFilter::TWO_CONNECTED_SIDES,
        3 => RectFilter::THREE_SIDES,
        _ => RectFilter::FOUR_SIDES,
    }
}

/// Waive all markers of rectangular subjects whose error pattern is in `filter`.
pub fn apply_rect_filter(markers: Vec<Marker>, subjects: &[&Polygon], filter: RectFilter) -> Vec<Marker> {
    if filter.is_empty() {
        return markers;
    }
    let mut keep = vec![true; markers.len()];
    for (subject, group) in group_by_subject(&markers) {
        let Some(p) = subjects.get(subject) else {
            continue;
        };
        if !p.is_box() {
            continue;
        }
        let b = p.bbox();
        if filter.contains(RectFilter::SQUARE) && b.width() != b.height() {
            continue;
        }
        let mut sides = 0u8;
        let mut all_on_sides = true;
        for &i in &group {
            let pair = &markers[i].pair;
            match box_side(p, &pair.first) {
                Some(s) => sides |= 1 << s,
                None => all_on_sides = false,
            }
            // width-like markers have their second edge on the subject too
            if let Some(s) = box_side(p, &pair.second) {
                sides |= 1 << s;
            }
        }
        let pattern = side_pattern(sides);
        if all_on_sides && pattern != RectFilter::NONE && filter.contains(pattern) {
            for &i in &group {
                keep[i] = false;
            }
        }
    }
    markers
        .into_iter()
        .zip(keep)
        .filter_map(|(m, k)| k.then_some(m))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{BBox, EdgePair};

    fn marker(first: Edge, subject: usize) -> Marker {
        Marker {
            pair: EdgePair::new(first, first),
            subject,
        }
    }

    #[test]
    fn opposite_markers() {
        let left = marker(Edge::from_coords(0, 100, 0, 0), 0);
        let right = marker(Edge::from_coords(10, 0, 10, 100), 0);
        let other = marker(Edge::from_coords(50, 0, 50, 100), 1);
        let all = vec![left, right, other];
        assert_eq!(apply_opposite_filter(all.clone(), OppositeFilter::OnlyOpposite), vec![left, right]);
        assert_eq!(apply_opposite_filter(all.clone(), OppositeFilter::NotOpposite), vec![other]);
        assert_eq!(apply_opposite_filter(all.clone(), OppositeFilter::NoOppositeFilter), all);
    }

    #[test]
    fn rect_patterns() {
        let b = Polygon::from_box(BBox::new(0, 0, 10, 10));
        let subjects = [&b];
        let one = vec![marker(Edge::from_coords(0, 10, 0, 0), 0)];
        assert!(apply_rect_filter(one.clone(), &subjects, RectFilter::ONE_SIDE).is_empty());
        assert_eq!(
            apply_rect_filter(one.clone(), &subjects, RectFilter::TWO_OPPOSITE_SIDES),
            one
        );

        let two = vec![
            marker(Edge::from_coords(0, 10, 0, 0), 0),
            marker(Edge::from_coords(10, 0, 10, 10), 0),
        ];
        assert!(apply_rect_filter(two.clone(), &subjects, RectFilter::TWO_OPPOSITE_SIDES).is_empty());
        assert!(
            apply_rect_filter(
                two.clone(),
                &subjects,
                RectFilter::TWO_OPPOSITE_SIDES | RectFilter::SQUARE
            )
            .is_empty()
        );
        assert_eq!(
            apply_rect_filter(two.clone(), &subjects, RectFilter::TWO_CONNECTED_SIDES),
            two
        );
    }
}
