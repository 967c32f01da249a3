//! Linking of oriented boundary edges into closed loops and loops into polygons.

use std::{cmp::Ordering, collections::HashMap};

use super::locate::{contour_contains2, midpoint2};
use crate::{
    core::spatial::{box_index, query_box},
    geom::{BBox, Edge, Point, Polygon, Vector},
};

/// Angular class of `v` measured counter clockwise from `r`: 0 for `(0, pi)`, 1 for `[pi, 2pi)`
/// and 2 for the direction of `r` itself (sorted as a full turn).
fn ccw_half(r: Vector, v: Vector) -> u8 {
    let c = r.cross(v);
    if c > 0 {
        0
    } else if c < 0 || r.dot(v) < 0 {
        1
    } else {
        2
    }
}

/// Order of `a` and `b` by their counter clockwise angle from `r`.
fn cmp_ccw_from(r: Vector, a: Vector, b: Vector) -> Ordering {
    let ha = ccw_half(r, a);
    let hb = ccw_half(r, b);
    if ha != hb {
        return ha.cmp(&hb);
    }
    match a.cross(b) {
        c if c > 0 => Ordering::Less,
        c if c < 0 => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// Link oriented edges (interior on the left) into closed loops.
///
/// At vertices with several outgoing edges the sharpest left turn is taken with
/// `min_coherence` (loops touching in a point stay separate), the sharpest right turn otherwise
/// (loops touching in a point are joined).
pub(crate) fn link_loops(edges: &[Edge], min_coherence: bool) -> Vec<Vec<Point>> {
    let mut outgoing: HashMap<Point, Vec<usize>> = HashMap::new();
    for (i, e) in edges.iter().enumerate() {
        outgoing.entry(e.p1).or_default().push(i);
    }

    let select = |cur: usize, filter: &dyn Fn(usize) -> bool| -> Option<usize> {
        let e = &edges[cur];
        let r = -e.d();
        let candidates = outgoing.get(&e.p2)?;
        let iter = candidates.iter().copied().filter(|&i| filter(i));
        if min_coherence {
            iter.max_by(|&a, &b| cmp_ccw_from(r, edges[a].d(), edges[b].d()))
        } else {
            iter.min_by(|&a, &b| cmp_ccw_from(r, edges[a].d(), edges[b].d()))
        }
    };

    let mut used = vec![false; edges.len()];
    let mut loops = Vec::new();
    for start in 0..edges.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let mut contour = vec![edges[start].p1];
        let mut cur = start;
        let mut loop_count = 0;
        loop {
            loop_count += 1;
            if loop_count > edges.len() {
                unreachable!("internal library error: edge linking did not terminate");
            }
            let next = match select(cur, &|_| true) {
                Some(n) if n == start => break,
                Some(n) if !used[n] => n,
                _ => match select(cur, &|i| !used[i]) {
                    Some(n) => n,
                    None => break,
                },
            };
            contour.push(edges[cur].p2);
            used[next] = true;
            cur = next;
        }
        if contour.len() >= 3 {
            loops.push(contour);
        }
    }
    loops
}

/// Link edges into loops and build polygons: counter clockwise loops become hulls, clockwise
/// loops become holes of the smallest hull enclosing them.
pub(crate) fn assemble_polygons(edges: &[Edge], min_coherence: bool) -> Vec<Polygon> {
    let loops = link_loops(edges, min_coherence);

    let mut hulls: Vec<(Vec<Point>, i64)> = Vec::new();
    let mut holes: Vec<Vec<Point>> = Vec::new();
    for l in loops {
        let a = crate::geom::contour_area2(&l);
        if a > 0 {
            hulls.push((l, a));
        } else if a < 0 {
            holes.push(l);
        }
    }

    let hull_boxes: Vec<BBox> = hulls.iter().map(|(h, _)| contour_bbox(h)).collect();
    let index = box_index(hull_boxes.iter().copied());
    let mut stack = Vec::new();
    let mut hull_holes: Vec<Vec<Vec<Point>>> = vec![Vec::new(); hulls.len()];

    for hole in holes {
        let hb = contour_bbox(&hole);
        let q = midpoint2(&Edge::new(hole[0], hole[1]));
        let owner = query_box(&index, &hb, &mut stack)
            .into_iter()
            .filter(|&i| hull_boxes[i].contains_box(&hb) && contour_contains2(&hulls[i].0, q))
            .min_by_key(|&i| hulls[i].1);
        match owner {
            Some(i) => hull_holes[i].push(hole),
            None => log::debug!("dropping orphan hole at {:?}", hb),
        }
    }

    hulls
        .into_iter()
        .zip(hull_holes)
        .map(|((h, _), hs)| Polygon::with_holes(h, hs))
        .filter(|p| !p.is_empty())
        .collect()
}

fn contour_bbox(pts: &[Point]) -> BBox {
    let mut b = BBox::empty();
    for &p in pts {
        b.add_point(p);
    }
    b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angular_order() {
        let r = Vector::new(0, -1);
        // right turn (east) comes before straight (north) before left turn (west)
        assert_eq!(
            cmp_ccw_from(r, Vector::new(1, 0), Vector::new(0, 1)),
            Ordering::Less
        );
        assert_eq!(
            cmp_ccw_from(r, Vector::new(0, 1), Vector::new(-1, 0)),
            Ordering::Less
        );
        assert_eq!(
            cmp_ccw_from(r, Vector::new(-1, 0), Vector::new(0, -1)),
            Ordering::Less
        );
    }

    #[test]
    fn nested_holes_go_to_innermost_hull() {
        let outer = Polygon::from_box(BBox::new(0, 0, 100, 100));
        let hole1 = Polygon::from_box(BBox::new(10, 10, 90, 90));
        let inner = Polygon::from_box(BBox::new(20, 20, 80, 80));
        let hole2 = Polygon::from_box(BBox::new(30, 30, 70, 70));
        let mut edges: Vec<Edge> = outer.edges().chain(inner.edges()).collect();
        edges.extend(hole1.edges().map(|e| e.reversed()));
        edges.extend(hole2.edges().map(|e| e.reversed()));
        let mut polys = assemble_polygons(&edges, false);
        polys.sort();
        assert_eq!(polys.len(), 2);
        assert!(polys.iter().all(|p| p.hole_count() == 1));
        assert_eq!(polys.iter().map(|p| p.area()).sum::<i64>(), 3600 + 2000);
    }
}
