//! Boolean operations on edges based on the coverage along their supporting lines.
//!
//! Edges on the same infinite line are cut into elementary pieces at every end point. Each piece
//! records which orientations of the first and second operand cover it, the operation selects the
//! pieces to keep, and runs of kept pieces are joined into edges again. Parts of the first operand
//! keep its orientation, parts only covered by the second operand keep the second operand's
//! orientation. Antiparallel edges are never joined.

use std::collections::BTreeMap;

use super::BooleanOp;
use crate::{
    core::spatial::{box_index, query_box},
    geom::{Edge, Point, Vector},
    properties::{PropertiesId, WithProperties},
};

#[derive(Debug, Copy, Clone)]
enum Mode {
    Merge,
    Op(BooleanOp),
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a.abs()
}

/// Primitive direction of the supporting line (canonical sign), the line offset and whether the
/// edge runs along the canonical direction.
fn line_of(e: &Edge) -> (Vector, i128, bool) {
    let (dx, dy) = (e.dx() as i64, e.dy() as i64);
    let g = gcd(dx, dy).max(1);
    let mut dir = Vector::new((dx / g) as i32, (dy / g) as i32);
    let mut fwd = true;
    if dir.x < 0 || (dir.x == 0 && dir.y < 0) {
        dir = -dir;
        fwd = false;
    }
    (dir, dir.cross(e.p1.to_vector()), fwd)
}

#[derive(Debug)]
struct Interval {
    t1: i128,
    t2: i128,
    fwd: bool,
    prop_id: PropertiesId,
    second: bool,
}

#[derive(Debug)]
struct Line {
    base: Point,
    intervals: Vec<Interval>,
}

#[derive(Debug, Default, Clone, Copy)]
struct Cover {
    // [operand][orientation: 0 forward, 1 backward]
    by: [[Option<PropertiesId>; 2]; 2],
}

impl Cover {
    fn add(&mut self, second: bool, fwd: bool, id: PropertiesId) {
        let slot = &mut self.by[second as usize][(!fwd) as usize];
        *slot = Some(match *slot {
            Some(old) => old.max_content(id),
            None => id,
        });
    }

    fn any(&self, second: bool) -> bool {
        self.by[second as usize].iter().any(|s| s.is_some())
    }
}

fn point_at(dir: Vector, base: Point, t: i128) -> Point {
    let t0 = dir.dot(base.to_vector());
    let k = (t - t0) / dir.sq_length() as i128;
    Point::new(
        (base.x as i128 + dir.x as i128 * k) as i32,
        (base.y as i128 + dir.y as i128 * k) as i32,
    )
}

fn run(
    a: &[WithProperties<Edge>],
    b: &[WithProperties<Edge>],
    mode: Mode,
) -> Vec<WithProperties<Edge>> {
    let mut lines: BTreeMap<(Vector, i128), Line> = BTreeMap::new();
    for (second, edges) in [(false, a), (true, b)] {
        for e in edges.iter().filter(|e| !e.shape.is_degenerate()) {
            let (dir, offset, fwd) = line_of(&e.shape);
            let line = lines.entry((dir, offset)).or_insert_with(|| Line {
                base: e.shape.p1,
                intervals: Vec::new(),
            });
            let u = dir.dot(e.shape.p1.to_vector());
            let v = dir.dot(e.shape.p2.to_vector());
            line.intervals.push(Interval {
                t1: u.min(v),
                t2: u.max(v),
                fwd,
                prop_id: e.prop_id,
                second,
            });
        }
    }

    let mut result = Vec::new();
    for ((dir, _), line) in lines {
        let mut bps: Vec<i128> = line
            .intervals
            .iter()
            .flat_map(|i| [i.t1, i.t2])
            .collect();
        bps.sort_unstable();
        bps.dedup();
        if bps.len() < 2 {
            continue;
        }
        let mut covers = vec![Cover::default(); bps.len() - 1];
        for i in &line.intervals {
            let k1 = bps.partition_point(|&t| t < i.t1);
            let k2 = bps.partition_point(|&t| t < i.t2);
            for c in &mut covers[k1..k2] {
                c.add(i.second, i.fwd, i.prop_id);
            }
        }

        // kept pieces per orientation: (piece index, property id)
        for orient in 0..2 {
            let fwd = orient == 0;
            let mut run_start: Option<(usize, PropertiesId)> = None;
            let flush = |start: usize, end: usize, id: PropertiesId, out: &mut Vec<_>| {
                let p1 = point_at(dir, line.base, bps[start]);
                let p2 = point_at(dir, line.base, bps[end]);
                let e = if fwd { Edge::new(p1, p2) } else { Edge::new(p2, p1) };
                out.push(WithProperties::new(e, id));
            };
            for (k, c) in covers.iter().enumerate() {
                let a_here = c.by[0][orient];
                let b_here = c.by[1][orient];
                let keep = match mode {
                    Mode::Merge => a_here,
                    Mode::Op(BooleanOp::And) => a_here.filter(|_| c.any(true)),
                    Mode::Op(BooleanOp::Not) => a_here.filter(|_| !c.any(true)),
                    Mode::Op(BooleanOp::Or) => a_here.or(b_here.filter(|_| !c.any(false))),
                    Mode::Op(BooleanOp::Xor) => a_here
                        .filter(|_| !c.any(true))
                        .or(b_here.filter(|_| !c.any(false))),
                };
                match (run_start, keep) {
                    (Some((_, id)), Some(kid)) if id == kid => {}
                    (Some((s, id)), Some(kid)) => {
                        flush(s, k, id, &mut result);
                        run_start = Some((k, kid));
                    }
                    (Some((s, id)), None) => {
                        flush(s, k, id, &mut result);
                        run_start = None;
                    }
                    (None, Some(kid)) => run_start = Some((k, kid)),
                    (None, None) => {}
                }
            }
            if let Some((s, id)) = run_start {
                flush(s, covers.len(), id, &mut result);
            }
        }
    }

    result.extend(dots(a, b, mode));
    result
}

/// Point lookup on an edge set.
struct PointCover<'a> {
    edges: &'a [WithProperties<Edge>],
    index: static_aabb2d_index::StaticAABB2DIndex<i64>,
}

impl<'a> PointCover<'a> {
    fn new(edges: &'a [WithProperties<Edge>]) -> Self {
        PointCover {
            edges,
            index: box_index(edges.iter().map(|e| e.shape.bbox())),
        }
    }

    fn covers(&self, p: Point) -> bool {
        let mut stack = Vec::new();
        query_box(&self.index, &Edge::new(p, p).bbox(), &mut stack)
            .into_iter()
            .any(|i| self.edges[i].shape.contains(p))
    }
}

/// Handling of degenerate (dot) edges.
fn dots(
    a: &[WithProperties<Edge>],
    b: &[WithProperties<Edge>],
    mode: Mode,
) -> Vec<WithProperties<Edge>> {
    let a_dots: Vec<&WithProperties<Edge>> = a.iter().filter(|e| e.shape.is_degenerate()).collect();
    let b_dots: Vec<&WithProperties<Edge>> = b.iter().filter(|e| e.shape.is_degenerate()).collect();
    if a_dots.is_empty() && b_dots.is_empty() {
        return Vec::new();
    }

    let a_cover = PointCover::new(a);
    let b_cover = PointCover::new(b);
    let on_a = |p: Point| a_cover.covers(p);
    let on_b = |p: Point| b_cover.covers(p);

    let mut result: Vec<WithProperties<Edge>> = Vec::new();
    let mut push = |e: &WithProperties<Edge>| {
        if !result.iter().any(|r| r.shape == e.shape) {
            result.push(e.clone());
        }
    };
    match mode {
        Mode::Merge => a_dots.iter().for_each(|d| push(*d)),
        Mode::Op(BooleanOp::And) => a_dots
            .iter()
            .filter(|d| on_b(d.shape.p1))
            .for_each(|d| push(*d)),
        Mode::Op(BooleanOp::Not) => a_dots
            .iter()
            .filter(|d| !on_b(d.shape.p1))
            .for_each(|d| push(*d)),
        Mode::Op(BooleanOp::Or) => {
            a_dots.iter().for_each(|d| push(*d));
            b_dots
                .iter()
                .filter(|d| !on_a(d.shape.p1))
                .for_each(|d| push(*d));
        }
        Mode::Op(BooleanOp::Xor) => {
            a_dots
                .iter()
                .filter(|d| !on_b(d.shape.p1))
                .for_each(|d| push(*d));
            b_dots
                .iter()
                .filter(|d| !on_a(d.shape.p1))
                .for_each(|d| push(*d));
        }
    }
    result
}

/// Merge collinear overlapping or touching edges of the same orientation.
pub fn merge_edges(edges: &[WithProperties<Edge>]) -> Vec<WithProperties<Edge>> {
    run(edges, &[], Mode::Merge)
}

/// Boolean operation between two edge sets.
pub fn boolean_edges(
    a: &[WithProperties<Edge>],
    b: &[WithProperties<Edge>],
    op: BooleanOp,
) -> Vec<WithProperties<Edge>> {
    run(a, b, Mode::Op(op))
}

/// Common parts of two edge sets plus the crossing points of non-parallel edges as dot edges.
pub fn edge_intersections(
    a: &[WithProperties<Edge>],
    b: &[WithProperties<Edge>],
) -> Vec<WithProperties<Edge>> {
    let mut result = run(a, b, Mode::Op(BooleanOp::And));

    let index = box_index(b.iter().map(|e| e.shape.bbox()));
    let mut stack = Vec::new();
    let mut points: Vec<(Point, PropertiesId)> = Vec::new();
    for ea in a {
        for i in query_box(&index, &ea.shape.bbox(), &mut stack) {
            if let Some(p) = ea.shape.crossing_point(&b[i].shape)
                && !points.iter().any(|(q, _)| *q == p)
            {
                points.push((p, ea.prop_id));
            }
        }
    }
    result.extend(
        points
            .into_iter()
            .map(|(p, id)| WithProperties::new(Edge::new(p, p), id)),
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(edges: Vec<Edge>) -> Vec<WithProperties<Edge>> {
        edges.into_iter().map(WithProperties::plain).collect()
    }

    fn shapes(edges: Vec<WithProperties<Edge>>) -> Vec<Edge> {
        let mut r: Vec<Edge> = edges.into_iter().map(|e| e.shape).collect();
        r.sort();
        r
    }

    #[test]
    fn merge_collinear() {
        let e = plain(edge_list![(0, 0, 10, 0), (5, 0, 20, 0), (20, 0, 30, 0), (40, 0, 30, 0)]);
        assert_eq!(
            shapes(merge_edges(&e)),
            vec![
                Edge::from_coords(0, 0, 30, 0),
                Edge::from_coords(40, 0, 30, 0)
            ]
        );
    }

    #[test]
    fn boolean_orientation() {
        let a = plain(edge_list![(0, 0, 20, 0)]);
        let b = plain(edge_list![(30, 0, 10, 0)]);
        assert_eq!(
            shapes(boolean_edges(&a, &b, BooleanOp::And)),
            vec![Edge::from_coords(10, 0, 20, 0)]
        );
        assert_eq!(
            shapes(boolean_edges(&a, &b, BooleanOp::Not)),
            vec![Edge::from_coords(0, 0, 10, 0)]
        );
        assert_eq!(
            shapes(boolean_edges(&a, &b, BooleanOp::Xor)),
            vec![
                Edge::from_coords(0, 0, 10, 0),
                Edge::from_coords(30, 0, 20, 0)
            ]
        );
        assert_eq!(
            shapes(boolean_edges(&a, &b, BooleanOp::Or)),
            vec![
                Edge::from_coords(0, 0, 20, 0),
                Edge::from_coords(30, 0, 20, 0)
            ]
        );
    }

    #[test]
    fn diagonal_lines() {
        let a = plain(edge_list![(0, 0, 30, 20)]);
        let b = plain(edge_list![(15, 10, 60, 40)]);
        assert_eq!(
            shapes(boolean_edges(&a, &b, BooleanOp::And)),
            vec![Edge::from_coords(15, 10, 30, 20)]
        );
    }

    #[test]
    fn intersections_add_crossing_points() {
        let a = plain(edge_list![(0, 0, 10, 10)]);
        let b = plain(edge_list![(0, 10, 10, 0)]);
        assert_eq!(
            shapes(edge_intersections(&a, &b)),
            vec![Edge::from_coords(5, 5, 5, 5)]
        );
    }
}
