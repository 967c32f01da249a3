//! Generic scan engine: split, classify by winding, emit the boundary, link it into polygons.

use std::collections::BTreeMap;

use super::{link::assemble_polygons, locate::midpoint2};
use crate::{
    core::spatial::{box_index, extents_index},
    geom::{Edge, Point, Polygon},
    progress::{Progress, step},
};

/// Decides from the winding numbers of all layers whether a point is inside the result.
pub trait WindingEvaluator {
    fn inside(&self, wc: &[i32]) -> bool;
}

/// One layer merge: inside if more than `min_wc` shapes overlap.
#[derive(Debug, Copy, Clone)]
pub struct MergeEvaluator {
    pub min_wc: i32,
}

impl WindingEvaluator for MergeEvaluator {
    #[inline]
    fn inside(&self, wc: &[i32]) -> bool {
        wc[0] > self.min_wc
    }
}

/// Two layer boolean on the "inside" flags (winding above zero) of layer 0 and 1.
#[derive(Debug, Copy, Clone)]
pub struct BooleanEvaluator(pub super::BooleanOp);

impl WindingEvaluator for BooleanEvaluator {
    #[inline]
    fn inside(&self, wc: &[i32]) -> bool {
        let a = wc[0] > 0;
        let b = wc[1] > 0;
        match self.0 {
            super::BooleanOp::And => a && b,
            super::BooleanOp::Or => a || b,
            super::BooleanOp::Not => a && !b,
            super::BooleanOp::Xor => a != b,
        }
    }
}

/// Edge input collector and processor. Edges are tagged with their layer, a closed set of
/// contours per layer is expected (interior on the left side of each edge).
#[derive(Debug, Clone)]
pub struct BooleanEngine {
    edges: Vec<(Edge, usize)>,
    layers: usize,
    min_coherence: bool,
}

/// Coincident segments collapsed into one canonical segment (`a < b`) with the net contribution
/// per layer.
#[derive(Debug)]
struct SegmentGroup {
    a: Point,
    b: Point,
    contrib: Vec<i32>,
}

impl SegmentGroup {
    #[inline]
    fn edge(&self) -> Edge {
        Edge::new(self.a, self.b)
    }
}

impl BooleanEngine {
    pub fn new(layers: usize) -> Self {
        BooleanEngine {
            edges: Vec::new(),
            layers: layers.max(1),
            min_coherence: false,
        }
    }

    /// With `min_coherence`, polygons touching in a single point are kept separate.
    pub fn set_min_coherence(&mut self, min_coherence: bool) {
        self.min_coherence = min_coherence;
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn insert_polygon(&mut self, p: &Polygon, layer: usize) {
        debug_assert!(layer < self.layers);
        self.edges
            .extend(p.edges().filter(|e| !e.is_degenerate()).map(|e| (e, layer)));
    }

    /// Insert raw contour edges (e.g. offset contours, which may self overlap).
    pub fn insert_edges<I: IntoIterator<Item = Edge>>(&mut self, edges: I, layer: usize) {
        debug_assert!(layer < self.layers);
        self.edges.extend(
            edges
                .into_iter()
                .filter(|e| !e.is_degenerate())
                .map(|e| (e, layer)),
        );
    }

    /// Run the engine once and evaluate it with every evaluator given. Returns one polygon list
    /// per evaluator.
    pub fn process(
        &self,
        evaluators: &[&dyn WindingEvaluator],
        progress: Option<&Progress>,
    ) -> Vec<Vec<Polygon>> {
        if self.edges.is_empty() {
            return vec![Vec::new(); evaluators.len()];
        }

        let segments = split_segments(&self.edges);
        let groups = self.group(&segments);
        log::trace!(
            "boolean engine: {} input edges, {} segments, {} groups",
            self.edges.len(),
            segments.len(),
            groups.len()
        );
        let windings = classify(&groups, self.layers, progress);

        evaluators
            .iter()
            .map(|ev| {
                let mut boundary = Vec::new();
                for (g, (left, right)) in groups.iter().zip(windings.iter()) {
                    let inside_left = ev.inside(left);
                    let inside_right = ev.inside(right);
                    if inside_left && !inside_right {
                        boundary.push(g.edge());
                    } else if !inside_left && inside_right {
                        boundary.push(g.edge().reversed());
                    }
                }
                assemble_polygons(&boundary, self.min_coherence)
            })
            .collect()
    }

    fn group(&self, segments: &[(Edge, usize)]) -> Vec<SegmentGroup> {
        let mut map: BTreeMap<(Point, Point), Vec<i32>> = BTreeMap::new();
        for (e, layer) in segments {
            let (key, sign) = if e.p1 < e.p2 {
                ((e.p1, e.p2), 1)
            } else {
                ((e.p2, e.p1), -1)
            };
            map.entry(key).or_insert_with(|| vec![0; self.layers])[*layer] += sign;
        }
        map.into_iter()
            .filter(|(_, c)| c.iter().any(|&v| v != 0))
            .map(|((a, b), contrib)| SegmentGroup { a, b, contrib })
            .collect()
    }
}

/// Upper bound on snap rounds, each round only splits at points created by the previous one.
const MAX_SNAP_ROUNDS: usize = 32;

/// Split all edges at their mutual intersection points (crossings rounded to the grid).
///
/// Rounding moves a crossing off the original lines, so the pieces may cross or touch other
/// pieces again. Splitting repeats until no piece crosses another one and no end point lies in
/// the interior of another piece.
fn split_segments(edges: &[(Edge, usize)]) -> Vec<(Edge, usize)> {
    let mut segments = edges.to_vec();
    for round in 0..MAX_SNAP_ROUNDS {
        let (next, changed) = split_once(&segments);
        segments = next;
        if !changed {
            return segments;
        }
        log::trace!("boolean engine: snap round {round}, {} segments", segments.len());
    }
    log::debug!("boolean engine: snap rounding did not settle after {MAX_SNAP_ROUNDS} rounds");
    segments
}

/// One splitting round. Returns the pieces and whether anything was split.
fn split_once(edges: &[(Edge, usize)]) -> (Vec<(Edge, usize)>, bool) {
    let index = box_index(edges.iter().map(|(e, _)| e.bbox()));
    let mut splits: Vec<Vec<Point>> = vec![Vec::new(); edges.len()];
    let mut stack = Vec::new();
    let mut candidates = Vec::new();

    for (i, (ei, _)) in edges.iter().enumerate() {
        candidates.clear();
        let (l, b, r, t) = ei.bbox().index_extents();
        let mut visitor = |j: usize| {
            if j > i {
                candidates.push(j);
            }
        };
        index.visit_query_with_stack(l, b, r, t, &mut visitor, &mut stack);

        for &j in &candidates {
            let ej = &edges[j].0;
            for p in [ej.p1, ej.p2] {
                if ei.contains_excl(p) {
                    splits[i].push(p);
                }
            }
            for p in [ei.p1, ei.p2] {
                if ej.contains_excl(p) {
                    splits[j].push(p);
                }
            }
            if ei.crosses(ej) {
                let p = ei.line_intersection_unchecked(ej);
                if p != ei.p1 && p != ei.p2 {
                    splits[i].push(p);
                }
                if p != ej.p1 && p != ej.p2 {
                    splits[j].push(p);
                }
            }
        }
    }

    let mut changed = false;
    let mut result = Vec::with_capacity(edges.len());
    for ((e, layer), mut pts) in edges.iter().zip(splits) {
        if pts.is_empty() {
            result.push((*e, *layer));
            continue;
        }
        changed = true;
        let d = e.d();
        pts.sort_by_key(|p| (d.dot(*p - e.p1), *p));
        pts.dedup();
        let mut last = e.p1;
        for p in pts {
            if p != last {
                result.push((Edge::new(last, p), *layer));
                last = p;
            }
        }
        if last != e.p2 {
            result.push((Edge::new(last, e.p2), *layer));
        }
    }
    (result, changed)
}

/// Winding numbers per layer on the left and right side of every group.
fn classify(
    groups: &[SegmentGroup],
    layers: usize,
    progress: Option<&Progress>,
) -> Vec<(Vec<i32>, Vec<i32>)> {
    let index = extents_index(groups.iter().map(|g| {
        let b = g.edge().bbox();
        (
            2 * b.left as i64,
            2 * b.bottom as i64,
            2 * b.right as i64,
            2 * b.top as i64,
        )
    }));
    let mut stack = Vec::new();
    let mut result = Vec::with_capacity(groups.len());

    for (gi, g) in groups.iter().enumerate() {
        step(progress);
        let q = midpoint2(&g.edge());
        let mut w = vec![0i32; layers];

        if g.a.x != g.b.x {
            // downward ray: w collects the winding right of (below) the group
            let mut visitor = |j: usize| {
                if j == gi {
                    return;
                }
                let o = &groups[j];
                if o.a.x == o.b.x {
                    return;
                }
                let (lo, hi) = (2 * o.a.x as i64, 2 * o.b.x as i64);
                if q.0 < lo || q.0 >= hi {
                    return;
                }
                if super::locate::side2(&o.edge(), q) > 0 {
                    for (wl, c) in w.iter_mut().zip(o.contrib.iter()) {
                        *wl += c;
                    }
                }
            };
            index.visit_query_with_stack(q.0, i64::MIN / 4, q.0, q.1, &mut visitor, &mut stack);
            let left: Vec<i32> = w.iter().zip(g.contrib.iter()).map(|(a, c)| a + c).collect();
            result.push((left, w));
        } else {
            // leftward ray: w collects the winding left of the (upward) group
            let mut visitor = |j: usize| {
                if j == gi {
                    return;
                }
                let o = &groups[j];
                if o.a.y == o.b.y {
                    return;
                }
                let (u, v, sign) = if o.a.y < o.b.y {
                    (o.a, o.b, -1)
                } else {
                    (o.b, o.a, 1)
                };
                let (lo, hi) = (2 * u.y as i64, 2 * v.y as i64);
                if q.1 < lo || q.1 >= hi {
                    return;
                }
                if super::locate::side2(&Edge::new(u, v), q) < 0 {
                    for (wl, c) in w.iter_mut().zip(o.contrib.iter()) {
                        *wl += sign * c;
                    }
                }
            };
            index.visit_query_with_stack(i64::MIN / 4, q.1, q.0, q.1, &mut visitor, &mut stack);
            let right: Vec<i32> = w.iter().zip(g.contrib.iter()).map(|(a, c)| a - c).collect();
            result.push((w, right));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{boolean::BooleanOp, geom::BBox};

    fn merge(polys: &[Polygon], min_wc: i32) -> Vec<Polygon> {
        let mut engine = BooleanEngine::new(1);
        for p in polys {
            engine.insert_polygon(p, 0);
        }
        engine
            .process(&[&MergeEvaluator { min_wc }], None)
            .pop()
            .unwrap()
    }

    #[test]
    fn split_crossing_edges() {
        let s = split_segments(&[
            (Edge::from_coords(0, 0, 10, 10), 0),
            (Edge::from_coords(0, 10, 10, 0), 0),
        ]);
        assert_eq!(s.len(), 4);
        assert!(s.iter().any(|(e, _)| *e == Edge::from_coords(0, 0, 5, 5)));
    }

    #[test]
    fn merge_overlapping_boxes() {
        let r = merge(
            &[
                Polygon::from_box(BBox::new(0, 0, 10, 10)),
                Polygon::from_box(BBox::new(5, 5, 15, 15)),
            ],
            0,
        );
        assert_eq!(r.len(), 1);
        assert_eq!(r[0].area(), 175);
        assert_eq!(r[0].vertex_count(), 8);
    }

    #[test]
    fn min_wc_keeps_overlap_only() {
        let r = merge(
            &[
                Polygon::from_box(BBox::new(0, 0, 10, 10)),
                Polygon::from_box(BBox::new(5, 5, 15, 15)),
            ],
            1,
        );
        assert_eq!(r, vec![Polygon::from_box(BBox::new(5, 5, 10, 10))]);
    }

    #[test]
    fn abutting_boxes_merge() {
        let r = merge(
            &[
                Polygon::from_box(BBox::new(0, 0, 10, 10)),
                Polygon::from_box(BBox::new(10, 0, 20, 10)),
            ],
            0,
        );
        assert_eq!(r, vec![Polygon::from_box(BBox::new(0, 0, 20, 10))]);
    }

    #[test]
    fn frame_gives_hole() {
        let mut engine = BooleanEngine::new(2);
        engine.insert_polygon(&Polygon::from_box(BBox::new(0, 0, 30, 30)), 0);
        engine.insert_polygon(&Polygon::from_box(BBox::new(10, 10, 20, 20)), 1);
        let r = engine
            .process(&[&BooleanEvaluator(BooleanOp::Not)], None)
            .pop()
            .unwrap();
        assert_eq!(r.len(), 1);
        assert_eq!(r[0].hole_count(), 1);
        assert_eq!(r[0].area(), 800);
    }

    #[test]
    fn corner_touching_coherence() {
        let boxes = [
            Polygon::from_box(BBox::new(0, 0, 10, 10)),
            Polygon::from_box(BBox::new(10, 10, 20, 20)),
        ];
        let mut engine = BooleanEngine::new(1);
        for p in &boxes {
            engine.insert_polygon(p, 0);
        }
        let joined = engine.process(&[&MergeEvaluator { min_wc: 0 }], None);
        assert_eq!(joined[0].len(), 1);
        assert_eq!(joined[0][0].area(), 200);

        engine.set_min_coherence(true);
        let separate = engine.process(&[&MergeEvaluator { min_wc: 0 }], None);
        assert_eq!(separate[0].len(), 2);
    }
}
