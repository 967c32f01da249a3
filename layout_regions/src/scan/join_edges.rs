//! Joining connected edges into chains and turning them into polygons.

use std::collections::{HashMap, VecDeque};

use super::clusterer::{BoxClusterer, ClusterReceiver};
use crate::{
    boolean::{BooleanEngine, BooleanEvaluator, BooleanOp, MergeEvaluator, sized_contours},
    core::math::Vector2,
    geom::{Coord, Edge, Point, Polygon, compress_contour, contour_area2},
};

/// Corners with a miter longer than this factor times the offset are beveled.
const MITER_LIMIT: f64 = 2.0;

/// A maximal chain of connected edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeChain {
    /// Open chain from the first to the last point.
    Open(Vec<Point>),
    /// Closed loop, the last point connects back to the first.
    Closed(Vec<Point>),
}

/// Cluster receiver turning connected edges into polygons.
///
/// Open chains become path polygons: extended by `ext_b` at the start and `ext_e` at the end, by
/// `ext_o` to the right and `ext_i` to the left of the chain direction. Closed loops become the
/// loop sized outwards by `ext_o`; when `ext_i` is non-zero the loop sized inwards by `ext_i` is
/// cut out, producing a ring.
#[derive(Debug, Clone)]
pub struct JoinEdgesCluster {
    ext_b: Coord,
    ext_e: Coord,
    ext_o: Coord,
    ext_i: Coord,
    output: Vec<Polygon>,
}

impl JoinEdgesCluster {
    pub fn new(ext_b: Coord, ext_e: Coord, ext_o: Coord, ext_i: Coord) -> Self {
        JoinEdgesCluster {
            ext_b,
            ext_e,
            ext_o,
            ext_i,
            output: Vec::new(),
        }
    }

    /// Polygons produced so far.
    pub fn output(&self) -> &[Polygon] {
        &self.output
    }

    pub fn into_output(self) -> Vec<Polygon> {
        self.output
    }

    /// Turn one cluster of edges into polygons.
    pub fn join(&self, edges: &[Edge]) -> Vec<Polygon> {
        let mut result = Vec::new();
        for chain in edge_chains(edges) {
            match chain {
                EdgeChain::Open(pts) => result.extend(self.open_chain_polygons(&pts)),
                EdgeChain::Closed(pts) => result.extend(self.closed_loop_polygons(&pts)),
            }
        }
        result
    }

    fn open_chain_polygons(&self, pts: &[Point]) -> Vec<Polygon> {
        if self.ext_o.saturating_add(self.ext_i) <= 0 {
            return Vec::new();
        }
        let mut path: Vec<Vector2> = pts.iter().map(|p| p.to_vector2()).collect();
        let n = path.len();
        let t_first = (path[1] - path[0]).normalize();
        let t_last = (path[n - 1] - path[n - 2]).normalize();
        path[0] = path[0] - t_first.scale(self.ext_b as f64);
        path[n - 1] = path[n - 1] + t_last.scale(self.ext_e as f64);

        let right = offset_path(&path, self.ext_o as f64);
        let left = offset_path(&path, -(self.ext_i as f64));
        let contour: Vec<Point> = right
            .into_iter()
            .chain(left.into_iter().rev())
            .map(Point::from_vector2)
            .collect();

        let mut engine = BooleanEngine::new(1);
        engine.insert_edges(closed_edges(&contour), 0);
        engine
            .process(&[&MergeEvaluator { min_wc: 0 }], None)
            .pop()
            .unwrap_or_default()
    }

    fn closed_loop_polygons(&self, pts: &[Point]) -> Vec<Polygon> {
        let mut contour = compress_contour(pts);
        if contour.len() < 3 {
            return Vec::new();
        }
        if contour_area2(&contour) < 0 {
            contour.reverse();
        }

        let outer = sized_contours([contour.as_slice()], self.ext_o, false);
        if self.ext_i == 0 {
            return outer;
        }

        // inner offsets beyond the loop's own width leave nothing to cut out
        let inner = sized_contours([contour.as_slice()], -self.ext_i, false);
        let mut engine = BooleanEngine::new(2);
        for p in &outer {
            engine.insert_polygon(p, 0);
        }
        for p in &inner {
            engine.insert_polygon(p, 1);
        }
        engine
            .process(&[&BooleanEvaluator(BooleanOp::Not)], None)
            .pop()
            .unwrap_or_default()
    }
}

impl ClusterReceiver<Edge> for JoinEdgesCluster {
    fn cluster(&mut self, members: &[&Edge]) {
        let edges: Vec<Edge> = members.iter().map(|e| **e).collect();
        let polygons = self.join(&edges);
        self.output.extend(polygons);
    }
}

fn closed_edges(pts: &[Point]) -> impl Iterator<Item = Edge> + '_ {
    let n = pts.len();
    (0..n).map(move |i| Edge::new(pts[i], pts[(i + 1) % n]))
}

/// Offset an open path to its right side by `d` with miter joins.
fn offset_path(path: &[Vector2], d: f64) -> Vec<Vector2> {
    let n = path.len();
    let right_normal = |t: Vector2| Vector2::new(t.y, -t.x);
    let mut result = Vec::with_capacity(n + 2);
    for i in 0..n {
        let t_in = if i > 0 {
            Some((path[i] - path[i - 1]).normalize())
        } else {
            None
        };
        let t_out = if i + 1 < n {
            Some((path[i + 1] - path[i]).normalize())
        } else {
            None
        };
        match (t_in, t_out) {
            (Some(t), None) | (None, Some(t)) => {
                result.push(path[i] + right_normal(t).scale(d));
            }
            (Some(t1), Some(t2)) => {
                let n1 = right_normal(t1);
                let n2 = right_normal(t2);
                let s = 1.0 + n1.dot(n2);
                if s > 2.0 / (MITER_LIMIT * MITER_LIMIT) {
                    result.push(path[i] + (n1 + n2).scale(d / s));
                } else {
                    result.push(path[i] + n1.scale(d));
                    result.push(path[i] + n2.scale(d));
                }
            }
            (None, None) => {}
        }
    }
    result
}

/// Split edges into maximal chains. Edges are followed in their own direction where possible and
/// flipped where needed; the first edge of a chain determines its direction. Degenerate edges
/// are ignored.
pub fn edge_chains(edges: &[Edge]) -> Vec<EdgeChain> {
    let mut at_point: HashMap<Point, Vec<usize>> = HashMap::new();
    for (i, e) in edges.iter().enumerate() {
        if e.is_degenerate() {
            continue;
        }
        at_point.entry(e.p1).or_default().push(i);
        at_point.entry(e.p2).or_default().push(i);
    }

    let mut used: Vec<bool> = edges.iter().map(|e| e.is_degenerate()).collect();
    // next unused edge at `p`, preferring edges starting (forward) or ending (backward) there
    let take = |p: Point, forward: bool, used: &mut Vec<bool>| -> Option<Point> {
        let candidates = at_point.get(&p)?;
        let pick = candidates
            .iter()
            .copied()
            .filter(|&j| !used[j])
            .min_by_key(|&j| {
                let natural = if forward { edges[j].p1 == p } else { edges[j].p2 == p };
                !natural
            })?;
        used[pick] = true;
        let e = &edges[pick];
        Some(if e.p1 == p { e.p2 } else { e.p1 })
    };

    let mut chains = Vec::new();
    for start in 0..edges.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let mut pts = VecDeque::from([edges[start].p1, edges[start].p2]);

        let mut closed = false;
        while let Some(next) = take(*pts.back().unwrap_or(&edges[start].p2), true, &mut used) {
            if Some(&next) == pts.front() {
                closed = true;
                break;
            }
            pts.push_back(next);
        }
        if !closed {
            while let Some(prev) = take(*pts.front().unwrap_or(&edges[start].p1), false, &mut used) {
                if Some(&prev) == pts.back() {
                    closed = true;
                    break;
                }
                pts.push_front(prev);
            }
        }

        let pts: Vec<Point> = pts.into_iter().collect();
        chains.push(if closed {
            EdgeChain::Closed(pts)
        } else {
            EdgeChain::Open(pts)
        });
    }
    chains
}

/// Extend every edge into a box-like polygon: `ext_b` before its start, `ext_e` beyond its end,
/// `ext_o` to its right and `ext_i` to its left.
pub fn extended_edge(edge: &Edge, ext_b: Coord, ext_e: Coord, ext_o: Coord, ext_i: Coord) -> Option<Polygon> {
    if edge.is_degenerate() || ext_o.saturating_add(ext_i) <= 0 {
        return None;
    }
    let t = edge.d().to_vector2().normalize();
    let n = Vector2::new(t.y, -t.x);
    let a = edge.p1.to_vector2() - t.scale(ext_b as f64);
    let b = edge.p2.to_vector2() + t.scale(ext_e as f64);
    let o = n.scale(ext_o as f64);
    let i = n.scale(ext_i as f64);
    let pts = vec![
        Point::from_vector2(a + o),
        Point::from_vector2(b + o),
        Point::from_vector2(b - i),
        Point::from_vector2(a - i),
    ];
    if contour_area2(&pts) <= 0 {
        return None;
    }
    Some(Polygon::new(pts))
}

/// Extended edges: per edge boxes, or with `join` set, polygons of the joined edge chains.
pub fn extended_edges(
    edges: &[Edge],
    ext_b: Coord,
    ext_e: Coord,
    ext_o: Coord,
    ext_i: Coord,
    join: bool,
) -> Vec<Polygon> {
    if !join {
        return edges
            .iter()
            .filter_map(|e| extended_edge(e, ext_b, ext_e, ext_o, ext_i))
            .collect();
    }

    let mut clusterer = BoxClusterer::new();
    for e in edges {
        clusterer.insert(e.bbox(), *e);
    }
    let mut receiver = JoinEdgesCluster::new(ext_b, ext_e, ext_o, ext_i);
    clusterer.process(
        0,
        |a: &Edge, b: &Edge| a.p1 == b.p1 || a.p1 == b.p2 || a.p2 == b.p1 || a.p2 == b.p2,
        &mut receiver,
    );
    receiver.into_output()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::BBox;

    #[test]
    fn chains_open_and_closed() {
        let edges = vec![
            Edge::from_coords(0, 100, 0, 0),
            Edge::from_coords(100, 0, 0, 0),
            Edge::from_coords(100, 0, 100, 100),
        ];
        let chains = edge_chains(&edges);
        assert_eq!(
            chains,
            vec![EdgeChain::Open(vec![
                Point::new(0, 100),
                Point::new(0, 0),
                Point::new(100, 0),
                Point::new(100, 100)
            ])]
        );

        let outline: Vec<Edge> = Polygon::from_box(BBox::new(0, 0, 10, 10)).edges().collect();
        let chains = edge_chains(&outline);
        assert_eq!(chains.len(), 1);
        assert!(matches!(&chains[0], EdgeChain::Closed(p) if p.len() == 4));
    }

    #[test]
    fn single_edge_extension() {
        let e = Edge::from_coords(0, 0, 100, 0);
        let p = extended_edge(&e, 5, 10, 2, 3).unwrap();
        assert_eq!(p.bbox(), BBox::new(-5, -2, 110, 3));
        assert_eq!(p.area(), 115 * 5);
        assert!(extended_edge(&e, 0, 0, 0, 0).is_none());
    }

    #[test]
    fn open_chain_is_single_polygon() {
        let edges = vec![
            Edge::from_coords(0, 100, 0, 0),
            Edge::from_coords(0, 0, 100, 0),
            Edge::from_coords(100, 0, 100, 100),
        ];
        let result = extended_edges(&edges, 0, 0, 10, 0, true);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].hole_count(), 0);
        assert_eq!(result[0].bbox(), BBox::new(-10, -10, 110, 100));
        assert_eq!(result[0].area(), 110 * 10 * 2 + 100 * 10);
    }

    #[test]
    fn closed_loop_ring_and_fill() {
        let outline: Vec<Edge> = Polygon::from_box(BBox::new(0, 0, 100, 100)).edges().collect();
        let ring = extended_edges(&outline, 0, 0, 0, 10, true);
        assert_eq!(ring.len(), 1);
        assert_eq!(ring[0].hole_count(), 1);
        assert_eq!(ring[0].area(), 100 * 100 - 80 * 80);

        let filled = extended_edges(&outline, 0, 0, 5, 0, true);
        assert_eq!(filled, vec![Polygon::from_box(BBox::new(-5, -5, 105, 105))]);

        // an inner extension beyond the half width leaves no hole
        let full = extended_edges(&outline, 0, 0, 0, 60, true);
        assert_eq!(full, vec![Polygon::from_box(BBox::new(0, 0, 100, 100))]);
    }
}
