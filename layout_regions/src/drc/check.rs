//! Collecting relation markers over whole edge sets.

use super::EdgeRelationFilter;
use crate::{
    boolean::edge_outside_polygon,
    core::{
        Control,
        spatial::{box_index, query_box},
    },
    geom::{Edge, EdgePair, Polygon},
    scan::{BoxScanner, BoxScanner2},
};

/// Which pairs of a single layer check are considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckScope {
    /// All pairs.
    Any,
    /// Only pairs from the same subject shape (width, notch).
    SameSubject,
    /// Only pairs from different subject shapes (isolated).
    OtherSubject,
}

/// An edge taking part in a check, with the index of the subject shape it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckEdge {
    pub edge: Edge,
    pub subject: usize,
}

impl CheckEdge {
    #[inline]
    pub fn new(edge: Edge, subject: usize) -> Self {
        CheckEdge { edge, subject }
    }
}

/// A violation marker together with the subject shape of its first edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub pair: EdgePair,
    pub subject: usize,
}

/// Runs an [EdgeRelationFilter] over all candidate pairs of one or two edge sets.
#[derive(Debug, Clone)]
pub struct DrcCollector<'a> {
    filter: &'a EdgeRelationFilter,
    scope: CheckScope,
}

impl<'a> DrcCollector<'a> {
    pub fn new(filter: &'a EdgeRelationFilter, scope: CheckScope) -> Self {
        DrcCollector { filter, scope }
    }

    /// Check all pairs within one edge set.
    pub fn collect_single(&self, edges: &[CheckEdge]) -> Vec<Marker> {
        let mut scanner = BoxScanner::with_capacity(edges.len());
        for (i, e) in edges.iter().enumerate() {
            scanner.insert(e.edge.bbox(), i);
        }

        let mut found = Vec::new();
        scanner.visit_pairs(self.filter.distance(), &mut |&i: &usize, &j: &usize| -> Control {
            let (a, b) = (&edges[i], &edges[j]);
            let in_scope = match self.scope {
                CheckScope::Any => true,
                CheckScope::SameSubject => a.subject == b.subject,
                CheckScope::OtherSubject => a.subject != b.subject,
            };
            if in_scope && let Some(pair) = self.filter.check(&a.edge, &b.edge) {
                // normalized symmetric pairs may have exchanged their edges
                let subject = if pair.first == a.edge || edge_within(&pair.first, &a.edge) {
                    a.subject
                } else {
                    b.subject
                };
                found.push((Marker { pair, subject }, i, j));
            }
            Control::Continue
        });

        let all: Vec<Edge> = edges.iter().map(|e| e.edge).collect();
        self.finish(found, &all)
    }

    /// Check all pairs between a first and a second edge set. The first edge of every marker
    /// comes from `a`.
    pub fn collect_two(&self, a: &[CheckEdge], b: &[CheckEdge]) -> Vec<Marker> {
        let mut scanner = BoxScanner2::new();
        for (i, e) in a.iter().enumerate() {
            scanner.insert_a(e.edge.bbox(), i);
        }
        for (i, e) in b.iter().enumerate() {
            scanner.insert_b(e.edge.bbox(), i);
        }

        let mut found = Vec::new();
        scanner.visit_pairs(self.filter.distance(), &mut |&i: &usize, &j: &usize| -> Control {
            if let Some(pair) = self.filter.check(&a[i].edge, &b[j].edge) {
                found.push((
                    Marker {
                        pair,
                        subject: a[i].subject,
                    },
                    i,
                    a.len() + j,
                ));
            }
            Control::Continue
        });

        let all: Vec<Edge> = a.iter().chain(b.iter()).map(|e| e.edge).collect();
        self.finish(found, &all)
    }

    fn finish(&self, found: Vec<(Marker, usize, usize)>, all: &[Edge]) -> Vec<Marker> {
        let candidates = found.len();
        let markers: Vec<Marker> = if self.filter.options().shielded && !found.is_empty() {
            let index = box_index(all.iter().map(|e| e.bbox()));
            let mut stack = Vec::new();
            found
                .into_iter()
                .filter(|(m, i, j)| !is_shielded(&m.pair, *i, *j, all, &index, &mut stack))
                .map(|(m, _, _)| m)
                .collect()
        } else {
            found.into_iter().map(|(m, _, _)| m).collect()
        };
        log::debug!(
            "{:?} check (d = {}): {} candidate markers, {} after shielding",
            self.filter.relation(),
            self.filter.distance(),
            candidates,
            markers.len()
        );
        markers
    }
}

/// True if `part` lies on `whole` (both end points on the edge).
fn edge_within(part: &Edge, whole: &Edge) -> bool {
    whole.contains(part.p1) && whole.contains(part.p2)
}

/// The area between the two marker edges.
fn marker_area(pair: &EdgePair) -> Polygon {
    let (a, b) = (pair.first, pair.second);
    if a.d().dot(b.d()) > 0 {
        Polygon::new(vec![a.p1, a.p2, b.p2, b.p1])
    } else {
        Polygon::new(vec![a.p1, a.p2, b.p1, b.p2])
    }
}

/// A marker is shielded when any other edge has a part strictly inside the area between its
/// edges.
fn is_shielded(
    pair: &EdgePair,
    i: usize,
    j: usize,
    all: &[Edge],
    index: &static_aabb2d_index::StaticAABB2DIndex<i64>,
    stack: &mut Vec<usize>,
) -> bool {
    let area = marker_area(pair);
    if area.area() == 0 {
        return false;
    }
    query_box(index, &area.bbox(), stack)
        .into_iter()
        .filter(|&k| k != i && k != j)
        .any(|k| !edge_outside_polygon(&all[k], &area))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        drc::{EdgeRelation, EdgesCheckOptions},
        geom::BBox,
    };

    fn outline(b: BBox, subject: usize) -> Vec<CheckEdge> {
        Polygon::from_box(b)
            .edges()
            .map(|e| CheckEdge::new(e, subject))
            .collect()
    }

    #[test]
    fn space_between_boxes() {
        let mut edges = outline(BBox::new(0, 0, 10, 10), 0);
        edges.extend(outline(BBox::new(15, 0, 25, 10), 1));
        let filter = EdgeRelationFilter::new(EdgeRelation::Space, 10, EdgesCheckOptions::new());

        let markers = DrcCollector::new(&filter, CheckScope::Any).collect_single(&edges);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].pair.distance(), 5);

        let notch = DrcCollector::new(&filter, CheckScope::SameSubject).collect_single(&edges);
        assert!(notch.is_empty());
    }

    #[test]
    fn shielding_suppresses_marker() {
        let mut edges = outline(BBox::new(0, 0, 10, 10), 0);
        edges.extend(outline(BBox::new(20, 0, 30, 10), 1));
        // a thin box in between shields the two outer boxes from each other
        edges.extend(outline(BBox::new(14, -5, 16, 15), 2));
        let filter = EdgeRelationFilter::new(EdgeRelation::Space, 25, EdgesCheckOptions::new());
        let shielded = DrcCollector::new(&filter, CheckScope::Any).collect_single(&edges);
        assert!(shielded.iter().all(|m| m.pair.distance() == 4));

        let unshielded_filter = EdgeRelationFilter::new(
            EdgeRelation::Space,
            25,
            EdgesCheckOptions::new().with_shielded(false),
        );
        let all = DrcCollector::new(&unshielded_filter, CheckScope::Any).collect_single(&edges);
        assert!(all.iter().any(|m| m.pair.distance() == 10));
        assert!(all.len() > shielded.len());
    }

    #[test]
    fn two_layer_markers_keep_primary_first() {
        let outer = outline(BBox::new(0, 0, 100, 100), 0);
        let inner = outline(BBox::new(5, 40, 60, 60), 0);
        let filter = EdgeRelationFilter::new(EdgeRelation::Enclosing, 10, EdgesCheckOptions::new());
        let markers = DrcCollector::new(&filter, CheckScope::Any).collect_two(&outer, &inner);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].pair.first.p1.x, 0);
        assert_eq!(markers[0].pair.second.p1.x, 5);
    }
}
