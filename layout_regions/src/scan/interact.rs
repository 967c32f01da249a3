//! Interaction queries between shape sets.
//!
//! All queries are two population box scans: candidates come from the [BoxScanner2], the exact
//! relation is checked with the predicates from [crate::boolean]. For each subject the set of
//! distinct partners is recorded (seen-set), so a partner reached through several candidate pairs
//! is only counted once and every subject is reported at most once.

use super::box_scanner::BoxScanner2;
use crate::{
    boolean::{
        edge_inside_polygon, edge_interacts_polygon, edge_outside_polygon, polygon_inside,
        polygons_interact, polygons_overlap,
    },
    core::Control,
    geom::{BBox, Edge, Polygon},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Relation between a subject and its partners.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionMode {
    /// Subject and partner touch or overlap.
    Interacting,
    /// Subject and partner share area.
    Overlapping,
    /// Subject is completely inside the partner.
    Inside,
    /// Subject does not share area with any partner.
    Outside,
    /// Subject completely encloses the partner.
    Enclosing,
}

/// Inclusive bounds on the number of distinct partners a subject must have to be selected.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CountBounds {
    pub min: usize,
    pub max: usize,
}

impl CountBounds {
    #[inline]
    pub fn new(min: usize, max: usize) -> Self {
        CountBounds { min, max }
    }

    /// At least one partner.
    #[inline]
    pub fn any() -> Self {
        CountBounds {
            min: 1,
            max: usize::MAX,
        }
    }

    #[inline]
    pub fn contains(&self, n: usize) -> bool {
        n >= self.min && n <= self.max
    }

    /// True if the bounds are the plain "at least one" condition, which allows the scan to stop
    /// at the first partner.
    #[inline]
    pub fn is_any(&self) -> bool {
        self.min <= 1 && self.max == usize::MAX
    }
}

impl Default for CountBounds {
    fn default() -> Self {
        Self::any()
    }
}

/// For every subject the sorted list of distinct partners for which `related` holds.
///
/// Candidate pairs are pairs whose boxes, enlarged by `enlarge`, touch.
pub fn partner_sets<A, B, R>(
    subjects: &[A],
    subject_bbox: impl Fn(&A) -> BBox,
    partners: &[B],
    partner_bbox: impl Fn(&B) -> BBox,
    mut related: R,
) -> Vec<Vec<usize>>
where
    R: FnMut(&A, &B) -> bool,
{
    let mut scanner = BoxScanner2::new();
    for (i, s) in subjects.iter().enumerate() {
        scanner.insert_a(subject_bbox(s), i);
    }
    for (i, p) in partners.iter().enumerate() {
        scanner.insert_b(partner_bbox(p), i);
    }

    let mut sets: Vec<Vec<usize>> = vec![Vec::new(); subjects.len()];
    scanner.visit_pairs(0, &mut |&a: &usize, &b: &usize| -> Control {
        if related(&subjects[a], &partners[b]) {
            sets[a].push(b);
        }
        Control::Continue
    });

    for s in sets.iter_mut() {
        s.sort_unstable();
        s.dedup();
    }
    sets
}

/// Mask of the partners that appear in any of the sets.
pub fn pulled_mask(sets: &[Vec<usize>], partner_count: usize) -> Vec<bool> {
    let mut mask = vec![false; partner_count];
    for &i in sets.iter().flatten() {
        mask[i] = true;
    }
    mask
}

/// Selection mask over subjects from their partner sets.
fn selection_mask(
    sets: &[Vec<usize>],
    mode: InteractionMode,
    bounds: CountBounds,
    inverse: bool,
) -> Vec<bool> {
    sets.iter()
        .map(|s| {
            let hit = match mode {
                InteractionMode::Interacting
                | InteractionMode::Overlapping
                | InteractionMode::Enclosing => bounds.contains(s.len()),
                InteractionMode::Inside => !s.is_empty(),
                InteractionMode::Outside => s.is_empty(),
            };
            hit != inverse
        })
        .collect()
}

/// Subject polygon related to partner polygon according to `mode`. For `Outside` the relation
/// is "shares area" and subjects without any such partner are selected.
fn polygon_relation(mode: InteractionMode) -> fn(&Polygon, &Polygon) -> bool {
    match mode {
        InteractionMode::Interacting => polygons_interact,
        InteractionMode::Overlapping | InteractionMode::Outside => polygons_overlap,
        InteractionMode::Inside => polygon_inside,
        InteractionMode::Enclosing => |s, p| polygon_inside(p, s),
    }
}

/// Select polygons by their relation to other polygons.
pub fn select_polygons(
    subjects: &[&Polygon],
    others: &[&Polygon],
    mode: InteractionMode,
    bounds: CountBounds,
    inverse: bool,
) -> Vec<bool> {
    let rel = polygon_relation(mode);
    let sets = partner_sets(
        subjects,
        |p| p.bbox(),
        others,
        |p| p.bbox(),
        |s, o| rel(s, o),
    );
    selection_mask(&sets, mode, bounds, inverse)
}

/// Mask over `others` of the polygons related to any subject polygon. The relation is seen
/// from the pulled partner: `Inside` pulls partners inside a subject, `Enclosing` partners
/// enclosing one, `Outside` partners sharing no area with any subject.
pub fn pull_polygons(
    subjects: &[&Polygon],
    others: &[&Polygon],
    mode: InteractionMode,
) -> Vec<bool> {
    let rel = polygon_relation(match mode {
        InteractionMode::Inside => InteractionMode::Enclosing,
        InteractionMode::Enclosing => InteractionMode::Inside,
        m => m,
    });
    let sets = partner_sets(
        subjects,
        |p| p.bbox(),
        others,
        |p| p.bbox(),
        |s, o| rel(s, o),
    );
    let mask = pulled_mask(&sets, others.len());
    if mode == InteractionMode::Outside {
        mask.into_iter().map(|m| !m).collect()
    } else {
        mask
    }
}

fn edge_region_relation(mode: InteractionMode) -> fn(&Edge, &Polygon) -> bool {
    match mode {
        InteractionMode::Interacting | InteractionMode::Overlapping | InteractionMode::Enclosing => {
            edge_interacts_polygon
        }
        InteractionMode::Inside => edge_inside_polygon,
        InteractionMode::Outside => |e, p| !edge_outside_polygon(e, p),
    }
}

/// Select edges by their relation to polygons (`Interacting`, `Inside` or `Outside`).
pub fn select_edges_by_polygons(
    edges: &[&Edge],
    polygons: &[&Polygon],
    mode: InteractionMode,
    bounds: CountBounds,
    inverse: bool,
) -> Vec<bool> {
    let rel = edge_region_relation(mode);
    let sets = partner_sets(edges, |e| e.bbox(), polygons, |p| p.bbox(), |e, p| rel(e, p));
    selection_mask(&sets, mode, bounds, inverse)
}

/// Mask over `polygons` of the polygons interacting with (or, for `Inside`, containing) any edge.
pub fn pull_polygons_by_edges(
    edges: &[&Edge],
    polygons: &[&Polygon],
    mode: InteractionMode,
) -> Vec<bool> {
    let rel = edge_region_relation(mode);
    let sets = partner_sets(edges, |e| e.bbox(), polygons, |p| p.bbox(), |e, p| rel(e, p));
    pulled_mask(&sets, polygons.len())
}

/// Select polygons by the number of edges interacting with them.
pub fn select_polygons_by_edges(
    polygons: &[&Polygon],
    edges: &[&Edge],
    bounds: CountBounds,
    inverse: bool,
) -> Vec<bool> {
    let sets = partner_sets(
        polygons,
        |p| p.bbox(),
        edges,
        |e| e.bbox(),
        |p, e| edge_interacts_polygon(e, p),
    );
    selection_mask(&sets, InteractionMode::Interacting, bounds, inverse)
}

/// Mask over `edges` of the edges interacting with (or, for `Inside`, inside of) any polygon.
pub fn pull_edges_by_polygons(
    polygons: &[&Polygon],
    edges: &[&Edge],
    mode: InteractionMode,
) -> Vec<bool> {
    let rel = edge_region_relation(mode);
    let sets = partner_sets(polygons, |p| p.bbox(), edges, |e| e.bbox(), |p, e| rel(e, p));
    let mask = pulled_mask(&sets, edges.len());
    if mode == InteractionMode::Outside {
        mask.into_iter().map(|m| !m).collect()
    } else {
        mask
    }
}

/// Select edges by the number of other edges they touch or cross.
pub fn select_edges_by_edges(
    edges: &[&Edge],
    others: &[&Edge],
    bounds: CountBounds,
    inverse: bool,
) -> Vec<bool> {
    let sets = partner_sets(edges, |e| e.bbox(), others, |e| e.bbox(), |a, b| a.intersects(b));
    selection_mask(&sets, InteractionMode::Interacting, bounds, inverse)
}

/// Mask over `others` of the edges touching or crossing any edge of `edges`.
pub fn pull_edges_by_edges(edges: &[&Edge], others: &[&Edge]) -> Vec<bool> {
    let sets = partner_sets(edges, |e| e.bbox(), others, |e| e.bbox(), |a, b| a.intersects(b));
    pulled_mask(&sets, others.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: i32, y: i32, s: i32) -> Polygon {
        Polygon::from_box(BBox::new(x, y, x + s, y + s))
    }

    #[test]
    fn polygon_modes() {
        let subjects = [square(0, 0, 10), square(100, 0, 10), square(200, 0, 100)];
        let others = [square(10, 0, 10), square(2, 2, 4), square(210, 10, 10)];
        let s: Vec<&Polygon> = subjects.iter().collect();
        let o: Vec<&Polygon> = others.iter().collect();

        let any = CountBounds::any();
        assert_eq!(
            select_polygons(&s, &o, InteractionMode::Interacting, any, false),
            vec![true, false, true]
        );
        assert_eq!(
            select_polygons(&s, &o, InteractionMode::Interacting, CountBounds::new(2, 2), false),
            vec![true, false, false]
        );
        assert_eq!(
            select_polygons(&s, &o, InteractionMode::Overlapping, any, false),
            vec![true, false, true]
        );
        assert_eq!(
            select_polygons(&s, &o, InteractionMode::Outside, any, false),
            vec![false, true, false]
        );
        assert_eq!(
            select_polygons(&s, &o, InteractionMode::Enclosing, any, false),
            vec![true, false, true]
        );
        assert_eq!(
            select_polygons(&s, &o, InteractionMode::Inside, any, true),
            vec![true, true, true]
        );
        assert_eq!(
            pull_polygons(&s, &o, InteractionMode::Inside),
            vec![false, true, true]
        );
        assert_eq!(
            pull_polygons(&s, &o, InteractionMode::Overlapping),
            vec![false, true, true]
        );
    }

    #[test]
    fn partners_sorted_and_distinct() {
        let subjects = [square(0, 0, 100)];
        let others = [square(10, 10, 10), square(10, 10, 10), square(50, 50, 10)];
        let s: Vec<&Polygon> = subjects.iter().collect();
        let o: Vec<&Polygon> = others.iter().collect();
        let sets = partner_sets(&s, |p| p.bbox(), &o, |p| p.bbox(), |a, b| polygons_overlap(a, b));
        assert_eq!(sets, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn edges_and_polygons() {
        let polys = [square(0, 0, 10)];
        let edges = [
            Edge::from_coords(2, 2, 8, 8),
            Edge::from_coords(-5, 5, 5, 5),
            Edge::from_coords(20, 0, 30, 0),
            Edge::from_coords(10, 0, 20, 0),
        ];
        let p: Vec<&Polygon> = polys.iter().collect();
        let e: Vec<&Edge> = edges.iter().collect();
        let any = CountBounds::any();
        assert_eq!(
            select_edges_by_polygons(&e, &p, InteractionMode::Interacting, any, false),
            vec![true, true, false, true]
        );
        assert_eq!(
            select_edges_by_polygons(&e, &p, InteractionMode::Inside, any, false),
            vec![true, false, false, false]
        );
        assert_eq!(
            select_edges_by_polygons(&e, &p, InteractionMode::Outside, any, false),
            vec![false, false, true, true]
        );
        assert_eq!(
            select_polygons_by_edges(&p, &e, CountBounds::new(3, 3), false),
            vec![true]
        );
        assert_eq!(
            pull_edges_by_polygons(&p, &e, InteractionMode::Interacting),
            vec![true, true, false, true]
        );
        assert_eq!(
            select_edges_by_edges(&e, &e[2..3], any, false),
            vec![false, false, true, true]
        );
    }
}
