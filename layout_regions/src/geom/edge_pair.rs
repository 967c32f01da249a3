use std::fmt;

use super::{Area, BBox, Coord, CplxTrans, Edge, Point, Polygon, coord_round};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Two edges describing one relation between geometries, e.g. a DRC violation marker.
///
/// The meaning of `first` and `second` depends on the relation that produced the pair; for two
/// layer checks `first` comes from the primary input. A `symmetric` pair describes a relation
/// where the order does not matter (e.g. a space violation within one layer).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct EdgePair {
    pub first: Edge,
    pub second: Edge,
    pub symmetric: bool,
}

impl EdgePair {
    #[inline]
    pub const fn new(first: Edge, second: Edge) -> Self {
        EdgePair {
            first,
            second,
            symmetric: false,
        }
    }

    #[inline]
    pub const fn new_symmetric(first: Edge, second: Edge) -> Self {
        EdgePair {
            first,
            second,
            symmetric: true,
        }
    }

    /// Pair with `first` and `second` exchanged.
    #[inline]
    pub fn swapped(&self) -> EdgePair {
        EdgePair {
            first: self.second,
            second: self.first,
            symmetric: self.symmetric,
        }
    }

    /// Canonical form: symmetric pairs are ordered so the smaller edge comes first.
    pub fn normalized(&self) -> EdgePair {
        if self.symmetric && self.second < self.first {
            self.swapped()
        } else {
            *self
        }
    }

    pub fn bbox(&self) -> BBox {
        self.first.bbox().union(&self.second.bbox())
    }

    /// Smallest euclidean distance between the two edges, rounded to the grid.
    pub fn distance(&self) -> Coord {
        if self.first.intersects(&self.second) {
            return 0;
        }
        let d = [
            self.first.euclidian_distance(self.second.p1),
            self.first.euclidian_distance(self.second.p2),
            self.second.euclidian_distance(self.first.p1),
            self.second.euclidian_distance(self.first.p2),
        ]
        .into_iter()
        .fold(f64::MAX, f64::min);
        coord_round(d)
    }

    /// Area of the quadrilateral spanned by both edges.
    pub fn area(&self) -> Area {
        self.to_polygon(0).area()
    }

    /// Perimeter of the pair (sum of both edge lengths).
    pub fn perimeter(&self) -> f64 {
        self.first.length() + self.second.length()
    }

    /// The quadrilateral spanned by both edges (`first.p1`, `first.p2`, `second.p1`,
    /// `second.p2`). Degenerate pairs give an empty polygon.
    ///
    /// With a positive `enlargement` the result is the convex hull of the four end points, each
    /// enlarged to a square of half size `enlargement`, so dot pairs become visible boxes.
    pub fn to_polygon(&self, enlargement: Coord) -> Polygon {
        let pts = [self.first.p1, self.first.p2, self.second.p1, self.second.p2];
        if enlargement <= 0 {
            return Polygon::new(pts.to_vec());
        }
        let e = enlargement;
        let mut corners: Vec<Point> = pts
            .iter()
            .flat_map(|p| {
                [
                    Point::new(p.x - e, p.y - e),
                    Point::new(p.x + e, p.y - e),
                    Point::new(p.x + e, p.y + e),
                    Point::new(p.x - e, p.y + e),
                ]
            })
            .collect();
        corners.sort();
        corners.dedup();
        Polygon::new(convex_hull(&corners))
    }

    pub fn transformed(&self, t: &CplxTrans) -> EdgePair {
        EdgePair {
            first: self.first.transformed(t),
            second: self.second.transformed(t),
            symmetric: self.symmetric,
        }
    }
}

/// Counter clockwise convex hull of sorted, distinct points (monotone chain).
fn convex_hull(sorted: &[Point]) -> Vec<Point> {
    let turn = |o: Point, a: Point, b: Point| (a - o).cross(b - o);
    let mut hull: Vec<Point> = Vec::with_capacity(sorted.len() + 1);
    for pass in [sorted.to_vec(), sorted.iter().rev().copied().collect()] {
        let start = hull.len();
        for p in pass {
            while hull.len() >= start + 2 && turn(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
                hull.pop();
            }
            hull.push(p);
        }
        hull.pop();
    }
    hull
}

impl fmt::Debug for EdgePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}{}{:?}",
            self.first,
            if self.symmetric { "|" } else { "/" },
            self.second
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_and_area() {
        let ep = EdgePair::new(
            Edge::from_coords(0, 0, 100, 0),
            Edge::from_coords(100, 40, 0, 40),
        );
        assert_eq!(ep.distance(), 40);
        assert_eq!(ep.area(), 4000);
        assert_eq!(ep.swapped().swapped(), ep);
    }

    #[test]
    fn dot_pair_survives() {
        let dot = Edge::from_coords(5, 5, 5, 5);
        let ep = EdgePair::new(dot, dot);
        assert_eq!(ep.distance(), 0);
        assert_eq!(ep.area(), 0);
        assert_eq!(ep.bbox(), BBox::new(5, 5, 5, 5));
        assert_eq!(ep.to_polygon(2), Polygon::from_box(BBox::new(3, 3, 7, 7)));
    }

    #[test]
    fn enlarged_polygon_covers_both_edges() {
        let ep = EdgePair::new(
            Edge::from_coords(0, 0, 100, 0),
            Edge::from_coords(100, 40, 0, 40),
        );
        assert_eq!(ep.to_polygon(5), Polygon::from_box(BBox::new(-5, -5, 105, 45)));
    }
}
