use std::fmt;

use super::{Area, BBox, CplxTrans, Edge, Point, Vector};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Location of a point relative to a polygon.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PointLocation {
    Inside,
    Boundary,
    Outside,
}

/// Polygon with a hull and any number of holes.
///
/// Contours are kept in a normalized form: the hull is counter clockwise, holes are clockwise
/// (so the interior is always on the left side of each contour edge), consecutive duplicate and
/// collinear points are removed and every contour starts at its smallest point. Two polygons
/// describing the same contours therefore compare equal.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Polygon {
    hull: Vec<Point>,
    holes: Vec<Vec<Point>>,
}

/// Polygon without holes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SimplePolygon {
    hull: Vec<Point>,
}

/// Twice the signed area of a closed contour (positive for counter clockwise).
pub(crate) fn contour_area2(pts: &[Point]) -> Area {
    let n = pts.len();
    if n < 3 {
        return 0;
    }
    let mut a: i128 = 0;
    for i in 0..n {
        let p = pts[i];
        let q = pts[(i + 1) % n];
        a += p.x as i128 * q.y as i128 - q.x as i128 * p.y as i128;
    }
    a as Area
}

/// Remove duplicate and collinear points from a closed contour, returns an empty vector if the
/// contour collapses.
pub(crate) fn compress_contour(pts: &[Point]) -> Vec<Point> {
    let mut result: Vec<Point> = Vec::with_capacity(pts.len());
    for &p in pts {
        if result.last() != Some(&p) {
            result.push(p);
        }
    }
    while result.len() > 1 && result.first() == result.last() {
        result.pop();
    }

    let mut changed = true;
    while changed && result.len() >= 3 {
        changed = false;
        let n = result.len();
        let mut keep = Vec::with_capacity(n);
        for i in 0..n {
            let a = result[(i + n - 1) % n];
            let b = result[i];
            let c = result[(i + 1) % n];
            if (b - a).cross(c - b) == 0 {
                changed = true;
            } else {
                keep.push(b);
            }
        }
        if changed {
            result = keep;
            result.dedup();
            while result.len() > 1 && result.first() == result.last() {
                result.pop();
            }
        }
    }

    if result.len() < 3 {
        return Vec::new();
    }
    result
}

/// Bring a contour into normalized form with the requested orientation.
fn normalize_contour(pts: &[Point], ccw: bool) -> Vec<Point> {
    let mut c = compress_contour(pts);
    if c.is_empty() {
        return c;
    }
    if (contour_area2(&c) > 0) != ccw {
        c.reverse();
    }
    let start = c
        .iter()
        .enumerate()
        .min_by_key(|(_, p)| **p)
        .map(|(i, _)| i)
        .unwrap_or(0);
    c.rotate_left(start);
    c
}

fn contour_edges(pts: &[Point]) -> impl Iterator<Item = Edge> + '_ {
    let n = pts.len();
    (0..n).map(move |i| Edge::new(pts[i], pts[(i + 1) % n]))
}

fn contour_winding(pts: &[Point], p: Point) -> i32 {
    let mut wn = 0;
    for e in contour_edges(pts) {
        if e.p1.y <= p.y {
            if e.p2.y > p.y && e.side_of(p) > 0 {
                wn += 1;
            }
        } else if e.p2.y <= p.y && e.side_of(p) < 0 {
            wn -= 1;
        }
    }
    wn
}

impl Polygon {
    /// Create a polygon from a hull contour given in any orientation.
    pub fn new(hull: Vec<Point>) -> Self {
        Polygon {
            hull: normalize_contour(&hull, true),
            holes: Vec::new(),
        }
    }

    /// Create a polygon from a hull and holes given in any orientation.
    pub fn with_holes(hull: Vec<Point>, holes: Vec<Vec<Point>>) -> Self {
        let mut p = Polygon::new(hull);
        for h in holes {
            p.insert_hole(h);
        }
        p
    }

    /// Create a polygon from `(x, y)` tuples.
    pub fn from_coords(pts: &[(super::Coord, super::Coord)]) -> Self {
        Polygon::new(pts.iter().map(|&p| Point::from(p)).collect())
    }

    pub fn from_box(b: BBox) -> Self {
        if b.is_empty() {
            return Polygon::default();
        }
        Polygon::new(vec![
            b.lower_left(),
            Point::new(b.right, b.bottom),
            b.upper_right(),
            Point::new(b.left, b.top),
        ])
    }

    /// Add a hole contour (given in any orientation).
    pub fn insert_hole(&mut self, hole: Vec<Point>) {
        let h = normalize_contour(&hole, false);
        if !h.is_empty() {
            let pos = self.holes.binary_search(&h).unwrap_or_else(|i| i);
            self.holes.insert(pos, h);
        }
    }

    #[inline]
    pub fn hull(&self) -> &[Point] {
        &self.hull
    }

    #[inline]
    pub fn holes(&self) -> &[Vec<Point>] {
        &self.holes
    }

    #[inline]
    pub fn hole_count(&self) -> usize {
        self.holes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hull.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.hull.len() + self.holes.iter().map(|h| h.len()).sum::<usize>()
    }

    /// Twice the area (exact).
    pub fn area2(&self) -> Area {
        contour_area2(&self.hull) + self.holes.iter().map(|h| contour_area2(h)).sum::<Area>()
    }

    pub fn area(&self) -> Area {
        self.area2() / 2
    }

    pub fn perimeter(&self) -> f64 {
        self.edges().map(|e| e.length()).sum()
    }

    pub fn bbox(&self) -> BBox {
        let mut b = BBox::empty();
        for &p in &self.hull {
            b.add_point(p);
        }
        b
    }

    /// True if the polygon is an axis aligned rectangle.
    pub fn is_box(&self) -> bool {
        self.holes.is_empty() && self.hull.len() == 4 && self.is_rectilinear()
    }

    /// True if all edges are horizontal or vertical.
    pub fn is_rectilinear(&self) -> bool {
        self.edges().all(|e| e.is_ortho())
    }

    /// All contour edges, hull first, with the interior on the left side.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        contour_edges(&self.hull).chain(self.holes.iter().flat_map(|h| contour_edges(h)))
    }

    /// Iterate over the contours, hull first.
    pub fn contours(&self) -> impl Iterator<Item = &[Point]> + '_ {
        std::iter::once(self.hull.as_slice())
            .filter(|c| !c.is_empty())
            .chain(self.holes.iter().map(|h| h.as_slice()))
    }

    /// Classify `p` as inside, on the boundary or outside of the polygon.
    pub fn contains_point(&self, p: Point) -> PointLocation {
        if self.is_empty() || !self.bbox().contains_point(p) {
            return PointLocation::Outside;
        }
        if self.edges().any(|e| e.contains(p)) {
            return PointLocation::Boundary;
        }
        let wn: i32 = self.contours().map(|c| contour_winding(c, p)).sum();
        if wn != 0 {
            PointLocation::Inside
        } else {
            PointLocation::Outside
        }
    }

    pub fn transformed(&self, t: &CplxTrans) -> Polygon {
        Polygon::with_holes(
            self.hull.iter().map(|&p| t.apply(p)).collect(),
            self.holes
                .iter()
                .map(|h| h.iter().map(|&p| t.apply(p)).collect())
                .collect(),
        )
    }

    pub fn moved(&self, v: Vector) -> Polygon {
        Polygon {
            hull: self.hull.iter().map(|&p| p + v).collect(),
            holes: self
                .holes
                .iter()
                .map(|h| h.iter().map(|&p| p + v).collect())
                .collect(),
        }
    }
}

impl SimplePolygon {
    pub fn new(hull: Vec<Point>) -> Self {
        SimplePolygon {
            hull: normalize_contour(&hull, true),
        }
    }

    #[inline]
    pub fn hull(&self) -> &[Point] {
        &self.hull
    }

    pub fn area(&self) -> Area {
        contour_area2(&self.hull) / 2
    }

    pub fn bbox(&self) -> BBox {
        let mut b = BBox::empty();
        for &p in &self.hull {
            b.add_point(p);
        }
        b
    }
}

impl From<SimplePolygon> for Polygon {
    fn from(p: SimplePolygon) -> Self {
        Polygon {
            hull: p.hull,
            holes: Vec::new(),
        }
    }
}

impl TryFrom<Polygon> for SimplePolygon {
    type Error = Polygon;

    /// Fails (returning the polygon) if it has holes.
    fn try_from(p: Polygon) -> Result<Self, Self::Error> {
        if p.holes.is_empty() {
            Ok(SimplePolygon { hull: p.hull })
        } else {
            Err(p)
        }
    }
}

impl From<BBox> for Polygon {
    fn from(b: BBox) -> Self {
        Polygon::from_box(b)
    }
}

fn fmt_contour(f: &mut fmt::Formatter<'_>, pts: &[Point]) -> fmt::Result {
    for (i, p) in pts.iter().enumerate() {
        if i > 0 {
            write!(f, ";")?;
        }
        write!(f, "{p}")?;
    }
    Ok(())
}

impl fmt::Debug for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        fmt_contour(f, &self.hull)?;
        for h in &self.holes {
            write!(f, "/")?;
            fmt_contour(f, h)?;
        }
        write!(f, ")")
    }
}

impl fmt::Debug for SimplePolygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        fmt_contour(f, &self.hull)?;
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_makes_equal() {
        let a = Polygon::from_coords(&[(0, 0), (0, 10), (10, 10), (10, 0)]);
        let b = Polygon::from_coords(&[(10, 10), (10, 5), (10, 0), (0, 0), (0, 10), (0, 10)]);
        assert_eq!(a, b);
        assert_eq!(a, Polygon::from_box(BBox::new(0, 0, 10, 10)));
        assert_eq!(a.hull()[0], Point::new(0, 0));
        assert_eq!(a.area(), 100);
        assert!(a.is_box());
    }

    #[test]
    fn holes_reduce_area() {
        let mut p = Polygon::from_box(BBox::new(0, 0, 10, 10));
        p.insert_hole(vec![
            Point::new(2, 2),
            Point::new(4, 2),
            Point::new(4, 4),
            Point::new(2, 4),
        ]);
        assert_eq!(p.area(), 96);
        assert_eq!(p.contains_point(Point::new(3, 3)), PointLocation::Outside);
        assert_eq!(p.contains_point(Point::new(4, 3)), PointLocation::Boundary);
        assert_eq!(p.contains_point(Point::new(6, 6)), PointLocation::Inside);
        assert_eq!(p.edges().count(), 8);
        assert!(!p.is_box());
    }

    #[test]
    fn collapsed_contour_is_empty() {
        let p = Polygon::from_coords(&[(0, 0), (10, 0), (20, 0)]);
        assert!(p.is_empty());
        assert_eq!(p.area(), 0);
    }

    #[test]
    fn mirror_keeps_orientation() {
        let p = Polygon::from_coords(&[(0, 0), (10, 0), (10, 5)]);
        let m = p.transformed(&CplxTrans::orthogonal(0, true));
        assert!(m.area2() > 0);
        assert_eq!(m.bbox(), BBox::new(0, -5, 10, 0));
    }
}
