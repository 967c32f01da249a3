use std::fmt;

use super::{Area, Coord, Point, Vector};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis aligned integer box. A box with `left > right` is empty.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct BBox {
    pub left: Coord,
    pub bottom: Coord,
    pub right: Coord,
    pub top: Coord,
}

impl BBox {
    /// Box spanning the two corner coordinates, the corners may be given in any order.
    #[inline]
    pub fn new(x1: Coord, y1: Coord, x2: Coord, y2: Coord) -> Self {
        BBox {
            left: x1.min(x2),
            bottom: y1.min(y2),
            right: x1.max(x2),
            top: y1.max(y2),
        }
    }

    /// Box spanning two points.
    #[inline]
    pub fn from_points(p1: Point, p2: Point) -> Self {
        Self::new(p1.x, p1.y, p2.x, p2.y)
    }

    #[inline]
    pub const fn empty() -> Self {
        BBox {
            left: 1,
            bottom: 1,
            right: -1,
            top: -1,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.left > self.right || self.bottom > self.top
    }

    #[inline]
    pub fn width(&self) -> Coord {
        if self.is_empty() { 0 } else { self.right - self.left }
    }

    #[inline]
    pub fn height(&self) -> Coord {
        if self.is_empty() { 0 } else { self.top - self.bottom }
    }

    #[inline]
    pub fn area(&self) -> Area {
        self.width() as Area * self.height() as Area
    }

    #[inline]
    pub fn lower_left(&self) -> Point {
        Point::new(self.left, self.bottom)
    }

    #[inline]
    pub fn upper_right(&self) -> Point {
        Point::new(self.right, self.top)
    }

    #[inline]
    pub fn center(&self) -> Point {
        Point::new(
            ((self.left as i64 + self.right as i64) / 2) as Coord,
            ((self.bottom as i64 + self.top as i64) / 2) as Coord,
        )
    }

    /// Extend the box to include `p`.
    #[inline]
    pub fn add_point(&mut self, p: Point) {
        if self.is_empty() {
            *self = BBox::from_points(p, p);
        } else {
            self.left = self.left.min(p.x);
            self.bottom = self.bottom.min(p.y);
            self.right = self.right.max(p.x);
            self.top = self.top.max(p.y);
        }
    }

    /// Smallest box containing both boxes.
    #[inline]
    pub fn union(&self, other: &BBox) -> BBox {
        if self.is_empty() {
            *other
        } else if other.is_empty() {
            *self
        } else {
            BBox {
                left: self.left.min(other.left),
                bottom: self.bottom.min(other.bottom),
                right: self.right.max(other.right),
                top: self.top.max(other.top),
            }
        }
    }

    /// Common part of both boxes (may be empty, degenerate boxes are kept).
    #[inline]
    pub fn intersection(&self, other: &BBox) -> BBox {
        if self.is_empty() || other.is_empty() {
            return BBox::empty();
        }
        let r = BBox {
            left: self.left.max(other.left),
            bottom: self.bottom.max(other.bottom),
            right: self.right.min(other.right),
            top: self.top.min(other.top),
        };
        if r.is_empty() { BBox::empty() } else { r }
    }

    /// True if the boxes share at least one point (touching counts).
    #[inline]
    pub fn touches(&self, other: &BBox) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.left <= other.right
            && other.left <= self.right
            && self.bottom <= other.top
            && other.bottom <= self.top
    }

    /// True if the boxes share a region of non-zero area.
    #[inline]
    pub fn overlaps(&self, other: &BBox) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.left < other.right
            && other.left < self.right
            && self.bottom < other.top
            && other.bottom < self.top
    }

    #[inline]
    pub fn contains_point(&self, p: Point) -> bool {
        !self.is_empty()
            && p.x >= self.left
            && p.x <= self.right
            && p.y >= self.bottom
            && p.y <= self.top
    }

    #[inline]
    pub fn contains_box(&self, other: &BBox) -> bool {
        !other.is_empty()
            && self.contains_point(other.lower_left())
            && self.contains_point(other.upper_right())
    }

    /// Box grown by `d` on every side (shrunk for negative `d`).
    #[inline]
    pub fn enlarged(&self, d: Coord) -> BBox {
        if self.is_empty() {
            return *self;
        }
        let r = BBox {
            left: self.left.saturating_sub(d),
            bottom: self.bottom.saturating_sub(d),
            right: self.right.saturating_add(d),
            top: self.top.saturating_add(d),
        };
        if r.is_empty() { BBox::empty() } else { r }
    }

    #[inline]
    pub fn moved(&self, v: Vector) -> BBox {
        if self.is_empty() {
            return *self;
        }
        BBox {
            left: self.left + v.x,
            bottom: self.bottom + v.y,
            right: self.right + v.x,
            top: self.top + v.y,
        }
    }

    /// Bounding box of the transformed corners.
    pub fn transformed(&self, t: &super::CplxTrans) -> BBox {
        if self.is_empty() {
            return *self;
        }
        let mut r = BBox::empty();
        for p in [
            self.lower_left(),
            Point::new(self.right, self.bottom),
            self.upper_right(),
            Point::new(self.left, self.top),
        ] {
            r.add_point(t.apply(p));
        }
        r
    }

    /// Box extents as 64 bit values for use with the spatial index.
    #[inline]
    pub(crate) fn index_extents(&self) -> (i64, i64, i64, i64) {
        (
            self.left as i64,
            self.bottom as i64,
            self.right as i64,
            self.top as i64,
        )
    }
}

impl Default for BBox {
    #[inline]
    fn default() -> Self {
        BBox::empty()
    }
}

impl fmt::Debug for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "()")
        } else {
            write!(
                f,
                "({},{};{},{})",
                self.left, self.bottom, self.right, self.top
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_versus_overlapping() {
        let a = BBox::new(0, 0, 10, 10);
        let b = BBox::new(10, 0, 20, 10);
        assert!(a.touches(&b));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&b.moved(Vector::new(-1, 0))));
        assert!(!a.touches(&BBox::empty()));
    }

    #[test]
    fn union_with_empty() {
        let a = BBox::new(0, 0, 10, 10);
        assert_eq!(a.union(&BBox::empty()), a);
        assert_eq!(BBox::empty().union(&a), a);
        assert_eq!(a.intersection(&BBox::new(20, 20, 30, 30)), BBox::empty());
    }
}
