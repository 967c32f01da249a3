use std::{fmt, ops};

use crate::core::math::{Vector2, vec2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Integer coordinate type used for all layout geometry.
pub type Coord = i32;

/// Integer type wide enough to hold areas and squared lengths.
pub type Area = i64;

/// A point on the integer grid.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Point {
    pub x: Coord,
    pub y: Coord,
}

/// A displacement on the integer grid.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Vector {
    pub x: Coord,
    pub y: Coord,
}

impl Point {
    #[inline]
    pub const fn new(x: Coord, y: Coord) -> Self {
        Point { x, y }
    }

    /// Point as floating point vector (position relative to the origin).
    #[inline]
    pub fn to_vector2(self) -> Vector2<f64> {
        vec2(self.x as f64, self.y as f64)
    }

    /// Round a floating point position to the grid.
    #[inline]
    pub fn from_vector2(v: Vector2<f64>) -> Self {
        Point::new(super::coord_round(v.x), super::coord_round(v.y))
    }

    /// Squared euclidean distance to `other`.
    #[inline]
    pub fn sq_distance(self, other: Point) -> Area {
        (other - self).sq_length()
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        (self.sq_distance(other) as f64).sqrt()
    }

    /// Position relative to the origin.
    #[inline]
    pub fn to_vector(self) -> Vector {
        Vector::new(self.x, self.y)
    }
}

impl Vector {
    #[inline]
    pub const fn new(x: Coord, y: Coord) -> Self {
        Vector { x, y }
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.x == 0 && self.y == 0
    }

    /// Cross product (`self.x * other.y - self.y * other.x`), positive if `other` points to the
    /// left of `self`.
    #[inline]
    pub fn cross(self, other: Vector) -> i128 {
        self.x as i128 * other.y as i128 - self.y as i128 * other.x as i128
    }

    #[inline]
    pub fn dot(self, other: Vector) -> i128 {
        self.x as i128 * other.x as i128 + self.y as i128 * other.y as i128
    }

    #[inline]
    pub fn sq_length(self) -> Area {
        self.x as Area * self.x as Area + self.y as Area * self.y as Area
    }

    #[inline]
    pub fn length(self) -> f64 {
        (self.sq_length() as f64).sqrt()
    }

    #[inline]
    pub fn to_vector2(self) -> Vector2<f64> {
        vec2(self.x as f64, self.y as f64)
    }

    #[inline]
    pub fn from_vector2(v: Vector2<f64>) -> Self {
        Vector::new(super::coord_round(v.x), super::coord_round(v.y))
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl fmt::Debug for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

impl ops::Sub<Point> for Point {
    type Output = Vector;
    #[inline]
    fn sub(self, rhs: Point) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl ops::Add<Vector> for Point {
    type Output = Point;
    #[inline]
    fn add(self, rhs: Vector) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl ops::Sub<Vector> for Point {
    type Output = Point;
    #[inline]
    fn sub(self, rhs: Vector) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl ops::Add<Vector> for Vector {
    type Output = Vector;
    #[inline]
    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl ops::Sub<Vector> for Vector {
    type Output = Vector;
    #[inline]
    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl ops::Neg for Vector {
    type Output = Vector;
    #[inline]
    fn neg(self) -> Vector {
        Vector::new(-self.x, -self.y)
    }
}

impl From<(Coord, Coord)> for Point {
    #[inline]
    fn from(v: (Coord, Coord)) -> Self {
        Point::new(v.0, v.1)
    }
}

impl From<(Coord, Coord)> for Vector {
    #[inline]
    fn from(v: (Coord, Coord)) -> Self {
        Vector::new(v.0, v.1)
    }
}
