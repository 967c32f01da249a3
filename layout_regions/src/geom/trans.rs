use std::{cmp::Ordering, fmt, hash};

use super::{Coord, Point, Vector, coord_round};
use crate::core::{
    math::normalize_degrees,
    traits::{FuzzyEq, Real},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Complex integer-to-integer transformation: optional mirror at the x axis, then rotation by an
/// arbitrary angle (degrees, counter clockwise), then magnification, then displacement.
///
/// Results are rounded to the integer grid. Transformations compare equal (and hash/order)
/// by their values quantized to a fixed resolution so they can be used as variant keys.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone)]
pub struct CplxTrans {
    /// Displacement applied last.
    pub disp: Vector,
    /// Rotation angle in degrees, normalized to `[0, 360)`.
    angle: f64,
    /// Magnification.
    mag: f64,
    /// Mirror at the x axis (applied first).
    mirror: bool,
}

const ANGLE_QUANTUM: f64 = 1e-7;
const MAG_QUANTUM: f64 = 1e-9;

impl CplxTrans {
    /// Identity transformation.
    pub const fn unity() -> Self {
        CplxTrans {
            disp: Vector::new(0, 0),
            angle: 0.0,
            mag: 1.0,
            mirror: false,
        }
    }

    pub fn new(disp: Vector, angle: f64, mag: f64, mirror: bool) -> Self {
        let mut angle = normalize_degrees(angle);
        if (angle - 360.0).abs() < ANGLE_QUANTUM {
            angle = 0.0;
        }
        CplxTrans {
            disp,
            angle,
            mag,
            mirror,
        }
    }

    /// Pure displacement.
    pub fn displacement(dx: Coord, dy: Coord) -> Self {
        Self::new(Vector::new(dx, dy), 0.0, 1.0, false)
    }

    /// Pure rotation by a multiple of 90 degrees (`quadrants` counter clockwise), optionally
    /// mirrored first.
    pub fn orthogonal(quadrants: i32, mirror: bool) -> Self {
        Self::new(Vector::new(0, 0), 90.0 * quadrants as f64, 1.0, mirror)
    }

    /// Pure magnification.
    pub fn magnification(mag: f64) -> Self {
        Self::new(Vector::new(0, 0), 0.0, mag, false)
    }

    #[inline]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    #[inline]
    pub fn mag(&self) -> f64 {
        self.mag
    }

    #[inline]
    pub fn is_mirror(&self) -> bool {
        self.mirror
    }

    /// True if the rotation is a multiple of 90 degrees.
    pub fn is_ortho(&self) -> bool {
        let r = self.angle / 90.0;
        (r - r.round()).abs() * 90.0 < ANGLE_QUANTUM
    }

    /// True if a magnification other than 1 is present.
    pub fn is_mag(&self) -> bool {
        !self.mag.fuzzy_eq_eps(1.0, MAG_QUANTUM)
    }

    pub fn is_unity(&self) -> bool {
        self.disp.is_zero() && !self.mirror && !self.is_mag() && self.angle.abs() < ANGLE_QUANTUM
    }

    /// Same transformation without displacement.
    pub fn without_disp(&self) -> Self {
        CplxTrans {
            disp: Vector::new(0, 0),
            ..*self
        }
    }

    /// Angle rounded down to the next multiple of 90 degrees and the residual angle.
    pub fn split_angle(&self) -> (i32, f64) {
        let q = (self.angle / 90.0 + ANGLE_QUANTUM).floor();
        let residual = (self.angle - q * 90.0).max(0.0);
        let residual = if residual < ANGLE_QUANTUM { 0.0 } else { residual };
        ((q as i32).rem_euclid(4), residual)
    }

    /// Sine and cosine of the rotation, exact for orthogonal angles.
    fn sin_cos(&self) -> (f64, f64) {
        if self.is_ortho() {
            match ((self.angle / 90.0).round() as i32).rem_euclid(4) {
                0 => (0.0, 1.0),
                1 => (1.0, 0.0),
                2 => (0.0, -1.0),
                _ => (-1.0, 0.0),
            }
        } else {
            let a = self.angle.deg_to_rad();
            (a.sin(), a.cos())
        }
    }

    /// Linear part applied to a floating point vector.
    fn apply_linear(&self, x: f64, y: f64) -> (f64, f64) {
        let y = if self.mirror { -y } else { y };
        let (s, c) = self.sin_cos();
        ((c * x - s * y) * self.mag, (s * x + c * y) * self.mag)
    }

    /// Transform a point.
    pub fn apply(&self, p: Point) -> Point {
        if self.is_ortho() && !self.is_mag() {
            let (s, c) = self.sin_cos();
            let (s, c) = (s as i64, c as i64);
            let x = p.x as i64;
            let y = if self.mirror { -(p.y as i64) } else { p.y as i64 };
            return Point::new(
                (c * x - s * y) as Coord + self.disp.x,
                (s * x + c * y) as Coord + self.disp.y,
            );
        }
        let (x, y) = self.apply_linear(p.x as f64, p.y as f64);
        Point::new(
            coord_round(x) + self.disp.x,
            coord_round(y) + self.disp.y,
        )
    }

    /// Transform a vector (displacement is not applied).
    pub fn apply_vector(&self, v: Vector) -> Vector {
        let p = self.without_disp().apply(Point::new(v.x, v.y));
        Vector::new(p.x, p.y)
    }

    /// Transform a distance (only the magnification applies).
    pub fn apply_distance(&self, d: Coord) -> Coord {
        coord_round(d as f64 * self.mag)
    }

    /// Inverse transformation.
    pub fn inverted(&self) -> Self {
        let angle = if self.mirror { self.angle } else { -self.angle };
        let lin = CplxTrans::new(Vector::new(0, 0), angle, 1.0 / self.mag, self.mirror);
        let (dx, dy) = lin.apply_linear(self.disp.x as f64, self.disp.y as f64);
        CplxTrans {
            disp: Vector::new(-coord_round(dx), -coord_round(dy)),
            ..lin
        }
    }

    /// Concatenation: `self * other` applies `other` first, then `self`.
    pub fn concat(&self, other: &CplxTrans) -> Self {
        let angle = if self.mirror {
            self.angle - other.angle
        } else {
            self.angle + other.angle
        };
        let disp = self.apply(Point::new(other.disp.x, other.disp.y));
        CplxTrans::new(
            disp.to_vector(),
            angle,
            self.mag * other.mag,
            self.mirror != other.mirror,
        )
    }

    fn key(&self) -> (bool, i64, i64, Coord, Coord) {
        let mut a = (self.angle / ANGLE_QUANTUM).round() as i64;
        if a == (360.0 / ANGLE_QUANTUM).round() as i64 {
            a = 0;
        }
        (
            self.mirror,
            a,
            (self.mag / MAG_QUANTUM).round() as i64,
            self.disp.x,
            self.disp.y,
        )
    }
}

impl Default for CplxTrans {
    fn default() -> Self {
        CplxTrans::unity()
    }
}

impl PartialEq for CplxTrans {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for CplxTrans {}

impl hash::Hash for CplxTrans {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state)
    }
}

impl PartialOrd for CplxTrans {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CplxTrans {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Debug for CplxTrans {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}r{} *{} {},{}",
            if self.mirror { "m" } else { "" },
            self.angle,
            self.mag,
            self.disp.x,
            self.disp.y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orthogonal_rotation_is_exact() {
        let t = CplxTrans::orthogonal(1, false);
        assert_eq!(t.apply(Point::new(10, 0)), Point::new(0, 10));
        let m = CplxTrans::orthogonal(0, true);
        assert_eq!(m.apply(Point::new(3, 7)), Point::new(3, -7));
    }

    #[test]
    fn concat_and_invert() {
        let t1 = CplxTrans::new(Vector::new(100, 50), 90.0, 1.0, true);
        let t2 = CplxTrans::new(Vector::new(-7, 3), 180.0, 1.0, false);
        let t = t1.concat(&t2);
        for p in [Point::new(0, 0), Point::new(13, -4), Point::new(-20, 9)] {
            assert_eq!(t.apply(p), t1.apply(t2.apply(p)));
            assert_eq!(t.inverted().apply(t.apply(p)), p);
        }
        assert!(t1.concat(&t1.inverted()).is_unity());

        let m = CplxTrans::new(Vector::new(10, -20), 0.0, 2.0, false);
        assert_eq!(m.apply(Point::new(5, 5)), Point::new(20, -10));
        assert_eq!(m.inverted().apply(Point::new(20, -10)), Point::new(5, 5));
    }

    #[test]
    fn split_angle() {
        let t = CplxTrans::new(Vector::new(0, 0), 135.0, 1.0, false);
        let (q, r) = t.split_angle();
        assert_eq!(q, 1);
        assert!(r.fuzzy_eq(45.0));
        assert!(!t.is_ortho());
    }
}
