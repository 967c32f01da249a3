use super::Vector2;
use crate::core::traits::Real;

/// Normalize degrees to be in `[0, 360)`, e.g. `-90` becomes `270` and `450` becomes `90`.
///
/// # Examples
///
/// ```
/// # use layout_regions::core::math::*;
/// # use layout_regions::core::traits::*;
/// assert!(normalize_degrees(-90.0f64).fuzzy_eq(270.0));
/// assert!(normalize_degrees(450.0f64).fuzzy_eq(90.0));
/// assert!(normalize_degrees(360.0f64).fuzzy_eq(0.0));
/// ```
#[inline]
pub fn normalize_degrees<T>(angle: T) -> T
where
    T: Real,
{
    let full = T::from(360.0).unwrap();
    let r = angle - (angle / full).floor() * full;
    if r >= full { r - full } else { r }
}

/// Angle in degrees between two direction vectors, in `[0, 180]`.
///
/// Returns zero if either vector has zero length.
///
/// # Examples
///
/// ```
/// # use layout_regions::core::math::*;
/// # use layout_regions::core::traits::*;
/// assert!(angle_between(vec2(1.0f64, 0.0), vec2(0.0, 1.0)).fuzzy_eq(90.0));
/// assert!(angle_between(vec2(1.0f64, 0.0), vec2(-1.0, 0.0)).fuzzy_eq(180.0));
/// ```
#[inline]
pub fn angle_between<T>(v1: Vector2<T>, v2: Vector2<T>) -> T
where
    T: Real,
{
    let l = v1.length() * v2.length();
    if l.fuzzy_eq_zero() {
        return T::zero();
    }

    let c = (v1.dot(v2) / l).max(-T::one()).min(T::one());
    c.acos().rad_to_deg()
}

/// Squared distance between the points `p0` and `p1`.
#[inline]
pub fn dist_squared<T>(p0: Vector2<T>, p1: Vector2<T>) -> T
where
    T: Real,
{
    let d = p0 - p1;
    d.dot(d)
}

/// Parametric position of the projection of `point` onto the infinite line through `p0` and `p1`.
///
/// `0` corresponds to `p0` and `1` to `p1`. Returns zero for a degenerate line.
#[inline]
pub fn line_param_of_projection<T>(p0: Vector2<T>, p1: Vector2<T>, point: Vector2<T>) -> T
where
    T: Real,
{
    let v = p1 - p0;
    let l2 = v.length_squared();
    if l2.fuzzy_eq_zero() {
        return T::zero();
    }

    (point - p0).dot(v) / l2
}

/// Distance from `point` to the segment `p0`-`p1`.
///
/// # Examples
///
/// ```
/// # use layout_regions::core::math::*;
/// # use layout_regions::core::traits::*;
/// let d = point_segment_distance(vec2(0.0f64, 0.0), vec2(10.0, 0.0), vec2(5.0, 3.0));
/// assert!(d.fuzzy_eq(3.0));
/// let d = point_segment_distance(vec2(0.0f64, 0.0), vec2(10.0, 0.0), vec2(13.0, 4.0));
/// assert!(d.fuzzy_eq(5.0));
/// ```
pub fn point_segment_distance<T>(p0: Vector2<T>, p1: Vector2<T>, point: Vector2<T>) -> T
where
    T: Real,
{
    let t = line_param_of_projection(p0, p1, point)
        .max(T::zero())
        .min(T::one());
    let closest = p0 + (p1 - p0).scale(t);
    dist_squared(closest, point).sqrt()
}

/// Clip the parametric interval `[t0, t1]` of a line `origin + t * dir` against the half plane
/// `normal . (p - plane_point) < limit` (strict side is not distinguished in floating point).
///
/// Returns `None` if nothing of the interval remains.
pub fn clip_interval_half_plane<T>(
    interval: (T, T),
    origin: Vector2<T>,
    dir: Vector2<T>,
    normal: Vector2<T>,
    plane_point: Vector2<T>,
    limit: T,
) -> Option<(T, T)>
where
    T: Real,
{
    let (mut t0, mut t1) = interval;
    // f(t) = normal . (origin - plane_point) + t * normal . dir - limit < 0
    let base = normal.dot(origin - plane_point) - limit;
    let slope = normal.dot(dir);
    if slope.fuzzy_eq_zero() {
        return if base < T::zero() { Some((t0, t1)) } else { None };
    }

    let t_cross = -base / slope;
    if slope > T::zero() {
        t1 = t1.min(t_cross);
    } else {
        t0 = t0.max(t_cross);
    }

    if t0 < t1 { Some((t0, t1)) } else { None }
}

/// Parametric interval `[t0, t1]` of the line `origin + t * dir` that lies inside the circle of
/// `radius` around `center`, `None` if the line misses the circle.
pub fn line_circle_interval<T>(
    origin: Vector2<T>,
    dir: Vector2<T>,
    center: Vector2<T>,
    radius: T,
) -> Option<(T, T)>
where
    T: Real,
{
    let a = dir.length_squared();
    if a.fuzzy_eq_zero() {
        return if dist_squared(origin, center) < radius * radius {
            Some((T::zero(), T::one()))
        } else {
            None
        };
    }

    let f = origin - center;
    let b = T::two() * f.dot(dir);
    let c = f.dot(f) - radius * radius;
    let disc = b * b - T::two() * T::two() * a * c;
    if disc <= T::zero() {
        return None;
    }

    let sq = disc.sqrt();
    let t0 = (-b - sq) / (T::two() * a);
    let t1 = (-b + sq) / (T::two() * a);
    Some((t0, t1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::vec2;
    use crate::core::traits::FuzzyEq;

    #[test]
    fn clip_half_plane_keeps_inner_part() {
        // keep points with y < 5 on the line x = t, y = t
        let r = clip_interval_half_plane(
            (0.0, 10.0),
            vec2(0.0, 0.0),
            vec2(1.0, 1.0),
            vec2(0.0, 1.0),
            vec2(0.0, 0.0),
            5.0,
        )
        .unwrap();
        assert!(r.0.fuzzy_eq(0.0));
        assert!(r.1.fuzzy_eq(5.0));
    }

    #[test]
    fn circle_interval() {
        let (t0, t1) = line_circle_interval(vec2(-10.0, 0.0), vec2(1.0, 0.0), vec2(0.0, 0.0), 2.0)
            .unwrap();
        assert!(t0.fuzzy_eq(8.0));
        assert!(t1.fuzzy_eq(12.0));
        assert!(
            line_circle_interval(vec2(-10.0, 5.0), vec2(1.0, 0.0), vec2(0.0, 0.0), 2.0).is_none()
        );
    }
}
