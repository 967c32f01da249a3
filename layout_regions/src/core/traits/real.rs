use super::FuzzyEq;

/// Trait representing a real number used for intermediate angle and length computations.
///
/// Geometry itself is always stored with integer coordinates, this trait only covers the floating
/// point values that appear while measuring distances, projections and angles.
pub trait Real:
    num_traits::real::Real + num_traits::Bounded + FuzzyEq + Default + std::fmt::Debug + 'static
{
    #[inline]
    fn pi() -> Self {
        Self::from(std::f64::consts::PI).unwrap()
    }

    #[inline]
    fn two() -> Self {
        Self::one() + Self::one()
    }

    /// Convert degrees to radians.
    #[inline]
    fn deg_to_rad(self) -> Self {
        self * Self::pi() / Self::from(180.0).unwrap()
    }

    /// Convert radians to degrees.
    #[inline]
    fn rad_to_deg(self) -> Self {
        self * Self::from(180.0).unwrap() / Self::pi()
    }
}

impl Real for f32 {
    #[inline]
    fn pi() -> Self {
        std::f32::consts::PI
    }

    #[inline]
    fn two() -> Self {
        2.0f32
    }
}

impl Real for f64 {
    #[inline]
    fn pi() -> Self {
        std::f64::consts::PI
    }

    #[inline]
    fn two() -> Self {
        2.0f64
    }
}
