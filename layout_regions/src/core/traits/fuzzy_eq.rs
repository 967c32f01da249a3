/// Approximate equality of floating point measurements.
///
/// Distances and angles computed while checking edge relations are compared against thresholds
/// with a small tolerance, so exact integer geometry (e.g. two edges exactly 100 units apart) is
/// not misclassified by rounding noise.
///
/// ```
/// # use layout_regions::core::traits::*;
/// let d = (3.0f64 * 3.0 + 4.0 * 4.0).sqrt();
/// assert!(d.fuzzy_eq(5.0));
/// assert!((0.1f64 + 0.2 - 0.3).fuzzy_eq_zero());
/// ```
pub trait FuzzyEq: Sized + Copy {
    /// Tolerance used by [FuzzyEq::fuzzy_eq] and [FuzzyEq::fuzzy_eq_zero].
    fn fuzzy_epsilon() -> Self;

    /// `true` if `self` and `other` differ by less than `eps`.
    fn fuzzy_eq_eps(&self, other: Self, eps: Self) -> bool;

    #[inline]
    fn fuzzy_eq(&self, other: Self) -> bool {
        self.fuzzy_eq_eps(other, Self::fuzzy_epsilon())
    }

    fn fuzzy_eq_zero(&self) -> bool;
}

macro_rules! impl_fuzzy_eq {
    ($ty:ty, $eps:expr) => {
        impl FuzzyEq for $ty {
            #[inline]
            fn fuzzy_epsilon() -> Self {
                $eps
            }

            #[inline]
            fn fuzzy_eq_eps(&self, other: Self, eps: Self) -> bool {
                (*self - other).abs() < eps
            }

            #[inline]
            fn fuzzy_eq_zero(&self) -> bool {
                self.abs() < $eps
            }
        }
    };
}

impl_fuzzy_eq!(f32, 1.0e-5);
impl_fuzzy_eq!(f64, 1.0e-8);
