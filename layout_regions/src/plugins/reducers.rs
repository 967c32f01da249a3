use crate::geom::{CplxTrans, Vector};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Equivalence class of transformations an operation is invariant under.
///
/// [TransformClass::reduce] maps a transformation to the representative of its class: two
/// instances of a cell may share one computed result exactly when their accumulated
/// transformations reduce to the same value. Displacement never matters since results are
/// computed in the cell's own coordinate system.
///
/// # Examples
///
/// ```
/// # use layout_regions::geom::*;
/// # use layout_regions::plugins::*;
/// let r90 = CplxTrans::orthogonal(1, false);
/// let r0 = CplxTrans::unity();
/// let mag2 = CplxTrans::magnification(2.0);
///
/// // an area filter only cares about magnification
/// assert_eq!(TransformClass::ScaleOnly.reduce(&r90), TransformClass::ScaleOnly.reduce(&r0));
/// assert_ne!(TransformClass::ScaleOnly.reduce(&mag2), TransformClass::ScaleOnly.reduce(&r0));
///
/// // a width filter on bounding boxes also cares about orientation
/// assert_ne!(
///     TransformClass::ScaleAndOrientation.reduce(&r90),
///     TransformClass::ScaleAndOrientation.reduce(&r0)
/// );
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum TransformClass {
    /// Results do not depend on the transformation at all.
    Invariant,
    /// Only the magnification matters (isotropic operations with absolute dimensions).
    ScaleOnly,
    /// Only rotation and mirroring matter.
    OrientationOnly,
    /// Only mirroring matters (e.g. the direction of contour edges).
    MirrorOnly,
    /// Magnification, rotation and mirroring matter. This is the conservative default.
    #[default]
    ScaleAndOrientation,
    /// Only the deviation from an orthogonal rotation and mirroring matter (e.g. "is a
    /// rectangle").
    OrthogonalOnly,
}

impl TransformClass {
    /// Representative of the class `t` belongs to.
    pub fn reduce(&self, t: &CplxTrans) -> CplxTrans {
        let no_disp = Vector::new(0, 0);
        match self {
            TransformClass::Invariant => CplxTrans::unity(),
            TransformClass::ScaleOnly => CplxTrans::new(no_disp, 0.0, t.mag(), false),
            TransformClass::OrientationOnly => CplxTrans::new(no_disp, t.angle(), 1.0, t.is_mirror()),
            TransformClass::MirrorOnly => CplxTrans::new(no_disp, 0.0, 1.0, t.is_mirror()),
            TransformClass::ScaleAndOrientation => t.without_disp(),
            TransformClass::OrthogonalOnly => {
                let (_, residual) = t.split_angle();
                CplxTrans::new(no_disp, residual, 1.0, t.is_mirror())
            }
        }
    }

    /// True if no transformation requires a separate result.
    #[inline]
    pub fn is_invariant(&self) -> bool {
        *self == TransformClass::Invariant
    }

    /// The class covering the requirements of both `self` and `other`.
    pub fn combined(self, other: TransformClass) -> TransformClass {
        use TransformClass::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Invariant, x) | (x, Invariant) => x,
            (OrthogonalOnly, OrientationOnly) | (OrientationOnly, OrthogonalOnly) => OrientationOnly,
            (MirrorOnly, x @ (OrientationOnly | OrthogonalOnly))
            | (x @ (OrientationOnly | OrthogonalOnly), MirrorOnly) => x,
            _ => ScaleAndOrientation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orthogonal_only_ignores_quadrants() {
        let c = TransformClass::OrthogonalOnly;
        assert_eq!(
            c.reduce(&CplxTrans::orthogonal(3, false)),
            c.reduce(&CplxTrans::unity())
        );
        assert_eq!(
            c.reduce(&CplxTrans::orthogonal(1, true)),
            c.reduce(&CplxTrans::orthogonal(2, true))
        );
        let r45 = CplxTrans::new(Vector::new(0, 0), 45.0, 1.0, false);
        let r135 = CplxTrans::new(Vector::new(0, 0), 135.0, 1.0, false);
        assert_ne!(c.reduce(&r45), c.reduce(&CplxTrans::unity()));
        assert_eq!(c.reduce(&r45), c.reduce(&r135));
    }

    #[test]
    fn displacement_never_matters() {
        let t = CplxTrans::displacement(100, -50);
        for c in [
            TransformClass::Invariant,
            TransformClass::ScaleOnly,
            TransformClass::OrientationOnly,
            TransformClass::MirrorOnly,
            TransformClass::ScaleAndOrientation,
            TransformClass::OrthogonalOnly,
        ] {
            assert_eq!(c.reduce(&t), c.reduce(&CplxTrans::unity()));
        }
    }

    #[test]
    fn combined_classes() {
        use TransformClass::*;
        assert_eq!(Invariant.combined(ScaleOnly), ScaleOnly);
        assert_eq!(OrthogonalOnly.combined(OrientationOnly), OrientationOnly);
        assert_eq!(ScaleOnly.combined(OrientationOnly), ScaleAndOrientation);
        assert_eq!(MirrorOnly.combined(OrthogonalOnly), OrthogonalOnly);
        assert_eq!(ScaleOnly.combined(MirrorOnly), ScaleAndOrientation);
    }

    #[test]
    fn mirror_only_ignores_rotation() {
        let c = TransformClass::MirrorOnly;
        assert_eq!(c.reduce(&CplxTrans::orthogonal(1, false)), c.reduce(&CplxTrans::unity()));
        assert_eq!(c.reduce(&CplxTrans::orthogonal(1, true)), c.reduce(&CplxTrans::orthogonal(0, true)));
        assert_ne!(c.reduce(&CplxTrans::orthogonal(0, true)), c.reduce(&CplxTrans::unity()));
    }
}
