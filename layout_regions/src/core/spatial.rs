//! Helpers around `static_aabb2d_index` for integer boxes.

use static_aabb2d_index::{StaticAABB2DIndex, StaticAABB2DIndexBuildError, StaticAABB2DIndexBuilder};

use crate::geom::BBox;

/// Unwrap a spatial index from a builder or panic for the unexpected case of failure.
pub(crate) fn unwrap_spatial_index(builder: StaticAABB2DIndexBuilder<i64>) -> StaticAABB2DIndex<i64> {
    match builder.build() {
        Ok(x) => x,
        Err(e) => match e {
            StaticAABB2DIndexBuildError::ItemCountError { .. } => {
                unreachable!("internal library error: count mismatch when building spatial index")
            }
            StaticAABB2DIndexBuildError::NumericCastError => {
                panic!("failed to cast coordinate type: {e}")
            }
        },
    }
}

/// Build an index over the given boxes, item `i` of the index is the `i`-th box. Empty boxes are
/// added as inverted boxes that no query ever touches.
pub(crate) fn box_index<I>(boxes: I) -> StaticAABB2DIndex<i64>
where
    I: ExactSizeIterator<Item = BBox>,
{
    let mut builder = StaticAABB2DIndexBuilder::new(boxes.len());
    for b in boxes {
        if b.is_empty() {
            builder.add(i64::MAX, i64::MAX, i64::MAX, i64::MAX);
        } else {
            let (l, b, r, t) = b.index_extents();
            builder.add(l, b, r, t);
        }
    }
    unwrap_spatial_index(builder)
}

/// Build an index over boxes given in raw (already scaled) 64 bit extents.
pub(crate) fn extents_index<I>(extents: I) -> StaticAABB2DIndex<i64>
where
    I: ExactSizeIterator<Item = (i64, i64, i64, i64)>,
{
    let mut builder = StaticAABB2DIndexBuilder::new(extents.len());
    for (l, b, r, t) in extents {
        builder.add(l, b, r, t);
    }
    unwrap_spatial_index(builder)
}

/// Indexes of all boxes touching `b`.
pub(crate) fn query_box(index: &StaticAABB2DIndex<i64>, b: &BBox, stack: &mut Vec<usize>) -> Vec<usize> {
    let mut result = Vec::new();
    if b.is_empty() {
        return result;
    }
    let (l, bo, r, t) = b.index_extents();
    let mut visitor = |i: usize| {
        result.push(i);
    };
    index.visit_query_with_stack(l, bo, r, t, &mut visitor, stack);
    result
}
