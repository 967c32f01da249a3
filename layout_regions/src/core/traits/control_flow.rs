use static_aabb2d_index as aabb_index;
/// Trait for control flow inside visiting methods.
///
/// Box scanner receivers and spatial index visitors return a value implementing this trait so a
/// scan can stop as soon as the answer is known (e.g. "does anything interact at all").
///
/// # Examples
///
/// ```
/// # use layout_regions::core::*;
/// # use layout_regions::scan::*;
/// # use layout_regions::geom::*;
/// let boxes = [BBox::new(0, 0, 10, 10), BBox::new(5, 5, 20, 20), BBox::new(8, 0, 30, 4)];
/// let mut scanner = BoxScanner::new();
/// for (i, b) in boxes.iter().enumerate() {
///     scanner.insert(*b, i);
/// }
///
/// let mut visited = 0;
/// scanner.visit_pairs(0, &mut |_a: &usize, _b: &usize| {
///     visited += 1;
///     // Return Control::Break to stop the scan early
///     Control::Break(())
/// });
///
/// assert_eq!(visited, 1);
/// ```
pub trait ControlFlow {
    /// Constructs state indicating to continue iteration/visiting.
    fn continuing() -> Self;

    /// Returns `true` if control flow should break/stop iteration.
    fn should_break(&self) -> bool;
}

impl<C> ControlFlow for C
where
    C: aabb_index::ControlFlow,
{
    #[inline]
    fn continuing() -> Self {
        C::continuing()
    }

    #[inline]
    fn should_break(&self) -> bool {
        self.should_break()
    }
}
