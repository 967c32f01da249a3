use super::{RegionBox, RegionDelegate, RegionFlags};
use crate::{DelegateKind, geom::Polygon, properties::WithProperties};

/// Delegate of a region without polygons.
#[derive(Debug, Clone, Default)]
pub struct EmptyRegion {
    flags: RegionFlags,
}

impl EmptyRegion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flags(flags: RegionFlags) -> Self {
        EmptyRegion { flags }
    }
}

impl<'s> RegionDelegate<'s> for EmptyRegion {
    fn kind(&self) -> DelegateKind {
        DelegateKind::Empty
    }

    fn clone_delegate(&self) -> RegionBox<'s> {
        Box::new(self.clone())
    }

    fn flags(&self) -> &RegionFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut RegionFlags {
        &mut self.flags
    }

    fn iter(&self) -> Box<dyn Iterator<Item = WithProperties<Polygon>> + '_> {
        Box::new(std::iter::empty())
    }

    fn is_merged(&self) -> bool {
        true
    }

    fn is_empty(&self) -> bool {
        true
    }

    fn count(&self) -> usize {
        0
    }
}
