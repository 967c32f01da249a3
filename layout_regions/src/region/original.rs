use super::{RegionBox, RegionDelegate, RegionFlags};
use crate::{
    DelegateKind,
    geom::Polygon,
    layout::RecursiveShapeIterator,
    properties::WithProperties,
};

/// Read only view of the polygons delivered by a hierarchy iterator.
///
/// Every operation runs on a fresh traversal; mutations upgrade the region to a flat copy.
#[derive(Debug, Clone)]
pub struct OriginalLayerRegion<'s> {
    iter: RecursiveShapeIterator<'s>,
    flags: RegionFlags,
}

impl<'s> OriginalLayerRegion<'s> {
    pub fn new(iter: RecursiveShapeIterator<'s>) -> Self {
        OriginalLayerRegion {
            iter,
            flags: RegionFlags::new(),
        }
    }

    pub fn iterator(&self) -> &RecursiveShapeIterator<'s> {
        &self.iter
    }
}

impl<'s> RegionDelegate<'s> for OriginalLayerRegion<'s> {
    fn kind(&self) -> DelegateKind {
        DelegateKind::OriginalLayer
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
        Box::new(self.iter.shapes::<Polygon>().map(|s| s.to_owned_shape()))
    }

    fn hier_count(&self) -> usize {
        let layout = self.iter.layout();
        if !self.iter.is_complete() {
            return self.count();
        }
        match layout.cells_bottom_up(self.iter.top_cell()) {
            Ok(cells) => cells
                .into_iter()
                .flat_map(|ci| {
                    self.iter
                        .layers()
                        .iter()
                        .filter_map(move |&l| layout.cell(ci).shapes(l))
                })
                .map(|s| s.polygons.len())
                .sum(),
            Err(_) => self.count(),
        }
    }
}
