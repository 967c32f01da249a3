use std::borrow::Cow;

use super::{RegionBox, RegionDelegate, RegionFlags};
use crate::{
    DelegateKind,
    boolean::{MergeOptions, merge_polygons},
    geom::{BBox, Polygon},
    plugins::{PolygonFilter, PolygonProcessor, process_all},
    properties::WithProperties,
};

/// Polygons held in a plain list.
#[derive(Debug, Clone, Default)]
pub struct FlatRegion {
    shapes: Vec<WithProperties<Polygon>>,
    flags: RegionFlags,
    merged: bool,
}

impl FlatRegion {
    pub fn new(shapes: Vec<WithProperties<Polygon>>, flags: RegionFlags) -> Self {
        FlatRegion {
            shapes,
            flags,
            merged: false,
        }
    }

    pub(crate) fn boxed<'s>(
        shapes: Vec<WithProperties<Polygon>>,
        flags: RegionFlags,
        merged: bool,
    ) -> RegionBox<'s> {
        Box::new(FlatRegion {
            shapes,
            flags,
            merged,
        })
    }

    pub fn insert(&mut self, polygon: WithProperties<Polygon>) {
        self.shapes.push(polygon);
        self.merged = false;
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
        self.merged = false;
    }

    pub fn reserve(&mut self, n: usize) {
        self.shapes.reserve(n);
    }
}

impl<'s> RegionDelegate<'s> for FlatRegion {
    fn kind(&self) -> DelegateKind {
        DelegateKind::Flat
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
        Box::new(self.shapes.iter().cloned())
    }

    fn as_flat_mut(&mut self) -> Option<&mut FlatRegion> {
        Some(self)
    }

    fn shapes(&self) -> Cow<'_, [WithProperties<Polygon>]> {
        Cow::Borrowed(&self.shapes)
    }

    fn is_merged(&self) -> bool {
        self.merged || self.shapes.is_empty()
    }

    fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    fn count(&self) -> usize {
        self.shapes.len()
    }

    fn bbox(&self) -> BBox {
        self.shapes
            .iter()
            .fold(BBox::empty(), |b, p| b.union(&p.shape.bbox()))
    }

    fn merged_in_place(mut self: Box<Self>, min_coherence: bool, min_wc: u32) -> RegionBox<'s> {
        if !self.is_merged() || min_wc > 0 {
            let options = MergeOptions {
                min_coherence,
                min_wc,
                ..self.flags.merge_options()
            };
            self.shapes = merge_polygons(&self.shapes, &options, None);
            self.merged = true;
        }
        self
    }

    fn add_in_place(mut self: Box<Self>, other: &dyn RegionDelegate<'s>) -> RegionBox<'s> {
        if !other.is_empty() {
            self.shapes.extend(other.iter());
            self.merged = false;
        }
        self
    }

    fn filter_in_place(mut self: Box<Self>, filter: &dyn PolygonFilter) -> RegionBox<'s> {
        if !filter.requires_raw_input() && self.flags.merged_semantics && !self.is_merged() {
            self.shapes = merge_polygons(&self.shapes, &self.flags.merge_options(), None);
            self.merged = true;
        }
        self.shapes
            .retain(|p| filter.selected(&p.shape, p.prop_id));
        self
    }

    fn process_in_place(mut self: Box<Self>, processor: &PolygonProcessor) -> RegionBox<'s> {
        let input = if !processor.requires_raw_input() && self.flags.merged_semantics && !self.is_merged() {
            merge_polygons(&self.shapes, &self.flags.merge_options(), None)
        } else {
            std::mem::take(&mut self.shapes)
        };
        self.shapes = process_all(&input, processor);
        self.merged = processor.result_is_merged();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{geom::BBox, plugins::HullsProcessor};

    fn boxes(b: &[BBox]) -> Vec<WithProperties<Polygon>> {
        b.iter()
            .map(|b| WithProperties::plain(Polygon::from_box(*b)))
            .collect()
    }

    #[test]
    fn merge_in_place_keeps_flat_storage() {
        let r = FlatRegion::new(
            boxes(&[BBox::new(0, 0, 10, 10), BBox::new(5, 0, 20, 10)]),
            RegionFlags::new(),
        );
        let r: RegionBox<'static> = Box::new(r);
        let r = r.merged_in_place(false, 0);
        assert_eq!(r.kind(), DelegateKind::Flat);
        assert!(r.is_merged());
        assert_eq!(r.count(), 1);
        assert_eq!(r.area(), 200);
    }

    #[test]
    fn process_in_place_merges_first() {
        let r = FlatRegion::new(
            boxes(&[BBox::new(0, 0, 10, 10), BBox::new(10, 0, 20, 10)]),
            RegionFlags::new(),
        );
        let r: RegionBox<'static> = Box::new(r);
        let r = r.process_in_place(&HullsProcessor);
        assert_eq!(r.count(), 1);
        assert!(!r.is_merged());
    }
}
