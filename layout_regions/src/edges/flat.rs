use std::borrow::Cow;

use super::{EdgesBox, EdgesDelegate, EdgesFlags};
use crate::{
    DelegateKind,
    boolean::merge_edges,
    geom::{BBox, Edge},
    plugins::{EdgeFilter, EdgeProcessor, process_all},
    properties::WithProperties,
};

/// Edges held in a plain list.
#[derive(Debug, Clone, Default)]
pub struct FlatEdges {
    shapes: Vec<WithProperties<Edge>>,
    flags: EdgesFlags,
    merged: bool,
}

impl FlatEdges {
    pub fn new(shapes: Vec<WithProperties<Edge>>, flags: EdgesFlags) -> Self {
        FlatEdges {
            shapes,
            flags,
            merged: false,
        }
    }

    pub(crate) fn boxed<'s>(shapes: Vec<WithProperties<Edge>>, merged: bool) -> EdgesBox<'s> {
        Box::new(FlatEdges {
            shapes,
            flags: EdgesFlags::new(),
            merged,
        })
    }

    pub fn insert(&mut self, edge: WithProperties<Edge>) {
        self.shapes.push(edge);
        self.merged = false;
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
        self.merged = false;
    }
}

impl<'s> EdgesDelegate<'s> for FlatEdges {
    fn kind(&self) -> DelegateKind {
        DelegateKind::Flat
    }

    fn clone_delegate(&self) -> EdgesBox<'s> {
        Box::new(self.clone())
    }

    fn flags(&self) -> &EdgesFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut EdgesFlags {
        &mut self.flags
    }

    fn iter(&self) -> Box<dyn Iterator<Item = WithProperties<Edge>> + '_> {
        Box::new(self.shapes.iter().cloned())
    }

    fn as_flat_mut(&mut self) -> Option<&mut FlatEdges> {
        Some(self)
    }

    fn shapes(&self) -> Cow<'_, [WithProperties<Edge>]> {
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
            .fold(BBox::empty(), |b, e| b.union(&e.shape.bbox()))
    }

    fn merged_in_place(mut self: Box<Self>) -> EdgesBox<'s> {
        if !self.is_merged() {
            self.shapes = merge_edges(&self.shapes);
            self.merged = true;
        }
        self
    }

    fn add_in_place(mut self: Box<Self>, other: &dyn EdgesDelegate<'s>) -> EdgesBox<'s> {
        if !other.is_empty() {
            self.shapes.extend(other.iter());
            self.merged = false;
        }
        self
    }

    fn filter_in_place(mut self: Box<Self>, filter: &dyn EdgeFilter) -> EdgesBox<'s> {
        if !filter.requires_raw_input() && self.flags.merged_semantics && !self.is_merged() {
            self.shapes = merge_edges(&self.shapes);
            self.merged = true;
        }
        self.shapes.retain(|e| filter.selected(&e.shape, e.prop_id));
        self
    }

    fn process_in_place(mut self: Box<Self>, processor: &EdgeProcessor) -> EdgesBox<'s> {
        let input = if !processor.requires_raw_input() && self.flags.merged_semantics && !self.is_merged() {
            merge_edges(&self.shapes)
        } else {
            std::mem::take(&mut self.shapes)
        };
        self.shapes = process_all(&input, processor);
        self.merged = processor.result_is_merged();
        self
    }
}
