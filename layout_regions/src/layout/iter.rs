use std::{collections::HashMap, marker::PhantomData};

use super::{CellIndex, LayerIndex, Layout, LayoutShape};
use crate::{
    errors::RegionResult,
    geom::{BBox, CplxTrans},
    properties::{PropertiesId, WithProperties},
};

/// Query over the shapes of a cell tree: a top cell, a set of layers, an optional search region
/// and a global transformation.
///
/// The query itself holds no iteration state. Every call to [RecursiveShapeIterator::shapes]
/// starts a fresh traversal, so the query can be restarted any number of times.
///
/// # Examples
///
/// ```
/// # use layout_regions::layout::*;
/// # use layout_regions::geom::*;
/// let mut ly = Layout::new();
/// let l1 = ly.insert_layer("1/0");
/// let top = ly.add_cell("TOP");
/// let child = ly.add_cell("CHILD");
/// ly.insert(child, l1, Polygon::from_box(BBox::new(0, 0, 10, 10)));
/// ly.add_instance(top, child, CplxTrans::displacement(100, 0));
/// ly.add_instance(top, child, CplxTrans::displacement(200, 0));
///
/// let it = RecursiveShapeIterator::new(&ly, top, l1).unwrap();
/// let boxes: Vec<BBox> = it.shapes::<Polygon>().map(|s| s.transformed().bbox()).collect();
/// assert_eq!(boxes, vec![BBox::new(100, 0, 110, 10), BBox::new(200, 0, 210, 10)]);
/// // restarting gives the same sequence
/// assert_eq!(it.shapes::<Polygon>().count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveShapeIterator<'l> {
    layout: &'l Layout,
    top: CellIndex,
    layers: Vec<LayerIndex>,
    region: Option<BBox>,
    global_trans: CplxTrans,
    max_depth: usize,
}

impl<'l> RecursiveShapeIterator<'l> {
    /// Query over `layer` of the tree below `top`.
    pub fn new(layout: &'l Layout, top: CellIndex, layer: LayerIndex) -> RegionResult<Self> {
        Self::with_layers(layout, top, vec![layer])
    }

    /// Query over several layers. The layer each shape comes from is reported as its source tag.
    pub fn with_layers(
        layout: &'l Layout,
        top: CellIndex,
        layers: Vec<LayerIndex>,
    ) -> RegionResult<Self> {
        layout.check_cell(top)?;
        for &l in &layers {
            layout.check_layer(l)?;
        }
        Ok(RecursiveShapeIterator {
            layout,
            top,
            layers,
            region: None,
            global_trans: CplxTrans::unity(),
            max_depth: usize::MAX,
        })
    }

    /// Only deliver shapes whose transformed bounding box touches `region`.
    pub fn set_region(mut self, region: BBox) -> Self {
        self.region = Some(region);
        self
    }

    /// Transformation applied on top of every accumulated instance transformation.
    pub fn set_global_trans(mut self, t: CplxTrans) -> Self {
        self.global_trans = t;
        self
    }

    /// Limit the hierarchy depth (0 = top cell only).
    pub fn set_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    #[inline]
    pub fn layout(&self) -> &'l Layout {
        self.layout
    }

    #[inline]
    pub fn top_cell(&self) -> CellIndex {
        self.top
    }

    #[inline]
    pub fn layers(&self) -> &[LayerIndex] {
        &self.layers
    }

    #[inline]
    pub fn region(&self) -> Option<BBox> {
        self.region
    }

    #[inline]
    pub fn global_trans(&self) -> &CplxTrans {
        &self.global_trans
    }

    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// True if the query delivers the complete tree (no region, no depth limit) so the hierarchy
    /// can be taken over as is.
    pub fn is_complete(&self) -> bool {
        self.region.is_none() && self.max_depth == usize::MAX
    }

    /// Start a traversal delivering shapes of kind `S`.
    pub fn shapes<'q, S: LayoutShape>(&'q self) -> ShapeIter<'l, 'q, S> {
        ShapeIter {
            query: self,
            stack: vec![Frame {
                cell: self.top,
                trans: self.global_trans,
                depth: 0,
                layer_pos: 0,
                shape_pos: 0,
                inst_pos: 0,
            }],
            bbox_cache: HashMap::new(),
            _shape: PhantomData,
        }
    }
}

/// A shape delivered by the recursive iterator.
#[derive(Debug, Clone)]
pub struct ShapeRef<'l, S> {
    /// Shape in the coordinates of the cell holding it.
    pub shape: &'l S,
    pub prop_id: PropertiesId,
    /// Accumulated transformation into the top cell (global transformation included).
    pub trans: CplxTrans,
    /// Source tag: the layer the shape was found on.
    pub layer: LayerIndex,
    /// The cell holding the shape.
    pub cell: CellIndex,
}

impl<S: LayoutShape> ShapeRef<'_, S> {
    /// Shape in top cell coordinates.
    pub fn transformed(&self) -> S {
        self.shape.transformed(&self.trans)
    }

    /// Shape in top cell coordinates together with its property id.
    pub fn to_owned_shape(&self) -> WithProperties<S> {
        WithProperties::new(self.transformed(), self.prop_id)
    }
}

#[derive(Debug)]
struct Frame {
    cell: CellIndex,
    trans: CplxTrans,
    depth: usize,
    layer_pos: usize,
    shape_pos: usize,
    inst_pos: usize,
}

/// Traversal state of one [RecursiveShapeIterator::shapes] call.
#[derive(Debug)]
pub struct ShapeIter<'l, 'q, S> {
    query: &'q RecursiveShapeIterator<'l>,
    stack: Vec<Frame>,
    bbox_cache: HashMap<CellIndex, BBox>,
    _shape: PhantomData<S>,
}

impl<'l, S: LayoutShape> Iterator for ShapeIter<'l, '_, S> {
    type Item = ShapeRef<'l, S>;

    fn next(&mut self) -> Option<Self::Item> {
        let layout = self.query.layout;
        let layers = &self.query.layers;
        loop {
            let frame = self.stack.last_mut()?;
            let cell = layout.cell(frame.cell);

            while frame.layer_pos < layers.len() {
                let layer = layers[frame.layer_pos];
                if let Some(shapes) = cell.shapes(layer) {
                    let container = S::container(shapes);
                    while frame.shape_pos < container.len() {
                        let s = &container[frame.shape_pos];
                        frame.shape_pos += 1;
                        if let Some(region) = &self.query.region
                            && !s.shape.bbox().transformed(&frame.trans).touches(region)
                        {
                            continue;
                        }
                        return Some(ShapeRef {
                            shape: &s.shape,
                            prop_id: s.prop_id,
                            trans: frame.trans,
                            layer,
                            cell: frame.cell,
                        });
                    }
                }
                frame.layer_pos += 1;
                frame.shape_pos = 0;
            }

            let instances = cell.instances();
            if frame.depth >= self.query.max_depth || frame.inst_pos >= instances.len() {
                self.stack.pop();
                continue;
            }

            let inst = &instances[frame.inst_pos];
            frame.inst_pos += 1;
            let trans = frame.trans.concat(&inst.trans);
            let depth = frame.depth + 1;
            if let Some(region) = &self.query.region {
                let cb = layout.cell_bbox_cached(inst.cell, layers, &mut self.bbox_cache);
                if !cb.transformed(&trans).touches(region) {
                    continue;
                }
            }
            self.stack.push(Frame {
                cell: inst.cell,
                trans,
                depth,
                layer_pos: 0,
                shape_pos: 0,
                inst_pos: 0,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Edge, Polygon};

    fn two_level() -> (Layout, CellIndex, LayerIndex, LayerIndex) {
        let mut ly = Layout::new();
        let l1 = ly.insert_layer("1/0");
        let l2 = ly.insert_layer("2/0");
        let top = ly.add_cell("TOP");
        let a = ly.add_cell("A");
        ly.insert(top, l1, Polygon::from_box(BBox::new(0, 0, 5, 5)));
        ly.insert(a, l1, Polygon::from_box(BBox::new(0, 0, 10, 10)));
        ly.insert(a, l2, Edge::from_coords(0, 0, 10, 0));
        ly.add_instance(top, a, CplxTrans::displacement(100, 0));
        ly.add_instance(top, a, CplxTrans::displacement(0, 100));
        (ly, top, l1, l2)
    }

    #[test]
    fn delivers_all_levels() {
        let (ly, top, l1, l2) = two_level();
        let it = RecursiveShapeIterator::with_layers(&ly, top, vec![l1, l2]).unwrap();
        assert_eq!(it.shapes::<Polygon>().count(), 3);
        let edges: Vec<_> = it.shapes::<Edge>().map(|s| s.transformed()).collect();
        assert_eq!(
            edges,
            vec![
                Edge::from_coords(100, 0, 110, 0),
                Edge::from_coords(0, 100, 10, 100)
            ]
        );
        assert!(it.shapes::<Edge>().all(|s| s.layer == l2));
    }

    #[test]
    fn region_and_depth() {
        let (ly, top, l1, _) = two_level();
        let it = RecursiveShapeIterator::new(&ly, top, l1)
            .unwrap()
            .set_region(BBox::new(90, -10, 120, 20));
        let b: Vec<_> = it.shapes::<Polygon>().map(|s| s.transformed().bbox()).collect();
        assert_eq!(b, vec![BBox::new(100, 0, 110, 10)]);

        let it = RecursiveShapeIterator::new(&ly, top, l1)
            .unwrap()
            .set_max_depth(0);
        assert_eq!(it.shapes::<Polygon>().count(), 1);
    }

    #[test]
    fn invalid_layer() {
        let (ly, top, _, _) = two_level();
        assert!(RecursiveShapeIterator::new(&ly, top, LayerIndex(7)).is_err());
    }
}
