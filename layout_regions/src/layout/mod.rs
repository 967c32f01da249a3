//! Minimal cell/instance hierarchy.
//!
//! This is the hierarchy collaborator the shape collections work against: cells hold per-layer
//! shape containers and instances of other cells placed with complex transformations. Shapes are
//! read back through the restartable [RecursiveShapeIterator].

mod iter;
mod shapes;

pub use iter::{RecursiveShapeIterator, ShapeRef};
pub use shapes::{LayoutShape, Shapes};

use std::{
    collections::{BTreeMap, HashMap},
    sync::atomic::{AtomicU64, Ordering},
};

use crate::{
    errors::{RegionError, RegionResult},
    geom::{BBox, CplxTrans},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Index of a cell inside its layout.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellIndex(pub usize);

/// Index of a layer inside its layout.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerIndex(pub usize);

/// Placement of a cell inside another one.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub cell: CellIndex,
    pub trans: CplxTrans,
}

impl Instance {
    pub fn new(cell: CellIndex, trans: CplxTrans) -> Self {
        Instance { cell, trans }
    }
}

/// A cell: named container of per-layer shapes and child instances.
#[derive(Debug, Clone, Default)]
pub struct Cell {
    name: String,
    shapes: BTreeMap<LayerIndex, Shapes>,
    instances: Vec<Instance>,
}

impl Cell {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Shapes on `layer`, `None` if the cell never had shapes on it.
    #[inline]
    pub fn shapes(&self, layer: LayerIndex) -> Option<&Shapes> {
        self.shapes.get(&layer)
    }

    /// Shapes on `layer`, created on demand.
    #[inline]
    pub fn shapes_mut(&mut self, layer: LayerIndex) -> &mut Shapes {
        self.shapes.entry(layer).or_default()
    }

    /// True if the cell holds no shapes on `layer`.
    pub fn is_empty_on(&self, layer: LayerIndex) -> bool {
        self.shapes.get(&layer).is_none_or(|s| s.is_empty())
    }
}

static NEXT_LAYOUT_ID: AtomicU64 = AtomicU64::new(1);

/// A layout: a flat list of cells plus the layer table.
#[derive(Debug)]
pub struct Layout {
    id: u64,
    cells: Vec<Cell>,
    layers: Vec<String>,
    cell_by_name: HashMap<String, CellIndex>,
}

impl Clone for Layout {
    /// Clones get their own identity, a store never mistakes a clone for the original.
    fn clone(&self) -> Self {
        Layout {
            id: NEXT_LAYOUT_ID.fetch_add(1, Ordering::Relaxed),
            cells: self.cells.clone(),
            layers: self.layers.clone(),
            cell_by_name: self.cell_by_name.clone(),
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new()
    }
}

impl Layout {
    pub fn new() -> Self {
        Layout {
            id: NEXT_LAYOUT_ID.fetch_add(1, Ordering::Relaxed),
            cells: Vec::new(),
            layers: Vec::new(),
            cell_by_name: HashMap::new(),
        }
    }

    /// Process-unique identity of this layout object.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Add a cell. Names are made unique by appending `$n` if needed.
    pub fn add_cell(&mut self, name: &str) -> CellIndex {
        let mut unique = name.to_string();
        let mut n = 1;
        while self.cell_by_name.contains_key(&unique) {
            unique = format!("{name}${n}");
            n += 1;
        }
        let ci = CellIndex(self.cells.len());
        self.cells.push(Cell {
            name: unique.clone(),
            ..Default::default()
        });
        self.cell_by_name.insert(unique, ci);
        ci
    }

    pub fn insert_layer(&mut self, name: &str) -> LayerIndex {
        self.layers.push(name.to_string());
        LayerIndex(self.layers.len() - 1)
    }

    pub fn layer_name(&self, layer: LayerIndex) -> Option<&str> {
        self.layers.get(layer.0).map(|s| s.as_str())
    }

    pub fn find_layer(&self, name: &str) -> Option<LayerIndex> {
        self.layers.iter().position(|l| l == name).map(LayerIndex)
    }

    #[inline]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_valid_cell(&self, ci: CellIndex) -> bool {
        ci.0 < self.cells.len()
    }

    #[inline]
    pub fn is_valid_layer(&self, layer: LayerIndex) -> bool {
        layer.0 < self.layers.len()
    }

    pub fn check_cell(&self, ci: CellIndex) -> RegionResult<()> {
        if self.is_valid_cell(ci) {
            Ok(())
        } else {
            Err(RegionError::UnknownCell(ci))
        }
    }

    pub fn check_layer(&self, layer: LayerIndex) -> RegionResult<()> {
        if self.is_valid_layer(layer) {
            Ok(())
        } else {
            Err(RegionError::UnknownLayer(layer))
        }
    }

    pub fn find_cell(&self, name: &str) -> Option<CellIndex> {
        self.cell_by_name.get(name).copied()
    }

    #[inline]
    pub fn cell(&self, ci: CellIndex) -> &Cell {
        &self.cells[ci.0]
    }

    #[inline]
    pub fn cell_mut(&mut self, ci: CellIndex) -> &mut Cell {
        &mut self.cells[ci.0]
    }

    pub fn cells(&self) -> impl Iterator<Item = (CellIndex, &Cell)> + '_ {
        self.cells.iter().enumerate().map(|(i, c)| (CellIndex(i), c))
    }

    /// Place `child` inside `parent` with `trans`.
    pub fn add_instance(&mut self, parent: CellIndex, child: CellIndex, trans: CplxTrans) {
        self.cells[parent.0]
            .instances
            .push(Instance::new(child, trans));
    }

    /// Replace all instances of `parent`.
    pub fn set_instances(&mut self, parent: CellIndex, instances: Vec<Instance>) {
        self.cells[parent.0].instances = instances;
    }

    /// Insert a shape into a cell.
    pub fn insert<S: LayoutShape>(&mut self, ci: CellIndex, layer: LayerIndex, shape: S) {
        S::container_mut(self.cells[ci.0].shapes_mut(layer))
            .push(crate::properties::WithProperties::plain(shape));
    }

    /// Duplicate a cell with all its shapes and instances. The copy gets a `$n` suffixed name.
    pub fn copy_cell(&mut self, ci: CellIndex) -> CellIndex {
        let src = self.cells[ci.0].clone();
        let copy = self.add_cell(&src.name);
        let cell = &mut self.cells[copy.0];
        cell.shapes = src.shapes;
        cell.instances = src.instances;
        copy
    }

    /// Point instance `index` of `parent` to another cell, keeping its transformation.
    pub fn redirect_instance(&mut self, parent: CellIndex, index: usize, cell: CellIndex) {
        self.cells[parent.0].instances[index].cell = cell;
    }

    /// Remove all shapes of `layer` in every cell.
    pub fn clear_layer(&mut self, layer: LayerIndex) {
        for c in self.cells.iter_mut() {
            c.shapes.remove(&layer);
        }
    }

    /// Cells without parents.
    pub fn top_cells(&self) -> Vec<CellIndex> {
        let mut has_parent = vec![false; self.cells.len()];
        for c in &self.cells {
            for inst in &c.instances {
                has_parent[inst.cell.0] = true;
            }
        }
        (0..self.cells.len())
            .filter(|&i| !has_parent[i])
            .map(CellIndex)
            .collect()
    }

    /// Cells reachable from `top` (including `top`) ordered so that every cell comes after all of
    /// its children.
    pub fn cells_bottom_up(&self, top: CellIndex) -> RegionResult<Vec<CellIndex>> {
        self.check_cell(top)?;
        // 0 = unvisited, 1 = in progress, 2 = done
        let mut state = vec![0u8; self.cells.len()];
        let mut order = Vec::new();
        let mut stack = vec![(top, 0usize)];
        state[top.0] = 1;
        while let Some(&mut (ci, ref mut next)) = stack.last_mut() {
            let insts = &self.cells[ci.0].instances;
            if *next < insts.len() {
                let child = insts[*next].cell;
                *next += 1;
                match state[child.0] {
                    0 => {
                        state[child.0] = 1;
                        stack.push((child, 0));
                    }
                    1 => return Err(RegionError::RecursiveHierarchy(child)),
                    _ => {}
                }
            } else {
                state[ci.0] = 2;
                order.push(ci);
                stack.pop();
            }
        }
        Ok(order)
    }

    /// Parent instances of every cell reachable from `top`: `(parent, instance index)` lists.
    pub fn parent_instances(&self, top: CellIndex) -> RegionResult<HashMap<CellIndex, Vec<(CellIndex, usize)>>> {
        let mut parents: HashMap<CellIndex, Vec<(CellIndex, usize)>> = HashMap::new();
        for ci in self.cells_bottom_up(top)? {
            for (i, inst) in self.cells[ci.0].instances.iter().enumerate() {
                parents.entry(inst.cell).or_default().push((ci, i));
            }
        }
        Ok(parents)
    }

    /// Bounding box of a cell including its subtree, restricted to `layers`.
    pub fn cell_bbox(&self, ci: CellIndex, layers: &[LayerIndex]) -> BBox {
        let mut cache = HashMap::new();
        self.cell_bbox_cached(ci, layers, &mut cache)
    }

    pub(crate) fn cell_bbox_cached(
        &self,
        ci: CellIndex,
        layers: &[LayerIndex],
        cache: &mut HashMap<CellIndex, BBox>,
    ) -> BBox {
        if let Some(b) = cache.get(&ci) {
            return *b;
        }
        let cell = &self.cells[ci.0];
        let mut b = BBox::empty();
        for &l in layers {
            if let Some(s) = cell.shapes(l) {
                b = b.union(&s.bbox());
            }
        }
        for inst in &cell.instances {
            let cb = self.cell_bbox_cached(inst.cell, layers, cache);
            b = b.union(&cb.transformed(&inst.trans));
        }
        cache.insert(ci, b);
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Polygon;

    #[test]
    fn bottom_up_order_and_bbox() {
        let mut ly = Layout::new();
        let l1 = ly.insert_layer("1/0");
        let top = ly.add_cell("TOP");
        let a = ly.add_cell("A");
        let b = ly.add_cell("B");
        ly.add_instance(top, a, CplxTrans::displacement(100, 0));
        ly.add_instance(a, b, CplxTrans::displacement(0, 100));
        ly.insert(b, l1, Polygon::from_box(BBox::new(0, 0, 10, 10)));

        let order = ly.cells_bottom_up(top).unwrap();
        assert_eq!(order, vec![b, a, top]);
        assert_eq!(ly.cell_bbox(top, &[l1]), BBox::new(100, 100, 110, 110));
        assert_eq!(ly.top_cells(), vec![top]);
    }

    #[test]
    fn recursion_is_reported() {
        let mut ly = Layout::new();
        let a = ly.add_cell("A");
        let b = ly.add_cell("B");
        ly.add_instance(a, b, CplxTrans::unity());
        ly.add_instance(b, a, CplxTrans::unity());
        assert!(matches!(
            ly.cells_bottom_up(a),
            Err(RegionError::RecursiveHierarchy(_))
        ));
    }

    #[test]
    fn copy_and_redirect() {
        let mut ly = Layout::new();
        let l1 = ly.insert_layer("1/0");
        let top = ly.add_cell("TOP");
        let a = ly.add_cell("A");
        ly.insert(a, l1, Polygon::from_box(BBox::new(0, 0, 10, 10)));
        ly.add_instance(top, a, CplxTrans::unity());
        ly.add_instance(top, a, CplxTrans::displacement(50, 0));

        let a1 = ly.copy_cell(a);
        ly.redirect_instance(top, 1, a1);
        assert_eq!(ly.cell(a1).name(), "A$1");
        assert_eq!(ly.cell(a1).shapes(l1), ly.cell(a).shapes(l1));
        assert_eq!(ly.cell(top).instances()[1].cell, a1);
        assert_eq!(ly.cell_bbox(top, &[l1]), BBox::new(0, 0, 60, 10));
    }

    #[test]
    fn unique_cell_names() {
        let mut ly = Layout::new();
        ly.add_cell("A");
        let a1 = ly.add_cell("A");
        assert_eq!(ly.cell(a1).name(), "A$1");
        assert_eq!(ly.find_cell("A$1"), Some(a1));
    }
}
