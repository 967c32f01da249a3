use std::{
    cell::{Ref, RefCell, RefMut},
    collections::{HashMap, HashSet},
    fmt,
};

use crate::{
    errors::{RegionError, RegionResult},
    geom::CplxTrans,
    layout::{CellIndex, LayerIndex, Layout, LayoutShape, RecursiveShapeIterator},
};

#[derive(Debug)]
struct StoreLayout {
    layout: Layout,
    top: CellIndex,
    /// Identity and top cell of the layout the hierarchy was taken from.
    source: Option<(u64, CellIndex)>,
    /// Source cell of every variant copy.
    origin: HashMap<CellIndex, CellIndex>,
}

impl StoreLayout {
    fn source_cell(&self, ci: CellIndex) -> CellIndex {
        self.origin.get(&ci).copied().unwrap_or(ci)
    }
}

/// Caller owned container of the hierarchies deep collections work on.
///
/// The store holds one layout per source hierarchy (identified by source layout and top cell).
/// Each layout mirrors the cell tree of its source; shape data lives in layers created on demand.
/// Deep collections borrow the store, so it must outlive them:
///
/// ```compile_fail
/// # use layout_regions::prelude::*;
/// let region = {
///     let store = DeepShapeStore::new();
///     let mut ly = Layout::new();
///     let l1 = ly.insert_layer("1/0");
///     let top = ly.add_cell("TOP");
///     let it = RecursiveShapeIterator::new(&ly, top, l1).unwrap();
///     Region::new_deep(&it, &store).unwrap()
/// };
/// ```
///
/// The store is single threaded: it uses interior mutability to add result layers while
/// collections hold shared borrows of it.
#[derive(Default)]
pub struct DeepShapeStore {
    layouts: RefCell<Vec<StoreLayout>>,
}

impl fmt::Debug for DeepShapeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeepShapeStore")
            .field("layouts", &self.layouts.borrow().len())
            .finish()
    }
}

impl DeepShapeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store taking over `layout` as its only hierarchy, see [DeepShapeStore::singular_layer].
    pub fn from_layout(layout: Layout, top: CellIndex) -> RegionResult<Self> {
        layout.cells_bottom_up(top)?;
        let store = Self::new();
        store.push_layout(layout, top, None);
        Ok(store)
    }

    /// True if the store holds exactly one layout.
    pub fn is_singular(&self) -> bool {
        self.layouts.borrow().len() == 1
    }

    pub fn layout_count(&self) -> usize {
        self.layouts.borrow().len()
    }

    /// Read access to a store layout.
    pub fn layout(&self, index: usize) -> RegionResult<Ref<'_, Layout>> {
        Ref::filter_map(self.layouts.borrow(), |l| l.get(index).map(|s| &s.layout))
            .map_err(|_| RegionError::UnknownLayout(index))
    }

    /// Write access to a store layout. Changing the cell tree invalidates the deep layers on it.
    pub fn layout_mut(&self, index: usize) -> RegionResult<RefMut<'_, Layout>> {
        RefMut::filter_map(self.layouts.borrow_mut(), |l| {
            l.get_mut(index).map(|s| &mut s.layout)
        })
        .map_err(|_| RegionError::UnknownLayout(index))
    }

    /// Top cell of a store layout.
    pub fn top_cell(&self, index: usize) -> RegionResult<CellIndex> {
        self.layouts
            .borrow()
            .get(index)
            .map(|s| s.top)
            .ok_or(RegionError::UnknownLayout(index))
    }

    /// Deep layer over an existing layer of the only layout of a singular store.
    pub fn singular_layer(&self, layer: LayerIndex) -> RegionResult<DeepLayer<'_>> {
        let n = self.layout_count();
        if n != 1 {
            return Err(RegionError::NotSingular(n));
        }
        self.layout(0)?.check_layer(layer)?;
        Ok(DeepLayer {
            store: self,
            layout: 0,
            layer,
            trans: CplxTrans::unity(),
        })
    }

    /// Copy the shapes of kind `S` delivered by `iter` into a new layer.
    ///
    /// The hierarchy below the iterator's top cell is mirrored once per source layout; further
    /// layers from the same source share it. Iterators restricted to a search region or a maximum
    /// depth cannot be represented hierarchically and are stored flat in a layout of their own.
    pub fn create_layer<S: LayoutShape>(
        &self,
        iter: &RecursiveShapeIterator<'_>,
    ) -> RegionResult<DeepLayer<'_>> {
        let source = iter.layout();
        let top = iter.top_cell();
        let name = iter
            .layers()
            .iter()
            .filter_map(|&l| source.layer_name(l))
            .collect::<Vec<_>>()
            .join("+");

        if !iter.is_complete() {
            let mut layout = Layout::new();
            let layer = layout.insert_layer(&name);
            let ci = layout.add_cell(source.cell(top).name());
            S::container_mut(layout.cell_mut(ci).shapes_mut(layer))
                .extend(iter.shapes::<S>().map(|s| s.to_owned_shape()));
            log::debug!("stored clipped hierarchy of cell {top:?} flat");
            let index = self.push_layout(layout, ci, None);
            return Ok(DeepLayer {
                store: self,
                layout: index,
                layer,
                trans: CplxTrans::unity(),
            });
        }

        let order = source.cells_bottom_up(top)?;
        let key = (source.id(), top);
        let existing = self
            .layouts
            .borrow()
            .iter()
            .position(|s| s.source == Some(key));

        let index = match existing {
            Some(index) => index,
            None => {
                let mut layout = Layout::new();
                for (_, cell) in source.cells() {
                    layout.add_cell(cell.name());
                }
                for (ci, cell) in source.cells() {
                    layout.set_instances(ci, cell.instances().to_vec());
                }
                log::debug!("new deep store layout for cell {top:?} ({} cells)", order.len());
                self.push_layout(layout, top, Some(key))
            }
        };

        let below_top: HashSet<CellIndex> = order.iter().copied().collect();
        let mut layouts = self.layouts.borrow_mut();
        let store_layout = &mut layouts[index];
        let layer = store_layout.layout.insert_layer(&name);
        // variant copies made by earlier operations receive the shapes of their source cell
        for ci in (0..store_layout.layout.cell_count()).map(CellIndex) {
            let src = store_layout.source_cell(ci);
            if !below_top.contains(&src) {
                continue;
            }
            let cell = source.cell(src);
            for &l in iter.layers() {
                if let Some(shapes) = cell.shapes(l) {
                    S::container_mut(store_layout.layout.cell_mut(ci).shapes_mut(layer))
                        .extend_from_slice(S::container(shapes));
                }
            }
        }

        Ok(DeepLayer {
            store: self,
            layout: index,
            layer,
            trans: *iter.global_trans(),
        })
    }

    fn push_layout(&self, layout: Layout, top: CellIndex, source: Option<(u64, CellIndex)>) -> usize {
        let mut layouts = self.layouts.borrow_mut();
        layouts.push(StoreLayout {
            layout,
            top,
            source,
            origin: HashMap::new(),
        });
        layouts.len() - 1
    }

    /// Remember the source cells of `(copy, original)` cell copies made in a store layout.
    pub(crate) fn record_copies(&self, index: usize, copies: &[(CellIndex, CellIndex)]) {
        if copies.is_empty() {
            return;
        }
        let mut layouts = self.layouts.borrow_mut();
        let Some(s) = layouts.get_mut(index) else {
            unreachable!("internal library error: deep layer refers to unknown layout {index}")
        };
        for &(copy, original) in copies {
            let src = s.source_cell(original);
            s.origin.insert(copy, src);
        }
    }

    pub(crate) fn with_layout<R>(&self, index: usize, f: impl FnOnce(&Layout, CellIndex) -> R) -> R {
        let layouts = self.layouts.borrow();
        match layouts.get(index) {
            Some(s) => f(&s.layout, s.top),
            None => unreachable!("internal library error: deep layer refers to unknown layout {index}"),
        }
    }

    pub(crate) fn with_layout_mut<R>(
        &self,
        index: usize,
        f: impl FnOnce(&mut Layout, CellIndex) -> R,
    ) -> R {
        let mut layouts = self.layouts.borrow_mut();
        match layouts.get_mut(index) {
            Some(s) => {
                let top = s.top;
                f(&mut s.layout, top)
            }
            None => unreachable!("internal library error: deep layer refers to unknown layout {index}"),
        }
    }
}

/// Handle of one layer inside a [DeepShapeStore] layout, seen through an accumulated
/// transformation.
#[derive(Clone)]
pub struct DeepLayer<'s> {
    store: &'s DeepShapeStore,
    layout: usize,
    layer: LayerIndex,
    trans: CplxTrans,
}

impl fmt::Debug for DeepLayer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeepLayer")
            .field("layout", &self.layout)
            .field("layer", &self.layer)
            .field("trans", &self.trans)
            .finish()
    }
}

impl<'s> DeepLayer<'s> {
    #[inline]
    pub fn store(&self) -> &'s DeepShapeStore {
        self.store
    }

    #[inline]
    pub fn layout_index(&self) -> usize {
        self.layout
    }

    #[inline]
    pub fn layer(&self) -> LayerIndex {
        self.layer
    }

    #[inline]
    pub fn trans(&self) -> &CplxTrans {
        &self.trans
    }

    /// True if both layers live in the same store layout and are seen the same way, so that
    /// operations between them can run cell by cell.
    pub fn is_compatible(&self, other: &DeepLayer<'_>) -> bool {
        std::ptr::eq(self.store, other.store) && self.layout == other.layout && self.trans == other.trans
    }

    /// A new empty layer in the same layout.
    pub(crate) fn derived(&self) -> DeepLayer<'s> {
        let layer = self.store.with_layout_mut(self.layout, |ly, _| ly.insert_layer("derived"));
        DeepLayer {
            store: self.store,
            layout: self.layout,
            layer,
            trans: self.trans,
        }
    }
}
