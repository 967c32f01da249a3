use std::collections::HashMap;

use super::{
    hier::{CellTask, Decomposition, Plan, plan},
    store::DeepLayer,
};
use crate::{
    errors::RegionResult,
    geom::{BBox, CplxTrans},
    layout::{CellIndex, LayerIndex, Layout, LayoutShape, RecursiveShapeIterator},
    properties::WithProperties,
};

fn transformed<S: LayoutShape>(shapes: Vec<WithProperties<S>>, t: &CplxTrans) -> Vec<WithProperties<S>> {
    if t.is_unity() {
        return shapes;
    }
    shapes
        .into_iter()
        .map(|s| WithProperties::new(s.shape.transformed(t), s.prop_id))
        .collect()
}

/// Shapes of all source cells of a task in the coordinates of the task cell.
fn gather<S: LayoutShape>(layout: &Layout, task: &CellTask, layer: LayerIndex) -> Vec<WithProperties<S>> {
    let mut out = Vec::new();
    for (ci, t) in &task.sources {
        let Some(shapes) = layout.cell(*ci).shapes(layer) else {
            continue;
        };
        let container = S::container(shapes);
        if t.is_unity() {
            out.extend_from_slice(container);
        } else {
            out.extend(
                container
                    .iter()
                    .map(|s| WithProperties::new(s.shape.transformed(t), s.prop_id)),
            );
        }
    }
    out
}

/// Plan the tasks for `inputs`, call `op` once per task and store what it returns in a new layer
/// of the same layout, transformed back from the variant frame.
fn run_tasks<'s, O, F>(inputs: &[&DeepLayer<'s>], mode: Decomposition, mut op: F) -> DeepLayer<'s>
where
    O: LayoutShape,
    F: FnMut(&Layout, &CellTask) -> Vec<WithProperties<O>>,
{
    let first = inputs[0];
    let output = first.derived();
    let layers: Vec<LayerIndex> = inputs.iter().map(|l| l.layer()).collect();
    let copies = first
        .store()
        .with_layout_mut(first.layout_index(), |layout, top| {
            let Plan { tasks, copies } = plan(layout, top, &layers, first.trans(), mode);
            for task in &tasks {
                let results = op(&*layout, task);
                if results.is_empty() {
                    continue;
                }
                let results = transformed(results, &task.variant.inverted());
                O::container_mut(layout.cell_mut(task.cell).shapes_mut(output.layer()))
                    .extend(results);
            }
            copies
        });
    first.store().record_copies(first.layout_index(), &copies);
    output
}

/// Run `op` once per cell task over the inputs (all compatible with the first one) and store the
/// results in a new layer of the same layout.
///
/// `op` sees the inputs in the cell variant's frame, results are transformed back into the cell.
/// Tasks without any input shapes are skipped.
pub(crate) fn run_cells<'s, I, O, F>(
    inputs: &[&DeepLayer<'s>],
    mode: Decomposition,
    mut op: F,
) -> DeepLayer<'s>
where
    I: LayoutShape,
    O: LayoutShape,
    F: FnMut(Vec<Vec<WithProperties<I>>>) -> Vec<WithProperties<O>>,
{
    run_tasks(inputs, mode, |layout, task| {
        let contents: Vec<Vec<WithProperties<I>>> = inputs
            .iter()
            .map(|l| transformed(gather(layout, task, l.layer()), &task.variant))
            .collect();
        if contents.iter().all(|c| c.is_empty()) {
            return Vec::new();
        }
        op(contents)
    })
}

/// Like [run_cells] for two inputs holding different shape kinds.
pub(crate) fn run_cells2<'s, A, B, O, F>(
    a: &DeepLayer<'s>,
    b: &DeepLayer<'s>,
    mode: Decomposition,
    mut op: F,
) -> DeepLayer<'s>
where
    A: LayoutShape,
    B: LayoutShape,
    O: LayoutShape,
    F: FnMut(Vec<WithProperties<A>>, Vec<WithProperties<B>>) -> Vec<WithProperties<O>>,
{
    run_tasks(&[a, b], mode, |layout, task| {
        let sa = transformed(gather::<A>(layout, task, a.layer()), &task.variant);
        let sb = transformed(gather::<B>(layout, task, b.layer()), &task.variant);
        if sa.is_empty() && sb.is_empty() {
            return Vec::new();
        }
        op(sa, sb)
    })
}

/// Copy of a layer restricted to one shape kind.
pub(crate) fn copy_layer<'s, S: LayoutShape>(input: &DeepLayer<'s>) -> DeepLayer<'s> {
    let output = input.derived();
    input
        .store()
        .with_layout_mut(input.layout_index(), |layout, _| {
            for ci in (0..layout.cell_count()).map(CellIndex) {
                let shapes = match layout.cell(ci).shapes(input.layer()) {
                    Some(s) if !S::container(s).is_empty() => S::container(s).clone(),
                    _ => continue,
                };
                S::container_mut(layout.cell_mut(ci).shapes_mut(output.layer())).extend(shapes);
            }
        });
    output
}

/// Shapes of both layers in one new layer.
pub(crate) fn concat_layers<'s, S: LayoutShape>(a: &DeepLayer<'s>, b: &DeepLayer<'s>) -> DeepLayer<'s> {
    let output = copy_layer::<S>(a);
    a.store().with_layout_mut(a.layout_index(), |layout, _| {
        for ci in (0..layout.cell_count()).map(CellIndex) {
            let shapes = match layout.cell(ci).shapes(b.layer()) {
                Some(s) if !S::container(s).is_empty() => S::container(s).clone(),
                _ => continue,
            };
            S::container_mut(layout.cell_mut(ci).shapes_mut(output.layer())).extend(shapes);
        }
    });
    output
}

/// All shapes of a layer in top cell coordinates.
pub(crate) fn flatten<S: LayoutShape>(layer: &DeepLayer<'_>) -> Vec<WithProperties<S>> {
    layer.store().with_layout(layer.layout_index(), |layout, top| {
        match RecursiveShapeIterator::new(layout, top, layer.layer()) {
            Ok(iter) => iter
                .set_global_trans(*layer.trans())
                .shapes::<S>()
                .map(|s| s.to_owned_shape())
                .collect(),
            Err(e) => unreachable!("internal library error: invalid deep layer: {e}"),
        }
    })
}

fn bottom_up(layout: &Layout, top: CellIndex) -> Vec<CellIndex> {
    match layout.cells_bottom_up(top) {
        Ok(order) => order,
        Err(e) => unreachable!("internal library error: invalid store hierarchy: {e}"),
    }
}

/// Number of shapes as seen flat and as stored (per cell).
pub(crate) fn counts<S: LayoutShape>(layer: &DeepLayer<'_>) -> (usize, usize) {
    layer.store().with_layout(layer.layout_index(), |layout, top| {
        let order = bottom_up(layout, top);
        let mut placements: HashMap<CellIndex, usize> = HashMap::from([(top, 1)]);
        let mut flat = 0;
        let mut hier = 0;
        for &ci in order.iter().rev() {
            let n = placements.get(&ci).copied().unwrap_or(0);
            let cell = layout.cell(ci);
            let own = cell
                .shapes(layer.layer())
                .map_or(0, |s| S::container(s).len());
            flat += n * own;
            hier += own;
            for inst in cell.instances() {
                *placements.entry(inst.cell).or_insert(0) += n;
            }
        }
        (flat, hier)
    })
}

pub(crate) fn bbox<S: LayoutShape>(layer: &DeepLayer<'_>) -> BBox {
    layer.store().with_layout(layer.layout_index(), |layout, top| {
        let mut cache = HashMap::new();
        layout
            .cell_bbox_cached(top, &[layer.layer()], &mut cache)
            .transformed(layer.trans())
    })
}

/// Write the shapes of a layer into `target`, rebuilding the part of the cell tree that holds
/// shapes below `cell`.
pub(crate) fn insert_hierarchy<S: LayoutShape>(
    layer: &DeepLayer<'_>,
    target: &mut Layout,
    cell: CellIndex,
    target_layer: LayerIndex,
) -> RegionResult<()> {
    target.check_cell(cell)?;
    target.check_layer(target_layer)?;
    layer.store().with_layout(layer.layout_index(), |layout, top| {
        let mut cache = HashMap::new();
        let mut mapped: HashMap<CellIndex, CellIndex> = HashMap::new();
        for ci in bottom_up(layout, top) {
            if layout
                .cell_bbox_cached(ci, &[layer.layer()], &mut cache)
                .is_empty()
            {
                continue;
            }
            let src = layout.cell(ci);
            let (dest, t) = if ci == top {
                (cell, *layer.trans())
            } else {
                (target.add_cell(src.name()), CplxTrans::unity())
            };
            if let Some(shapes) = src.shapes(layer.layer()) {
                let own = transformed(S::container(shapes).clone(), &t);
                S::container_mut(target.cell_mut(dest).shapes_mut(target_layer)).extend(own);
            }
            for inst in src.instances() {
                if let Some(&child) = mapped.get(&inst.cell) {
                    target.add_instance(dest, child, t.concat(&inst.trans));
                }
            }
            mapped.insert(ci, dest);
        }
    });
    Ok(())
}
