//! Per-cell decomposition of hierarchical operations.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::{
    core::Control,
    geom::{BBox, Coord, CplxTrans},
    layout::{CellIndex, LayerIndex, Layout, Shapes},
    plugins::TransformClass,
    scan::{BoxScanner, BoxScanner2},
};

/// One unit of per-cell computation.
#[derive(Debug, Clone)]
pub(crate) struct CellTask {
    pub cell: CellIndex,
    /// Representative transformation of all placements of the cell (no displacement).
    pub variant: CplxTrans,
    /// Cells whose own shapes make up the content of `cell`, with their transformation into it.
    pub sources: Vec<(CellIndex, CplxTrans)>,
}

/// Tasks of one operation together with the cell copies made for its variants.
#[derive(Debug, Clone, Default)]
pub(crate) struct Plan {
    pub tasks: Vec<CellTask>,
    /// `(copy, original)` for every cell duplicated while planning.
    pub copies: Vec<(CellIndex, CellIndex)>,
}

/// How an operation is decomposed.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Decomposition {
    /// Interaction distance of non-local operations, `None` for operations on single shapes.
    pub interaction: Option<Coord>,
    pub reducer: TransformClass,
    pub wants_variants: bool,
}

impl Decomposition {
    pub fn local(reducer: TransformClass, wants_variants: bool) -> Self {
        Decomposition {
            interaction: None,
            reducer,
            wants_variants,
        }
    }

    pub fn non_local(d: Coord, reducer: TransformClass) -> Self {
        Decomposition {
            interaction: Some(d.max(0)),
            reducer,
            wants_variants: true,
        }
    }
}

fn shape_boxes(shapes: &Shapes) -> impl Iterator<Item = BBox> + '_ {
    shapes
        .polygons
        .iter()
        .map(|p| p.shape.bbox())
        .chain(shapes.edges.iter().map(|e| e.shape.bbox()))
        .chain(shapes.edge_pairs.iter().map(|e| e.shape.bbox()))
}

/// Cells whose content is flattened into the parents for a non-local operation.
///
/// A placement is not isolated if it comes closer than `d` to a sibling placement or to a shape
/// of its parent; placements inside flattened cells are never isolated. A cell with only such
/// placements is flattened as a whole. Otherwise its non-isolated placements are redirected to a
/// copy that is flattened, while the isolated ones keep sharing the cell. Copies are reported in
/// `copies` as `(copy, original)`.
fn dissolved_cells(
    layout: &mut Layout,
    top_down: &[CellIndex],
    layers: &[LayerIndex],
    d: Coord,
    copies: &mut Vec<(CellIndex, CellIndex)>,
) -> HashSet<CellIndex> {
    let mut placements: HashMap<CellIndex, usize> = HashMap::new();
    for &p in top_down {
        for inst in layout.cell(p).instances() {
            *placements.entry(inst.cell).or_default() += 1;
        }
    }

    let mut cache = HashMap::new();
    let mut dissolved = HashSet::new();
    // non-isolated placements per child cell, as (parent, instance index)
    let mut pending: HashMap<CellIndex, Vec<(CellIndex, usize)>> = HashMap::new();
    for &c in top_down {
        if let Some(hits) = pending.remove(&c) {
            if hits.len() == placements.get(&c).copied().unwrap_or(0) {
                dissolved.insert(c);
            } else {
                let copy = layout.copy_cell(c);
                copies.push((copy, c));
                for &(p, i) in &hits {
                    layout.redirect_instance(p, i, copy);
                }
                dissolved.insert(copy);
                for (i, inst) in layout.cell(copy).instances().iter().enumerate() {
                    *placements.entry(inst.cell).or_default() += 1;
                    pending.entry(inst.cell).or_default().push((copy, i));
                }
            }
        }

        let cell = layout.cell(c);
        let hit = if dissolved.contains(&c) {
            vec![true; cell.instances().len()]
        } else {
            isolation_hits(layout, c, layers, d, &mut cache)
        };
        for ((i, inst), hit) in cell.instances().iter().enumerate().zip(hit) {
            if hit {
                pending.entry(inst.cell).or_default().push((c, i));
            }
        }
    }
    dissolved
}

/// Per instance of `p`, whether it comes closer than `d` to a sibling or a shape of `p`.
fn isolation_hits(
    layout: &Layout,
    p: CellIndex,
    layers: &[LayerIndex],
    d: Coord,
    cache: &mut HashMap<CellIndex, BBox>,
) -> Vec<bool> {
    let cell = layout.cell(p);
    let mut hit = vec![false; cell.instances().len()];
    let mut instances = BoxScanner::new();
    let mut mixed = BoxScanner2::new();
    for (i, inst) in cell.instances().iter().enumerate() {
        let b = layout
            .cell_bbox_cached(inst.cell, layers, cache)
            .transformed(&inst.trans);
        instances.insert(b, i);
        mixed.insert_a(b, i);
    }
    if instances.is_empty() {
        return hit;
    }
    for &l in layers {
        if let Some(shapes) = cell.shapes(l) {
            for b in shape_boxes(shapes) {
                mixed.insert_b(b, ());
            }
        }
    }

    instances.visit_pairs(d, &mut |&a: &usize, &b: &usize| -> Control {
        hit[a] = true;
        hit[b] = true;
        Control::Continue
    });
    mixed.visit_pairs(d, &mut |&a: &usize, _: &()| -> Control {
        hit[a] = true;
        Control::Continue
    });
    hit
}

fn collect_sources(
    layout: &Layout,
    ci: CellIndex,
    trans: CplxTrans,
    absorbed: &HashSet<CellIndex>,
    out: &mut Vec<(CellIndex, CplxTrans)>,
) {
    out.push((ci, trans));
    for inst in layout.cell(ci).instances() {
        if absorbed.contains(&inst.cell) {
            collect_sources(layout, inst.cell, trans.concat(&inst.trans), absorbed, out);
        }
    }
}

/// Decompose an operation over `layers` below `top` into cell tasks.
///
/// Every cell gets one result per reduced placement transformation. With `wants_variants` cells
/// placed with different reduced transformations are duplicated and the parent instances are
/// redirected to the copies; otherwise their shapes are propagated into the parent cells. For
/// non-local operations, cells that are not isolated are flattened into their parents as well.
pub(crate) fn plan(
    layout: &mut Layout,
    top: CellIndex,
    layers: &[LayerIndex],
    global: &CplxTrans,
    mode: Decomposition,
) -> Plan {
    let mut top_down = match layout.cells_bottom_up(top) {
        Ok(order) => order,
        Err(e) => unreachable!("internal library error: invalid store hierarchy: {e}"),
    };
    top_down.reverse();

    let mut copies = Vec::new();
    let dissolved = match mode.interaction {
        Some(d) => dissolved_cells(layout, &top_down, layers, d, &mut copies),
        None => HashSet::new(),
    };
    let mut absorbed = dissolved.clone();

    let mut acc: HashMap<CellIndex, BTreeSet<CplxTrans>> = HashMap::new();
    acc.insert(top, BTreeSet::from([global.without_disp()]));
    let mut processed: Vec<CellIndex> = Vec::new();

    for &c in &top_down {
        if dissolved.contains(&c) {
            continue;
        }
        if c != top {
            let mut set = BTreeSet::new();
            for &p in &processed {
                for inst in layout.cell(p).instances().iter().filter(|i| i.cell == c) {
                    for a in &acc[&p] {
                        set.insert(a.concat(&inst.trans).without_disp());
                    }
                }
            }
            acc.insert(c, set);
        }

        let mut groups: BTreeMap<CplxTrans, BTreeSet<CplxTrans>> = BTreeMap::new();
        for a in &acc[&c] {
            groups.entry(mode.reducer.reduce(a)).or_default().insert(*a);
        }
        if groups.len() <= 1 {
            processed.push(c);
            continue;
        }
        if !mode.wants_variants {
            absorbed.insert(c);
            processed.push(c);
            continue;
        }

        let parents = processed.clone();
        let mut targets: Vec<(CplxTrans, CellIndex)> = Vec::with_capacity(groups.len());
        for (i, (v, subset)) in groups.into_iter().enumerate() {
            let target = if i == 0 {
                c
            } else {
                let copy = layout.copy_cell(c);
                copies.push((copy, c));
                copy
            };
            acc.insert(target, subset);
            targets.push((v, target));
            processed.push(target);
        }

        for p in parents {
            let Some(a) = acc[&p].first().copied() else {
                continue;
            };
            for i in 0..layout.cell(p).instances().len() {
                let inst = &layout.cell(p).instances()[i];
                if inst.cell != c {
                    continue;
                }
                let v = mode.reducer.reduce(&a.concat(&inst.trans));
                if let Some(&(_, target)) = targets.iter().find(|(tv, _)| *tv == v)
                    && target != c
                {
                    layout.redirect_instance(p, i, target);
                }
            }
        }
    }

    let propagated = absorbed.len() - dissolved.len();
    log::debug!(
        "cell decomposition: {} tasks, {} dissolved, {} propagated, {} cell copies",
        processed.len() - propagated,
        dissolved.len(),
        propagated,
        copies.len()
    );

    let tasks = processed
        .into_iter()
        .filter(|c| !absorbed.contains(c))
        .map(|c| {
            let variant = acc[&c]
                .first()
                .map(|a| mode.reducer.reduce(a))
                .unwrap_or_default();
            let mut sources = Vec::new();
            collect_sources(layout, c, CplxTrans::unity(), &absorbed, &mut sources);
            CellTask {
                cell: c,
                variant,
                sources,
            }
        })
        .collect();
    Plan { tasks, copies }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Polygon;

    fn two_level(gap: Coord) -> (Layout, CellIndex, CellIndex, LayerIndex) {
        let mut ly = Layout::new();
        let l1 = ly.insert_layer("1/0");
        let top = ly.add_cell("TOP");
        let a = ly.add_cell("A");
        ly.insert(a, l1, Polygon::from_box(BBox::new(0, 0, 10, 10)));
        ly.add_instance(top, a, CplxTrans::unity());
        ly.add_instance(top, a, CplxTrans::displacement(10 + gap, 0));
        (ly, top, a, l1)
    }

    #[test]
    fn isolated_instances_stay() {
        let (mut ly, top, a, l1) = two_level(20);
        let tasks = plan(
            &mut ly,
            top,
            &[l1],
            &CplxTrans::unity(),
            Decomposition::non_local(5, TransformClass::Invariant),
        )
        .tasks;
        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().any(|t| t.cell == a && t.sources.len() == 1));
    }

    #[test]
    fn close_instances_dissolve() {
        let (mut ly, top, _, l1) = two_level(4);
        let tasks = plan(
            &mut ly,
            top,
            &[l1],
            &CplxTrans::unity(),
            Decomposition::non_local(5, TransformClass::Invariant),
        )
        .tasks;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].cell, top);
        assert_eq!(tasks[0].sources.len(), 3);
    }

    #[test]
    fn only_close_placements_dissolve() {
        let (mut ly, top, a, l1) = two_level(4);
        ly.add_instance(top, a, CplxTrans::displacement(100, 0));
        let Plan { tasks, copies } = plan(
            &mut ly,
            top,
            &[l1],
            &CplxTrans::unity(),
            Decomposition::non_local(5, TransformClass::Invariant),
        );
        assert_eq!(copies, vec![(CellIndex(2), a)]);
        assert_eq!(tasks.len(), 2);
        let top_task = tasks.iter().find(|t| t.cell == top).unwrap();
        assert_eq!(top_task.sources.len(), 3);
        assert!(top_task.sources[1..].iter().all(|(c, _)| *c == CellIndex(2)));
        // the far placement still shares the cell
        assert!(tasks.iter().any(|t| t.cell == a && t.sources.len() == 1));
        assert_eq!(ly.cell(top).instances()[2].cell, a);
    }

    #[test]
    fn variants_versus_propagation() {
        let mut ly = Layout::new();
        let l1 = ly.insert_layer("1/0");
        let top = ly.add_cell("TOP");
        let a = ly.add_cell("A");
        ly.insert(a, l1, Polygon::from_box(BBox::new(0, 0, 10, 10)));
        ly.add_instance(top, a, CplxTrans::unity());
        ly.add_instance(top, a, CplxTrans::new((100, 0).into(), 0.0, 2.0, false));

        let mut with_variants = ly.clone();
        let Plan { tasks, copies } = plan(
            &mut with_variants,
            top,
            &[l1],
            &CplxTrans::unity(),
            Decomposition::local(TransformClass::ScaleOnly, true),
        );
        assert_eq!(tasks.len(), 3);
        assert_eq!(with_variants.cell_count(), 3);
        assert_eq!(copies, vec![(CellIndex(2), a)]);
        let mags: BTreeSet<i64> = tasks
            .iter()
            .filter(|t| t.cell != top)
            .map(|t| (t.variant.mag() * 10.0).round() as i64)
            .collect();
        assert_eq!(mags, BTreeSet::from([10, 20]));

        let tasks = plan(
            &mut ly,
            top,
            &[l1],
            &CplxTrans::unity(),
            Decomposition::local(TransformClass::ScaleOnly, false),
        )
        .tasks;
        assert_eq!(ly.cell_count(), 2);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].sources.len(), 3);
    }
}
