//! Sweep line box scanners.
//!
//! Items are sorted by the lower edge of their (enlarged) boxes and swept bottom to top. An active
//! list holds all items whose box still reaches the sweep position; each new item is compared
//! against the active items by x extent. Every pair of touching boxes is reported exactly once.

use crate::{
    core::{Control, traits::ControlFlow},
    geom::{BBox, Coord},
};

/// Core sweep over boxes identified by index. `group` splits the boxes into populations; only
/// pairs with `group[a] != group[b]` are reported when `cross_only` is set.
fn sweep<C, F>(boxes: &[BBox], groups: Option<&[bool]>, enlarge: Coord, visitor: &mut F) -> C
where
    C: ControlFlow,
    F: FnMut(usize, usize) -> C,
{
    let enlarged: Vec<BBox> = boxes.iter().map(|b| b.enlarged(enlarge)).collect();
    let mut order: Vec<usize> = (0..boxes.len())
        .filter(|&i| !enlarged[i].is_empty())
        .collect();
    order.sort_by_key(|&i| (enlarged[i].bottom, enlarged[i].left));

    let mut active: Vec<usize> = Vec::new();
    for &i in &order {
        let bi = &enlarged[i];
        active.retain(|&j| enlarged[j].top >= bi.bottom);
        for &j in &active {
            if let Some(g) = groups
                && g[i] == g[j]
            {
                continue;
            }
            let bj = &enlarged[j];
            if bj.left <= bi.right && bi.left <= bj.right {
                let (a, b) = if j < i { (j, i) } else { (i, j) };
                try_cf!(visitor(a, b));
            }
        }
        active.push(i);
    }
    C::continuing()
}

/// Box scanner over one population of items.
#[derive(Debug, Clone)]
pub struct BoxScanner<T> {
    boxes: Vec<BBox>,
    items: Vec<T>,
}

impl<T> Default for BoxScanner<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BoxScanner<T> {
    pub fn new() -> Self {
        BoxScanner {
            boxes: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn with_capacity(n: usize) -> Self {
        BoxScanner {
            boxes: Vec::with_capacity(n),
            items: Vec::with_capacity(n),
        }
    }

    pub fn insert(&mut self, bbox: BBox, item: T) {
        self.boxes.push(bbox);
        self.items.push(item);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[inline]
    pub fn boxes(&self) -> &[BBox] {
        &self.boxes
    }

    /// Visit every pair of items whose boxes, enlarged by `enlarge`, touch. Items inserted first
    /// are passed first. Stops early if the visitor breaks.
    pub fn visit_pairs<C, F>(&self, enlarge: Coord, visitor: &mut F) -> C
    where
        C: ControlFlow,
        F: FnMut(&T, &T) -> C,
    {
        let items = &self.items;
        sweep(&self.boxes, None, enlarge, &mut |a, b| {
            visitor(&items[a], &items[b])
        })
    }

    /// Same as [BoxScanner::visit_pairs] but passing item indexes.
    pub fn visit_index_pairs<C, F>(&self, enlarge: Coord, visitor: &mut F) -> C
    where
        C: ControlFlow,
        F: FnMut(usize, usize) -> C,
    {
        sweep(&self.boxes, None, enlarge, visitor)
    }
}

/// Box scanner over two populations, only pairs across the populations are reported.
#[derive(Debug, Clone)]
pub struct BoxScanner2<A, B> {
    boxes: Vec<BBox>,
    second: Vec<bool>,
    index: Vec<usize>,
    items_a: Vec<A>,
    items_b: Vec<B>,
}

impl<A, B> Default for BoxScanner2<A, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, B> BoxScanner2<A, B> {
    pub fn new() -> Self {
        BoxScanner2 {
            boxes: Vec::new(),
            second: Vec::new(),
            index: Vec::new(),
            items_a: Vec::new(),
            items_b: Vec::new(),
        }
    }

    pub fn insert_a(&mut self, bbox: BBox, item: A) {
        self.boxes.push(bbox);
        self.second.push(false);
        self.index.push(self.items_a.len());
        self.items_a.push(item);
    }

    pub fn insert_b(&mut self, bbox: BBox, item: B) {
        self.boxes.push(bbox);
        self.second.push(true);
        self.index.push(self.items_b.len());
        self.items_b.push(item);
    }

    #[inline]
    pub fn items_a(&self) -> &[A] {
        &self.items_a
    }

    #[inline]
    pub fn items_b(&self) -> &[B] {
        &self.items_b
    }

    /// Visit every pair of an item of the first and an item of the second population whose boxes,
    /// enlarged by `enlarge`, touch.
    pub fn visit_pairs<C, F>(&self, enlarge: Coord, visitor: &mut F) -> C
    where
        C: ControlFlow,
        F: FnMut(&A, &B) -> C,
    {
        self.visit_index_pairs(enlarge, &mut |a, b| visitor(&self.items_a[a], &self.items_b[b]))
    }

    /// Same as [BoxScanner2::visit_pairs] but passing the indexes within each population.
    pub fn visit_index_pairs<C, F>(&self, enlarge: Coord, visitor: &mut F) -> C
    where
        C: ControlFlow,
        F: FnMut(usize, usize) -> C,
    {
        let second = &self.second;
        let index = &self.index;
        sweep(&self.boxes, Some(second), enlarge, &mut |i, j| {
            let (ia, ib) = if second[i] { (j, i) } else { (i, j) };
            visitor(index[ia], index[ib])
        })
    }
}

/// Collect all touching pairs of a scanner into a vector (convenience for tests and small inputs).
pub fn collect_pairs<T: Clone>(scanner: &BoxScanner<T>, enlarge: Coord) -> Vec<(T, T)> {
    let mut pairs = Vec::new();
    scanner.visit_pairs(enlarge, &mut |a: &T, b: &T| -> Control {
        pairs.push((a.clone(), b.clone()));
        Control::Continue
    });
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_touching_pairs_once() {
        let mut scanner = BoxScanner::new();
        scanner.insert(BBox::new(0, 0, 10, 10), 0);
        scanner.insert(BBox::new(10, 0, 20, 10), 1);
        scanner.insert(BBox::new(30, 0, 40, 10), 2);
        scanner.insert(BBox::new(0, 10, 5, 20), 3);
        let mut pairs = collect_pairs(&scanner, 0);
        pairs.sort();
        assert_eq!(pairs, vec![(0, 1), (0, 3)]);

        let mut pairs = collect_pairs(&scanner, 5);
        pairs.sort();
        assert_eq!(pairs, vec![(0, 1), (0, 3), (1, 2), (1, 3)]);
    }

    #[test]
    fn two_populations() {
        let mut scanner = BoxScanner2::new();
        scanner.insert_a(BBox::new(0, 0, 10, 10), "a0");
        scanner.insert_a(BBox::new(5, 5, 15, 15), "a1");
        scanner.insert_b(BBox::new(12, 12, 20, 20), 'b');
        let mut pairs = Vec::new();
        scanner.visit_pairs(0, &mut |a: &&str, b: &char| -> Control {
            pairs.push((*a, *b));
            Control::Continue
        });
        assert_eq!(pairs, vec![("a1", 'b')]);
    }
}
