//! Grouping of items into connected clusters.

use super::box_scanner::BoxScanner;
use crate::{
    core::Control,
    geom::{BBox, Coord},
};

/// Receives the clusters found by a [BoxClusterer].
pub trait ClusterReceiver<T> {
    /// Called once per cluster with all member items in insertion order.
    fn cluster(&mut self, members: &[&T]);
}

impl<T, F> ClusterReceiver<T> for F
where
    F: FnMut(&[&T]),
{
    fn cluster(&mut self, members: &[&T]) {
        self(members)
    }
}

/// Simple union-find over item indexes.
#[derive(Debug, Clone)]
struct DisjointSets {
    parent: Vec<usize>,
}

impl DisjointSets {
    fn new(n: usize) -> Self {
        DisjointSets {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}

/// Box clusterer: items whose boxes touch and which pass the interaction test end up in the same
/// cluster (transitively).
///
/// # Examples
///
/// ```
/// # use layout_regions::geom::*;
/// # use layout_regions::scan::*;
/// let mut clusterer = BoxClusterer::new();
/// clusterer.insert(BBox::new(0, 0, 10, 10), 'a');
/// clusterer.insert(BBox::new(10, 0, 20, 10), 'b');
/// clusterer.insert(BBox::new(50, 0, 60, 10), 'c');
/// let clusters = clusterer.clusters(0, |_, _| true);
/// assert_eq!(clusters, vec![vec![&'a', &'b'], vec![&'c']]);
/// ```
#[derive(Debug, Clone)]
pub struct BoxClusterer<T> {
    scanner: BoxScanner<T>,
}

impl<T> Default for BoxClusterer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BoxClusterer<T> {
    pub fn new() -> Self {
        BoxClusterer {
            scanner: BoxScanner::new(),
        }
    }

    pub fn insert(&mut self, bbox: BBox, item: T) {
        self.scanner.insert(bbox, item);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.scanner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.scanner.is_empty()
    }

    /// Cluster member indexes, ordered by the first inserted member of each cluster.
    pub fn cluster_indices<I>(&self, enlarge: Coord, mut interacts: I) -> Vec<Vec<usize>>
    where
        I: FnMut(&T, &T) -> bool,
    {
        let items = self.scanner.items();
        let mut sets = DisjointSets::new(items.len());
        self.scanner
            .visit_index_pairs(enlarge, &mut |a: usize, b: usize| -> Control {
                if sets.find(a) != sets.find(b) && interacts(&items[a], &items[b]) {
                    sets.union(a, b);
                }
                Control::Continue
            });

        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut group_of_root = vec![usize::MAX; items.len()];
        for i in 0..items.len() {
            let root = sets.find(i);
            if group_of_root[root] == usize::MAX {
                group_of_root[root] = groups.len();
                groups.push(Vec::new());
            }
            groups[group_of_root[root]].push(i);
        }

        log::trace!("clustered {} items into {} clusters", items.len(), groups.len());
        groups
    }

    /// Collect the clusters into vectors of item references.
    pub fn clusters<I>(&self, enlarge: Coord, interacts: I) -> Vec<Vec<&T>>
    where
        I: FnMut(&T, &T) -> bool,
    {
        let items = self.scanner.items();
        self.cluster_indices(enlarge, interacts)
            .into_iter()
            .map(|g| g.into_iter().map(|i| &items[i]).collect())
            .collect()
    }

    /// Cluster the items and hand each cluster to `receiver`.
    pub fn process<I, R>(&self, enlarge: Coord, interacts: I, receiver: &mut R)
    where
        I: FnMut(&T, &T) -> bool,
        R: ClusterReceiver<T> + ?Sized,
    {
        for members in self.clusters(enlarge, interacts) {
            receiver.cluster(&members);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitive_clusters() {
        let mut clusterer = BoxClusterer::new();
        clusterer.insert(BBox::new(0, 0, 10, 10), 0);
        clusterer.insert(BBox::new(20, 0, 30, 10), 1);
        clusterer.insert(BBox::new(9, 0, 21, 2), 2);
        clusterer.insert(BBox::new(100, 0, 110, 10), 3);
        let clusters = clusterer.clusters(0, |_, _| true);
        assert_eq!(clusters, vec![vec![&0, &1, &2], vec![&3]]);
    }

    #[test]
    fn interaction_test_splits_clusters() {
        let mut clusterer = BoxClusterer::new();
        clusterer.insert(BBox::new(0, 0, 10, 10), 0);
        clusterer.insert(BBox::new(5, 0, 15, 10), 1);
        let clusters = clusterer.clusters(0, |a, b| a + b > 5);
        assert_eq!(clusters.len(), 2);

        let mut sizes = Vec::new();
        clusterer.process(0, |_, _| true, &mut |m: &[&i32]| sizes.push(m.len()));
        assert_eq!(sizes, vec![2]);
    }
}
