#![allow(dead_code)]

use layout_regions::prelude::*;

pub fn box_region<'s>(boxes: &[(Coord, Coord, Coord, Coord)]) -> Region<'s> {
    boxes
        .iter()
        .map(|&(x1, y1, x2, y2)| Polygon::from_box(BBox::new(x1, y1, x2, y2)))
        .collect()
}

/// Counter clockwise outline edges of a box.
pub fn box_outline<'s>(b: BBox) -> Edges<'s> {
    Polygon::from_box(b).edges().collect()
}

pub fn edge(x1: Coord, y1: Coord, x2: Coord, y2: Coord) -> Edge {
    Edge::from_coords(x1, y1, x2, y2)
}

pub fn box_points(x1: Coord, y1: Coord, x2: Coord, y2: Coord) -> Vec<Point> {
    vec![
        Point::new(x1, y1),
        Point::new(x2, y1),
        Point::new(x2, y2),
        Point::new(x1, y2),
    ]
}

/// Flat copy of whatever a collection delivers.
pub fn flat_copy<'s>(r: &Region<'_>) -> Region<'s> {
    r.iter().collect()
}

pub fn flat_edges_copy<'s>(e: &Edges<'_>) -> Edges<'s> {
    e.iter().collect()
}

pub fn assert_same_region(a: &Region<'_>, b: &Region<'_>, context: &str) {
    let (a, b) = (flat_copy(a), flat_copy(b));
    let diff = &a ^ &b;
    assert!(
        diff.is_empty(),
        "{context}: regions differ, area {} vs {}, xor: {:?}",
        a.area(),
        b.area(),
        diff.iter().map(|p| p.shape).collect::<Vec<_>>()
    );
}

pub fn assert_same_edges(a: &Edges<'_>, b: &Edges<'_>, context: &str) {
    let (a, b) = (flat_edges_copy(a), flat_edges_copy(b));
    let diff = &a ^ &b;
    assert!(
        diff.is_empty(),
        "{context}: edges differ, length {} vs {}, xor: {:?}",
        a.length(),
        b.length(),
        diff.iter().map(|e| e.shape).collect::<Vec<_>>()
    );
}

fn undirected(e: Edge) -> Edge {
    if e.p2 < e.p1 { e.reversed() } else { e }
}

/// Edge pairs reduced to sorted pairs of undirected edges, independent of the first/second order.
pub fn pair_keys(ep: &EdgePairs<'_>) -> Vec<(Edge, Edge)> {
    let mut keys: Vec<_> = ep
        .iter()
        .map(|p| {
            let (a, b) = (undirected(p.shape.first), undirected(p.shape.second));
            if b < a { (b, a) } else { (a, b) }
        })
        .collect();
    keys.sort();
    keys
}

pub fn distances(ep: &EdgePairs<'_>) -> Vec<Coord> {
    let mut d: Vec<_> = ep.iter().map(|p| p.shape.distance()).collect();
    d.sort();
    d
}

/// Layout with a small hierarchy on two layers.
///
/// Cell `B` holds an L shape, cell `A` holds boxes, a ring and an instance of `B`. `TOP` places
/// `A` plain, rotated, mirrored, magnified and once more overlapping the plain placement.
pub struct TestLayout {
    pub layout: Layout,
    pub top: CellIndex,
    pub l1: LayerIndex,
    pub l2: LayerIndex,
}

impl TestLayout {
    pub fn new() -> Self {
        let mut layout = Layout::new();
        let l1 = layout.insert_layer("1/0");
        let l2 = layout.insert_layer("2/0");
        let top = layout.add_cell("TOP");
        let a = layout.add_cell("A");
        let b = layout.add_cell("B");

        layout.insert(
            b,
            l1,
            Polygon::from_coords(&[(0, 0), (40, 0), (40, 10), (10, 10), (10, 30), (0, 30)]),
        );
        layout.insert(b, l2, Polygon::from_box(BBox::new(30, 5, 60, 25)));

        layout.insert(a, l1, Polygon::from_box(BBox::new(0, 0, 100, 60)));
        layout.insert(a, l1, Polygon::from_box(BBox::new(120, 0, 140, 200)));
        layout.insert(
            a,
            l1,
            Polygon::with_holes(box_points(200, 0, 260, 60), vec![box_points(220, 20, 240, 40)]),
        );
        layout.insert(a, l2, Polygon::from_box(BBox::new(90, 50, 130, 70)));
        layout.add_instance(a, b, CplxTrans::displacement(10, 100));

        layout.insert(top, l1, Polygon::from_box(BBox::new(-200, -200, -150, -100)));
        layout.insert(top, l2, Polygon::from_box(BBox::new(-160, -120, -100, -110)));
        layout.add_instance(top, a, CplxTrans::unity());
        layout.add_instance(top, a, CplxTrans::new(Vector::new(600, 0), 90.0, 1.0, false));
        layout.add_instance(top, a, CplxTrans::new(Vector::new(0, 700), 0.0, 1.0, true));
        layout.add_instance(top, a, CplxTrans::new(Vector::new(1000, 1000), 0.0, 2.0, false));
        layout.add_instance(top, a, CplxTrans::new(Vector::new(1000, 0), 180.0, 1.0, true));
        layout.add_instance(top, a, CplxTrans::displacement(60, 30));

        TestLayout { layout, top, l1, l2 }
    }

    pub fn iter(&self, layer: LayerIndex) -> RecursiveShapeIterator<'_> {
        RecursiveShapeIterator::new(&self.layout, self.top, layer).unwrap()
    }

    /// Flat region of `layer`.
    pub fn flat_region<'s>(&'s self, layer: LayerIndex) -> Region<'s> {
        let mut r = Region::from_original(self.iter(layer));
        r.flatten();
        r
    }

    pub fn deep_region<'s>(&self, layer: LayerIndex, store: &'s DeepShapeStore) -> Region<'s> {
        Region::new_deep(&self.iter(layer), store).unwrap()
    }
}

impl Default for TestLayout {
    fn default() -> Self {
        Self::new()
    }
}
