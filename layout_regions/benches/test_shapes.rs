use layout_regions::prelude::*;

/// `n` x `n` grid of overlapping boxes, every box overlaps its right and upper neighbor.
pub fn overlapping_grid<'s>(n: i32) -> Region<'s> {
    let mut r = Region::new();
    for i in 0..n {
        for j in 0..n {
            let (x, y) = (i * 80, j * 80);
            r.insert(Polygon::from_box(BBox::new(x, y, x + 100, y + 100)));
        }
    }
    r
}

/// `n` x `n` grid of separated boxes with alternating gaps of 10 and 30.
pub fn spaced_grid<'s>(n: i32) -> Region<'s> {
    let mut r = Region::new();
    let mut x = 0;
    for i in 0..n {
        let mut y = 0;
        for j in 0..n {
            r.insert(Polygon::from_box(BBox::new(x, y, x + 50, y + 20)));
            y += 20 + if j % 2 == 0 { 10 } else { 30 };
        }
        x += 50 + if i % 2 == 0 { 10 } else { 30 };
    }
    r
}
