use layout_regions::prelude::*;

fn boxes<'s>(boxes: &[(Coord, Coord, Coord, Coord)]) -> Region<'s> {
    boxes
        .iter()
        .map(|&(x1, y1, x2, y2)| Polygon::from_box(BBox::new(x1, y1, x2, y2)))
        .collect()
}

fn report(name: &str, r: &Region<'_>) {
    log::info!("{name}: {} polygons, area {}, bbox {:?}", r.count(), r.area(), r.bbox());
    for p in r.iter() {
        println!("  {name}: {:?}", p.shape);
    }
}

fn main() {
    env_logger::init();

    let a = boxes(&[(0, 0, 100, 100), (80, 80, 200, 120)]);
    let b = boxes(&[(50, 50, 150, 150), (300, 0, 350, 50)]);

    report("a merged", &a.merged());
    report("a and b", &(&a & &b));
    report("a or b", &(&a | &b));
    report("a not b", &(&a - &b));
    report("a xor b", &(&a ^ &b));
    report("a sized 10", &a.sized(10));

    let outline = a.edges();
    log::info!("outline of a: {} edges, length {}", outline.count(), outline.length());
    let clipped = outline.and_region(&b);
    log::info!("outline inside b: {} edges, length {}", clipped.count(), clipped.length());
}
