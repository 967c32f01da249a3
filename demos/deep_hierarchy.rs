use layout_regions::prelude::*;

fn build() -> (Layout, CellIndex, LayerIndex, LayerIndex) {
    let mut ly = Layout::new();
    let active = ly.insert_layer("1/0");
    let poly = ly.insert_layer("2/0");
    let top = ly.add_cell("TOP");
    let unit = ly.add_cell("UNIT");

    ly.insert(unit, active, Polygon::from_box(BBox::new(0, 0, 40, 20)));
    ly.insert(unit, poly, Polygon::from_box(BBox::new(15, -10, 25, 30)));
    for i in 0..20 {
        for j in 0..10 {
            ly.add_instance(top, unit, CplxTrans::displacement(i * 60, j * 50));
        }
    }
    // one rotated placement forms its own variant when orientation matters
    ly.add_instance(top, unit, CplxTrans::new(Vector::new(-100, 0), 90.0, 1.0, false));
    (ly, top, active, poly)
}

fn main() {
    env_logger::init();

    let (ly, top, active, poly) = build();
    let store = DeepShapeStore::new();
    let run = || -> layout_regions::errors::RegionResult<()> {
        let a = Region::new_deep(&RecursiveShapeIterator::new(&ly, top, active)?, &store)?;
        let p = Region::new_deep(&RecursiveShapeIterator::new(&ly, top, poly)?, &store)?;
        log::info!("active: {} polygons, {} stored in the hierarchy", a.count(), a.hier_count());

        let gates = &a & &p;
        log::info!("gates: {} polygons, {} in the hierarchy", gates.count(), gates.hier_count());

        let sd = &a - &p;
        log::info!("source/drain: {} polygons, area {}", sd.count(), sd.area());

        let options = RegionCheckOptions::new();
        let width = p.width_check(12, &options);
        log::info!("poly width < 12: {} markers, {} in the hierarchy", width.count(), width.hier_count());

        let edges = a.edges();
        log::info!("active outline: {} edges, {} in the hierarchy", edges.count(), edges.hier_count());

        let mut out = Layout::new();
        let out_layer = out.insert_layer("100/0");
        let out_top = out.add_cell("GATES");
        gates.insert_into(&mut out, out_top, out_layer)?;
        log::info!("written hierarchy: {} cells", out.cell_count());
        Ok(())
    };

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
