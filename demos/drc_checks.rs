use layout_regions::prelude::*;

fn report(name: &str, markers: &EdgePairs<'_>) {
    log::info!("{name}: {} violations", markers.count());
    for ep in markers.iter() {
        println!("  {name}: distance {} between {:?}", ep.shape.distance(), ep.shape);
    }
}

fn main() {
    env_logger::init();

    let metal: Region = [
        Polygon::from_box(BBox::new(0, 0, 100, 20)),
        Polygon::from_box(BBox::new(0, 35, 100, 60)),
        Polygon::from_coords(&[(120, 0), (200, 0), (200, 100), (170, 100), (170, 30), (160, 30), (160, 100), (120, 100)]),
    ]
    .into_iter()
    .collect();
    let via: Region = [Polygon::from_box(BBox::new(5, 5, 95, 18))].into_iter().collect();

    let options = RegionCheckOptions::new();
    report("width < 25", &metal.width_check(25, &options));
    report("space < 20", &metal.space_check(20, &options));
    report("notch < 15", &metal.notch_check(15, &options));
    report("isolated < 25", &metal.isolated_check(25, &options));
    report("enclosure of via < 6", &metal.enclosing_check(&via, 6, &options));

    let projected = options.with_metrics(Metrics::Projection);
    report("space < 20 (projection)", &metal.space_check(20, &projected));

    let waived = options.with_rect_filter(RectFilter::TWO_OPPOSITE_SIDES);
    report("width < 25 (plain bars waived)", &metal.width_check(25, &waived));

    let area = metal.space_check(20, &options).polygons(0);
    log::info!("space violation area: {}", area.area());
}
