//! Isotropic sizing by edge bands and a positive winding boolean.
//!
//! Every edge sweeps a band of width `d` to its outer side, outer corners get a miter (or
//! beveled) corner piece. Growing unites the polygon with the bands, shrinking cuts the bands
//! out of it. Bands wider than the polygon itself therefore fill holes and remove narrow parts
//! instead of flipping over.

use super::{BooleanEngine, BooleanEvaluator, BooleanOp, MergeEvaluator, assign_properties};
use crate::{
    core::math::Vector2,
    geom::{Coord, Edge, Point, Polygon},
    progress::Progress,
    properties::WithProperties,
};

/// Corners with a miter longer than this factor times the sizing distance are cut.
const MITER_LIMIT: f64 = 2.0;

/// Pieces covering the area swept when moving the closed contour `pts` (interior on the left) by
/// `d` to its right side, i.e. outwards for positive `d`.
pub fn offset_band(pts: &[Point], d: Coord, out: &mut Vec<Polygon>) {
    let n = pts.len();
    if n < 3 || d == 0 {
        return;
    }
    let df = d as f64;
    let right_normal = |t: Vector2| -> Vector2 { Vector2::new(t.y, -t.x) };

    for i in 0..n {
        let prev = pts[(i + n - 1) % n];
        let p = pts[i];
        let next = pts[(i + 1) % n];
        if p == next {
            continue;
        }
        let pv = p.to_vector2();
        let t2 = (next - p).to_vector2().normalize();
        let n2 = right_normal(t2);
        let o2 = n2.scale(df);
        out.push(Polygon::new(vec![
            p,
            next,
            Point::from_vector2(next.to_vector2() + o2),
            Point::from_vector2(pv + o2),
        ]));

        if prev == p {
            continue;
        }
        let t1 = (p - prev).to_vector2().normalize();
        if t1.perp_dot(t2) * df <= 0.0 {
            // the bands of both edges overlap at inner corners
            continue;
        }
        let n1 = right_normal(t1);
        let mut corner = vec![p, Point::from_vector2(pv + n1.scale(df))];
        let s = 1.0 + n1.dot(n2);
        if s > 2.0 / (MITER_LIMIT * MITER_LIMIT) {
            corner.push(Point::from_vector2(pv + (n1 + n2).scale(df / s)));
        } else {
            let ad = df.abs();
            corner.push(Point::from_vector2(pv + n1.scale(df) + t1.scale(ad)));
            corner.push(Point::from_vector2(pv + o2 - t2.scale(ad)));
        }
        corner.push(Point::from_vector2(pv + o2));
        out.push(Polygon::new(corner));
    }
}

fn closed_edges(pts: &[Point]) -> impl Iterator<Item = Edge> + '_ {
    let n = pts.len();
    (0..n).map(move |i| Edge::new(pts[i], pts[(i + 1) % n]))
}

/// The area enclosed by `contours` (interior on the left of each) sized by `d`.
pub fn sized_contours<'a, I>(contours: I, d: Coord, min_coherence: bool) -> Vec<Polygon>
where
    I: IntoIterator<Item = &'a [Point]>,
{
    sized_area(contours, d, min_coherence, None)
}

fn sized_area<'a, I>(
    contours: I,
    d: Coord,
    min_coherence: bool,
    progress: Option<&Progress>,
) -> Vec<Polygon>
where
    I: IntoIterator<Item = &'a [Point]>,
{
    let mut engine = BooleanEngine::new(2);
    engine.set_min_coherence(min_coherence);
    let mut band = Vec::new();
    for c in contours {
        engine.insert_edges(closed_edges(c), 0);
        offset_band(c, d, &mut band);
    }
    for p in &band {
        engine.insert_polygon(p, 1);
    }
    let op = if d >= 0 { BooleanOp::Or } else { BooleanOp::Not };
    engine
        .process(&[&BooleanEvaluator(op)], progress)
        .pop()
        .unwrap_or_default()
}

/// Size polygons by `d` (grow for positive, shrink for negative values). The result is merged.
pub fn size_polygons(
    polygons: &[WithProperties<Polygon>],
    d: Coord,
    min_coherence: bool,
    progress: Option<&Progress>,
) -> Vec<WithProperties<Polygon>> {
    let result = if d >= 0 || polygons.len() < 2 {
        sized_area(
            polygons.iter().flat_map(|p| p.shape.contours()),
            d,
            min_coherence,
            progress,
        )
    } else {
        // shrinking works per polygon, the bands of one polygon must not cut into another
        let mut engine = BooleanEngine::new(1);
        engine.set_min_coherence(min_coherence);
        for p in polygons {
            for r in sized_area(p.shape.contours(), d, min_coherence, None) {
                engine.insert_polygon(&r, 0);
            }
        }
        engine
            .process(&[&MergeEvaluator { min_wc: 0 }], progress)
            .pop()
            .unwrap_or_default()
    };
    assign_properties(result, &[polygons])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::BBox;

    fn size(p: Polygon, d: Coord) -> Vec<Polygon> {
        size_polygons(&[WithProperties::plain(p)], d, false, None)
            .into_iter()
            .map(|p| p.shape)
            .collect()
    }

    #[test]
    fn grow_and_shrink_box() {
        let b = Polygon::from_box(BBox::new(0, 0, 100, 50));
        assert_eq!(size(b.clone(), 10), vec![Polygon::from_box(BBox::new(-10, -10, 110, 60))]);
        assert_eq!(size(b.clone(), -10), vec![Polygon::from_box(BBox::new(10, 10, 90, 40))]);
        assert!(size(b, -30).is_empty());
    }

    #[test]
    fn grow_closes_hole() {
        let frame = Polygon::with_holes(
            Polygon::from_box(BBox::new(0, 0, 30, 30)).hull().to_vec(),
            vec![Polygon::from_box(BBox::new(10, 10, 20, 20)).hull().to_vec()],
        );
        let r = size(frame, 6);
        assert_eq!(r, vec![Polygon::from_box(BBox::new(-6, -6, 36, 36))]);
    }

    #[test]
    fn shrink_removes_narrow_parts() {
        // a 10 wide bar attached to a 40 wide block
        let t = Polygon::from_coords(&[(0, 0), (40, 0), (40, 40), (25, 40), (25, 80), (15, 80), (15, 40), (0, 40)]);
        let r = size(t, -6);
        assert_eq!(r, vec![Polygon::from_box(BBox::new(6, 6, 34, 34))]);
    }

    #[test]
    fn slanted_edges_grow_outwards() {
        let tri = Polygon::from_coords(&[(0, 0), (100, 0), (0, 100)]);
        let r = size(tri.clone(), 5);
        assert_eq!(r.len(), 1);
        assert!(r[0].area() > tri.area());
        let b = r[0].bbox();
        assert_eq!((b.left, b.bottom), (-5, -5));

        let r = size(tri.clone(), -5);
        assert_eq!(r.len(), 1);
        assert!(r[0].area() < tri.area());
        assert!(size(tri, -40).is_empty());
    }

    #[test]
    fn l_shape_inner_corner() {
        let l = Polygon::from_coords(&[(0, 0), (20, 0), (20, 10), (10, 10), (10, 20), (0, 20)]);
        let r = size(l, 2);
        assert_eq!(
            r,
            vec![Polygon::from_coords(&[
                (-2, -2),
                (22, -2),
                (22, 12),
                (12, 12),
                (12, 22),
                (-2, 22)
            ])]
        );
    }
}
