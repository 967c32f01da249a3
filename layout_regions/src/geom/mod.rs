//! Integer geometry value types: points, boxes, edges, polygons, edge pairs and transformations.
mod bbox;
mod edge;
mod edge_pair;
mod point;
mod polygon;
mod trans;

pub use bbox::BBox;
pub use edge::Edge;
pub use edge_pair::EdgePair;
pub use point::{Area, Coord, Point, Vector};
pub use polygon::{PointLocation, Polygon, SimplePolygon};
pub(crate) use polygon::{compress_contour, contour_area2};
pub use trans::CplxTrans;

/// Round a floating point coordinate to the integer grid.
#[inline]
pub fn coord_round(v: f64) -> Coord {
    v.round() as Coord
}

/// Sign of a 128 bit value as `-1`, `0` or `1`.
#[inline]
pub(crate) fn sign128(v: i128) -> i32 {
    match v.cmp(&0) {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    }
}
