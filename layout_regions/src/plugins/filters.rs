//! Library filters.

use super::{EdgeFilter, EdgePairFilter, PolygonFilter, TransformClass};
use crate::{
    core::math::normalize_degrees,
    geom::{Area, Coord, Edge, EdgePair, Polygon},
    properties::{PropertiesId, PropertyValue},
};

/// Selects polygons with `min <= area < max`.
#[derive(Debug, Clone, Copy)]
pub struct AreaFilter {
    pub min: Area,
    pub max: Area,
    pub inverse: bool,
}

impl AreaFilter {
    pub fn new(min: Area, max: Area, inverse: bool) -> Self {
        AreaFilter { min, max, inverse }
    }
}

impl PolygonFilter for AreaFilter {
    fn selected(&self, polygon: &Polygon, _prop_id: PropertiesId) -> bool {
        let a = polygon.area();
        (a >= self.min && a < self.max) != self.inverse
    }

    fn reducer(&self) -> TransformClass {
        TransformClass::ScaleOnly
    }
}

/// Selects polygons with `min <= perimeter < max`.
#[derive(Debug, Clone, Copy)]
pub struct PerimeterFilter {
    pub min: Coord,
    pub max: Coord,
    pub inverse: bool,
}

impl PerimeterFilter {
    pub fn new(min: Coord, max: Coord, inverse: bool) -> Self {
        PerimeterFilter { min, max, inverse }
    }
}

impl PolygonFilter for PerimeterFilter {
    fn selected(&self, polygon: &Polygon, _prop_id: PropertiesId) -> bool {
        let p = polygon.perimeter();
        (p >= self.min as f64 && p < self.max as f64) != self.inverse
    }

    fn reducer(&self) -> TransformClass {
        TransformClass::ScaleOnly
    }
}

/// Bounding box dimension checked by [BBoxFilter].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BBoxParameter {
    Width,
    Height,
    MaxDim,
    MinDim,
}

/// Selects polygons by a bounding box dimension in `[min, max)`.
#[derive(Debug, Clone, Copy)]
pub struct BBoxFilter {
    pub parameter: BBoxParameter,
    pub min: Coord,
    pub max: Coord,
    pub inverse: bool,
}

impl BBoxFilter {
    pub fn new(parameter: BBoxParameter, min: Coord, max: Coord, inverse: bool) -> Self {
        BBoxFilter {
            parameter,
            min,
            max,
            inverse,
        }
    }
}

impl PolygonFilter for BBoxFilter {
    fn selected(&self, polygon: &Polygon, _prop_id: PropertiesId) -> bool {
        let b = polygon.bbox();
        let v = match self.parameter {
            BBoxParameter::Width => b.width(),
            BBoxParameter::Height => b.height(),
            BBoxParameter::MaxDim => b.width().max(b.height()),
            BBoxParameter::MinDim => b.width().min(b.height()),
        };
        (v >= self.min && v < self.max) != self.inverse
    }

    fn reducer(&self) -> TransformClass {
        TransformClass::ScaleAndOrientation
    }
}

/// Selects axis aligned rectangles (optionally squares only).
#[derive(Debug, Clone, Copy, Default)]
pub struct RectangleFilter {
    pub square: bool,
    pub inverse: bool,
}

impl PolygonFilter for RectangleFilter {
    fn selected(&self, polygon: &Polygon, _prop_id: PropertiesId) -> bool {
        let hit = polygon.is_box() && {
            let b = polygon.bbox();
            !self.square || b.width() == b.height()
        };
        hit != self.inverse
    }

    fn reducer(&self) -> TransformClass {
        TransformClass::OrthogonalOnly
    }
}

/// Selects polygons made of horizontal and vertical edges only.
#[derive(Debug, Clone, Copy, Default)]
pub struct RectilinearFilter {
    pub inverse: bool,
}

impl PolygonFilter for RectilinearFilter {
    fn selected(&self, polygon: &Polygon, _prop_id: PropertiesId) -> bool {
        polygon.is_rectilinear() != self.inverse
    }

    fn reducer(&self) -> TransformClass {
        TransformClass::OrthogonalOnly
    }
}

/// Selects polygons by their number of holes in `[min, max]`.
#[derive(Debug, Clone, Copy)]
pub struct HoleCountFilter {
    pub min: usize,
    pub max: usize,
    pub inverse: bool,
}

impl PolygonFilter for HoleCountFilter {
    fn selected(&self, polygon: &Polygon, _prop_id: PropertiesId) -> bool {
        let n = polygon.hole_count();
        (n >= self.min && n <= self.max) != self.inverse
    }

    fn reducer(&self) -> TransformClass {
        TransformClass::Invariant
    }
}

/// Selects shapes carrying a property with the given key and value.
#[derive(Debug, Clone)]
pub struct PropertyFilter {
    pub key: PropertyValue,
    pub value: PropertyValue,
    pub inverse: bool,
}

impl PropertyFilter {
    pub fn new(key: impl Into<PropertyValue>, value: impl Into<PropertyValue>, inverse: bool) -> Self {
        PropertyFilter {
            key: key.into(),
            value: value.into(),
            inverse,
        }
    }

    fn matches(&self, prop_id: PropertiesId) -> bool {
        (prop_id.properties().get(&self.key) == Some(&self.value)) != self.inverse
    }
}

impl PolygonFilter for PropertyFilter {
    fn selected(&self, _polygon: &Polygon, prop_id: PropertiesId) -> bool {
        self.matches(prop_id)
    }

    fn reducer(&self) -> TransformClass {
        TransformClass::Invariant
    }

    fn requires_raw_input(&self) -> bool {
        true
    }
}

impl EdgeFilter for PropertyFilter {
    fn selected(&self, _edge: &Edge, prop_id: PropertiesId) -> bool {
        self.matches(prop_id)
    }

    fn reducer(&self) -> TransformClass {
        TransformClass::Invariant
    }

    fn requires_raw_input(&self) -> bool {
        true
    }
}

impl EdgePairFilter for PropertyFilter {
    fn selected(&self, _edge_pair: &EdgePair, prop_id: PropertiesId) -> bool {
        self.matches(prop_id)
    }

    fn reducer(&self) -> TransformClass {
        TransformClass::Invariant
    }
}

/// Selects edges with `min <= length < max`.
#[derive(Debug, Clone, Copy)]
pub struct EdgeLengthFilter {
    pub min: Coord,
    pub max: Coord,
    pub inverse: bool,
}

impl EdgeLengthFilter {
    pub fn new(min: Coord, max: Coord, inverse: bool) -> Self {
        EdgeLengthFilter { min, max, inverse }
    }
}

impl EdgeFilter for EdgeLengthFilter {
    fn selected(&self, edge: &Edge, _prop_id: PropertiesId) -> bool {
        let l = edge.length();
        (l >= self.min as f64 && l < self.max as f64) != self.inverse
    }

    fn reducer(&self) -> TransformClass {
        TransformClass::ScaleOnly
    }
}

/// Selects edges by their direction angle in `[min_angle, max_angle)` degrees. Edge directions
/// are folded into `[0, 180)`, so an edge and its reverse behave the same.
#[derive(Debug, Clone, Copy)]
pub struct EdgeOrientationFilter {
    pub min_angle: f64,
    pub max_angle: f64,
    pub inverse: bool,
}

impl EdgeOrientationFilter {
    pub fn new(min_angle: f64, max_angle: f64, inverse: bool) -> Self {
        EdgeOrientationFilter {
            min_angle,
            max_angle,
            inverse,
        }
    }

    /// Horizontal and vertical edges.
    pub fn orthogonal() -> [Self; 2] {
        [Self::new(0.0, 1e-6, false), Self::new(90.0, 90.0 + 1e-6, false)]
    }
}

/// Direction angle of an edge folded into `[0, 180)`.
pub(crate) fn edge_angle(edge: &Edge) -> f64 {
    let d = edge.d();
    let deg = normalize_degrees((d.y as f64).atan2(d.x as f64).to_degrees());
    if deg >= 180.0 - 1e-9 { (deg - 180.0).max(0.0) } else { deg }
}

impl EdgeFilter for EdgeOrientationFilter {
    fn selected(&self, edge: &Edge, _prop_id: PropertiesId) -> bool {
        if edge.is_degenerate() {
            return self.inverse;
        }
        let a = edge_angle(edge);
        (a >= self.min_angle - 1e-9 && a < self.max_angle) != self.inverse
    }

    fn reducer(&self) -> TransformClass {
        TransformClass::OrientationOnly
    }
}

/// Selects edge pairs with `min <= distance < max`.
#[derive(Debug, Clone, Copy)]
pub struct EdgePairDistanceFilter {
    pub min: Coord,
    pub max: Coord,
    pub inverse: bool,
}

impl EdgePairDistanceFilter {
    pub fn new(min: Coord, max: Coord, inverse: bool) -> Self {
        EdgePairDistanceFilter { min, max, inverse }
    }
}

impl EdgePairFilter for EdgePairDistanceFilter {
    fn selected(&self, edge_pair: &EdgePair, _prop_id: PropertiesId) -> bool {
        let d = edge_pair.distance();
        (d >= self.min && d < self.max) != self.inverse
    }

    fn reducer(&self) -> TransformClass {
        TransformClass::ScaleOnly
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{geom::BBox, properties::property_set};

    #[test]
    fn polygon_filters() {
        let b = Polygon::from_box(BBox::new(0, 0, 10, 20));
        let tri = Polygon::from_coords(&[(0, 0), (10, 0), (0, 10)]);
        let none = PropertiesId::NONE;

        assert!(AreaFilter::new(200, 201, false).selected(&b, none));
        assert!(!AreaFilter::new(200, 201, true).selected(&b, none));
        assert!(PerimeterFilter::new(60, 61, false).selected(&b, none));
        assert!(BBoxFilter::new(BBoxParameter::MaxDim, 20, 21, false).selected(&b, none));
        assert!(!BBoxFilter::new(BBoxParameter::Width, 20, 21, false).selected(&b, none));
        assert!(RectangleFilter::default().selected(&b, none));
        assert!(!RectangleFilter { square: true, inverse: false }.selected(&b, none));
        assert!(!RectilinearFilter::default().selected(&tri, none));
    }

    #[test]
    fn property_filter() {
        let id = PropertiesId::intern(property_set([("net", "VSS")]));
        let f = PropertyFilter::new("net", "VSS", false);
        let b = Polygon::from_box(BBox::new(0, 0, 1, 1));
        assert!(PolygonFilter::selected(&f, &b, id));
        assert!(!PolygonFilter::selected(&f, &b, PropertiesId::NONE));
    }

    #[test]
    fn edge_orientation() {
        let f = EdgeOrientationFilter::new(40.0, 50.0, false);
        assert!(f.selected(&Edge::from_coords(0, 0, 10, 10), PropertiesId::NONE));
        assert!(f.selected(&Edge::from_coords(10, 10, 0, 0), PropertiesId::NONE));
        assert!(!f.selected(&Edge::from_coords(0, 0, 10, 0), PropertiesId::NONE));
        let [h, v] = EdgeOrientationFilter::orthogonal();
        assert!(h.selected(&Edge::from_coords(10, 0, 0, 0), PropertiesId::NONE));
        assert!(v.selected(&Edge::from_coords(0, 10, 0, 0), PropertiesId::NONE));
    }
}
