/// Macro used for implementing the shape macros. Used for extracting macro repetition count for
/// reserving capacity up front.
#[doc(hidden)]
#[macro_export]
macro_rules! replace_expr {
    ($_t:tt $sub:expr) => {
        $sub
    };
}

/// Construct a polygon hull from a list of (x, y) tuples (any orientation).
///
/// # Examples
///
/// ```
/// # use layout_regions::polygon;
/// # use layout_regions::geom::*;
/// let p = polygon![(0, 0), (0, 10), (10, 10), (10, 0)];
/// assert!(p.is_box());
/// assert_eq!(p.hull()[0], Point::new(0, 0));
/// assert_eq!(p.area(), 100);
/// ```
#[macro_export]
macro_rules! polygon {
    ($( $x:expr ),* $(,)?) => {
        {
            let size = <[()]>::len(&[$($crate::replace_expr!(($x) ())),*]);
            let mut pts = Vec::with_capacity(size);
            $(
                pts.push($crate::geom::Point::new($x.0, $x.1));
            )*
            $crate::geom::Polygon::new(pts)
        }
    };
}

/// Construct a vector of edges from a list of (x1, y1, x2, y2) tuples.
///
/// # Examples
///
/// ```
/// # use layout_regions::edge_list;
/// # use layout_regions::geom::*;
/// let edges = edge_list![(0, 0, 10, 0), (10, 0, 10, 10)];
/// assert_eq!(edges.len(), 2);
/// assert_eq!(edges[1], Edge::from_coords(10, 0, 10, 10));
/// ```
#[macro_export]
macro_rules! edge_list {
    ($( $x:expr ),* $(,)?) => {
        {
            let size = <[()]>::len(&[$($crate::replace_expr!(($x) ())),*]);
            let mut edges = Vec::with_capacity(size);
            $(
                edges.push($crate::geom::Edge::from_coords($x.0, $x.1, $x.2, $x.3));
            )*
            edges
        }
    };
}
