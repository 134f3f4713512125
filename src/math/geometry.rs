use super::{Point2d, Vector2d};
use cgmath::prelude::*;
use itertools::Itertools;

/// The turning direction of an ordered triplet of points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Colinear,
    Clockwise,
    CounterClockwise,
}

/// Computes the orientation of the triplet `(p, q, r)` from the sign
/// of the cross product of `q - p` and `r - q`.
pub fn orientation(p: Point2d, q: Point2d, r: Point2d) -> Orientation {
    let val = (q.y - p.y) * (r.x - q.x) - (q.x - p.x) * (r.y - q.y);
    if val == 0.0 {
        Orientation::Colinear
    } else if val > 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::CounterClockwise
    }
}

/// Checks whether `q` lies within the bounding box of the segment `(p, r)`.
/// Only meaningful when the three points are known to be colinear.
pub fn on_segment(p: Point2d, q: Point2d, r: Point2d) -> bool {
    q.x <= f64::max(p.x, r.x)
        && q.x >= f64::min(p.x, r.x)
        && q.y <= f64::max(p.y, r.y)
        && q.y >= f64::min(p.y, r.y)
}

/// Determines whether the segments `(a0, a1)` and `(b0, b1)` cross, touch or overlap.
pub fn segments_intersect(a0: Point2d, a1: Point2d, b0: Point2d, b1: Point2d) -> bool {
    use Orientation::Colinear;

    let o0 = orientation(a0, a1, b0);
    let o1 = orientation(a0, a1, b1);
    let o2 = orientation(b0, b1, a0);
    let o3 = orientation(b0, b1, a1);

    if o0 != o1 && o2 != o3 {
        return true;
    }

    (o0 == Colinear && on_segment(a0, b0, a1))
        || (o1 == Colinear && on_segment(a0, b1, a1))
        || (o2 == Colinear && on_segment(b0, a0, b1))
        || (o3 == Colinear && on_segment(b0, a1, b1))
}

/// Computes the point at which the infinite lines through `(a0, a1)` and `(b0, b1)` meet.
/// Returns `None` if the lines are parallel.
pub fn intersection_point(a0: Point2d, a1: Point2d, b0: Point2d, b1: Point2d) -> Option<Point2d> {
    let da: Vector2d = a1 - a0;
    let db: Vector2d = b1 - b0;
    let denom = da.perp_dot(db);
    if denom == 0.0 {
        return None;
    }
    let t = (b0 - a0).perp_dot(db) / denom;
    Some(a0 + t * da)
}

/// Determines whether a point lies inside the closed polygon described by `vertices`,
/// using ray casting along the positive x direction.
///
/// A point lying exactly on an edge or vertex is considered inside.
/// Polygons with fewer than three vertices contain no points.
pub fn point_in_polygon(point: Point2d, vertices: &[Point2d]) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let mut inside = false;
    for (a, b) in vertices.iter().copied().circular_tuple_windows() {
        if orientation(a, point, b) == Orientation::Colinear && on_segment(a, point, b) {
            return true;
        }
        if (a.y > point.y) != (b.y > point.y) {
            let x_int = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if point.x <= x_int {
                inside = !inside;
            }
        }
    }
    inside
}

/// The Euclidean distance between two points.
pub fn distance(p: Point2d, q: Point2d) -> f64 {
    p.distance(q)
}
