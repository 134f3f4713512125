use crate::error::{Error, Result};
use crate::math::{distance, point_in_polygon, segments_intersect, Point2d};
use itertools::Itertools;
use smallvec::SmallVec;

/// The vertices of a polygonal obstacle, stored inline for typical obstacle sizes.
pub type Vertices = SmallVec<[Point2d; 10]>;

/// A static obstacle the car must avoid.
#[derive(Clone, Debug, PartialEq)]
pub enum Obstacle {
    /// A disc of the given radius.
    Circle { centre: Point2d, radius: f64 },
    /// A simple polygon. The ring is closed implicitly from the last vertex back to the first.
    /// Simplicity is assumed but not verified.
    Polygon { centre: Point2d, vertices: Vertices },
}

impl Obstacle {
    /// Creates a circular obstacle.
    pub fn circle(x: f64, y: f64, radius: f64) -> Result<Self> {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(Error::InvalidRadius(radius));
        }
        Ok(Obstacle::Circle {
            centre: Point2d::new(x, y),
            radius,
        })
    }

    /// Creates a polygonal obstacle from an ordered ring of at least three vertices.
    pub fn polygon(centre: Point2d, vertices: impl IntoIterator<Item = Point2d>) -> Result<Self> {
        let vertices: Vertices = vertices.into_iter().collect();
        if vertices.len() < 3 {
            return Err(Error::TooFewVertices(vertices.len()));
        }
        Ok(Obstacle::Polygon { centre, vertices })
    }

    /// The nominal centre of the obstacle.
    pub fn centre(&self) -> Point2d {
        match self {
            Obstacle::Circle { centre, .. } => *centre,
            Obstacle::Polygon { centre, .. } => *centre,
        }
    }

    /// The radius of the smallest disc around [Obstacle::centre] containing the obstacle.
    pub fn bounding_radius(&self) -> f64 {
        match self {
            Obstacle::Circle { radius, .. } => *radius,
            Obstacle::Polygon { centre, vertices } => vertices
                .iter()
                .map(|v| distance(*centre, *v))
                .fold(0.0, f64::max),
        }
    }

    /// Whether a point lies clear of the obstacle.
    /// Points on the obstacle's boundary are not clear.
    pub fn point_safe(&self, point: Point2d) -> bool {
        match self {
            Obstacle::Circle { centre, radius } => distance(point, *centre) > *radius,
            Obstacle::Polygon { vertices, .. } => !point_in_polygon(point, vertices),
        }
    }

    /// Whether a straight motion step from `from` to `to` stays clear of the obstacle.
    ///
    /// Circles only sample the end point of the step, so the step must be short
    /// relative to the obstacle. Polygons test the step against every edge, but a step
    /// lying entirely inside a polygon crosses no edge and must be caught by [Obstacle::point_safe].
    pub fn segment_safe(&self, from: Point2d, to: Point2d) -> bool {
        match self {
            Obstacle::Circle { .. } => self.point_safe(to),
            Obstacle::Polygon { .. } => self.edge_crossed(from, to).is_none(),
        }
    }

    /// Returns the first polygon edge intersected by the segment `(from, to)`.
    /// Always `None` for circles.
    pub fn edge_crossed(&self, from: Point2d, to: Point2d) -> Option<[Point2d; 2]> {
        match self {
            Obstacle::Circle { .. } => None,
            Obstacle::Polygon { vertices, .. } => vertices
                .iter()
                .copied()
                .circular_tuple_windows()
                .find(|&(a, b)| segments_intersect(from, to, a, b))
                .map(|(a, b)| [a, b]),
        }
    }

    /// The polygon's vertices, or an empty slice for a circle.
    pub fn vertices(&self) -> &[Point2d] {
        match self {
            Obstacle::Circle { .. } => &[],
            Obstacle::Polygon { vertices, .. } => vertices,
        }
    }
}
