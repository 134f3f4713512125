use crate::error::{Error, Result};
use crate::math::{segments_intersect, Point2d};
use crate::obstacle::Obstacle;
use crate::util::Interval;
use crate::{ObstacleId, ObstacleSet};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// The default arena width in m.
pub const DEFAULT_WIDTH: f64 = 20.0;

/// The default arena height in m.
pub const DEFAULT_HEIGHT: f64 = 10.0;

/// The rectangle `[0, lx] x [0, ly]` the car must stay within.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    /// The horizontal length in m.
    lx: f64,
    /// The vertical length in m.
    ly: f64,
}

/// What a point or motion step collided with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Collision {
    /// The arena boundary.
    Boundary,
    /// One of the obstacles.
    Obstacle(ObstacleId),
}

/// An arena along with the obstacles inside it.
///
/// An environment is built once per trial and never mutated afterwards,
/// so it can be shared freely between evaluations.
#[derive(Clone, Debug)]
pub struct Environment {
    arena: Arena,
    obstacles: ObstacleSet,
}

impl Arena {
    /// Creates an arena of the given width and height.
    pub fn new(lx: f64, ly: f64) -> Result<Self> {
        let valid = |l: f64| l > 0.0 && l.is_finite();
        if !valid(lx) || !valid(ly) {
            return Err(Error::InvalidArena { lx, ly });
        }
        Ok(Self { lx, ly })
    }

    /// The width of the arena in m.
    pub fn width(&self) -> f64 {
        self.lx
    }

    /// The height of the arena in m.
    pub fn height(&self) -> f64 {
        self.ly
    }

    /// The range of valid x coordinates.
    pub fn x_bounds(&self) -> Interval<f64> {
        Interval::up_to(self.lx)
    }

    /// The range of valid y coordinates.
    pub fn y_bounds(&self) -> Interval<f64> {
        Interval::up_to(self.ly)
    }

    /// Whether a point lies within the arena. Points on the boundary are in bounds.
    pub fn in_bounds(&self, point: Point2d) -> bool {
        self.x_bounds().contains(point.x) && self.y_bounds().contains(point.y)
    }

    /// The corners of the arena, counter-clockwise from the origin.
    pub fn corners(&self) -> [Point2d; 4] {
        [
            Point2d::new(0.0, 0.0),
            Point2d::new(self.lx, 0.0),
            Point2d::new(self.lx, self.ly),
            Point2d::new(0.0, self.ly),
        ]
    }

    /// Whether the segment `(from, to)` touches or crosses any of the four walls.
    pub fn crosses_boundary(&self, from: Point2d, to: Point2d) -> bool {
        self.corners()
            .into_iter()
            .circular_tuple_windows()
            .any(|(a, b)| segments_intersect(from, to, a, b))
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            lx: DEFAULT_WIDTH,
            ly: DEFAULT_HEIGHT,
        }
    }
}

impl Environment {
    /// Creates an environment from an arena and a set of obstacles.
    pub fn new(arena: Arena, obstacles: impl IntoIterator<Item = Obstacle>) -> Self {
        let mut set = ObstacleSet::with_key();
        for obstacle in obstacles {
            set.insert(obstacle);
        }
        Self {
            arena,
            obstacles: set,
        }
    }

    /// Creates an environment without obstacles.
    pub fn empty(arena: Arena) -> Self {
        Self::new(arena, std::iter::empty())
    }

    /// Gets the arena.
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Gets a reference to the obstacle with the given ID.
    pub fn obstacle(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.get(id)
    }

    /// Returns an iterator over all the obstacles.
    pub fn iter_obstacles(&self) -> impl Iterator<Item = (ObstacleId, &Obstacle)> {
        self.obstacles.iter()
    }

    /// The number of obstacles.
    pub fn num_obstacles(&self) -> usize {
        self.obstacles.len()
    }

    /// Whether a point lies within the arena.
    pub fn in_bounds(&self, point: Point2d) -> bool {
        self.arena.in_bounds(point)
    }

    /// Whether a point lies outside every obstacle.
    pub fn obstacle_free(&self, point: Point2d) -> bool {
        self.obstacles.values().all(|ob| ob.point_safe(point))
    }

    /// Whether a point is in bounds and obstacle free.
    pub fn safe(&self, point: Point2d) -> bool {
        self.in_bounds(point) && self.obstacle_free(point)
    }

    /// Whether the segment `(from, to)` stays off the walls and clear of every obstacle.
    pub fn safe_segment(&self, from: Point2d, to: Point2d) -> bool {
        self.check_segment(from, to).is_none()
    }

    /// Determines what, if anything, a point collides with.
    pub fn check_point(&self, point: Point2d) -> Option<Collision> {
        if !self.in_bounds(point) {
            return Some(Collision::Boundary);
        }
        self.obstacles
            .iter()
            .find(|(_, ob)| !ob.point_safe(point))
            .map(|(id, _)| Collision::Obstacle(id))
    }

    /// Determines what, if anything, the segment `(from, to)` collides with.
    pub fn check_segment(&self, from: Point2d, to: Point2d) -> Option<Collision> {
        if self.arena.crosses_boundary(from, to) {
            return Some(Collision::Boundary);
        }
        self.obstacles
            .iter()
            .find(|(_, ob)| !ob.segment_safe(from, to))
            .map(|(id, _)| Collision::Obstacle(id))
    }
}
