//! Random obstacle layouts and mission endpoints.

use crate::config::ShapeKind;
use crate::environment::Arena;
use crate::error::{Error, Result};
use crate::math::{distance, Point2d};
use crate::obstacle::Obstacle;
use crate::util::Interval;
use crate::vehicle::Pose;
use log::{debug, trace, warn};
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// How far from the left wall the origin sits in polygonal trials,
/// so the first swept step does not touch the wall.
pub const POLYGON_ORIGIN_OFFSET: f64 = 0.1; // m

/// The safe radius that scales the standard polygonal layout.
pub const POLYGON_SAFE_RADIUS: f64 = 1.0; // m

/// The cap on total placement attempts, however many succeed.
pub const MAX_ATTEMPTS: usize = 1_000_000;

/// Parameters for rejection-sampling a random obstacle layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutParams {
    /// The range of obstacle radii in m. For polygons, each vertex's distance from the centre.
    pub radius: Interval<f64>,
    /// The minimum gap between neighbouring obstacles in m.
    pub clearance: f64,
    /// The horizontal band obstacles are placed in.
    pub x_range: Interval<f64>,
    /// The vertical band obstacles are placed in.
    pub y_range: Interval<f64>,
    /// The number of consecutive rejected placements after which generation stops.
    pub max_failures: usize,
    /// The number of obstacles required, or `None` to fill the layout.
    pub count: Option<usize>,
    /// The number of vertices of each polygonal obstacle.
    pub vertices: usize,
}

impl LayoutParams {
    /// The standard parameters for an arena and obstacle shape.
    pub fn for_arena(arena: &Arena, shape: ShapeKind) -> Self {
        let (lx, ly) = (arena.width(), arena.height());
        match shape {
            ShapeKind::Circle => Self {
                radius: Interval::new(0.5, 0.8),
                clearance: 1.0,
                x_range: Interval::new(0.2 * lx, 0.8 * lx),
                y_range: Interval::up_to(ly),
                max_failures: 20_000,
                count: None,
                vertices: 10,
            },
            ShapeKind::Polygon => Self::polygons(arena, POLYGON_SAFE_RADIUS),
        }
    }

    /// Polygonal layout parameters scaled by a safe radius `d`: vertex radii in
    /// `[d, 3d]`, a clearance of `d`, and centres kept `4d` inside the middle
    /// four fifths of the arena.
    pub fn polygons(arena: &Arena, d: f64) -> Self {
        let (lx, ly) = (arena.width(), arena.height());
        Self {
            radius: Interval::new(d, 3.0 * d),
            clearance: d,
            x_range: Interval::new(0.1 * lx + 4.0 * d, 0.9 * lx - 4.0 * d),
            y_range: Interval::up_to(ly),
            max_failures: 10_000,
            count: None,
            vertices: 10,
        }
    }

    /// Checks that the parameters describe a layout that can be sampled.
    pub fn validate(&self) -> Result<()> {
        let finite = |range: Interval<f64>| range.min.is_finite() && range.max.is_finite();
        if !(self.radius.min > 0.0 && self.radius.is_valid() && finite(self.radius)) {
            return Err(Error::InvalidConfig(format!(
                "obstacle radii must be a positive range, got {:?}",
                self.radius
            )));
        }
        if !(self.clearance >= 0.0 && self.clearance.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "clearance must be non-negative, got {}",
                self.clearance
            )));
        }
        if !finite(self.x_range) || !finite(self.y_range) {
            return Err(Error::InvalidConfig(format!(
                "placement bands must be finite, got {:?} x {:?}",
                self.x_range, self.y_range
            )));
        }
        if self.vertices < 3 {
            return Err(Error::InvalidConfig(format!(
                "polygons need at least 3 vertices, got {}",
                self.vertices
            )));
        }
        Ok(())
    }

    /// Requires exactly `count` obstacles.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

/// Draws a value uniformly from a closed interval, or `None` if the interval is empty.
fn uniform(rng: &mut impl Rng, range: Interval<f64>) -> Option<f64> {
    if !range.is_valid() || !range.min.is_finite() || !range.max.is_finite() {
        return None;
    }
    Some(Uniform::new_inclusive(range.min, range.max).sample(rng))
}

/// Runs the rejection loop shared by both obstacle shapes.
///
/// `propose` returns a candidate, or `None` if no candidate can ever be drawn.
/// `accept` decides whether a candidate fits alongside those already placed.
/// Generation stops after [LayoutParams::max_failures] consecutive rejections
/// or [MAX_ATTEMPTS] attempts in total.
fn place<R: Rng>(
    rng: &mut R,
    params: &LayoutParams,
    mut propose: impl FnMut(&mut R) -> Result<Option<Obstacle>>,
    accept: impl Fn(&Obstacle, &[Obstacle]) -> bool,
) -> Result<Vec<Obstacle>> {
    params.validate()?;

    let mut placed = Vec::new();
    let mut failures = 0;
    let mut attempts = 0;
    while failures < params.max_failures && params.count.map_or(true, |n| placed.len() < n) {
        if attempts == MAX_ATTEMPTS {
            warn!("gave up after {} placement attempts", attempts);
            break;
        }
        attempts += 1;
        let candidate = match propose(rng)? {
            Some(candidate) => candidate,
            None => break,
        };
        if accept(&candidate, &placed) {
            trace!(
                "placed obstacle {} at ({:.3}, {:.3}) after {} failures",
                placed.len(),
                candidate.centre().x,
                candidate.centre().y,
                failures
            );
            placed.push(candidate);
            failures = 0;
        } else {
            failures += 1;
        }
    }

    match params.count {
        Some(requested) if placed.len() < requested => {
            warn!(
                "layout capacity reached: placed {} of {} obstacles",
                placed.len(),
                requested
            );
            Err(Error::LayoutCapacity {
                placed: placed.len(),
                requested,
            })
        }
        _ => {
            debug!("generated {} obstacles", placed.len());
            Ok(placed)
        }
    }
}

/// Scatters circular obstacles at random.
///
/// Each circle lies entirely within the placement bands and keeps at least
/// `clearance` from every other circle.
pub fn generate_circles<R: Rng>(rng: &mut R, params: &LayoutParams) -> Result<Vec<Obstacle>> {
    let propose = |rng: &mut R| {
        let sample = |rng: &mut R| {
            let r = uniform(rng, params.radius)?;
            let x = uniform(rng, params.x_range.shrink(r))?;
            let y = uniform(rng, params.y_range.shrink(r))?;
            Some((x, y, r))
        };
        sample(rng).map(|(x, y, r)| Obstacle::circle(x, y, r)).transpose()
    };
    let accept = |candidate: &Obstacle, placed: &[Obstacle]| {
        placed.iter().all(|other| {
            let d = distance(candidate.centre(), other.centre());
            d >= candidate.bounding_radius() + other.bounding_radius() + params.clearance
        })
    };
    place(rng, params, propose, accept)
}

/// Scatters star-shaped polygonal obstacles at random.
///
/// Each polygon has [LayoutParams::vertices] vertices at evenly spaced angles
/// under a random rotation, each at a random distance from the centre.
/// Polygons must lie inside the arena, and their bounding circles keep more
/// than `clearance` apart.
pub fn generate_polygons<R: Rng>(
    rng: &mut R,
    arena: &Arena,
    params: &LayoutParams,
) -> Result<Vec<Obstacle>> {
    let propose = |rng: &mut R| {
        let sample = |rng: &mut R| {
            let x = uniform(rng, params.x_range)?;
            let y = uniform(rng, params.y_range)?;
            let rotation = uniform(rng, Interval::up_to(TAU))?;
            let n = params.vertices;
            let mut vertices = Vec::with_capacity(n);
            for i in 0..n {
                let angle = rotation + TAU * i as f64 / n as f64;
                let r = uniform(rng, params.radius)?;
                vertices.push(Point2d::new(x + r * angle.cos(), y + r * angle.sin()));
            }
            Some((Point2d::new(x, y), vertices))
        };
        sample(rng)
            .map(|(centre, vertices)| Obstacle::polygon(centre, vertices))
            .transpose()
    };
    let accept = |candidate: &Obstacle, placed: &[Obstacle]| {
        let inside = candidate.vertices().iter().all(|v| arena.in_bounds(*v));
        let clear = placed.iter().all(|other| {
            let d = distance(candidate.centre(), other.centre());
            d > params.radius.max * 2.0 + params.clearance
        });
        inside && clear
    };
    place(rng, params, propose, accept)
}

/// Generates obstacles of the given shape.
pub fn generate(
    rng: &mut impl Rng,
    arena: &Arena,
    shape: ShapeKind,
    params: &LayoutParams,
) -> Result<Vec<Obstacle>> {
    match shape {
        ShapeKind::Circle => generate_circles(rng, params),
        ShapeKind::Polygon => generate_polygons(rng, arena, params),
    }
}

/// Picks a random mission: the origin on the left wall and the target on the right wall,
/// each between a fifth and four fifths of the way up. The car starts facing along the x axis.
///
/// In polygonal trials the origin is moved just off the wall.
pub fn random_endpoints(rng: &mut impl Rng, arena: &Arena, shape: ShapeKind) -> (Pose, Point2d) {
    let band = Uniform::new_inclusive(0.2, 0.8);
    let y0 = band.sample(rng) * arena.height();
    let y1 = band.sample(rng) * arena.height();
    let x0 = match shape {
        ShapeKind::Circle => 0.0,
        ShapeKind::Polygon => POLYGON_ORIGIN_OFFSET,
    };
    (Pose::new(x0, y0, 0.0), Point2d::new(arena.width(), y1))
}
