//! Obstacle layouts as supplied by a trial description.
//!
//! In JSON, a layout is one of:
//! * `null` or `true` - generate obstacles at random
//! * `false` - no obstacles
//! * an array of obstacles, each either an `[x, y, r]` circle or a
//!   `{ "x": .., "y": .., "vertices": [[x, y], ..] }` polygon

use crate::config::ShapeKind;
use crate::environment::{Arena, Environment};
use crate::error::{Error, Result};
use crate::generator::{generate, LayoutParams};
use crate::math::Point2d;
use crate::obstacle::Obstacle;
use log::debug;
use rand::Rng;
use serde::Deserialize;
use std::path::Path;

/// Where a trial's obstacles come from.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(try_from = "Option<RawLayout>")]
pub enum ObstacleLayout {
    /// Generated at random when the trial is built.
    #[default]
    Random,
    /// No obstacles at all.
    Empty,
    /// A fixed set of obstacles.
    Fixed(Vec<Obstacle>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLayout {
    Flag(bool),
    Obstacles(Vec<RawObstacle>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawObstacle {
    Circle([f64; 3]),
    Polygon { x: f64, y: f64, vertices: Vec<[f64; 2]> },
}

impl TryFrom<Option<RawLayout>> for ObstacleLayout {
    type Error = Error;

    fn try_from(raw: Option<RawLayout>) -> Result<Self> {
        Ok(match raw {
            None | Some(RawLayout::Flag(true)) => ObstacleLayout::Random,
            Some(RawLayout::Flag(false)) => ObstacleLayout::Empty,
            Some(RawLayout::Obstacles(obstacles)) => ObstacleLayout::Fixed(
                obstacles
                    .into_iter()
                    .map(Obstacle::try_from)
                    .collect::<Result<_>>()?,
            ),
        })
    }
}

impl TryFrom<RawObstacle> for Obstacle {
    type Error = Error;

    fn try_from(raw: RawObstacle) -> Result<Self> {
        match raw {
            RawObstacle::Circle([x, y, r]) => Obstacle::circle(x, y, r),
            RawObstacle::Polygon { x, y, vertices } => Obstacle::polygon(
                Point2d::new(x, y),
                vertices.into_iter().map(|[vx, vy]| Point2d::new(vx, vy)),
            ),
        }
    }
}

impl ObstacleLayout {
    /// Parses a layout from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a layout from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Builds the environment for a trial, generating obstacles if required.
    pub fn build(
        &self,
        arena: Arena,
        shape: ShapeKind,
        params: &LayoutParams,
        rng: &mut impl Rng,
    ) -> Result<Environment> {
        let env = match self {
            ObstacleLayout::Random => Environment::new(arena, generate(rng, &arena, shape, params)?),
            ObstacleLayout::Empty => Environment::empty(arena),
            ObstacleLayout::Fixed(obstacles) => Environment::new(arena, obstacles.iter().cloned()),
        };
        debug!(
            "built {:.1} x {:.1} arena with {} obstacles",
            arena.width(),
            arena.height(),
            env.num_obstacles()
        );
        Ok(env)
    }
}
