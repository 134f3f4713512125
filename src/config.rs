//! Grading configuration.

use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::grading::{GradeTier, FINE_TOLERANCE};
use crate::math::Point2d;
use crate::vehicle::{Kinematics, Pose, Vehicle};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The default integration step in s.
pub const DEFAULT_DT: f64 = 0.01;

/// The default cap on integration steps per run.
pub const DEFAULT_MAX_STEPS: usize = 100_000;

/// The shape of obstacles in a trial.
///
/// Circular trials check only the end point of each step against the environment.
/// Polygonal trials also check the swept segment of each step against the walls
/// and every obstacle edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    #[default]
    Circle,
    Polygon,
}

/// Settings for grading a single trial.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradingConfig {
    /// The tier used to stop a run early once the goal is reached.
    pub tier: GradeTier,
    /// The goal tolerance in m (and rad for headings).
    pub tolerance: f64,
    /// The obstacle shape, which selects the collision checks.
    pub shape: ShapeKind,
    /// The integration step in s.
    pub dt: f64,
    /// The maximum number of integration steps in a run.
    pub max_steps: usize,
    /// Whether command intervals shorter than `dt` are rejected.
    pub enforce_min_interval: bool,
    /// The car model.
    pub kinematics: Kinematics,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            tier: GradeTier::default(),
            tolerance: FINE_TOLERANCE,
            shape: ShapeKind::default(),
            dt: DEFAULT_DT,
            max_steps: DEFAULT_MAX_STEPS,
            enforce_min_interval: true,
            kinematics: Kinematics::default(),
        }
    }
}

impl GradingConfig {
    /// Parses a configuration from TOML. Missing fields take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GradingConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Checks that every setting is usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.dt > 0.0 && self.dt.is_finite()) {
            return Err(Error::InvalidStep(self.dt));
        }
        if !(self.tolerance >= 0.0 && self.tolerance.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "tolerance must be non-negative, got {}",
                self.tolerance
            )));
        }
        if self.max_steps == 0 {
            return Err(Error::InvalidConfig("max_steps must be at least 1".into()));
        }
        if !self.kinematics.speed.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "speed must be finite, got {}",
                self.kinematics.speed
            )));
        }
        if !(self.kinematics.wheel_base > 0.0 && self.kinematics.wheel_base.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "wheel base must be positive, got {}",
                self.kinematics.wheel_base
            )));
        }
        Ok(())
    }

    /// Creates a vehicle using this configuration's step size and car model.
    pub fn vehicle<'a>(
        &self,
        environment: &'a Environment,
        origin: Pose,
        target: Point2d,
    ) -> Result<Vehicle<'a>> {
        self.validate()?;
        Ok(Vehicle::new(environment, origin, target, self.dt)?.with_kinematics(self.kinematics))
    }
}
