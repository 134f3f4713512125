//! Grading tiers and their pass predicates.

use crate::error::CommandError;
use crate::math::Point2d;
use crate::vehicle::Pose;
use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The standard goal tolerance, in m for positions and rad for headings.
pub const FINE_TOLERANCE: f64 = 0.1;

/// A looser tolerance for coarse grading.
pub const COARSE_TOLERANCE: f64 = 1.0;

/// A success criterion for a final pose, from least to most strict.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GradeTier {
    /// The car reached the target's x coordinate.
    PositionOnly,
    /// The car came within the tolerance of the target.
    #[default]
    PositionRadius,
    /// The car came within the tolerance of the target while facing along the x axis.
    PositionHeading,
}

/// The outcome of every tier for a single pose.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierFlags {
    pub position_only: bool,
    pub position_radius: bool,
    pub position_heading: bool,
}

impl GradeTier {
    /// All tiers, from least to most strict.
    pub const ALL: [GradeTier; 3] = [
        GradeTier::PositionOnly,
        GradeTier::PositionRadius,
        GradeTier::PositionHeading,
    ];

    /// The identifier used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            GradeTier::PositionOnly => "position-only",
            GradeTier::PositionRadius => "position-radius",
            GradeTier::PositionHeading => "position-heading",
        }
    }

    /// Whether `pose` satisfies this tier for the given target.
    /// Values exactly at the tolerance pass.
    pub fn passes(&self, pose: Pose, target: Point2d, tolerance: f64) -> bool {
        let dx = target.x - pose.x;
        let dy = target.y - pose.y;
        match self {
            GradeTier::PositionOnly => dx.abs() <= tolerance,
            GradeTier::PositionRadius => dx.hypot(dy) <= tolerance,
            GradeTier::PositionHeading => dx.hypot(dy) <= tolerance && pose.theta.abs() <= tolerance,
        }
    }
}

impl fmt::Display for GradeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GradeTier {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GradeTier::ALL
            .into_iter()
            .find(|tier| tier.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CommandError::UnknownTier(s.to_string()))
    }
}

impl TierFlags {
    /// Evaluates every tier against a pose.
    pub fn evaluate(pose: Pose, target: Point2d, tolerance: f64) -> Self {
        Self {
            position_only: GradeTier::PositionOnly.passes(pose, target, tolerance),
            position_radius: GradeTier::PositionRadius.passes(pose, target, tolerance),
            position_heading: GradeTier::PositionHeading.passes(pose, target, tolerance),
        }
    }

    /// Gets the outcome of a single tier.
    pub fn get(&self, tier: GradeTier) -> bool {
        match tier {
            GradeTier::PositionOnly => self.position_only,
            GradeTier::PositionRadius => self.position_radius,
            GradeTier::PositionHeading => self.position_heading,
        }
    }

    /// The tiers that passed, from least to most strict.
    pub fn passed(&self) -> ArrayVec<GradeTier, 3> {
        GradeTier::ALL
            .into_iter()
            .filter(|tier| self.get(*tier))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_tiers() {
        assert_eq!("position-only".parse::<GradeTier>(), Ok(GradeTier::PositionOnly));
        assert_eq!(" Position-Heading ".parse::<GradeTier>(), Ok(GradeTier::PositionHeading));
        assert_eq!(
            "sideways".parse::<GradeTier>(),
            Err(CommandError::UnknownTier("sideways".into()))
        );
        for tier in GradeTier::ALL {
            assert_eq!(tier.to_string().parse::<GradeTier>(), Ok(tier));
        }
    }

    #[test]
    fn tolerance_is_inclusive() {
        let target = Point2d::new(20.0, 8.0);
        let tol = 0.5;
        let at = Pose::new(19.5, 8.0, 0.0);
        let beyond = Pose::new(19.49, 8.0, 0.0);
        for tier in GradeTier::ALL {
            assert!(tier.passes(at, target, tol), "{tier} should pass at the tolerance");
            assert!(!tier.passes(beyond, target, tol), "{tier} should fail beyond the tolerance");
        }
    }

    #[test]
    fn tiers_are_independent() {
        let target = Point2d::new(20.0, 8.0);

        // Right x, wrong y
        let flags = TierFlags::evaluate(Pose::new(20.0, 2.0, 0.0), target, 0.1);
        assert_eq!(flags.passed().as_slice(), &[GradeTier::PositionOnly]);

        // Right spot, wrong heading
        let flags = TierFlags::evaluate(Pose::new(19.95, 8.0, 0.5), target, 0.1);
        assert_eq!(
            flags.passed().as_slice(),
            &[GradeTier::PositionOnly, GradeTier::PositionRadius]
        );

        // Negative headings are compared by magnitude
        let flags = TierFlags::evaluate(Pose::new(19.95, 8.0, -0.05), target, 0.1);
        assert!(flags.get(GradeTier::PositionHeading));

        // No wrapping: a full turn is not a zero heading
        let turned = Pose::new(20.0, 8.0, 2.0 * std::f64::consts::PI);
        assert!(!GradeTier::PositionHeading.passes(turned, target, 0.1));
    }
}
