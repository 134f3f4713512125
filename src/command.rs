//! Piecewise-constant steering command sequences.

use crate::error::CommandError;
use crate::vehicle::MAX_STEER;
use serde::{Deserialize, Serialize};

/// Slack allowed when comparing an interval against the integration step.
const INTERVAL_SLACK: f64 = 1e-6; // s

/// A sequence of steering angles and the times at which each takes effect.
///
/// `controls[i]` is held on `[times[i], times[i + 1])`, so there is one
/// more time than there are controls.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandSequence {
    /// Steering angles in rad.
    pub controls: Vec<f64>,
    /// Switch times in s.
    pub times: Vec<f64>,
}

impl CommandSequence {
    /// Creates a new command sequence. The sequence is not validated.
    pub fn new(controls: Vec<f64>, times: Vec<f64>) -> Self {
        Self { controls, times }
    }

    /// A single steering angle held from 0 until `duration`.
    pub fn constant(phi: f64, duration: f64) -> Self {
        Self::new(vec![phi], vec![0.0, duration])
    }

    /// The number of constant-control intervals.
    pub fn len(&self) -> usize {
        self.controls.len()
    }

    /// Whether the sequence has no intervals.
    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// The time at which the final interval ends.
    pub fn end_time(&self) -> Option<f64> {
        self.times.last().copied()
    }

    /// Iterates each control along with the end time of its interval.
    pub fn intervals(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.controls
            .iter()
            .copied()
            .zip(self.times.iter().skip(1).copied())
    }

    /// Checks every static precondition on the sequence, reporting the first violated one.
    ///
    /// # Parameters
    /// * `dt` - The integration step in s
    /// * `enforce_min_interval` - Whether to reject intervals shorter than `dt`
    pub fn validate(&self, dt: f64, enforce_min_interval: bool) -> Result<(), CommandError> {
        let (controls, times) = (&self.controls, &self.times);

        if controls.is_empty() && times.len() <= 1 {
            return Err(CommandError::Empty);
        }
        if controls.len() + 1 != times.len() {
            return Err(CommandError::LengthMismatch {
                controls: controls.len(),
                times: times.len(),
            });
        }
        if let Some(index) = times.iter().position(|t| !t.is_finite()) {
            return Err(CommandError::NonFinite { index });
        }
        if let Some(index) = controls.iter().position(|phi| !phi.is_finite()) {
            return Err(CommandError::NonFinite { index });
        }
        if times[0] != 0.0 {
            return Err(CommandError::NonZeroStart { first: times[0] });
        }
        if let Some((index, &value)) = controls
            .iter()
            .enumerate()
            .find(|(_, phi)| !(-MAX_STEER..=MAX_STEER).contains(*phi))
        {
            return Err(CommandError::SteeringOutOfRange { index, value });
        }
        if let Some(index) = times.windows(2).position(|w| w[0] >= w[1]) {
            return Err(CommandError::NonIncreasingTimes { index });
        }
        if enforce_min_interval {
            let short = times
                .windows(2)
                .map(|w| w[1] - w[0])
                .enumerate()
                .find(|(_, delta)| *delta < dt - INTERVAL_SLACK);
            if let Some((index, delta)) = short {
                return Err(CommandError::IntervalTooShort { index, delta, dt });
            }
        }
        Ok(())
    }
}
