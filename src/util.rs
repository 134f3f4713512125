//! Miscellaneous utility structs and functions.

use std::fmt::Debug;

use cgmath::num_traits::Float;
use serde::{Deserialize, Serialize};

/// A closed interval on the real number line.
#[derive(Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    /// Creates a new interval.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: std::cmp::PartialOrd> Interval<T> {
    /// Returns true if this interval contains the value, including its end points.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }

    /// Returns true if the interval contains at least one value.
    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }
}

impl<T: Float> Interval<T> {
    /// Creates the interval `[0, max]`.
    pub fn up_to(max: T) -> Self {
        Self {
            min: T::zero(),
            max,
        }
    }

    /// Shrinks the interval by `margin` at both ends.
    /// The result may be empty, see [Interval::is_valid].
    pub fn shrink(&self, margin: T) -> Self {
        Self {
            min: self.min + margin,
            max: self.max - margin,
        }
    }
}

impl<T: Debug> Debug for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}
