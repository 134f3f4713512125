//! Error types.

use thiserror::Error;

/// A reason a command sequence was rejected before simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("command sequence contains no intervals")]
    Empty,

    #[error("control sequence length must be one less than times: got {controls} controls and {times} times")]
    LengthMismatch { controls: usize, times: usize },

    #[error("non-finite value in command sequence at index {index}")]
    NonFinite { index: usize },

    #[error("first time must be 0, got {first}")]
    NonZeroStart { first: f64 },

    #[error("control {index} is {value} rad, all controls must be between -pi/4 and pi/4")]
    SteeringOutOfRange { index: usize, value: f64 },

    #[error("time sequence must be strictly increasing, violated at index {index}")]
    NonIncreasingTimes { index: usize },

    #[error("interval {index} lasts {delta} s, shorter than the integration step of {dt} s")]
    IntervalTooShort { index: usize, delta: f64, dt: f64 },

    #[error("unrecognised grading tier: {0:?}")]
    UnknownTier(String),
}

/// An error building a trial or loading its inputs.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid command sequence: {0}")]
    Command(#[from] CommandError),

    #[error("arena dimensions must be positive, got {lx} x {ly}")]
    InvalidArena { lx: f64, ly: f64 },

    #[error("integration step must be positive, got {0}")]
    InvalidStep(f64),

    #[error("obstacle radius must be positive, got {0}")]
    InvalidRadius(f64),

    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("could only place {placed} of {requested} obstacles")]
    LayoutCapacity { placed: usize, requested: usize },

    #[error("layout error: {0}")]
    Layout(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
