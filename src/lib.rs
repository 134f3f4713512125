pub use cgmath;
pub use command::CommandSequence;
pub use config::{GradingConfig, ShapeKind};
pub use environment::{Arena, Collision, Environment};
pub use error::{CommandError, Error, Result};
pub use generator::LayoutParams;
pub use grading::{GradeTier, TierFlags};
pub use layout::ObstacleLayout;
pub use obstacle::Obstacle;
pub use simulation::{evaluate, simulate, Simulation, Strategy, Termination, Trajectory, Verdict};
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
pub use util::Interval;
pub use vehicle::{Kinematics, Pose, Vehicle};

pub mod command;
pub mod config;
mod debug;
pub mod environment;
pub mod error;
pub mod generator;
pub mod grading;
pub mod layout;
pub mod math;
pub mod obstacle;
pub mod simulation;
mod util;
pub mod vehicle;

new_key_type! {
    /// Unique ID of an [Obstacle].
    pub struct ObstacleId;
}

type ObstacleSet = SlotMap<ObstacleId, Obstacle>;
