pub use self::dynamics::{Kinematics, MAX_STEER};
use crate::environment::{Arena, Environment};
use crate::error::{Error, Result};
use crate::math::{distance, Point2d};
use crate::obstacle::Obstacle;
use crate::util::Interval;
use crate::ObstacleId;
use serde::{Deserialize, Serialize};

mod dynamics;

/// The configuration of the car: position in m and heading in rad.
///
/// The heading is never wrapped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

/// A simulated car, as handed to a steering strategy.
///
/// Holds the mission (origin and target), a shared reference to the environment
/// and the integration step. The vehicle itself is stateless: poses are passed
/// in and returned by [Vehicle::step].
#[derive(Clone, Debug)]
pub struct Vehicle<'a> {
    /// The environment the car drives in.
    environment: &'a Environment,
    /// The starting pose.
    origin: Pose,
    /// The position the car must reach.
    target: Point2d,
    /// The integration step in s.
    dt: f64,
    /// The car model.
    kinematics: Kinematics,
}

impl Pose {
    /// Creates a new pose.
    pub const fn new(x: f64, y: f64, theta: f64) -> Self {
        Self { x, y, theta }
    }

    /// The position component of the pose.
    pub fn position(&self) -> Point2d {
        Point2d::new(self.x, self.y)
    }
}

impl<'a> Vehicle<'a> {
    /// Creates a new vehicle.
    pub fn new(environment: &'a Environment, origin: Pose, target: Point2d, dt: f64) -> Result<Self> {
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(Error::InvalidStep(dt));
        }
        Ok(Self {
            environment,
            origin,
            target,
            dt,
            kinematics: Kinematics::default(),
        })
    }

    /// Creates a vehicle for the standard mission: start at the left wall a fifth of the way up,
    /// facing right, and reach the right wall four fifths of the way up.
    pub fn standard_mission(environment: &'a Environment, dt: f64) -> Result<Self> {
        let (origin, target) = standard_endpoints(environment.arena());
        Self::new(environment, origin, target, dt)
    }

    /// Replaces the car model.
    pub fn with_kinematics(mut self, kinematics: Kinematics) -> Self {
        self.kinematics = kinematics;
        self
    }

    /// The starting pose.
    pub fn origin(&self) -> Pose {
        self.origin
    }

    /// The target position.
    pub fn target(&self) -> Point2d {
        self.target
    }

    /// The integration step in s.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// The car model.
    pub fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    /// The environment the car drives in.
    pub fn environment(&self) -> &'a Environment {
        self.environment
    }

    /// The range of valid x coordinates.
    pub fn x_bounds(&self) -> Interval<f64> {
        self.environment.arena().x_bounds()
    }

    /// The range of valid y coordinates.
    pub fn y_bounds(&self) -> Interval<f64> {
        self.environment.arena().y_bounds()
    }

    /// Returns an iterator over the obstacles in the environment.
    pub fn obstacles(&self) -> impl Iterator<Item = (ObstacleId, &'a Obstacle)> {
        self.environment.iter_obstacles()
    }

    /// Integrates one step of size [Vehicle::dt] from `pose` under steering angle `phi`.
    pub fn step(&self, pose: Pose, phi: f64) -> Pose {
        self.kinematics.step(pose, phi, self.dt)
    }

    /// The distance from a pose to the target.
    pub fn distance_to_target(&self, pose: Pose) -> f64 {
        distance(pose.position(), self.target)
    }
}

/// The standard mission endpoints for an arena.
pub fn standard_endpoints(arena: &Arena) -> (Pose, Point2d) {
    let origin = Pose::new(0.0, 0.2 * arena.height(), 0.0);
    let target = Point2d::new(arena.width(), 0.8 * arena.height());
    (origin, target)
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn standard_mission() {
        let env = Environment::empty(Arena::default());
        let car = Vehicle::standard_mission(&env, 0.01).unwrap();
        assert_eq!(car.origin(), Pose::new(0.0, 2.0, 0.0));
        assert_eq!(car.target(), Point2d::new(20.0, 8.0));
        assert_eq!(car.x_bounds().max, 20.0);
        assert_eq!(car.y_bounds().max, 10.0);
        assert_approx_eq!(car.distance_to_target(car.origin()), 436f64.sqrt());
    }

    #[test]
    fn sees_obstacles() {
        let env = Environment::new(Arena::default(), [Obstacle::circle(10.0, 5.0, 1.0).unwrap()]);
        let car = Vehicle::standard_mission(&env, 0.01).unwrap();
        let (_, ob) = car.obstacles().next().unwrap();
        assert_eq!(ob.centre(), Point2d::new(10.0, 5.0));
        assert_eq!(car.obstacles().count(), 1);
    }

    #[test]
    fn rejects_bad_step() {
        let env = Environment::empty(Arena::default());
        let target = Point2d::new(20.0, 8.0);
        for dt in [0.0, -0.01, f64::NAN] {
            let result = Vehicle::new(&env, Pose::default(), target, dt);
            assert!(matches!(result, Err(Error::InvalidStep(_))));
        }
    }

    #[test]
    fn step_uses_own_dt() {
        let env = Environment::empty(Arena::default());
        let car = Vehicle::new(&env, Pose::default(), Point2d::new(1.0, 0.0), 0.5).unwrap();
        let pose = car.step(car.origin(), 0.0);
        assert_approx_eq!(pose.x, 0.5);
    }
}
