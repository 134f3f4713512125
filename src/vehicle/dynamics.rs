use super::Pose;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_4;

/// The largest steering angle magnitude a command may request, in rad.
pub const MAX_STEER: f64 = FRAC_PI_4;

/// The parameters of the constant-speed car model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Kinematics {
    /// The forward speed in m/s.
    pub speed: f64,
    /// The wheel base in m, scaling the turning rate.
    pub wheel_base: f64,
}

impl Default for Kinematics {
    fn default() -> Self {
        Self {
            speed: 1.0,
            wheel_base: 1.0,
        }
    }
}

impl Kinematics {
    /// Computes the state rate `(dx/dt, dy/dt, dtheta/dt)` at a pose under steering angle `phi`.
    pub fn rate(&self, pose: Pose, phi: f64) -> (f64, f64, f64) {
        (
            self.speed * pose.theta.cos(),
            self.speed * pose.theta.sin(),
            phi.tan() / self.wheel_base,
        )
    }

    /// Advances a pose by one explicit Euler step of `dt` seconds.
    pub fn step(&self, pose: Pose, phi: f64, dt: f64) -> Pose {
        let (dx, dy, dtheta) = self.rate(pose, phi);
        Pose {
            x: pose.x + dt * dx,
            y: pose.y + dt * dy,
            theta: pose.theta + dt * dtheta,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn straight_step() {
        let pose = Kinematics::default().step(Pose::new(0.0, 1.0, 0.0), 0.0, 0.01);
        assert_approx_eq!(pose.x, 0.01);
        assert_approx_eq!(pose.y, 1.0);
        assert_eq!(pose.theta, 0.0);
    }

    #[test]
    fn uses_state_before_update() {
        let k = Kinematics::default();
        let pose = k.step(Pose::new(0.0, 0.0, 0.0), MAX_STEER, 0.1);
        // Heading changes, but position moves along the old heading
        assert_approx_eq!(pose.x, 0.1);
        assert_eq!(pose.y, 0.0);
        assert_approx_eq!(pose.theta, 0.1);
    }

    #[test]
    fn speed_and_wheel_base() {
        let k = Kinematics {
            speed: 2.0,
            wheel_base: 2.0,
        };
        let pose = k.step(Pose::new(1.0, 1.0, std::f64::consts::FRAC_PI_2), MAX_STEER, 0.5);
        assert_approx_eq!(pose.x, 1.0);
        assert_approx_eq!(pose.y, 2.0);
        assert_approx_eq!(pose.theta, std::f64::consts::FRAC_PI_2 + 0.25);
    }
}
