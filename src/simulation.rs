use crate::command::CommandSequence;
use crate::config::{GradingConfig, ShapeKind};
#[cfg(feature = "debug")]
use crate::debug::take_debug_trace;
use crate::debug::{debug_collision, debug_step};
use crate::environment::Collision;
use crate::error::{Error, Result};
use crate::grading::{GradeTier, TierFlags};
use crate::math::{distance, intersection_point, Point2d};
use crate::vehicle::{Pose, Vehicle};
use log::{debug, warn};
use serde::Serialize;

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Termination {
    /// The car left the arena or hit an obstacle.
    Unsafe,
    /// The car satisfied the configured grading tier.
    Goal,
    /// The commands ran out, or the step cap was hit, before either of the above.
    Exhausted,
}

/// The state of a [Simulation].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimState {
    Running,
    Terminated(Termination),
}

/// The record of a run: one pose, control and time per integration step,
/// preceded by the initial pose at time 0.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Trajectory {
    poses: Vec<Pose>,
    controls: Vec<f64>,
    times: Vec<f64>,
}

/// The result of grading a command sequence.
#[derive(Clone, Debug, Serialize)]
pub struct Verdict {
    /// Everything the car did.
    pub trajectory: Trajectory,
    /// How the run ended.
    pub termination: Termination,
    /// Whether the run ended without a collision.
    pub safe: bool,
    /// The outcome of every tier at the final pose.
    pub done: TierFlags,
    /// What the car hit, if anything.
    pub collision: Option<Collision>,
    /// The tier the run was graded against.
    pub tier: GradeTier,
    /// The distance from the origin to the target.
    initial_distance: f64,
    /// The distance from the final pose to the target.
    final_distance: f64,
    /// The geometry checked during the run.
    #[cfg(feature = "debug")]
    pub debug: serde_json::Value,
}

/// A steering strategy under test.
///
/// Given the car, the strategy produces the full sequence of commands up front.
pub trait Strategy {
    fn plan(&mut self, vehicle: &Vehicle<'_>) -> CommandSequence;
}

impl<F> Strategy for F
where
    F: FnMut(&Vehicle<'_>) -> CommandSequence,
{
    fn plan(&mut self, vehicle: &Vehicle<'_>) -> CommandSequence {
        self(vehicle)
    }
}

/// Replays a validated command sequence through the car model,
/// checking safety and the goal after every step.
pub struct Simulation<'s, 'a> {
    /// The car being driven.
    vehicle: &'s Vehicle<'a>,
    /// The commands being replayed.
    commands: &'s CommandSequence,
    /// The grading settings.
    config: &'s GradingConfig,
    /// The run so far.
    trajectory: Trajectory,
    /// The index of the command currently applied.
    interval: usize,
    /// The current state.
    state: SimState,
    /// The collision that ended the run, if any.
    collision: Option<Collision>,
}

impl Trajectory {
    /// Starts a trajectory at the given pose.
    fn start(origin: Pose) -> Self {
        Self {
            poses: vec![origin],
            controls: vec![],
            times: vec![0.0],
        }
    }

    /// Records a step.
    fn push(&mut self, pose: Pose, control: f64, time: f64) {
        self.poses.push(pose);
        self.controls.push(control);
        self.times.push(time);
    }

    /// The poses, starting with the origin.
    pub fn poses(&self) -> &[Pose] {
        &self.poses
    }

    /// The control applied on each step; one fewer than the poses.
    pub fn controls(&self) -> &[f64] {
        &self.controls
    }

    /// The elapsed time at each pose.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// The number of integration steps taken.
    pub fn steps(&self) -> usize {
        self.controls.len()
    }

    /// The most recent pose.
    pub fn final_pose(&self) -> Pose {
        // Never empty: the origin is recorded on creation.
        self.poses[self.poses.len() - 1]
    }

    /// The controls with the last one repeated, so there is one per time sample.
    /// Empty if no step was taken.
    pub fn aligned_controls(&self) -> Vec<f64> {
        let mut controls = self.controls.clone();
        if let Some(last) = controls.last().copied() {
            controls.push(last);
        }
        controls
    }
}

impl Verdict {
    /// Whether the run was safe and ended satisfying the given tier.
    pub fn passed(&self, tier: GradeTier) -> bool {
        self.safe && self.done.get(tier)
    }

    /// The final pose of the run.
    pub fn final_pose(&self) -> Pose {
        self.trajectory.final_pose()
    }

    /// A score in `(-inf, 1]`: 1 if the graded tier passed, otherwise the
    /// fraction of the initial distance to the target that was covered.
    pub fn score(&self) -> f64 {
        if self.passed(self.tier) {
            1.0
        } else if self.initial_distance > 0.0 {
            1.0 - self.final_distance / self.initial_distance
        } else {
            0.0
        }
    }
}

impl<'s, 'a> Simulation<'s, 'a> {
    /// Validates the configuration and the commands, then prepares a run from the
    /// vehicle's origin. No step is taken if validation fails.
    ///
    /// The vehicle must use the configured step size and car model.
    pub fn new(
        vehicle: &'s Vehicle<'a>,
        commands: &'s CommandSequence,
        config: &'s GradingConfig,
    ) -> Result<Self> {
        config.validate()?;
        if vehicle.dt() != config.dt {
            return Err(Error::InvalidConfig(format!(
                "vehicle step of {} s differs from the configured {} s",
                vehicle.dt(),
                config.dt
            )));
        }
        if *vehicle.kinematics() != config.kinematics {
            return Err(Error::InvalidConfig(format!(
                "vehicle model {:?} differs from the configured {:?}",
                vehicle.kinematics(),
                config.kinematics
            )));
        }
        commands.validate(config.dt, config.enforce_min_interval)?;

        #[cfg(feature = "debug")]
        take_debug_trace();

        debug!(
            "simulating {} intervals over {} s (tier {}, tolerance {})",
            commands.len(),
            commands.end_time().unwrap_or(0.0),
            config.tier,
            config.tolerance
        );

        Ok(Self {
            vehicle,
            commands,
            config,
            trajectory: Trajectory::start(vehicle.origin()),
            interval: 0,
            state: SimState::Running,
            collision: None,
        })
    }

    /// The current state.
    pub fn state(&self) -> SimState {
        self.state
    }

    /// The run so far.
    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Advances the simulation by a single integration step,
    /// unless it has already terminated.
    pub fn step(&mut self) -> SimState {
        if self.state != SimState::Running {
            return self.state;
        }

        let dt = self.vehicle.dt();
        let steps = self.trajectory.steps();

        // Move on to the interval containing the current time
        let elapsed = steps as f64 * dt;
        while self.interval < self.commands.len()
            && elapsed >= self.commands.times[self.interval + 1]
        {
            self.interval += 1;
        }
        if self.interval == self.commands.len() {
            self.state = SimState::Terminated(Termination::Exhausted);
            return self.state;
        }
        if steps >= self.config.max_steps {
            warn!(
                "step cap of {} reached at t = {} s before the commands ended",
                self.config.max_steps, elapsed
            );
            self.state = SimState::Terminated(Termination::Exhausted);
            return self.state;
        }

        // Integrate
        let phi = self.commands.controls[self.interval];
        let prev = self.trajectory.final_pose();
        let pose = self.vehicle.step(prev, phi);
        self.trajectory.push(pose, phi, (steps + 1) as f64 * dt);
        debug_step(steps + 1, prev.position(), pose.position());

        // Check safety, then the goal
        if let Some(collision) = self.check(prev.position(), pose.position()) {
            self.record_collision(collision, prev.position(), pose.position());
            self.state = SimState::Terminated(Termination::Unsafe);
        } else if self
            .config
            .tier
            .passes(pose, self.vehicle.target(), self.config.tolerance)
        {
            self.state = SimState::Terminated(Termination::Goal);
        }

        self.state
    }

    /// Steps until the run terminates, then grades it.
    pub fn run(mut self) -> Verdict {
        while self.step() == SimState::Running {}
        self.finish()
    }

    /// Checks a motion step against the environment.
    fn check(&self, from: Point2d, to: Point2d) -> Option<Collision> {
        let env = self.vehicle.environment();
        match self.config.shape {
            ShapeKind::Circle => env.check_point(to),
            ShapeKind::Polygon => env.check_point(to).or_else(|| env.check_segment(from, to)),
        }
    }

    /// Stores the collision that ended the run.
    fn record_collision(&mut self, collision: Collision, from: Point2d, to: Point2d) {
        let edge = match collision {
            Collision::Obstacle(id) => self
                .vehicle
                .environment()
                .obstacle(id)
                .and_then(|ob| ob.edge_crossed(from, to)),
            Collision::Boundary => None,
        };
        let at = edge
            .and_then(|[a, b]| intersection_point(from, to, a, b))
            .unwrap_or(to);
        debug!("collision with {:?} at ({:.3}, {:.3})", collision, at.x, at.y);
        debug_collision(at, edge);
        self.collision = Some(collision);
    }

    /// Grades the terminated run.
    fn finish(self) -> Verdict {
        let termination = match self.state {
            SimState::Terminated(termination) => termination,
            SimState::Running => Termination::Exhausted,
        };
        let target = self.vehicle.target();
        let final_pose = self.trajectory.final_pose();
        let done = TierFlags::evaluate(final_pose, target, self.config.tolerance);

        debug!(
            "run ended {:?} after {} steps, passed tiers: {:?}",
            termination,
            self.trajectory.steps(),
            done.passed()
        );

        Verdict {
            termination,
            safe: self.collision.is_none(),
            done,
            collision: self.collision,
            tier: self.config.tier,
            initial_distance: distance(self.vehicle.origin().position(), target),
            final_distance: distance(final_pose.position(), target),
            trajectory: self.trajectory,
            #[cfg(feature = "debug")]
            debug: take_debug_trace(),
        }
    }
}

/// Validates and replays a command sequence for a vehicle.
/// Rejected commands are reported as [Error::Command].
pub fn simulate(
    vehicle: &Vehicle<'_>,
    commands: &CommandSequence,
    config: &GradingConfig,
) -> Result<Verdict> {
    Ok(Simulation::new(vehicle, commands, config)?.run())
}

/// Asks a strategy for its commands, then replays and grades them.
pub fn evaluate(
    strategy: &mut impl Strategy,
    vehicle: &Vehicle<'_>,
    config: &GradingConfig,
) -> Result<Verdict> {
    let commands = strategy.plan(vehicle);
    simulate(vehicle, &commands, config)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::environment::{Arena, Environment};
    use crate::obstacle::Obstacle;
    use assert_approx_eq::assert_approx_eq;

    fn open_arena() -> Environment {
        Environment::empty(Arena::new(20.0, 10.0).unwrap())
    }

    #[test]
    fn records_one_sample_per_step() {
        let env = open_arena();
        let car = Vehicle::new(&env, Pose::new(1.0, 5.0, 0.0), Point2d::new(19.0, 5.0), 0.01).unwrap();
        let commands = CommandSequence::new(vec![0.1, -0.1], vec![0.0, 0.5, 1.0]);
        let verdict = simulate(&car, &commands, &GradingConfig::default()).unwrap();

        let traj = &verdict.trajectory;
        assert_eq!(verdict.termination, Termination::Exhausted);
        assert_eq!(traj.steps(), 100);
        assert_eq!(traj.poses().len(), 101);
        assert_eq!(traj.times().len(), 101);
        assert_eq!(traj.controls().len(), traj.poses().len() - 1);
        assert_eq!(traj.controls()[0], 0.1);
        assert_eq!(traj.controls()[49], 0.1);
        assert_eq!(traj.controls()[50], -0.1);
        assert_approx_eq!(*traj.times().last().unwrap(), 1.0);

        let aligned = traj.aligned_controls();
        assert_eq!(aligned.len(), traj.times().len());
        assert_eq!(aligned[aligned.len() - 1], aligned[aligned.len() - 2]);
    }

    #[test]
    fn step_by_step_matches_run() {
        let env = open_arena();
        let car = Vehicle::new(&env, Pose::new(1.0, 5.0, 0.0), Point2d::new(19.0, 5.0), 0.01).unwrap();
        let commands = CommandSequence::constant(0.2, 0.3);
        let config = GradingConfig::default();

        let mut sim = Simulation::new(&car, &commands, &config).unwrap();
        let mut count = 0;
        while sim.step() == SimState::Running {
            count += 1;
        }
        assert_eq!(sim.state(), SimState::Terminated(Termination::Exhausted));
        assert_eq!(count, sim.trajectory().steps());
        // Further steps do nothing
        sim.step();
        assert_eq!(count, sim.trajectory().steps());

        let verdict = simulate(&car, &commands, &config).unwrap();
        assert_eq!(&verdict.trajectory, sim.trajectory());
    }

    #[test]
    fn step_cap_truncates() {
        let env = open_arena();
        let car = Vehicle::new(&env, Pose::new(1.0, 5.0, 0.0), Point2d::new(19.0, 5.0), 0.01).unwrap();
        let config = GradingConfig {
            max_steps: 10,
            ..Default::default()
        };
        let verdict = simulate(&car, &CommandSequence::constant(0.0, 5.0), &config).unwrap();
        assert_eq!(verdict.termination, Termination::Exhausted);
        assert_eq!(verdict.trajectory.steps(), 10);
        assert!(verdict.safe);
    }

    #[test]
    fn swept_check_catches_thin_wall() {
        // A sliver much thinner than one step
        let wall = Obstacle::polygon(
            Point2d::new(5.0, 5.0),
            [
                Point2d::new(5.0, 0.0),
                Point2d::new(5.001, 0.0),
                Point2d::new(5.001, 10.0),
                Point2d::new(5.0, 10.0),
            ],
        )
        .unwrap();
        let env = Environment::new(Arena::new(20.0, 10.0).unwrap(), [wall]);
        // Steps land at 4.7 and 5.2, either side of the wall
        let car = Vehicle::new(&env, Pose::new(1.2, 5.0, 0.0), Point2d::new(19.0, 5.0), 0.5).unwrap();
        let commands = CommandSequence::constant(0.0, 10.0);

        let sampled = GradingConfig {
            dt: 0.5,
            ..Default::default()
        };
        let swept = GradingConfig {
            shape: ShapeKind::Polygon,
            ..sampled.clone()
        };
        let verdict = simulate(&car, &commands, &swept).unwrap();
        assert_eq!(verdict.termination, Termination::Unsafe);
        assert!(!verdict.safe);
        assert!(matches!(verdict.collision, Some(Collision::Obstacle(_))));
        assert_approx_eq!(verdict.final_pose().x, 5.2);

        // Endpoint sampling tunnels straight through
        let short = CommandSequence::constant(0.0, 5.0);
        let verdict = simulate(&car, &short, &sampled).unwrap();
        assert_eq!(verdict.termination, Termination::Exhausted);
        assert!(verdict.safe);
        assert!(verdict.final_pose().x > 6.0);
    }

    #[test]
    fn rejects_inconsistent_config() {
        let env = open_arena();
        let car = Vehicle::new(&env, Pose::new(1.0, 5.0, 0.0), Point2d::new(19.0, 5.0), 0.01).unwrap();
        let commands = CommandSequence::constant(0.0, 1.0);

        let config = GradingConfig {
            tolerance: -3.0,
            ..Default::default()
        };
        assert!(matches!(simulate(&car, &commands, &config), Err(Error::InvalidConfig(_))));

        let config = GradingConfig {
            dt: 0.5,
            ..Default::default()
        };
        assert!(matches!(simulate(&car, &commands, &config), Err(Error::InvalidConfig(_))));

        let mut config = GradingConfig::default();
        config.kinematics.speed = 2.0;
        assert!(matches!(simulate(&car, &commands, &config), Err(Error::InvalidConfig(_))));

        // A vehicle built from the config always matches it
        let car = config
            .vehicle(&env, Pose::new(1.0, 5.0, 0.0), Point2d::new(19.0, 5.0))
            .unwrap();
        let verdict = simulate(&car, &commands, &config).unwrap();
        assert_approx_eq!(verdict.final_pose().x, 3.0);
    }

    #[test]
    fn rejected_commands_take_no_steps() {
        let env = open_arena();
        let car = Vehicle::new(&env, Pose::new(1.0, 5.0, 0.0), Point2d::new(19.0, 5.0), 0.01).unwrap();
        let commands = CommandSequence::new(vec![0.0], vec![0.5, 1.0]);
        let config = GradingConfig::default();
        let result = Simulation::new(&car, &commands, &config);
        assert!(matches!(
            result,
            Err(Error::Command(crate::error::CommandError::NonZeroStart { .. }))
        ));
    }

    #[test]
    fn score_reflects_progress() {
        let env = open_arena();
        let car = Vehicle::new(&env, Pose::new(0.0, 5.0, 0.0), Point2d::new(20.0, 5.0), 0.01).unwrap();
        let verdict = simulate(&car, &CommandSequence::constant(0.0, 5.0), &GradingConfig::default())
            .unwrap();
        assert_approx_eq!(verdict.score(), 0.25, 1e-6);

        let verdict = simulate(&car, &CommandSequence::constant(0.0, 30.0), &GradingConfig::default())
            .unwrap();
        assert_eq!(verdict.termination, Termination::Goal);
        assert_eq!(verdict.score(), 1.0);
    }

    #[test]
    fn closures_are_strategies() {
        let env = open_arena();
        let car = Vehicle::standard_mission(&env, 0.01).unwrap();
        let mut calls = 0;
        let mut strategy = |v: &Vehicle<'_>| {
            calls += 1;
            assert_eq!(v.dt(), 0.01);
            CommandSequence::constant(0.0, 1.0)
        };
        let verdict = evaluate(&mut strategy, &car, &GradingConfig::default()).unwrap();
        assert_eq!(calls, 1);
        assert_eq!(verdict.trajectory.steps(), 100);
    }
}
