//! Input validation and the strategy contract.

use dubins_grader::{
    evaluate, math::Point2d, simulate, Arena, CommandError, CommandSequence, Environment,
    Error, GradeTier, GradingConfig, Pose, Termination, Vehicle,
};
use std::f64::consts::FRAC_PI_4;

fn rejected(controls: &[f64], times: &[f64]) -> CommandError {
    let env = Environment::empty(Arena::default());
    let car = Vehicle::standard_mission(&env, 0.01).unwrap();
    let commands = CommandSequence::new(controls.to_vec(), times.to_vec());
    match simulate(&car, &commands, &GradingConfig::default()) {
        Err(Error::Command(e)) => e,
        other => panic!("expected a command error, got {:?}", other.map(|v| v.termination)),
    }
}

/// Every malformed command sequence is rejected before any step is taken.
#[test]
fn malformed_commands_are_rejected() {
    assert_eq!(rejected(&[], &[0.0]), CommandError::Empty);
    assert!(matches!(
        rejected(&[0.0, 0.0], &[0.0, 1.0]),
        CommandError::LengthMismatch { .. }
    ));
    assert!(matches!(
        rejected(&[0.0], &[1.0, 2.0]),
        CommandError::NonZeroStart { .. }
    ));
    assert!(matches!(
        rejected(&[FRAC_PI_4 + 0.01], &[0.0, 1.0]),
        CommandError::SteeringOutOfRange { index: 0, .. }
    ));
    assert!(matches!(
        rejected(&[0.0, 0.0], &[0.0, 2.0, 2.0]),
        CommandError::NonIncreasingTimes { index: 1 }
    ));
    assert!(matches!(
        rejected(&[0.0, 0.0], &[0.0, 1.0, 1.001]),
        CommandError::IntervalTooShort { index: 1, .. }
    ));
    assert!(matches!(
        rejected(&[0.0], &[0.0, f64::NAN]),
        CommandError::NonFinite { index: 1 }
    ));
}

/// The steering limit itself is allowed.
#[test]
fn steering_limit_is_inclusive() {
    let env = Environment::empty(Arena::default());
    let car = Vehicle::new(&env, Pose::new(10.0, 5.0, 0.0), Point2d::new(20.0, 5.0), 0.01).unwrap();
    let commands = CommandSequence::new(vec![FRAC_PI_4, -FRAC_PI_4], vec![0.0, 1.0, 2.0]);
    let verdict = simulate(&car, &commands, &GradingConfig::default()).unwrap();
    assert_eq!(verdict.termination, Termination::Exhausted);
}

/// A strategy is asked for its plan once, and a rejected plan reports why.
#[test]
fn strategies() {
    let env = Environment::empty(Arena::default());
    let car = Vehicle::standard_mission(&env, 0.01).unwrap();
    let config = GradingConfig {
        tier: GradeTier::PositionOnly,
        ..Default::default()
    };

    let mut bad = |_: &Vehicle<'_>| CommandSequence::new(vec![0.0], vec![0.0]);
    assert!(matches!(
        evaluate(&mut bad, &car, &config),
        Err(Error::Command(CommandError::LengthMismatch { .. }))
    ));

    // Head straight for the target, then stop steering
    let mut aim = |v: &Vehicle<'_>| {
        let origin = v.origin();
        let bearing = (v.target().y - origin.y).atan2(v.target().x - origin.x);
        let phi = FRAC_PI_4;
        let turn_time = bearing * v.kinematics().wheel_base / phi.tan() / v.kinematics().speed;
        CommandSequence::new(vec![phi, 0.0], vec![0.0, turn_time, 60.0])
    };
    let verdict = evaluate(&mut aim, &car, &config).unwrap();
    assert_eq!(verdict.termination, Termination::Goal);
    assert!(verdict.safe);
    assert!(verdict.passed(GradeTier::PositionOnly));
}

/// Evaluations of one shared environment can run on many threads at once.
#[test]
fn parallel_evaluations() {
    let env = Environment::empty(Arena::default());
    let config = GradingConfig::default();
    let phis = [-0.2, -0.1, 0.0, 0.1, 0.2];

    let parallel: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = phis
            .iter()
            .map(|&phi| {
                let (env, config) = (&env, &config);
                s.spawn(move || {
                    let car = Vehicle::standard_mission(env, 0.01).unwrap();
                    simulate(&car, &CommandSequence::constant(phi, 20.0), config).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (phi, verdict) in phis.iter().zip(parallel) {
        let car = Vehicle::standard_mission(&env, 0.01).unwrap();
        let serial = simulate(&car, &CommandSequence::constant(*phi, 20.0), &config).unwrap();
        assert_eq!(verdict.trajectory, serial.trajectory);
        assert_eq!(verdict.termination, serial.termination);
    }
}

/// Configuration files override only what they name.
#[test]
fn config_from_toml() {
    let config = GradingConfig::from_toml_str(
        r#"
        tier = "position-only"
        tolerance = 1.0
        dt = 0.05
        "#,
    )
    .unwrap();
    let env = Environment::empty(Arena::default());
    let car = config
        .vehicle(&env, Pose::new(0.0, 5.0, 0.0), Point2d::new(20.0, 2.0))
        .unwrap();
    assert_eq!(car.dt(), 0.05);

    let verdict = simulate(&car, &CommandSequence::constant(0.0, 30.0), &config).unwrap();
    assert_eq!(verdict.termination, Termination::Goal);
    assert!(verdict.final_pose().x >= 19.0);
    assert!(verdict.final_pose().x < 19.1);
}
