//! End-to-end trajectory generation scenarios.

use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use voss_curve::{Curve, Heading, ParametricCurve, Path, QuinticSpline, SplineKnot};
use voss_drive::{DriveModel, MotorModel};
use voss_math::{Angle, Vec2};
use voss_motion::{Constraint, ConstraintSet, GenerationConfig, generate_trajectory};

fn line_path(length: f64) -> Path {
    let span = Vec2::new(length, 0.0);
    Path::new(
        Curve::new(QuinticSpline::from_derivatives(
            SplineKnot::new(Vec2::ZERO, span, Vec2::ZERO),
            SplineKnot::new(span, span, Vec2::ZERO),
        )),
        Heading::Tangent,
    )
}

/// Differential drive with unit wheels: motor velocity equals bot velocity
/// when driving straight.
fn unit_differential() -> DriveModel {
    DriveModel::differential(MotorModel::new(0.0, 1.0, 0.1), 1.0, 1.0, 1.0).unwrap()
}

#[test]
fn rest_to_rest_line_is_a_trapezoid() {
    let model = unit_differential();
    let constraints = ConstraintSet::new([
        Constraint::motor_speed(1.0, &model).unwrap(),
        Constraint::motor_acceleration(1.0, &model).unwrap(),
    ]);

    let trajectory =
        generate_trajectory(line_path(2.0), &constraints, &GenerationConfig::default()).unwrap();

    // Accelerate over 0.5, cruise 1.0, decelerate over 0.5.
    assert_abs_diff_eq!(trajectory.duration(), 3.0, epsilon = 2e-2);

    let start = trajectory.at_time(0.0);
    let end = trajectory.at_time(trajectory.duration());
    assert_abs_diff_eq!(start.velocity.linear.length(), 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(end.velocity.linear.length(), 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(end.pose.position.x, 2.0, epsilon = 1e-6);

    let mid = trajectory.at_time(trajectory.duration() / 2.0);
    assert_abs_diff_eq!(mid.velocity.linear.x, 1.0, epsilon = 1e-2);
}

#[test]
fn rolling_finish_skips_the_deceleration_leg() {
    let model = unit_differential();
    let constraints = ConstraintSet::new([
        Constraint::motor_speed(1.0, &model).unwrap(),
        Constraint::motor_acceleration(1.0, &model).unwrap(),
    ]);
    let config = GenerationConfig {
        target_end_velocity: 1.0,
        ..GenerationConfig::default()
    };

    let trajectory = generate_trajectory(line_path(2.0), &constraints, &config).unwrap();

    assert_abs_diff_eq!(trajectory.duration(), 2.5, epsilon = 2e-2);
    assert_abs_diff_eq!(
        trajectory
            .at_time(trajectory.duration())
            .velocity
            .linear
            .x,
        1.0,
        epsilon = 1e-2
    );
}

#[test]
fn reparameterization_matches_a_dense_reference() {
    let spline = QuinticSpline::from_control_points([
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(2.0, 0.0),
        Vec2::new(2.0, 1.0),
        Vec2::new(2.0, 2.0),
        Vec2::new(3.0, 2.0),
    ]);
    let curve = Curve::new(spline);

    // Dense trapezoidal reference for the arc length integral.
    let steps = 200_000;
    let du = 1.0 / f64::from(steps);
    let mut reference_length = 0.0;
    let mut speeds = Vec::with_capacity(steps as usize + 1);
    for i in 0..=steps {
        speeds.push(spline.derivative(f64::from(i) * du).length());
    }
    let mut cumulative = vec![0.0];
    for i in 0..steps as usize {
        reference_length += du * (speeds[i] + speeds[i + 1]) / 2.0;
        cumulative.push(reference_length);
    }

    assert_abs_diff_eq!(curve.length(), reference_length, epsilon = 1e-6);

    // Invert the reference at the halfway arc length.
    let half = reference_length / 2.0;
    let index = cumulative.partition_point(|&s| s < half);
    let u_half = index as f64 * du;

    let halfway = curve.point_at(curve.length() / 2.0);
    assert_abs_diff_eq!(halfway.position.x, spline.point(u_half).x, epsilon = 1e-3);
    assert_abs_diff_eq!(halfway.position.y, spline.point(u_half).y, epsilon = 1e-3);
}

#[test]
fn voltage_limited_differential_run() {
    let model = unit_differential();
    let constraints = ConstraintSet::new([
        Constraint::motor_speed(10.0, &model).unwrap(),
        Constraint::motor_voltage(12.0, &model).unwrap(),
    ]);

    let trajectory =
        generate_trajectory(line_path(5.0), &constraints, &GenerationConfig::default()).unwrap();

    // Every sampled velocity stays under both the motor speed cap and the
    // voltage-limited steady-state speed (12 V / kv).
    let mut peak: f64 = 0.0;
    for i in 0..=200 {
        let t = trajectory.duration() * f64::from(i) / 200.0;
        let v = trajectory.at_time(t).velocity.linear.length();
        peak = peak.max(v);
        assert!(v <= 10.0 + 1e-6, "motor speed cap violated: {v}");
        assert!(v <= 12.0, "voltage steady state exceeded: {v}");
    }
    assert!(peak > 5.0, "profile never got up to speed: {peak}");

    // Rest-to-rest targets.
    assert_abs_diff_eq!(
        trajectory.at_time(0.0).velocity.linear.length(),
        0.0,
        epsilon = 1e-9
    );
    assert_abs_diff_eq!(
        trajectory
            .at_time(trajectory.duration())
            .velocity
            .linear
            .length(),
        0.0,
        epsilon = 1e-9
    );
}

#[test]
fn mecanum_point_turn_profile() {
    let model =
        DriveModel::mecanum(MotorModel::new(0.0, 1.0, 0.1), 1.0, 1.0, 0.3, 0.25).unwrap();
    let constraints = ConstraintSet::new([Constraint::motor_speed(10.0, &model).unwrap()]);

    let path = Path::point_turn(Vec2::new(0.5, -0.5), Angle::ZERO, Angle::HALF_TURN);
    assert_abs_diff_eq!(path.length(), core::f64::consts::PI, epsilon = 1e-12);

    let trajectory =
        generate_trajectory(path, &constraints, &GenerationConfig::default()).unwrap();

    // Translation stays frozen while heading sweeps linearly in arc length.
    for i in 0..=20 {
        let s = trajectory.path().length() * f64::from(i) / 20.0;
        let point = trajectory.path().point_at(s);
        assert_eq!(point.curve.derivative, Vec2::ZERO);
        assert_abs_diff_eq!(point.heading.as_radians(), s, epsilon = 1e-9);
    }

    // The turn rate is limited by the most constraining motor row.
    let spin = model.motor_vel_from_bot_vel() * nalgebra::Vector3::new(0.0, 0.0, 1.0);
    let max_turn_rate = spin.iter().fold(f64::INFINITY, |max, rate| {
        if rate.abs() > 0.0 {
            max.min(10.0 / rate.abs())
        } else {
            max
        }
    });

    // No acceleration constraint: the profile saturates immediately, so the
    // duration is the sweep over the max turn rate (up to endpoint ramps).
    assert_abs_diff_eq!(
        trajectory.duration(),
        core::f64::consts::PI / max_turn_rate,
        epsilon = 5e-3
    );
}

#[test]
fn reversed_trajectory_mirrors_the_forward_one() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut random_point = |scale: f64| -> Vec2 {
        Vec2::new(
            rng.random_range(-scale..scale),
            rng.random_range(-scale..scale),
        )
    };

    // A random but tame quintic: control points spread out enough that the
    // tangent never degenerates.
    let points = [
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.5) + random_point(0.25),
        Vec2::new(2.0, 0.0) + random_point(0.25),
        Vec2::new(3.0, 1.0) + random_point(0.25),
        Vec2::new(4.0, 0.5) + random_point(0.25),
        Vec2::new(5.0, 1.0),
    ];
    let spline = QuinticSpline::from_control_points(points);

    let model = unit_differential();
    let constraints = ConstraintSet::new([
        Constraint::motor_speed(8.0, &model).unwrap(),
        Constraint::motor_acceleration(20.0, &model).unwrap(),
    ]);
    let config = GenerationConfig::default();

    let forward =
        generate_trajectory(Path::new(Curve::new(spline), Heading::Tangent), &constraints, &config)
            .unwrap();
    let backward = generate_trajectory(
        Path::new(Curve::new(spline), Heading::Tangent).reversed(),
        &constraints,
        &config,
    )
    .unwrap();

    assert_abs_diff_eq!(forward.duration(), backward.duration(), epsilon = 1e-6);

    for i in 0..=50 {
        let t = forward.duration() * f64::from(i) / 50.0;
        let a = forward.at_time(t);
        let b = backward.at_time(backward.duration() - t);

        assert_abs_diff_eq!(a.pose.position.x, b.pose.position.x, epsilon = 1e-3);
        assert_abs_diff_eq!(a.pose.position.y, b.pose.position.y, epsilon = 1e-3);
        assert_abs_diff_eq!(
            (a.pose.heading - b.pose.heading).wrapped().as_radians(),
            0.0,
            epsilon = 1e-3
        );

        // The reversed run covers the same ground backwards.
        assert_abs_diff_eq!(a.velocity.linear.x, -b.velocity.linear.x, epsilon = 1e-3);
        assert_abs_diff_eq!(a.velocity.linear.y, -b.velocity.linear.y, epsilon = 1e-3);
        assert_abs_diff_eq!(a.velocity.angular, -b.velocity.angular, epsilon = 1e-3);
    }
}

#[test]
fn sampled_arc_length_is_monotone_and_complete() {
    let model = unit_differential();
    let constraints = ConstraintSet::new([
        Constraint::motor_speed(3.0, &model).unwrap(),
        Constraint::motor_acceleration(5.0, &model).unwrap(),
    ]);

    let spline = QuinticSpline::from_control_points([
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(2.0, 0.0),
        Vec2::new(2.0, 1.0),
        Vec2::new(2.0, 2.0),
        Vec2::new(3.0, 2.0),
    ]);
    let trajectory = generate_trajectory(
        Path::new(Curve::new(spline), Heading::Tangent),
        &constraints,
        &GenerationConfig::default(),
    )
    .unwrap();

    let mut last = 0.0;
    for i in 0..=500 {
        let t = trajectory.duration() * f64::from(i) / 500.0;
        let s = trajectory.profile().at_time(t).position;
        assert!(s >= last - 1e-9, "arc length went backwards at t = {t}");
        last = s;
    }
    assert_abs_diff_eq!(last, trajectory.path().length(), epsilon = 1e-6);
}
