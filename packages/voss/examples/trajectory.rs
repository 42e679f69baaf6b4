//! Generates a trajectory for a small differential robot and prints a
//! handful of tracking setpoints.

use voss::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .init();

    const TRACK_WIDTH: f64 = 0.35;
    const WHEEL_RADIUS: f64 = 0.05;
    const GEAR_RATIO: f64 = 1.5;

    // An S-curve followed by a turn in place.
    let spline = QuinticSpline::from_derivatives(
        SplineKnot::new(Vec2::new(0.0, 0.0), Vec2::new(2.0, 0.0), Vec2::ZERO),
        SplineKnot::new(Vec2::new(1.5, 1.0), Vec2::new(2.0, 0.0), Vec2::ZERO),
    );
    let sweep = Path::new(Curve::new(spline), Heading::Tangent);
    let end_heading = sweep.point_at(sweep.length()).heading;
    let turn = Path::point_turn(Vec2::new(1.5, 1.0), end_heading, end_heading + 90.0.deg());
    let path = sweep.then(turn);

    let model = DriveModel::differential(
        MotorModel::new(0.05, 0.4, 0.015),
        WHEEL_RADIUS,
        GEAR_RATIO,
        TRACK_WIDTH,
    )?;
    let constraints = ConstraintSet::new([
        Constraint::motor_speed(50.0, &model)?,
        Constraint::motor_voltage(12.0, &model)?,
    ]);

    let trajectory = generate_trajectory(path, &constraints, &GenerationConfig::default())?;
    println!(
        "trajectory: {:.3} m over {:.3} s",
        trajectory.path().length(),
        trajectory.duration()
    );

    let mut stepper = trajectory.stepper();
    for i in 0..=10 {
        let t = trajectory.duration() * f64::from(i) / 10.0;
        let state = stepper.at_time(t);

        println!(
            "t={t:5.2}s  pos=({:6.3}, {:6.3})  heading={:7.2}°  v={:5.3} m/s  ω={:6.3} rad/s",
            state.pose.position.x,
            state.pose.position.y,
            state.pose.heading.as_degrees(),
            state.velocity.linear.length(),
            state.velocity.angular,
        );
    }

    Ok(())
}
