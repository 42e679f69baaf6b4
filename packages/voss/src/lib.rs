//! Time-optimal trajectory generation for planar mobile robots.
//!
//! voss turns a smooth geometric path and a description of a robot's drive
//! (wheel layout, motor constants, voltage budget) into a time-indexed
//! stream of poses, pose velocities, and pose accelerations for a
//! controller to track.
//!
//! Generation runs in three stages:
//!
//! 1. **Geometry.** A [`QuinticSpline`] (or any custom
//!    [`ParametricCurve`]) is reparameterized by arc length into a
//!    [`Curve`], then paired with a [`Heading`] provider (and optionally
//!    composed with more curves and point turns) into a [`Path`].
//! 2. **Constraints.** A [`DriveModel`] built from wheel positions and
//!    motor constants yields [`Constraint`]s: per-motor speed, wheel
//!    surface speed, acceleration, and voltage limits, collected into a
//!    [`ConstraintSet`].
//! 3. **Profiling.** [`generate_trajectory`] sweeps the path under the
//!    constraint set and returns a [`Trajectory`] whose
//!    [`at_time`](voss_motion::Trajectory::at_time) method answers pose
//!    queries for any instant of the motion.
//!
//! ```
//! use voss::prelude::*;
//!
//! let spline = QuinticSpline::from_control_points([
//!     Vec2::new(0.0, 0.0),
//!     Vec2::new(0.5, 0.0),
//!     Vec2::new(1.0, 0.0),
//!     Vec2::new(1.0, 1.0),
//!     Vec2::new(1.0, 2.0),
//!     Vec2::new(1.5, 2.0),
//! ]);
//! let path = Path::new(Curve::new(spline), Heading::Tangent);
//!
//! let model = DriveModel::differential(
//!     MotorModel::new(0.05, 0.4, 0.015), // ks, kv, ka
//!     0.05,                              // wheel radius
//!     1.5,                               // gear ratio
//!     0.35,                              // track width
//! )?;
//! let constraints = ConstraintSet::new([
//!     Constraint::motor_speed(50.0, &model)?,
//!     Constraint::motor_voltage(12.0, &model)?,
//! ]);
//!
//! let trajectory = generate_trajectory(path, &constraints, &GenerationConfig::default())?;
//! let midpoint = trajectory.at_time(trajectory.duration() / 2.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The crates behind the feature gates can also be used on their own:
//! `voss-math` (vectors, angles, intervals), `voss-curve` (splines and
//! paths), `voss-drive` (drive-model algebra), and `voss-motion`
//! (constraints, profiles, trajectories).
//!
//! [`QuinticSpline`]: crate::curve::QuinticSpline
//! [`ParametricCurve`]: crate::curve::ParametricCurve
//! [`Curve`]: crate::curve::Curve
//! [`Heading`]: crate::curve::Heading
//! [`Path`]: crate::curve::Path
//! [`DriveModel`]: crate::drive::DriveModel
//! [`Constraint`]: crate::motion::Constraint
//! [`ConstraintSet`]: crate::motion::ConstraintSet
//! [`generate_trajectory`]: crate::motion::generate_trajectory
//! [`Trajectory`]: crate::motion::Trajectory

#[doc(inline)]
#[cfg(feature = "curve")]
pub use voss_curve as curve;

#[doc(inline)]
#[cfg(feature = "drive")]
pub use voss_drive as drive;

#[doc(inline)]
#[cfg(feature = "math")]
pub use voss_math as math;

#[doc(inline)]
#[cfg(feature = "motion")]
pub use voss_motion as motion;

/// Commonly used features of voss.
///
/// This module is meant to be glob imported.
pub mod prelude {
    #[cfg(feature = "curve")]
    pub use crate::curve::{
        Curve, CurvePoint, Heading, ParametricCurve, Path, PathPoint, QuinticSpline, SplineKnot,
    };
    #[cfg(feature = "drive")]
    pub use crate::drive::{DriveModel, MotorModel, Wheel};
    #[cfg(feature = "math")]
    pub use crate::math::{Angle, IntoAngle, Interval, MotionState, Pose, PoseState, Twist, Vec2};
    #[cfg(feature = "motion")]
    pub use crate::motion::{
        Constraint, ConstraintSet, GenerationConfig, MotionProfile, Trajectory,
        generate_profile, generate_trajectory,
    };
}
