//! Time-optimal motion profiles and trajectories.
//!
//! Given a [`Path`](voss_curve::Path) and a [`ConstraintSet`] built from a
//! drive model, [`generate_trajectory`] computes the fastest traversal that
//! honors every pointwise velocity bound and state-dependent acceleration
//! interval, and packages it as a time-indexed [`Trajectory`].
//!
//! The 1-D core, [`generate_profile`], is independent of paths: anything
//! implementing [`MotionConstrainer`] can be profiled.

mod constraint;
mod profile;
mod trajectory;

pub use constraint::{
    AccelerationConstraint, Constraint, ConstraintError, ConstraintSet, Limits,
    VelocityConstraint,
};
pub use profile::{
    GenerationConfig, MAX_VELOCITY, MotionConstrainer, MotionProfile, ProfileError,
    ProfileSegment, ProfileStepper, generate_profile,
};
pub use trajectory::{Trajectory, TrajectoryError, TrajectoryStepper, generate_trajectory};
