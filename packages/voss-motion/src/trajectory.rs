use std::cell::RefCell;

use thiserror::Error;
use voss_curve::{Path, PathPoint, PathStepper};
use voss_math::{Interval, MotionState, PoseState};

use crate::profile::EPSILON;
use crate::{
    ConstraintSet, GenerationConfig, MotionConstrainer, MotionProfile, ProfileError,
    ProfileStepper, generate_profile,
};

/// Errors raised while assembling a [`Trajectory`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrajectoryError {
    /// The path and profile describe different distances.
    #[error("path length {path_length} and profile distance {profile_distance} disagree")]
    LengthMismatch {
        /// Arc length of the path.
        path_length: f64,
        /// Distance covered by the profile.
        profile_distance: f64,
    },

    /// Profile generation failed.
    #[error(transparent)]
    Profile(#[from] ProfileError),
}

/// A time-parameterized traversal of a path.
///
/// Pairs a [`Path`] with a [`MotionProfile`] over the same arc length and
/// answers "where should the robot be, and how fast, at time t".
#[derive(Debug)]
pub struct Trajectory {
    path: Path,
    profile: MotionProfile,
}

impl Trajectory {
    /// Composes a path and a profile.
    ///
    /// # Errors
    ///
    /// Fails if the path length and profile distance disagree by more than
    /// a small tolerance.
    pub fn new(path: Path, profile: MotionProfile) -> Result<Self, TrajectoryError> {
        let path_length = path.length();
        let profile_distance = profile.distance();

        if (path_length - profile_distance).abs() > EPSILON * path_length.max(1.0) {
            return Err(TrajectoryError::LengthMismatch {
                path_length,
                profile_distance,
            });
        }

        Ok(Self { path, profile })
    }

    /// The path being traversed.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The velocity schedule over the path.
    #[must_use]
    pub fn profile(&self) -> &MotionProfile {
        &self.profile
    }

    /// Total time the traversal takes.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.profile.duration()
    }

    /// Samples the pose, pose velocity, and pose acceleration at a time
    /// (clamped into `[0, duration]`).
    #[must_use]
    pub fn at_time(&self, t: f64) -> PoseState {
        let state = self.profile.at_time(t);
        pose_state(&self.path.point_at(state.position), state)
    }

    /// Returns a cursor for sequential sampling.
    #[must_use]
    pub fn stepper(&self) -> TrajectoryStepper<'_> {
        TrajectoryStepper {
            path: self.path.stepper(),
            profile: self.profile.stepper(),
        }
    }
}

/// Chain rule from the arc-length parameterization to time: velocity
/// follows the tangent, acceleration splits into a centripetal `v²` term
/// and a tangential `dv/dt` term.
fn pose_state(point: &PathPoint, state: MotionState) -> PoseState {
    PoseState::new(
        point.pose(),
        point.pose_derivative() * state.velocity,
        point.pose_second_derivative() * (state.velocity * state.velocity)
            + point.pose_derivative() * state.acceleration,
    )
}

/// A cursor over a [`Trajectory`].
///
/// Pairs a path stepper with a profile stepper; the monotone-time contract
/// of the profile stepper keeps the path queries monotone in arc length.
#[derive(Debug)]
pub struct TrajectoryStepper<'a> {
    path: PathStepper<'a>,
    profile: ProfileStepper<'a>,
}

impl TrajectoryStepper<'_> {
    /// Samples the trajectory at a time (clamped into `[0, duration]`).
    pub fn at_time(&mut self, t: f64) -> PoseState {
        let state = self.profile.at_time(t);
        pose_state(&self.path.point_at(state.position), state)
    }
}

/// Adapts `(path, constraints)` to the 1-D [`MotionConstrainer`] interface.
///
/// The generator probes the same arc length several times in a row (once
/// for the velocity bound, then repeatedly while searching accelerations),
/// so the last computed [`PathPoint`] is kept in a one-slot cache.
struct PathConstrainer<'a> {
    path: &'a Path,
    constraints: &'a ConstraintSet,
    cache: RefCell<Option<(f64, PathPoint)>>,
}

impl PathConstrainer<'_> {
    fn point_at(&self, s: f64) -> PathPoint {
        if let Some((cached_s, point)) = *self.cache.borrow() {
            if cached_s == s {
                return point;
            }
        }

        let point = self.path.point_at(s);
        *self.cache.borrow_mut() = Some((s, point));
        point
    }
}

impl MotionConstrainer for PathConstrainer<'_> {
    fn max_velocity(&self, s: f64) -> f64 {
        self.constraints.max_velocity(&self.point_at(s))
    }

    fn accel_range(&self, s: f64, velocity: f64) -> Interval {
        self.constraints.accel_range(&self.point_at(s), velocity)
    }
}

/// Generates the time-optimal trajectory over `path` under `constraints`.
///
/// # Errors
///
/// Propagates [`ProfileError`]s from the underlying generator (including
/// invalid configuration and unsatisfiable constraints); the final length
/// check cannot fail for profiles generated here.
pub fn generate_trajectory(
    path: Path,
    constraints: &ConstraintSet,
    config: &GenerationConfig,
) -> Result<Trajectory, TrajectoryError> {
    let constrainer = PathConstrainer {
        path: &path,
        constraints,
        cache: RefCell::new(None),
    };
    let profile = generate_profile(&constrainer, path.length(), config)?;

    Trajectory::new(path, profile)
}
