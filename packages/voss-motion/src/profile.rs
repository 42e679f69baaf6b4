use thiserror::Error;
use voss_math::{Interval, MotionState};

/// Hard ceiling applied to every pointwise velocity bound.
pub const MAX_VELOCITY: f64 = 1e4;

/// Numerical guard used throughout profile generation.
pub(crate) const EPSILON: f64 = 1e-6;

/// Answers pointwise constraint queries along a 1-D path coordinate.
///
/// During generation, queries arrive in two sweeps over a fixed grid of
/// arc lengths (forward, then backward), with repeated `accel_range` calls
/// at the same `s` while the velocity search narrows.
pub trait MotionConstrainer {
    /// The largest admissible `|ds/dt|` at `s`. Must be non-negative.
    fn max_velocity(&self, s: f64) -> f64;

    /// The interval of admissible `ds²/dt²` at `s` when traveling at
    /// `velocity`. May be empty.
    fn accel_range(&self, s: f64, velocity: f64) -> Interval;
}

/// Targets and tuning for profile generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    /// Velocity to start the profile at (an upper bound; the constraints
    /// may force a slower start).
    pub target_start_velocity: f64,

    /// Velocity to end the profile at (also an upper bound).
    pub target_end_velocity: f64,

    /// Arc length between constraint samples.
    pub segment_size: f64,

    /// Termination tolerance for the feasible-velocity bisection.
    pub velocity_search_tolerance: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            target_start_velocity: 0.0,
            target_end_velocity: 0.0,
            segment_size: 0.01,
            velocity_search_tolerance: 0.01,
        }
    }
}

/// Errors raised by [`generate_profile`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    /// The profile distance was zero, negative, or NaN.
    #[error("profile distance must be positive (got {0})")]
    NonPositiveDistance(f64),

    /// A velocity target was negative.
    #[error("target velocities must be non-negative (got {0})")]
    NegativeTargetVelocity(f64),

    /// The segment size was outside `(0, distance]`.
    #[error("segment size must be in (0, distance] (got {segment_size} for distance {distance})")]
    InvalidSegmentSize {
        /// Requested segment size.
        segment_size: f64,
        /// Profile distance.
        distance: f64,
    },

    /// The velocity search tolerance was not positive.
    #[error("velocity search tolerance must be positive (got {0})")]
    NonPositiveTolerance(f64),

    /// A constrainer returned a negative pointwise velocity bound.
    #[error("constraint produced a negative velocity bound at s = {s} ({bound})")]
    NegativeVelocityBound {
        /// Arc length of the offending sample.
        s: f64,
        /// The bound that was returned.
        bound: f64,
    },

    /// No admissible acceleration exists even at rest; the constraints
    /// cannot be satisfied by any profile.
    #[error("constraints admit no acceleration even at rest (segment {index}, s = {s})")]
    Unsatisfiable {
        /// Index of the segment where the search bottomed out.
        index: usize,
        /// Arc length of the offending sample.
        s: f64,
    },
}

/// One constant-acceleration piece of a [`MotionProfile`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileSegment {
    /// Arc length at the start of the segment.
    pub position: f64,

    /// Velocity at the start of the segment.
    pub velocity: f64,

    /// Acceleration held across the segment.
    pub acceleration: f64,

    /// Time the segment takes.
    pub duration: f64,

    /// Time at the start of the segment.
    pub start_time: f64,
}

/// A piecewise-constant-acceleration schedule covering `[0, distance]`.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionProfile {
    segments: Vec<ProfileSegment>,
    distance: f64,
    duration: f64,
    final_velocity: f64,
}

impl MotionProfile {
    /// Total distance covered.
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Total time the profile takes.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// The segments of the schedule, in order.
    #[must_use]
    pub fn segments(&self) -> &[ProfileSegment] {
        &self.segments
    }

    /// Samples the profile at a time (clamped into `[0, duration]`).
    #[must_use]
    pub fn at_time(&self, t: f64) -> MotionState {
        if t >= self.duration {
            return MotionState::new(self.distance, self.final_velocity, 0.0);
        }

        let index = self
            .segments
            .partition_point(|segment| segment.start_time <= t.max(0.0))
            .saturating_sub(1);
        sample(&self.segments[index], t)
    }

    /// Returns a cursor for sequential sampling.
    #[must_use]
    pub fn stepper(&self) -> ProfileStepper<'_> {
        ProfileStepper {
            profile: self,
            cursor: 0,
            last_t: 0.0,
        }
    }
}

fn sample(segment: &ProfileSegment, t: f64) -> MotionState {
    let tau = (t - segment.start_time).max(0.0);
    MotionState::new(segment.position, segment.velocity, segment.acceleration).after(tau)
}

/// A cursor over a [`MotionProfile`].
///
/// Queries must arrive with non-decreasing `t`; debug builds assert this,
/// release builds fall back to a re-search.
#[derive(Debug)]
pub struct ProfileStepper<'a> {
    profile: &'a MotionProfile,
    cursor: usize,
    last_t: f64,
}

impl ProfileStepper<'_> {
    /// Samples the profile at a time (clamped into `[0, duration]`).
    pub fn at_time(&mut self, t: f64) -> MotionState {
        debug_assert!(
            t >= self.last_t - 1e-9,
            "profile stepper stepped backwards ({} after {})",
            t,
            self.last_t,
        );
        self.last_t = t;

        if t >= self.profile.duration {
            return MotionState::new(self.profile.distance, self.profile.final_velocity, 0.0);
        }

        let segments = &self.profile.segments;
        if t < segments[self.cursor].start_time {
            // Non-monotone use: re-search rather than return garbage.
            self.cursor = segments
                .partition_point(|segment| segment.start_time <= t.max(0.0))
                .saturating_sub(1);
        }
        while self.cursor + 1 < segments.len()
            && t >= segments[self.cursor].start_time + segments[self.cursor].duration
        {
            self.cursor += 1;
        }

        sample(&segments[self.cursor], t)
    }
}

/// Which sweep of the dynamic pass is running.
#[derive(Clone, Copy)]
enum Sweep {
    /// Accelerating along increasing `s`; governed by the upper end of the
    /// acceleration interval.
    Forward,
    /// Decelerating checked backwards from the end; governed by the
    /// (negated) lower end.
    Backward,
}

/// Computes the fastest velocity schedule over `[0, distance]` satisfying
/// `constrainer`, as a piecewise-constant-acceleration profile.
///
/// The pass discretizes the distance into segments of roughly
/// `config.segment_size`, caps each grid point by the constrainer's
/// velocity bound, then sweeps forward and backward applying the
/// reachable-velocity recurrence `v₁² = v₀² + 2aΔs`. Acceleration
/// intervals are evaluated at the segment's starting endpoint only; small
/// segments keep that approximation tight, and when an endpoint turns out
/// infeasible the pass bisects the velocity down to the fastest feasible
/// value instead.
///
/// # Errors
///
/// Returns an invalid-argument error for non-positive distances, negative
/// velocity targets, out-of-range segment sizes, or non-positive
/// tolerances, and [`ProfileError::Unsatisfiable`] if some grid point
/// admits no acceleration even at zero velocity.
pub fn generate_profile(
    constrainer: &impl MotionConstrainer,
    distance: f64,
    config: &GenerationConfig,
) -> Result<MotionProfile, ProfileError> {
    if !(distance > 0.0) {
        return Err(ProfileError::NonPositiveDistance(distance));
    }
    for target in [config.target_start_velocity, config.target_end_velocity] {
        if !(target >= 0.0) {
            return Err(ProfileError::NegativeTargetVelocity(target));
        }
    }
    if !(config.segment_size > 0.0) || config.segment_size > distance {
        return Err(ProfileError::InvalidSegmentSize {
            segment_size: config.segment_size,
            distance,
        });
    }
    if !(config.velocity_search_tolerance > 0.0) {
        return Err(ProfileError::NonPositiveTolerance(
            config.velocity_search_tolerance,
        ));
    }

    let count = (distance / config.segment_size).ceil() as usize;
    let ds = distance / count as f64;
    let tolerance = config.velocity_search_tolerance.max(EPSILON);

    // Pointwise bounds, with the endpoint targets as extra caps.
    let mut velocities = Vec::with_capacity(count + 1);
    for i in 0..=count {
        let s = i as f64 * ds;
        let bound = constrainer.max_velocity(s);
        if !(bound >= 0.0) {
            return Err(ProfileError::NegativeVelocityBound { s, bound });
        }
        velocities.push(bound.min(MAX_VELOCITY));
    }
    velocities[0] = velocities[0].min(config.target_start_velocity);
    velocities[count] = velocities[count].min(config.target_end_velocity);

    // Forward sweep: cap each point by what is reachable from its
    // predecessor under the best admissible acceleration.
    for i in 0..count {
        let s = i as f64 * ds;
        let (velocity, reachable) = fastest_feasible(
            constrainer,
            s,
            velocities[i],
            ds,
            tolerance,
            Sweep::Forward,
            i,
        )?;
        velocities[i] = velocity;
        velocities[i + 1] = velocities[i + 1].min(reachable);
    }

    // Backward sweep: the same recurrence on the reversed segment list
    // enforces that the end state is decelerable-to from everywhere.
    for i in (1..=count).rev() {
        let s = i as f64 * ds;
        let (velocity, reachable) = fastest_feasible(
            constrainer,
            s,
            velocities[i],
            ds,
            tolerance,
            Sweep::Backward,
            i,
        )?;
        velocities[i] = velocity;
        velocities[i - 1] = velocities[i - 1].min(reachable);
    }

    let mut segments = Vec::with_capacity(count);
    let mut time = 0.0;
    for i in 0..count {
        let v0 = velocities[i];
        let v1 = velocities[i + 1];

        let duration = if v0 + v1 > EPSILON {
            2.0 * ds / (v0 + v1)
        } else {
            // Both endpoints pinned at rest: the segment cannot be crossed
            // in meaningful time.
            ds / EPSILON
        };

        segments.push(ProfileSegment {
            position: i as f64 * ds,
            velocity: v0,
            acceleration: (v1 * v1 - v0 * v0) / (2.0 * ds),
            duration,
            start_time: time,
        });
        time += duration;
    }

    tracing::debug!(
        segments = count,
        distance,
        duration = time,
        "generated motion profile"
    );

    Ok(MotionProfile {
        segments,
        distance,
        duration: time,
        final_velocity: velocities[count],
    })
}

/// The sweep-direction acceleration available at `(s, velocity)`, if any.
fn available_accel(
    constrainer: &impl MotionConstrainer,
    s: f64,
    velocity: f64,
    sweep: Sweep,
) -> Option<f64> {
    let range = constrainer.accel_range(s, velocity);
    if range.is_empty() {
        return None;
    }

    Some(match sweep {
        Sweep::Forward => range.end(),
        Sweep::Backward => -range.start(),
    })
}

/// Finds the fastest velocity at `s`, at most `limit`, from which the next
/// grid point is reachable with `v² ≥ 0`, together with the velocity
/// reached there.
fn fastest_feasible(
    constrainer: &impl MotionConstrainer,
    s: f64,
    limit: f64,
    ds: f64,
    tolerance: f64,
    sweep: Sweep,
    index: usize,
) -> Result<(f64, f64), ProfileError> {
    // The acceleration must beat -v²/(2Δs), the rate that brings the
    // velocity exactly to zero over the segment.
    let feasible = |velocity: f64| -> Option<f64> {
        available_accel(constrainer, s, velocity, sweep)
            .filter(|accel| *accel > -(velocity * velocity) / (2.0 * ds))
    };

    if let Some(accel) = feasible(limit) {
        return Ok((limit, next_velocity(limit, accel, ds)));
    }

    // The bound itself is infeasible; bisect down to the fastest velocity
    // that still admits an acceleration.
    let Some(mut best_accel) = feasible(0.0) else {
        return Err(ProfileError::Unsatisfiable { index, s });
    };

    let (mut low, mut high) = (0.0, limit);
    while high - low > tolerance {
        let mid = 0.5 * (low + high);
        match feasible(mid) {
            Some(accel) => {
                low = mid;
                best_accel = accel;
            }
            None => high = mid,
        }
    }

    tracing::debug!(
        index,
        s,
        from = limit,
        to = low,
        "velocity bound infeasible, lowered by bisection"
    );

    Ok((low, next_velocity(low, best_accel, ds)))
}

/// `√(v² + 2aΔs)`, clamped against a slightly negative radicand.
fn next_velocity(velocity: f64, accel: f64, ds: f64) -> f64 {
    (velocity * velocity + 2.0 * accel * ds).max(0.0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Velocity cap and symmetric acceleration window, constant in `s`.
    struct Simple {
        max_velocity: f64,
        max_accel: f64,
    }

    impl MotionConstrainer for Simple {
        fn max_velocity(&self, _s: f64) -> f64 {
            self.max_velocity
        }

        fn accel_range(&self, _s: f64, _velocity: f64) -> Interval {
            Interval::symmetric(self.max_accel, 0.0)
        }
    }

    fn config() -> GenerationConfig {
        GenerationConfig {
            segment_size: 0.005,
            ..GenerationConfig::default()
        }
    }

    #[test]
    fn trapezoidal_schedule() {
        let constrainer = Simple {
            max_velocity: 1.0,
            max_accel: 1.0,
        };
        let profile = generate_profile(&constrainer, 2.0, &config()).unwrap();

        // Accelerate over 0.5, cruise for 1.0, decelerate over 0.5: three
        // seconds in total.
        assert_abs_diff_eq!(profile.duration(), 3.0, epsilon = 2e-2);
        assert_abs_diff_eq!(profile.distance(), 2.0);

        // Endpoints honor the rest-to-rest targets.
        assert_abs_diff_eq!(profile.at_time(0.0).velocity, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(
            profile.at_time(profile.duration()).velocity,
            0.0,
            epsilon = 1e-9
        );

        // Peak velocity is reached and never exceeded.
        let peak = profile
            .segments()
            .iter()
            .map(|segment| segment.velocity)
            .fold(0.0, f64::max);
        assert!(peak <= 1.0 + 1e-9);
        assert_abs_diff_eq!(profile.at_time(1.5).velocity, 1.0, epsilon = 1e-2);
    }

    #[test]
    fn profile_invariants() {
        let constrainer = Simple {
            max_velocity: 1.5,
            max_accel: 2.0,
        };
        let profile = generate_profile(&constrainer, 3.0, &config()).unwrap();

        let mut end = 0.0;
        for segment in profile.segments() {
            // Segments tile [0, distance] contiguously.
            assert_abs_diff_eq!(segment.position, end, epsilon = 1e-9);
            end = segment.position + segment.velocity * segment.duration
                + 0.5 * segment.acceleration * segment.duration * segment.duration;

            // Velocity bounds and acceleration windows hold.
            assert!(segment.velocity >= 0.0);
            assert!(segment.velocity <= constrainer.max_velocity(segment.position) + 1e-9);
            let range = constrainer.accel_range(segment.position, segment.velocity);
            assert!(segment.acceleration >= range.start() - 1e-9);
            assert!(segment.acceleration <= range.end() + 1e-9);
        }
        assert_abs_diff_eq!(end, profile.distance(), epsilon = 1e-6);

        // Duration is the sum of segment durations.
        let total: f64 = profile.segments().iter().map(|s| s.duration).sum();
        assert_abs_diff_eq!(total, profile.duration(), epsilon = 1e-9);
    }

    #[test]
    fn nonzero_end_target_skips_the_deceleration_leg() {
        let constrainer = Simple {
            max_velocity: 1.0,
            max_accel: 1.0,
        };
        let config = GenerationConfig {
            target_end_velocity: 1.0,
            ..config()
        };
        let profile = generate_profile(&constrainer, 2.0, &config).unwrap();

        // Accelerate over 0.5 (one second), cruise the remaining 1.5.
        assert_abs_diff_eq!(profile.duration(), 2.5, epsilon = 2e-2);
        assert_abs_diff_eq!(
            profile.at_time(profile.duration()).velocity,
            1.0,
            epsilon = 1e-2
        );
    }

    #[test]
    fn query_math_is_piecewise_quadratic() {
        let constrainer = Simple {
            max_velocity: 2.0,
            max_accel: 1.0,
        };
        let profile = generate_profile(&constrainer, 4.0, &config()).unwrap();

        // Early in the acceleration phase, s ≈ ½at².
        let early = profile.at_time(0.5);
        assert_abs_diff_eq!(early.position, 0.125, epsilon = 1e-2);
        assert_abs_diff_eq!(early.velocity, 0.5, epsilon = 1e-2);
        assert_abs_diff_eq!(early.acceleration, 1.0, epsilon = 1e-2);

        // Past the end, the state clamps to the terminal one.
        let after = profile.at_time(profile.duration() + 1.0);
        assert_abs_diff_eq!(after.position, 4.0);
        assert_abs_diff_eq!(after.velocity, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn stepper_matches_at_time() {
        let constrainer = Simple {
            max_velocity: 1.0,
            max_accel: 0.5,
        };
        let profile = generate_profile(&constrainer, 1.0, &config()).unwrap();
        let mut stepper = profile.stepper();

        for i in 0..=100 {
            let t = profile.duration() * f64::from(i) / 100.0;
            assert_eq!(stepper.at_time(t), profile.at_time(t));
        }
    }

    #[test]
    fn bisection_recovers_from_infeasible_bounds() {
        /// Admits no acceleration at all above a critical velocity, with a
        /// pointwise bound far beyond it.
        struct Cliff;

        impl MotionConstrainer for Cliff {
            fn max_velocity(&self, _s: f64) -> f64 {
                10.0
            }

            fn accel_range(&self, _s: f64, velocity: f64) -> Interval {
                if velocity > 2.0 {
                    Interval::EMPTY
                } else {
                    Interval::symmetric(1.0, 0.0)
                }
            }
        }

        let profile = generate_profile(&Cliff, 5.0, &config()).unwrap();
        let peak = profile
            .segments()
            .iter()
            .map(|segment| segment.velocity)
            .fold(0.0, f64::max);
        assert!(peak <= 2.0 + 1e-2, "peak {peak} exceeded the cliff");
    }

    #[test]
    fn unsatisfiable_at_rest_is_fatal() {
        struct Hopeless;

        impl MotionConstrainer for Hopeless {
            fn max_velocity(&self, _s: f64) -> f64 {
                1.0
            }

            fn accel_range(&self, _s: f64, _velocity: f64) -> Interval {
                Interval::EMPTY
            }
        }

        let error = generate_profile(&Hopeless, 1.0, &config()).unwrap_err();
        assert!(matches!(error, ProfileError::Unsatisfiable { index: 0, .. }));
    }

    #[test]
    fn argument_validation() {
        let constrainer = Simple {
            max_velocity: 1.0,
            max_accel: 1.0,
        };

        assert!(matches!(
            generate_profile(&constrainer, 0.0, &config()).unwrap_err(),
            ProfileError::NonPositiveDistance(_)
        ));
        assert!(matches!(
            generate_profile(
                &constrainer,
                1.0,
                &GenerationConfig {
                    target_start_velocity: -1.0,
                    ..config()
                }
            )
            .unwrap_err(),
            ProfileError::NegativeTargetVelocity(_)
        ));
        assert!(matches!(
            generate_profile(
                &constrainer,
                1.0,
                &GenerationConfig {
                    segment_size: 2.0,
                    ..config()
                }
            )
            .unwrap_err(),
            ProfileError::InvalidSegmentSize { .. }
        ));
        assert!(matches!(
            generate_profile(
                &constrainer,
                1.0,
                &GenerationConfig {
                    velocity_search_tolerance: 0.0,
                    ..config()
                }
            )
            .unwrap_err(),
            ProfileError::NonPositiveTolerance(_)
        ));
    }
}
