//! Parametric curves, arc-length reparameterization, and paths.
//!
//! The types in this crate turn a twice-differentiable vector function
//! `p(u): [0, 1] → ℝ²` into geometry a motion profile can consume:
//!
//! 1. [`QuinticSpline`] (or any [`ParametricCurve`]) supplies the function
//!    and its derivatives.
//! 2. [`Curve`] reparameterizes it by arc length, answering
//!    [`Curve::point_at`] queries with a full geometric snapshot
//!    ([`CurvePoint`]: position, unit tangent, curvature, curvature rate).
//! 3. [`Path`] pairs curves with [`Heading`] providers (and point turns)
//!    to yield pose-level snapshots ([`PathPoint`]).

mod arc_length;
mod curve;
mod path;
mod spline;

pub use arc_length::{ArcLengthMapping, ArcLengthStepper};
pub use curve::{Curve, CurvePoint, CurveStepper};
pub use path::{Heading, Path, PathPoint, PathStepper, PointTurn};
pub use spline::{ParametricCurve, QuinticSpline, SplineKnot};
