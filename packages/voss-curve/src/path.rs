use voss_math::{Angle, Pose, Twist, Vec2};

use crate::{Curve, CurvePoint, CurveStepper};

/// How a path derives robot heading from curve geometry.
///
/// Holonomic drives can face any direction while translating; the heading
/// provider is where that freedom is spent. Nonholonomic drives should use
/// [`Heading::Tangent`] (or its offset variant), which keeps the chassis
/// aligned with the direction of travel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Heading {
    /// Heading follows the curve tangent.
    Tangent,

    /// Heading follows the curve tangent plus a fixed offset.
    TangentOffset(Angle),

    /// Heading stays fixed while the robot translates.
    Constant(Angle),

    /// Heading sweeps linearly in arc length between two angles.
    Linear {
        /// Heading at the start of the segment.
        from: Angle,
        /// Heading at the end of the segment.
        to: Angle,
    },
}

impl Heading {
    /// Heading and its first two arc-length derivatives at a curve point.
    fn at(&self, point: &CurvePoint, s: f64, length: f64) -> (Angle, f64, f64) {
        match *self {
            Self::Tangent => (
                point.tangent_angle,
                point.curvature,
                point.curvature_derivative,
            ),
            Self::TangentOffset(offset) => (
                point.tangent_angle + offset,
                point.curvature,
                point.curvature_derivative,
            ),
            Self::Constant(heading) => (heading, 0.0, 0.0),
            Self::Linear { from, to } => {
                let rate = (to - from).as_radians() / length;
                (from + Angle::from_radians(rate * s), rate, 0.0)
            }
        }
    }

    /// The provider for the same segment traversed backwards.
    ///
    /// Reversing a curve turns its tangent by a half turn; tangent-based
    /// providers pick up a compensating offset so the robot keeps facing the
    /// way the original path had it at every position.
    #[must_use]
    fn reversed(self) -> Self {
        match self {
            Self::Tangent => Self::TangentOffset(Angle::HALF_TURN.wrapped()),
            Self::TangentOffset(offset) => {
                Self::TangentOffset((offset + Angle::HALF_TURN).wrapped())
            }
            Self::Constant(heading) => Self::Constant(heading),
            Self::Linear { from, to } => Self::Linear { from: to, to: from },
        }
    }
}

/// A stationary segment that only changes heading.
///
/// Arc length along a point turn counts swept radians, so a `PointTurn`
/// from 0 to π has length π and sweeps at one radian of heading per unit of
/// arc length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointTurn {
    position: Vec2,
    from: Angle,
    to: Angle,
}

impl PointTurn {
    /// Creates a turn-in-place from one heading to another.
    ///
    /// The sweep takes the raw angular difference; pass pre-wrapped angles
    /// to pick a direction, or a difference beyond ±π for multi-turn
    /// sweeps.
    #[must_use]
    pub const fn new(position: Vec2, from: Angle, to: Angle) -> Self {
        Self { position, from, to }
    }

    fn length(&self) -> f64 {
        (self.to - self.from).as_radians().abs()
    }

    fn reversed(self) -> Self {
        Self {
            position: self.position,
            from: self.to,
            to: self.from,
        }
    }

    fn point_at(&self, s: f64) -> PathPoint {
        let sweep = (self.to - self.from).as_radians();
        let direction = if sweep == 0.0 { 0.0 } else { sweep.signum() };
        let heading = self.from + Angle::from_radians(direction * s);

        PathPoint {
            curve: CurvePoint {
                arc_length: s,
                position: self.position,
                derivative: Vec2::ZERO,
                second_derivative: Vec2::ZERO,
                tangent_angle: heading,
                curvature: 0.0,
                curvature_derivative: 0.0,
            },
            heading,
            heading_derivative: direction,
            heading_second_derivative: 0.0,
        }
    }
}

/// A pose-level snapshot of a path at one arc length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    /// Geometry of the underlying curve at this arc length.
    pub curve: CurvePoint,

    /// Robot heading.
    pub heading: Angle,

    /// `d(heading)/ds`.
    pub heading_derivative: f64,

    /// `d²(heading)/ds²`.
    pub heading_second_derivative: f64,
}

impl PathPoint {
    /// The pose to track at this point.
    #[must_use]
    pub const fn pose(&self) -> Pose {
        Pose::new(self.curve.position, self.heading)
    }

    /// Derivative of the pose with respect to arc length.
    #[must_use]
    pub const fn pose_derivative(&self) -> Twist {
        Twist::new(self.curve.derivative, self.heading_derivative)
    }

    /// Second derivative of the pose with respect to arc length.
    #[must_use]
    pub const fn pose_second_derivative(&self) -> Twist {
        Twist::new(self.curve.second_derivative, self.heading_second_derivative)
    }
}

/// One stretch of a path.
#[derive(Debug)]
enum Segment {
    Curved { curve: Curve, heading: Heading },
    PointTurn(PointTurn),
}

impl Segment {
    fn length(&self) -> f64 {
        match self {
            Self::Curved { curve, .. } => curve.length(),
            Self::PointTurn(turn) => turn.length(),
        }
    }

    fn reversed(self) -> Self {
        match self {
            Self::Curved { curve, heading } => Self::Curved {
                curve: curve.reversed(),
                heading: heading.reversed(),
            },
            Self::PointTurn(turn) => Self::PointTurn(turn.reversed()),
        }
    }

    fn point_at(&self, s: f64) -> PathPoint {
        match self {
            Self::Curved { curve, heading } => {
                curved_point(heading, curve.point_at(s), curve.length())
            }
            Self::PointTurn(turn) => turn.point_at(s),
        }
    }
}

fn curved_point(heading: &Heading, point: CurvePoint, length: f64) -> PathPoint {
    let (heading, heading_derivative, heading_second_derivative) =
        heading.at(&point, point.arc_length, length);

    PathPoint {
        curve: point,
        heading,
        heading_derivative,
        heading_second_derivative,
    }
}

/// A drivable path: curve segments with heading providers and point turns,
/// indexed by cumulative arc length.
///
/// Composition flattens, so a path built out of other paths is a plain
/// segment list, and [`Path::reversed`] restructures that list rather than
/// stacking decorators, so reversing twice yields the original path.
#[derive(Debug)]
pub struct Path {
    segments: Vec<Segment>,
    /// Cumulative segment start offsets; one more entry than segments, the
    /// last being the total length.
    offsets: Vec<f64>,
}

impl Path {
    /// Creates a single-segment path from a curve and a heading provider.
    #[must_use]
    pub fn new(curve: Curve, heading: Heading) -> Self {
        Self::from_segments(vec![Segment::Curved { curve, heading }])
    }

    /// Creates a path that turns in place.
    #[must_use]
    pub fn point_turn(position: Vec2, from: Angle, to: Angle) -> Self {
        Self::from_segments(vec![Segment::PointTurn(PointTurn::new(position, from, to))])
    }

    /// Concatenates paths in order, offsetting each by the cumulative length
    /// of its predecessors.
    #[must_use]
    pub fn compose(paths: impl IntoIterator<Item = Path>) -> Self {
        Self::from_segments(
            paths
                .into_iter()
                .flat_map(|path| path.segments)
                .collect::<Vec<_>>(),
        )
    }

    /// Appends `next` to the end of this path.
    #[must_use]
    pub fn then(mut self, next: Path) -> Self {
        self.segments.extend(next.segments);
        Self::from_segments(self.segments)
    }

    fn from_segments(segments: Vec<Segment>) -> Self {
        let mut offsets = Vec::with_capacity(segments.len() + 1);
        let mut total = 0.0;

        offsets.push(0.0);
        for segment in &segments {
            total += segment.length();
            offsets.push(total);
        }

        Self { segments, offsets }
    }

    /// Total arc length.
    #[must_use]
    pub fn length(&self) -> f64 {
        *self.offsets.last().unwrap_or(&0.0)
    }

    /// The same path traversed end to start.
    #[must_use]
    pub fn reversed(self) -> Self {
        let mut segments: Vec<_> = self
            .segments
            .into_iter()
            .map(Segment::reversed)
            .collect();
        segments.reverse();

        Self::from_segments(segments)
    }

    /// Samples the path at arc length `s` (clamped into `[0, length]`).
    #[must_use]
    pub fn point_at(&self, s: f64) -> PathPoint {
        let s = s.clamp(0.0, self.length());
        let index = self.segment_index(s);
        globalize(self.segments[index].point_at(s - self.offsets[index]), s)
    }

    /// Returns a cursor for sequential sampling.
    #[must_use]
    pub fn stepper(&self) -> PathStepper<'_> {
        PathStepper {
            path: self,
            segment: 0,
            curve: None,
            last_s: 0.0,
        }
    }

    /// Index of the segment containing arc length `s`.
    fn segment_index(&self, s: f64) -> usize {
        self.offsets
            .partition_point(|&offset| offset <= s)
            .saturating_sub(1)
            .min(self.segments.len().saturating_sub(1))
    }
}

/// Rewrites a segment-local point to path-global arc length.
fn globalize(mut point: PathPoint, s: f64) -> PathPoint {
    point.curve.arc_length = s;
    point
}

/// A cursor over a [`Path`] for sequential sampling.
///
/// Queries must arrive with non-decreasing `s`; debug builds assert this,
/// release builds fall back to a re-search.
#[derive(Debug)]
pub struct PathStepper<'a> {
    path: &'a Path,
    segment: usize,
    curve: Option<CurveStepper<'a>>,
    last_s: f64,
}

impl PathStepper<'_> {
    /// Samples the path at arc length `s` (clamped into `[0, length]`).
    pub fn point_at(&mut self, s: f64) -> PathPoint {
        debug_assert!(
            s >= self.last_s - 1e-9,
            "path stepper stepped backwards ({} after {})",
            s,
            self.last_s,
        );

        let s = s.clamp(0.0, self.path.length());
        self.last_s = s;

        let index = self.path.segment_index(s);
        if index != self.segment {
            self.segment = index;
            self.curve = None;
        }

        let local = s - self.path.offsets[index];
        let point = match &self.path.segments[index] {
            Segment::Curved { curve, heading } => {
                let stepper = self.curve.get_or_insert_with(|| curve.stepper());
                curved_point(heading, stepper.point_at(local), curve.length())
            }
            Segment::PointTurn(turn) => turn.point_at(local),
        };

        globalize(point, s)
    }
}
