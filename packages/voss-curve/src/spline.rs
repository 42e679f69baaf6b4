use voss_math::Vec2;

/// Trait describing a parametric curve on `u ∈ [0, 1]`.
///
/// Implementations must be three times differentiable on the interior of
/// the domain; the higher derivatives feed the curvature-rate computation
/// during reparameterization.
pub trait ParametricCurve {
    /// Samples the curve function, returning a 2D point on the curve at the
    /// parameter `u`.
    fn point(&self, u: f64) -> Vec2;

    /// Samples the curve's derivative at a given parameter.
    fn derivative(&self, u: f64) -> Vec2;

    /// Samples the curve's second derivative at a given parameter.
    fn second_derivative(&self, u: f64) -> Vec2;

    /// Samples the curve's third derivative at a given parameter.
    fn third_derivative(&self, u: f64) -> Vec2;

    /// Signed curvature at a given parameter.
    ///
    /// Defined as 0 where the derivative vanishes.
    fn curvature(&self, u: f64) -> f64 {
        let d = self.derivative(u);
        let d2 = self.second_derivative(u);

        let curvature = d.perp_dot(d2) / d.length().powi(3);
        if curvature.is_nan() { 0.0 } else { curvature }
    }

    /// Derivative of the signed curvature with respect to the parameter.
    ///
    /// Defined as 0 where the derivative vanishes.
    fn curvature_derivative(&self, u: f64) -> f64 {
        let d = self.derivative(u);
        let d2 = self.second_derivative(u);
        let d3 = self.third_derivative(u);
        let norm = d.length();

        let derivative = d.perp_dot(d3) / norm.powi(3)
            - 3.0 * d.perp_dot(d2) * d.dot(d2) / norm.powi(5);
        if derivative.is_nan() { 0.0 } else { derivative }
    }
}

impl<C: ParametricCurve + ?Sized> ParametricCurve for Box<C> {
    fn point(&self, u: f64) -> Vec2 {
        (**self).point(u)
    }

    fn derivative(&self, u: f64) -> Vec2 {
        (**self).derivative(u)
    }

    fn second_derivative(&self, u: f64) -> Vec2 {
        (**self).second_derivative(u)
    }

    fn third_derivative(&self, u: f64) -> Vec2 {
        (**self).third_derivative(u)
    }

    fn curvature(&self, u: f64) -> f64 {
        (**self).curvature(u)
    }

    fn curvature_derivative(&self, u: f64) -> f64 {
        (**self).curvature_derivative(u)
    }
}

/// Endpoint conditions for building a [`QuinticSpline`] out of boundary
/// derivatives.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct SplineKnot {
    /// Position of the curve at this end.
    pub position: Vec2,

    /// First derivative of the curve at this end.
    pub derivative: Vec2,

    /// Second derivative of the curve at this end.
    pub second_derivative: Vec2,
}

impl SplineKnot {
    /// Creates a new `SplineKnot`.
    #[must_use]
    pub const fn new(position: Vec2, derivative: Vec2, second_derivative: Vec2) -> Self {
        Self {
            position,
            derivative,
            second_derivative,
        }
    }
}

/// A fifth-degree polynomial curve segment.
///
/// Quintics are the lowest-degree polynomials that can match position,
/// derivative, and second derivative at both endpoints, which is what it
/// takes for curvature to stay continuous across joined segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuinticSpline {
    /// Power-basis coefficients, lowest degree first:
    /// `p(u) = c[0] + c[1]u + c[2]u² + c[3]u³ + c[4]u⁴ + c[5]u⁵`.
    coefficients: [Vec2; 6],
}

impl QuinticSpline {
    /// Creates a spline from six Bézier control points.
    #[must_use]
    pub fn from_control_points(points: [Vec2; 6]) -> Self {
        let [p0, p1, p2, p3, p4, p5] = points;

        // Bernstein-to-power-basis expansion of a degree-5 Bézier.
        Self {
            coefficients: [
                p0,
                (p1 - p0) * 5.0,
                (p2 - p1 * 2.0 + p0) * 10.0,
                (p3 - p2 * 3.0 + p1 * 3.0 - p0) * 10.0,
                (p4 - p3 * 4.0 + p2 * 6.0 - p1 * 4.0 + p0) * 5.0,
                p5 - p4 * 5.0 + p3 * 10.0 - p2 * 10.0 + p1 * 5.0 - p0,
            ],
        }
    }

    /// Creates the unique quintic matching position, derivative, and second
    /// derivative at both endpoints (quintic Hermite interpolation).
    #[must_use]
    pub fn from_derivatives(start: SplineKnot, end: SplineKnot) -> Self {
        // Hermite conditions expressed as Bézier control points.
        Self::from_control_points([
            start.position,
            start.position + start.derivative / 5.0,
            start.position + start.derivative * (2.0 / 5.0) + start.second_derivative / 20.0,
            end.position - end.derivative * (2.0 / 5.0) + end.second_derivative / 20.0,
            end.position - end.derivative / 5.0,
            end.position,
        ])
    }
}

impl ParametricCurve for QuinticSpline {
    fn point(&self, u: f64) -> Vec2 {
        let c = &self.coefficients;
        ((((c[5] * u + c[4]) * u + c[3]) * u + c[2]) * u + c[1]) * u + c[0]
    }

    fn derivative(&self, u: f64) -> Vec2 {
        let c = &self.coefficients;
        (((c[5] * (5.0 * u) + c[4] * 4.0) * u + c[3] * 3.0) * u + c[2] * 2.0) * u + c[1]
    }

    fn second_derivative(&self, u: f64) -> Vec2 {
        let c = &self.coefficients;
        ((c[5] * (20.0 * u) + c[4] * 12.0) * u + c[3] * 6.0) * u + c[2] * 2.0
    }

    fn third_derivative(&self, u: f64) -> Vec2 {
        let c = &self.coefficients;
        (c[5] * (60.0 * u) + c[4] * 24.0) * u + c[3] * 6.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample_spline() -> QuinticSpline {
        QuinticSpline::from_control_points([
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(3.0, 2.0),
        ])
    }

    #[test]
    fn bezier_endpoint_conditions() {
        let spline = sample_spline();

        assert_abs_diff_eq!(spline.point(0.0).x, 0.0);
        assert_abs_diff_eq!(spline.point(0.0).y, 0.0);
        assert_abs_diff_eq!(spline.point(1.0).x, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(spline.point(1.0).y, 2.0, epsilon = 1e-12);

        // Endpoint derivative of a degree-5 Bézier is 5(p1 - p0).
        assert_abs_diff_eq!(spline.derivative(0.0).x, 5.0);
        assert_abs_diff_eq!(spline.derivative(0.0).y, 0.0);
        assert_abs_diff_eq!(spline.derivative(1.0).x, 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(spline.derivative(1.0).y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn derivatives_match_finite_differences() {
        let spline = sample_spline();
        let h = 1e-6;

        for i in 1..10 {
            let u = f64::from(i) / 10.0;

            let d = (spline.point(u + h) - spline.point(u - h)) / (2.0 * h);
            assert_abs_diff_eq!(d.x, spline.derivative(u).x, epsilon = 1e-4);
            assert_abs_diff_eq!(d.y, spline.derivative(u).y, epsilon = 1e-4);

            let d2 = (spline.derivative(u + h) - spline.derivative(u - h)) / (2.0 * h);
            assert_abs_diff_eq!(d2.x, spline.second_derivative(u).x, epsilon = 1e-4);
            assert_abs_diff_eq!(d2.y, spline.second_derivative(u).y, epsilon = 1e-4);

            let d3 = (spline.second_derivative(u + h) - spline.second_derivative(u - h))
                / (2.0 * h);
            assert_abs_diff_eq!(d3.x, spline.third_derivative(u).x, epsilon = 1e-3);
            assert_abs_diff_eq!(d3.y, spline.third_derivative(u).y, epsilon = 1e-3);

            let dk = (spline.curvature(u + h) - spline.curvature(u - h)) / (2.0 * h);
            assert_abs_diff_eq!(dk, spline.curvature_derivative(u), epsilon = 1e-3);
        }
    }

    #[test]
    fn hermite_boundary_conditions() {
        let start = SplineKnot::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 2.0), Vec2::new(0.5, 0.0));
        let end = SplineKnot::new(Vec2::new(4.0, 1.0), Vec2::new(-1.0, 0.0), Vec2::new(0.0, 3.0));
        let spline = QuinticSpline::from_derivatives(start, end);

        for (u, knot) in [(0.0, start), (1.0, end)] {
            assert_abs_diff_eq!(spline.point(u).x, knot.position.x, epsilon = 1e-9);
            assert_abs_diff_eq!(spline.point(u).y, knot.position.y, epsilon = 1e-9);
            assert_abs_diff_eq!(spline.derivative(u).x, knot.derivative.x, epsilon = 1e-9);
            assert_abs_diff_eq!(spline.derivative(u).y, knot.derivative.y, epsilon = 1e-9);
            assert_abs_diff_eq!(
                spline.second_derivative(u).x,
                knot.second_derivative.x,
                epsilon = 1e-9
            );
            assert_abs_diff_eq!(
                spline.second_derivative(u).y,
                knot.second_derivative.y,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn degenerate_derivative_yields_zero_curvature() {
        // All control points coincident: p′ ≡ 0 everywhere.
        let spline = QuinticSpline::from_control_points([Vec2::new(1.0, 1.0); 6]);

        assert_eq!(spline.curvature(0.5), 0.0);
        assert_eq!(spline.curvature_derivative(0.5), 0.0);
    }
}
