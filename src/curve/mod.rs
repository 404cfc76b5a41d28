pub mod linear;
pub mod spline;

use crate::config::InterpolationMethod;
use crate::error::{CalibrationError, CalibrationResult};

/// A fitted standard curve mapping optical density to concentration.
///
/// Implementations extrapolate outside the knot range instead of rejecting
/// the query; callers flag out-of-range readings separately.
pub trait Interpolant {
    fn evaluate(&self, x: f64) -> f64;
}

/// Builds the interpolant for `method` over knots sorted by ascending `xs`.
pub fn create_interpolant(
    method: InterpolationMethod,
    xs: &[f64],
    ys: &[f64],
) -> CalibrationResult<Box<dyn Interpolant>> {
    if xs.len() != ys.len() {
        return Err(CalibrationError::Validation(format!(
            "Knot count mismatch: {} optical densities, {} concentrations",
            xs.len(),
            ys.len()
        )));
    }
    debug_assert!(xs.windows(2).all(|w| w[0] <= w[1]), "knots must be sorted");

    let found = count_distinct(xs);
    let required = method.min_distinct_points();
    if found < required {
        return Err(CalibrationError::InsufficientData { method, required, found });
    }

    match method {
        InterpolationMethod::Linear => Ok(Box::new(linear::LinearInterpolant::new(xs, ys))),
        InterpolationMethod::Quadratic => Ok(Box::new(spline::BSpline::quadratic(xs, ys)?)),
        InterpolationMethod::CubicSpline => Ok(Box::new(spline::BSpline::not_a_knot_cubic(xs, ys)?)),
    }
}

/// Number of distinct values in an ascending slice.
pub fn count_distinct(sorted: &[f64]) -> usize {
    if sorted.is_empty() {
        return 0;
    }
    1 + sorted.windows(2).filter(|w| w[1] != w[0]).count()
}
