use super::Interpolant;
use crate::error::{CalibrationError, CalibrationResult};
use log::debug;
use nalgebra::{DMatrix, DVector};

/// Interpolating B-spline of fixed degree.
///
/// The knot vector is clamped at both data ends, so the first and last
/// polynomial pieces are also used to extrapolate.
#[derive(Debug, Clone)]
pub struct BSpline {
    degree: usize,
    knots: Vec<f64>,
    coefficients: Vec<f64>,
}

impl BSpline {
    /// Degree-2 spline with interior knots at the midpoints between data
    /// points, skipping the first and last midpoint.
    pub fn quadratic(xs: &[f64], ys: &[f64]) -> CalibrationResult<Self> {
        let n = xs.len();
        let mut knots = Vec::with_capacity(n + 3);
        knots.extend([xs[0]; 3]);
        knots.extend(xs.windows(2).skip(1).take(n.saturating_sub(3)).map(|w| 0.5 * (w[0] + w[1])));
        knots.extend([xs[n - 1]; 3]);
        Self::interpolate(2, knots, xs, ys)
    }

    /// Degree-3 spline with not-a-knot end conditions: the second and
    /// second-to-last data points are not knots.
    pub fn not_a_knot_cubic(xs: &[f64], ys: &[f64]) -> CalibrationResult<Self> {
        let n = xs.len();
        let mut knots = Vec::with_capacity(n + 4);
        knots.extend([xs[0]; 4]);
        knots.extend_from_slice(&xs[2..n - 2]);
        knots.extend([xs[n - 1]; 4]);
        Self::interpolate(3, knots, xs, ys)
    }

    /// Solves the collocation system `B(xs) c = ys` for the coefficients.
    fn interpolate(degree: usize, knots: Vec<f64>, xs: &[f64], ys: &[f64]) -> CalibrationResult<Self> {
        let n = xs.len();
        debug_assert_eq!(knots.len(), n + degree + 1);

        let mut matrix = DMatrix::zeros(n, n);
        for (row, &x) in xs.iter().enumerate() {
            let span = find_span(&knots, degree, n, x);
            let basis = basis_functions(&knots, degree, span, x);
            for (r, value) in basis.into_iter().enumerate() {
                matrix[(row, span - degree + r)] = value;
            }
        }

        let coefficients = solve(matrix, DVector::from_column_slice(ys))?;
        debug!("Fitted degree-{} spline over {} knots", degree, n);

        Ok(Self { degree, knots, coefficients })
    }
}

impl Interpolant for BSpline {
    fn evaluate(&self, x: f64) -> f64 {
        let n = self.coefficients.len();
        let span = find_span(&self.knots, self.degree, n, x);
        basis_functions(&self.knots, self.degree, span, x)
            .into_iter()
            .enumerate()
            .map(|(r, value)| value * self.coefficients[span - self.degree + r])
            .sum()
    }
}

/// Knot span `l` with `t[l] <= x < t[l + 1]`, clamped to `[degree, n - 1]`
/// so queries outside the data use the boundary piece.
fn find_span(knots: &[f64], degree: usize, n: usize, x: f64) -> usize {
    degree + knots[degree + 1..n].partition_point(|&t| t <= x)
}

/// Non-zero basis values `N[span - degree ..= span]` at `x` (Cox-de Boor).
fn basis_functions(knots: &[f64], degree: usize, span: usize, x: f64) -> Vec<f64> {
    let mut values = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];
    values[0] = 1.0;

    for j in 1..=degree {
        left[j] = x - knots[span + 1 - j];
        right[j] = knots[span + j] - x;
        let mut saved = 0.0;
        for r in 0..j {
            let temp = values[r] / (right[r + 1] + left[j - r]);
            values[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        values[j] = saved;
    }

    values
}

/// LU solve with partial pivoting; a zero pivot means the standards cannot
/// determine the spline.
fn solve(matrix: DMatrix<f64>, rhs: DVector<f64>) -> CalibrationResult<Vec<f64>> {
    let lu = matrix.lu();
    if !lu.is_invertible() {
        return Err(CalibrationError::SingularFit(
            "collocation matrix is singular (duplicate optical densities?)".to_string()
        ));
    }

    let coefficients = lu.solve(&rhs).ok_or_else(|| {
        CalibrationError::SingularFit("collocation system has no solution".to_string())
    })?;
    if coefficients.iter().any(|c| !c.is_finite()) {
        return Err(CalibrationError::SingularFit(
            "collocation system is too ill-conditioned".to_string()
        ));
    }

    Ok(coefficients.iter().copied().collect())
}
