use super::Interpolant;

/// Piecewise-linear curve through the standards.
///
/// Queries beyond either end follow the outermost segment.
#[derive(Debug, Clone)]
pub struct LinearInterpolant {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl LinearInterpolant {
    /// `xs` must be ascending with at least two distinct values.
    pub fn new(xs: &[f64], ys: &[f64]) -> Self {
        Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
        }
    }

    /// Index of the right end of the segment used for `x`.
    fn segment(&self, x: f64) -> usize {
        let last = self.xs.len() - 1;
        self.xs.partition_point(|&knot| knot < x).clamp(1, last)
    }
}

impl Interpolant for LinearInterpolant {
    fn evaluate(&self, x: f64) -> f64 {
        let hi = self.segment(x);
        let lo = hi - 1;

        let (x_lo, x_hi) = (self.xs[lo], self.xs[hi]);
        let (y_lo, y_hi) = (self.ys[lo], self.ys[hi]);

        // Non-finite when the segment has zero width; callers drop those.
        y_lo + (y_hi - y_lo) * ((x - x_lo) / (x_hi - x_lo))
    }
}
