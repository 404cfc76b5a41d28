pub mod range;
pub mod result;
pub mod summary;

use crate::config::{InterpolationMethod, StandardPoint};
use crate::curve::create_interpolant;
use crate::error::{CalibrationError, CalibrationResult};
use log::{debug, info, warn};

pub use range::*;
pub use result::*;
pub use summary::*;

/// Concentrations and range flags, one per query, in query order.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub concentrations: Vec<Option<f64>>,
    pub range_flags: Vec<RangeFlag>,
}

impl Evaluation {
    /// All-placeholder result used when the curve cannot be fitted.
    pub fn placeholder(len: usize) -> Self {
        Self {
            concentrations: vec![None; len],
            range_flags: vec![RangeFlag::WithinRange; len],
        }
    }
}

/// Fits the standard curve and evaluates every query against it.
///
/// Standards are sorted by optical density first (ties keep their input
/// order). Queries outside the calibrated domain are extrapolated and
/// flagged. A non-finite value only blanks its own query.
pub fn fit_and_evaluate(
    standards: &[StandardPoint],
    queries: &[f64],
    method: InterpolationMethod,
) -> CalibrationResult<Evaluation> {
    let mut sorted = standards.to_vec();
    sorted.sort_by(|a, b| a.optical_density.total_cmp(&b.optical_density));

    let xs: Vec<f64> = sorted.iter().map(|p| p.optical_density).collect();
    let ys: Vec<f64> = sorted.iter().map(|p| p.concentration).collect();

    let curve = create_interpolant(method, &xs, &ys)?;
    let domain = CalibrationDomain::from_standards(&sorted).ok_or(CalibrationError::InsufficientData {
        method,
        required: method.min_distinct_points(),
        found: 0,
    })?;
    debug!("Fitted {} curve over [{}, {}]", method, domain.min, domain.max);

    let concentrations = queries
        .iter()
        .map(|&od| {
            let value = curve.evaluate(od);
            if value.is_finite() {
                Some(value)
            } else {
                debug!("Non-finite concentration for optical density {}", od);
                None
            }
        })
        .collect();
    let range_flags = queries.iter().map(|&od| domain.classify(od)).collect();

    Ok(Evaluation { concentrations, range_flags })
}

/// Outcome of one calculation pass over a plate.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationRun {
    pub method: InterpolationMethod,
    pub domain: Option<CalibrationDomain>,
    pub results: Vec<PatientResult>,
    pub summary: Summary,
    /// Set when the curve could not be fitted and placeholders were used.
    pub warning: Option<String>,
}

/// Runs a full calculation pass.
///
/// Fitting failures caused by the standards (too few points, singular
/// system) do not fail the pass: every reading gets a placeholder
/// concentration and a within-range flag, and `warning` explains why.
pub fn calibrate(
    standards: &[StandardPoint],
    readings: &[f64],
    method: InterpolationMethod,
) -> CalibrationResult<CalibrationRun> {
    info!(
        "Calibrating {} readings against {} standards ({})",
        readings.len(),
        standards.len(),
        method
    );

    let (evaluation, warning) = match fit_and_evaluate(standards, readings, method) {
        Ok(evaluation) => (evaluation, None),
        Err(err) if err.is_recoverable() => {
            warn!("{}; reporting placeholders", err);
            (Evaluation::placeholder(readings.len()), Some(err.to_string()))
        }
        Err(err) => return Err(err),
    };

    let results: Vec<PatientResult> = readings
        .iter()
        .zip(evaluation.concentrations)
        .zip(evaluation.range_flags)
        .enumerate()
        .map(|(i, ((&optical_density, concentration), range_flag))| PatientResult {
            index: i + 1,
            optical_density,
            concentration,
            range_flag,
        })
        .collect();

    let summary = Summary::from_results(&results);
    info!(
        "{} within range, {} below, {} above",
        summary.within_range, summary.below_range, summary.above_range
    );

    Ok(CalibrationRun {
        method,
        domain: CalibrationDomain::from_standards(standards),
        results,
        summary,
        warning,
    })
}
