use thiserror::Error;
use crate::config::InterpolationMethod;

#[derive(Error, Debug)]
pub enum CalibrationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Plot error: {0}")]
    Plot(String),

    #[error("Insufficient data: {method} interpolation needs at least {required} distinct standards, got {found}")]
    InsufficientData {
        method: InterpolationMethod,
        required: usize,
        found: usize,
    },

    #[error("Unknown interpolation method: {0:?} (expected linear, quadratic or spline)")]
    InvalidMethod(String),

    #[error("Calibration curve could not be fitted: {0}")]
    SingularFit(String),

    #[error("Parameter validation error: {0}")]
    Validation(String),
}

impl CalibrationError {
    /// Errors caused by the standards themselves rather than by a caller bug.
    /// The calculation pass falls back to placeholders instead of failing.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CalibrationError::InsufficientData { .. } | CalibrationError::SingularFit(_)
        )
    }
}

pub type CalibrationResult<T> = Result<T, CalibrationError>;
