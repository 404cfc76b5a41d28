//! Hormone assay calibration.
//!
//! Standards (optical density, concentration) define a curve; patient
//! optical densities are evaluated against it, flagged against the
//! calibrated range and summarized. The engine keeps no state between
//! calls, so any front end can drive it with plain data.

pub mod calibration;
pub mod config;
pub mod curve;
pub mod error;
pub mod output;

pub use calibration::{calibrate, fit_and_evaluate, summarize, CalibrationRun, Evaluation, RangeFlag, Summary};
pub use config::{CalibrationSnapshot, InterpolationMethod, StandardPoint};
pub use error::{CalibrationError, CalibrationResult};
