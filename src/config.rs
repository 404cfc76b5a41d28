use serde::{Deserialize, Serialize};
use chrono::{Local, NaiveDateTime};
use clap::ValueEnum;
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;
use log::warn;
use crate::error::{CalibrationError, CalibrationResult};

/// Standard count the bench workflow is sized for.
pub const MAX_STANDARDS: usize = 10;
/// Patient readings per plate in the bench workflow.
pub const MAX_PATIENTS: usize = 50;

/// A calibration session as saved to and restored from disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSnapshot {
    pub hormone_name: String,
    pub unit: String,
    pub standards: Vec<StandardPoint>,
    pub patients: Vec<f64>,
    pub interpolation_method: InterpolationMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<NaiveDateTime>,
}

/// Known (optical density, concentration) pair. Stored as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct StandardPoint {
    pub optical_density: f64,
    pub concentration: f64,
}

impl StandardPoint {
    pub fn new(optical_density: f64, concentration: f64) -> Self {
        Self { optical_density, concentration }
    }
}

impl From<[f64; 2]> for StandardPoint {
    fn from(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

impl From<StandardPoint> for [f64; 2] {
    fn from(point: StandardPoint) -> Self {
        [point.optical_density, point.concentration]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(try_from = "String", into = "String")]
pub enum InterpolationMethod {
    Linear,
    Quadratic,
    #[value(name = "spline", aliases = ["cubic", "cubic_spline"])]
    CubicSpline,
}

impl InterpolationMethod {
    pub const ALL: [InterpolationMethod; 3] = [
        InterpolationMethod::Linear,
        InterpolationMethod::Quadratic,
        InterpolationMethod::CubicSpline,
    ];

    /// Identifier used in snapshots and on the command line.
    pub fn identifier(self) -> &'static str {
        match self {
            InterpolationMethod::Linear => "linear",
            InterpolationMethod::Quadratic => "quadratic",
            InterpolationMethod::CubicSpline => "spline",
        }
    }

    /// Minimum number of distinct optical densities the fit needs.
    pub fn min_distinct_points(self) -> usize {
        match self {
            InterpolationMethod::Linear => 2,
            InterpolationMethod::Quadratic => 3,
            InterpolationMethod::CubicSpline => 4,
        }
    }
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for InterpolationMethod {
    type Err = CalibrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(InterpolationMethod::Linear),
            "quadratic" => Ok(InterpolationMethod::Quadratic),
            "spline" | "cubic" | "cubic_spline" => Ok(InterpolationMethod::CubicSpline),
            _ => Err(CalibrationError::InvalidMethod(s.to_string())),
        }
    }
}

impl TryFrom<String> for InterpolationMethod {
    type Error = CalibrationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<InterpolationMethod> for String {
    fn from(method: InterpolationMethod) -> Self {
        method.identifier().to_string()
    }
}

impl CalibrationSnapshot {
    /// Built-in TSH plate used for demonstrations and first runs.
    pub fn example() -> Self {
        Self {
            hormone_name: "TSH".to_string(),
            unit: "µIU/mL".to_string(),
            standards: vec![
                StandardPoint::new(0.1, 1.0),
                StandardPoint::new(0.2, 2.0),
                StandardPoint::new(0.3, 3.0),
                StandardPoint::new(0.4, 4.0),
                StandardPoint::new(0.5, 5.0),
            ],
            patients: vec![0.15, 0.25, 0.35, 0.45, 0.55, 0.65, 0.75, 0.85, 0.95, 1.05],
            interpolation_method: InterpolationMethod::Linear,
            saved_at: None,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> CalibrationResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let snapshot: CalibrationSnapshot = serde_json::from_str(&content)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Writes the snapshot stamped with the current local time.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> CalibrationResult<()> {
        let stamped = self.with_timestamp(Local::now().naive_local());
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, &stamped)?;
        Ok(())
    }

    pub fn with_timestamp(&self, saved_at: NaiveDateTime) -> Self {
        Self {
            saved_at: Some(saved_at),
            ..self.clone()
        }
    }

    pub fn validate(&self) -> CalibrationResult<()> {
        if self.hormone_name.trim().is_empty() {
            return Err(CalibrationError::Validation(
                "Hormone name must not be empty".to_string()
            ));
        }

        self.validate_standards()?;
        self.validate_patients()?;

        Ok(())
    }

    fn validate_standards(&self) -> CalibrationResult<()> {
        if self.standards.is_empty() {
            return Err(CalibrationError::Validation(
                "At least one standard must be specified".to_string()
            ));
        }

        for (i, point) in self.standards.iter().enumerate() {
            if !is_non_negative(point.optical_density) {
                return Err(CalibrationError::Validation(
                    format!("Standard {} optical density must be a non-negative number", i + 1)
                ));
            }
            if !is_non_negative(point.concentration) {
                return Err(CalibrationError::Validation(
                    format!("Standard {} concentration must be a non-negative number", i + 1)
                ));
            }
        }

        if self.standards.len() > MAX_STANDARDS {
            warn!(
                "{} standards supplied; the assay workflow expects at most {}",
                self.standards.len(),
                MAX_STANDARDS
            );
        }

        Ok(())
    }

    fn validate_patients(&self) -> CalibrationResult<()> {
        if self.patients.is_empty() {
            return Err(CalibrationError::Validation(
                "At least one patient reading must be specified".to_string()
            ));
        }

        if let Some(i) = self.patients.iter().position(|&od| !is_non_negative(od)) {
            return Err(CalibrationError::Validation(
                format!("Patient {} optical density must be a non-negative number", i + 1)
            ));
        }

        if self.patients.len() > MAX_PATIENTS {
            warn!(
                "{} patient readings supplied; the assay workflow expects at most {}",
                self.patients.len(),
                MAX_PATIENTS
            );
        }

        Ok(())
    }
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
