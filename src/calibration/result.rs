use super::RangeFlag;
use serde::{Deserialize, Serialize};

/// Placeholder shown where no concentration could be computed.
pub const MISSING_CONCENTRATION: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientResult {
    /// 1-based position of the reading on the plate.
    pub index: usize,
    pub optical_density: f64,
    pub concentration: Option<f64>,
    pub range_flag: RangeFlag,
}

impl PatientResult {
    pub fn concentration_text(&self) -> String {
        match self.concentration {
            Some(value) => format!("{:.4}", value),
            None => MISSING_CONCENTRATION.to_string(),
        }
    }

    pub fn status_label(&self) -> &'static str {
        self.range_flag.label()
    }
}
