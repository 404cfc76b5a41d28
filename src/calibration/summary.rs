use super::{PatientResult, RangeFlag};
use serde::{Deserialize, Serialize};

/// Range tallies for one calculation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub within_range: usize,
    pub below_range: usize,
    pub above_range: usize,
}

impl Summary {
    pub fn from_results(results: &[PatientResult]) -> Self {
        let flags: Vec<RangeFlag> = results.iter().map(|r| r.range_flag).collect();
        summarize(&flags)
    }

    /// Labelled rows in report order.
    pub fn rows(&self) -> [(&'static str, usize); 4] {
        [
            ("Total patients", self.total),
            ("Within range", self.within_range),
            ("Below range", self.below_range),
            ("Above range", self.above_range),
        ]
    }
}

pub fn summarize(flags: &[RangeFlag]) -> Summary {
    flags.iter().fold(
        Summary { total: flags.len(), ..Summary::default() },
        |mut summary, flag| {
            match flag {
                RangeFlag::BelowRange => summary.below_range += 1,
                RangeFlag::WithinRange => summary.within_range += 1,
                RangeFlag::AboveRange => summary.above_range += 1,
            }
            summary
        },
    )
}
