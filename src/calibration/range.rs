use serde::{Deserialize, Serialize};
use crate::config::StandardPoint;

/// Where a reading falls relative to the calibrated domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeFlag {
    BelowRange,
    WithinRange,
    AboveRange,
}

impl RangeFlag {
    /// Signed code: -1 below, 0 within, 1 above.
    pub fn code(self) -> i8 {
        match self {
            RangeFlag::BelowRange => -1,
            RangeFlag::WithinRange => 0,
            RangeFlag::AboveRange => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RangeFlag::BelowRange => "Below",
            RangeFlag::WithinRange => "Normal",
            RangeFlag::AboveRange => "Above",
        }
    }

    pub fn is_within(self) -> bool {
        self == RangeFlag::WithinRange
    }
}

/// Closed optical-density interval spanned by the standards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationDomain {
    pub min: f64,
    pub max: f64,
}

impl CalibrationDomain {
    pub fn from_standards(standards: &[StandardPoint]) -> Option<Self> {
        let mut densities = standards.iter().map(|p| p.optical_density);
        let first = densities.next()?;
        let (min, max) = densities.fold((first, first), |(lo, hi), od| (lo.min(od), hi.max(od)));
        Some(Self { min, max })
    }

    /// Boundary readings count as within range.
    pub fn classify(&self, optical_density: f64) -> RangeFlag {
        if optical_density < self.min {
            RangeFlag::BelowRange
        } else if optical_density > self.max {
            RangeFlag::AboveRange
        } else {
            RangeFlag::WithinRange
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    fn scenario_standards() -> Vec<StandardPoint> {
        (1..=5)
            .map(|i| StandardPoint::new(0.1 * i as f64, i as f64))
            .collect()
    }

    #[test]
    fn test_domain_bounds() {
        let domain = CalibrationDomain::from_standards(&scenario_standards()).unwrap();
        assert_eq!(domain.min, 0.1);
        assert_eq!(domain.max, 0.5);
        assert!(CalibrationDomain::from_standards(&[]).is_none());
    }

    #[test]
    fn test_domain_ignores_input_order() {
        let mut rng = StdRng::seed_from_u64(7);
        let expected = CalibrationDomain::from_standards(&scenario_standards()).unwrap();

        for _ in 0..20 {
            let mut standards = scenario_standards();
            standards.shuffle(&mut rng);
            let domain = CalibrationDomain::from_standards(&standards).unwrap();
            assert_eq!(domain, expected);
            assert!(domain.min <= domain.max);
        }
    }

    #[test]
    fn test_boundaries_are_within() {
        let domain = CalibrationDomain { min: 0.1, max: 0.5 };
        assert_eq!(domain.classify(0.1), RangeFlag::WithinRange);
        assert_eq!(domain.classify(0.5), RangeFlag::WithinRange);
        assert_eq!(domain.classify(0.05), RangeFlag::BelowRange);
        assert_eq!(domain.classify(0.55), RangeFlag::AboveRange);
    }

    #[test]
    fn test_classification_partition() {
        let mut rng = StdRng::seed_from_u64(42);
        let domain = CalibrationDomain { min: 0.2, max: 0.8 };

        for _ in 0..500 {
            let od: f64 = rng.gen_range(0.0..1.0);
            let flag = domain.classify(od);
            assert_eq!(flag == RangeFlag::BelowRange, od < domain.min);
            assert_eq!(flag == RangeFlag::AboveRange, od > domain.max);
            assert_eq!(flag.is_within(), od >= domain.min && od <= domain.max);
            assert!([-1, 0, 1].contains(&flag.code()));
        }
    }

    #[test]
    fn test_single_point_domain() {
        let domain = CalibrationDomain::from_standards(&[StandardPoint::new(0.3, 2.0)]).unwrap();
        assert_eq!(domain.classify(0.3), RangeFlag::WithinRange);
        assert_eq!(domain.classify(0.31), RangeFlag::AboveRange);
    }
}
