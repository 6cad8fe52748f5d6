use crate::Error;
use crate::model::AmenityCategory;

use super::curve::ScoreCurve;

/// Default category weights: daily necessities carry the most weight.
/// Must sum to 1.0.
pub const DEFAULT_WEIGHTS: [(AmenityCategory, f64); AmenityCategory::COUNT] = [
    (AmenityCategory::GroceryStores, 0.25),
    (AmenityCategory::Parks, 0.20),
    (AmenityCategory::TransitStops, 0.15),
    (AmenityCategory::Hospitals, 0.10),
    (AmenityCategory::Schools, 0.10),
    (AmenityCategory::Pharmacies, 0.10),
    (AmenityCategory::Libraries, 0.05),
    (AmenityCategory::UrgentCare, 0.05),
];

/// Tolerance for the weight-sum check; covers float representation error
/// only, never a genuinely different total.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Validated weighting scheme passed to the scorer at construction.
///
/// An explicit value object rather than module-level constants, so alternate
/// weighting schemes can be tested without touching shared state.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    weights: [f64; AmenityCategory::COUNT],
    curves: [ScoreCurve; AmenityCategory::COUNT],
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let mut weights = [0.0; AmenityCategory::COUNT];
        for (category, weight) in DEFAULT_WEIGHTS {
            weights[category.index()] = weight;
        }
        Self {
            weights,
            curves: [ScoreCurve::default(); AmenityCategory::COUNT],
        }
    }
}

impl ScoringConfig {
    /// Builds a config with custom weights and the default curve.
    ///
    /// Every category must appear exactly once and the weights must sum to
    /// 1.0; a bad total fails construction instead of being renormalized.
    ///
    /// # Errors
    ///
    /// `InvalidWeights` for a bad sum, `InvalidData` for missing or repeated
    /// categories or negative weights.
    pub fn new(weights: &[(AmenityCategory, f64)]) -> Result<Self, Error> {
        let mut table = [f64::NAN; AmenityCategory::COUNT];
        for &(category, weight) in weights {
            if !table[category.index()].is_nan() {
                return Err(Error::InvalidData(format!(
                    "duplicate weight for category '{category}'"
                )));
            }
            if !(weight >= 0.0) {
                return Err(Error::InvalidData(format!(
                    "weight for category '{category}' must be non-negative, got {weight}"
                )));
            }
            table[category.index()] = weight;
        }

        for category in AmenityCategory::ALL {
            if table[category.index()].is_nan() {
                return Err(Error::InvalidData(format!(
                    "missing weight for category '{category}'"
                )));
            }
        }

        let sum: f64 = table.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(Error::InvalidWeights { sum });
        }

        Ok(Self {
            weights: table,
            curves: [ScoreCurve::default(); AmenityCategory::COUNT],
        })
    }

    /// Replaces the curve of one category.
    ///
    /// # Errors
    ///
    /// `InvalidData` when the curve breakpoints are misordered.
    pub fn with_curve(mut self, category: AmenityCategory, curve: ScoreCurve) -> Result<Self, Error> {
        curve.validate()?;
        self.curves[category.index()] = curve;
        Ok(self)
    }

    pub fn weight(&self, category: AmenityCategory) -> f64 {
        self.weights[category.index()]
    }

    pub fn curve(&self, category: AmenityCategory) -> &ScoreCurve {
        &self.curves[category.index()]
    }
}
