use serde::{Deserialize, Serialize};

use crate::Error;

/// Piecewise-linear distance-to-score curve, monotonically non-increasing.
///
/// Distances below `ideal_m` score 100; the score falls linearly to 70 at
/// `acceptable_m`, then to 30 at `poor_m`; past `poor_m` it decays at one
/// point per 100 m until it floors at 0. Unreachable distances score 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreCurve {
    pub ideal_m: f64,
    pub acceptable_m: f64,
    pub poor_m: f64,
}

impl Default for ScoreCurve {
    fn default() -> Self {
        Self {
            ideal_m: 400.0,
            acceptable_m: 1000.0,
            poor_m: 2000.0,
        }
    }
}

/// Decay past `poor_m`, score points per meter.
const TAIL_DECAY_PER_M: f64 = 1.0 / 100.0;

impl ScoreCurve {
    /// # Errors
    ///
    /// `InvalidData` unless `0 < ideal < acceptable < poor`.
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.ideal_m > 0.0 && self.ideal_m < self.acceptable_m && self.acceptable_m < self.poor_m)
        {
            return Err(Error::InvalidData(format!(
                "score curve breakpoints must satisfy 0 < ideal < acceptable < poor, \
                 got {} / {} / {}",
                self.ideal_m, self.acceptable_m, self.poor_m
            )));
        }
        Ok(())
    }

    /// Score in [0, 100] for a network distance; `None` means unreachable.
    pub fn score(&self, distance_m: Option<f64>) -> f64 {
        let Some(d) = distance_m else { return 0.0 };
        if !d.is_finite() {
            return 0.0;
        }

        if d < self.ideal_m {
            100.0
        } else if d < self.acceptable_m {
            100.0 - 30.0 * (d - self.ideal_m) / (self.acceptable_m - self.ideal_m)
        } else if d < self.poor_m {
            70.0 - 40.0 * (d - self.acceptable_m) / (self.poor_m - self.acceptable_m)
        } else {
            (30.0 - (d - self.poor_m) * TAIL_DECAY_PER_M).max(0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoints_score_their_band_values() {
        let curve = ScoreCurve::default();
        assert_eq!(curve.score(Some(0.0)), 100.0);
        assert_eq!(curve.score(Some(350.0)), 100.0);
        assert_eq!(curve.score(Some(400.0)), 100.0);
        assert_eq!(curve.score(Some(700.0)), 85.0);
        assert_eq!(curve.score(Some(1000.0)), 70.0);
        assert_eq!(curve.score(Some(1500.0)), 50.0);
        assert_eq!(curve.score(Some(2000.0)), 30.0);
        assert_eq!(curve.score(Some(3000.0)), 20.0);
        assert_eq!(curve.score(Some(5000.0)), 0.0);
        assert_eq!(curve.score(Some(50_000.0)), 0.0);
    }

    #[test]
    fn unreachable_scores_zero() {
        let curve = ScoreCurve::default();
        assert_eq!(curve.score(None), 0.0);
        assert_eq!(curve.score(Some(f64::INFINITY)), 0.0);
    }

    #[test]
    fn curve_is_monotone_non_increasing() {
        let curve = ScoreCurve::default();
        let mut previous = f64::INFINITY;
        for step in 0..800 {
            let score = curve.score(Some(f64::from(step) * 10.0));
            assert!(score <= previous, "score rose at {} m", step * 10);
            assert!((0.0..=100.0).contains(&score));
            previous = score;
        }
    }

    #[test]
    fn misordered_breakpoints_fail_validation() {
        let curve = ScoreCurve {
            ideal_m: 1000.0,
            acceptable_m: 400.0,
            poor_m: 2000.0,
        };
        assert!(curve.validate().is_err());
    }
}
