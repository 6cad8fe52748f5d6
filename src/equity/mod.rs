//! Equity gap analysis
//!
//! Combines a demographic need score with the walkability access score into
//! a per-category gap score, ranks underserved regions and proposes
//! candidate sites for new facilities.

use geo::Point;
use hashbrown::HashMap;
use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::model::{AmenityCategory, AmenityIndex, Region};
use crate::scoring::WalkabilityRecord;

/// Strategy combining need and access into a gap score.
///
/// The multiplicative form is asserted rather than derived, so alternative
/// formulations (additive, log-scaled need) plug in here.
pub trait GapFormula: Send + Sync {
    /// `need` and `access` are both in [0, 1]; results are clamped to [0, 1].
    fn gap_score(&self, need: f64, access: f64) -> f64;
}

/// Default formula: `need × (1 − access)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiplicativeGap;

impl GapFormula for MultiplicativeGap {
    fn gap_score(&self, need: f64, access: f64) -> f64 {
        need * (1.0 - access)
    }
}

/// Blend of income-based and density-based need, must sum to 1.0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NeedWeights {
    pub income: f64,
    pub density: f64,
}

impl Default for NeedWeights {
    fn default() -> Self {
        Self {
            income: 0.7,
            density: 0.3,
        }
    }
}

impl NeedWeights {
    fn validate(&self) -> Result<(), Error> {
        let sum = self.income + self.density;
        if self.income < 0.0 || self.density < 0.0 || (sum - 1.0).abs() > 1e-9 {
            return Err(Error::InvalidWeights { sum });
        }
        Ok(())
    }
}

/// Per (region, category) equity metrics. Higher gap = more underserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapRecord {
    pub region_id: String,
    pub category: AmenityCategory,
    /// Demographic need, [0, 1].
    pub need_score: f64,
    /// Category sub-score scaled to [0, 1].
    pub access_score: f64,
    /// `formula(need, access)`, clamped to [0, 1].
    pub gap_score: f64,
}

/// Proposed coordinate for a new facility.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteRecommendation {
    pub region_id: String,
    /// WGS84 lon/lat (region centroid).
    pub location: Point<f64>,
    pub population_served: u32,
    pub gap_score: f64,
}

struct RegionEntry<'a> {
    region: &'a Region,
    walkability: &'a WalkabilityRecord,
    need_score: f64,
}

/// Ranks regions by equity gap per amenity category.
///
/// Need scores are min-max normalized once over the full region set at
/// construction so they stay comparable across queries.
pub struct EquityGapAnalyzer<'a> {
    entries: Vec<RegionEntry<'a>>,
    formula: Box<dyn GapFormula>,
}

impl std::fmt::Debug for EquityGapAnalyzer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EquityGapAnalyzer").finish_non_exhaustive()
    }
}

impl<'a> EquityGapAnalyzer<'a> {
    /// # Errors
    ///
    /// `InvalidWeights` for a bad need blend, `InvalidData` when a region
    /// has no matching walkability record.
    pub fn new(
        regions: &'a [Region],
        walkability: &'a [WalkabilityRecord],
        weights: NeedWeights,
        formula: Box<dyn GapFormula>,
    ) -> Result<Self, Error> {
        weights.validate()?;

        let by_id: HashMap<&str, &WalkabilityRecord> = walkability
            .iter()
            .map(|record| (record.region_id.as_str(), record))
            .collect();

        let need_scores = need_scores(regions, weights);
        let mut entries = Vec::with_capacity(regions.len());
        for (region, need_score) in regions.iter().zip(need_scores) {
            let walkability = by_id.get(region.id.as_str()).ok_or_else(|| {
                Error::InvalidData(format!(
                    "no walkability record for region {}",
                    region.id
                ))
            })?;
            entries.push(RegionEntry {
                region,
                walkability,
                need_score,
            });
        }
        entries.sort_by(|a, b| a.region.id.cmp(&b.region.id));

        Ok(Self { entries, formula })
    }

    /// Gap records for one category, sorted by region id.
    pub fn gap_records(&self, category: AmenityCategory) -> Vec<GapRecord> {
        self.entries
            .iter()
            .map(|entry| self.record(entry, category))
            .collect()
    }

    /// The `top_n` most underserved regions for `category` among regions
    /// with at least `min_population` residents, ranked by gap score
    /// descending. Ties break by higher need, then lower access, then
    /// region id, so the ranking is deterministic.
    pub fn identify_underserved_areas(
        &self,
        category: AmenityCategory,
        top_n: usize,
        min_population: u32,
    ) -> Vec<GapRecord> {
        let mut ranked: Vec<GapRecord> = self
            .entries
            .iter()
            .filter(|entry| entry.region.population >= min_population)
            .map(|entry| self.record(entry, category))
            .collect();

        ranked.sort_by(|a, b| {
            b.gap_score
                .total_cmp(&a.gap_score)
                .then_with(|| b.need_score.total_cmp(&a.need_score))
                .then_with(|| a.access_score.total_cmp(&b.access_score))
                .then_with(|| a.region_id.cmp(&b.region_id))
        });
        ranked.truncate(top_n);
        ranked
    }

    /// Proposes region centroids of the top-ranked underserved regions as
    /// new-facility sites, skipping centroids within `min_separation_m` of
    /// an existing amenity of the category.
    pub fn find_optimal_locations(
        &self,
        category: AmenityCategory,
        amenities: &AmenityIndex,
        top_n: usize,
        min_population: u32,
        min_separation_m: f64,
    ) -> Vec<SiteRecommendation> {
        let by_id: HashMap<&str, &Region> = self
            .entries
            .iter()
            .map(|entry| (entry.region.id.as_str(), entry.region))
            .collect();

        self.identify_underserved_areas(category, top_n, min_population)
            .into_iter()
            .filter_map(|record| {
                let region = by_id.get(record.region_id.as_str())?;
                let too_close = amenities
                    .nearest_in_category(&region.centroid, category)
                    .is_some_and(|(_, meters)| meters < min_separation_m);
                if too_close {
                    log::debug!(
                        "Region {}: centroid within {min_separation_m} m of an existing \
                         {category}, skipping site",
                        region.id
                    );
                    return None;
                }
                Some(SiteRecommendation {
                    region_id: record.region_id,
                    location: region.centroid,
                    population_served: region.population,
                    gap_score: record.gap_score,
                })
            })
            .collect()
    }

    fn record(&self, entry: &RegionEntry<'_>, category: AmenityCategory) -> GapRecord {
        let access_score = entry.walkability.subscore(category) / 100.0;
        let gap_score = self
            .formula
            .gap_score(entry.need_score, access_score)
            .clamp(0.0, 1.0);
        GapRecord {
            region_id: entry.region.id.clone(),
            category,
            need_score: entry.need_score,
            access_score,
            gap_score,
        }
    }
}

/// Need per region: `w_income · (1 − minmax(income)) + w_density ·
/// minmax(density)`. Missing values and degenerate ranges normalize to 0.5,
/// matching the neutral default applied upstream of normalization.
fn need_scores(regions: &[Region], weights: NeedWeights) -> Vec<f64> {
    let income_range = minmax(regions.iter().filter_map(|r| r.median_income));
    let density_range = minmax(
        regions
            .iter()
            .map(Region::population_density)
            .filter(|&d| d > 0.0),
    );

    regions
        .iter()
        .map(|region| {
            let income_need = match region.median_income {
                Some(income) => 1.0 - normalize(income, income_range),
                None => 0.5,
            };
            let density = region.population_density();
            let density_need = if density > 0.0 {
                normalize(density, density_range)
            } else {
                0.5
            };
            weights.income * income_need + weights.density * density_need
        })
        .collect()
}

fn minmax(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    match values.minmax_by(f64::total_cmp) {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(v) => Some((v, v)),
        MinMaxResult::MinMax(lo, hi) => Some((lo, hi)),
    }
}

fn normalize(value: f64, range: Option<(f64, f64)>) -> f64 {
    match range {
        Some((lo, hi)) if hi > lo => (value - lo) / (hi - lo),
        _ => 0.5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{DistanceFeature, RegionFeatures};
    use crate::scoring::{ScoringConfig, score_regions};

    fn region(id: &str, population: u32, income: Option<f64>) -> Region {
        Region {
            id: id.to_string(),
            name: None,
            centroid: Point::new(-118.25, 34.05),
            population,
            median_income: income,
            area_sq_km: 2.0,
        }
    }

    fn uniform_features(region_id: &str, distance_m: f64) -> RegionFeatures {
        RegionFeatures::synthetic(
            region_id,
            [DistanceFeature {
                distance_m: Some(distance_m),
                count_within_radius: 1,
            }; AmenityCategory::COUNT],
        )
    }

    fn analyzer<'a>(
        regions: &'a [Region],
        walkability: &'a [WalkabilityRecord],
    ) -> EquityGapAnalyzer<'a> {
        EquityGapAnalyzer::new(
            regions,
            walkability,
            NeedWeights::default(),
            Box::new(MultiplicativeGap),
        )
        .unwrap()
    }

    #[test]
    fn gap_is_monotone_in_need_and_access() {
        let formula = MultiplicativeGap;
        assert!(formula.gap_score(0.8, 0.4) > formula.gap_score(0.5, 0.4));
        assert!(formula.gap_score(0.8, 0.2) > formula.gap_score(0.8, 0.4));
    }

    #[test]
    fn lower_income_means_strictly_higher_gap_everywhere() {
        let regions = [
            region("a", 5000, Some(40_000.0)),
            region("b", 5000, Some(80_000.0)),
        ];
        // Identical (imperfect) access in every category.
        let features = vec![uniform_features("a", 1200.0), uniform_features("b", 1200.0)];
        let walkability = score_regions(&features, &ScoringConfig::default());

        let analyzer = analyzer(&regions, &walkability);
        for category in AmenityCategory::ALL {
            let records = analyzer.gap_records(category);
            let a = records.iter().find(|r| r.region_id == "a").unwrap();
            let b = records.iter().find(|r| r.region_id == "b").unwrap();
            assert!(
                a.gap_score > b.gap_score,
                "category {category}: {} <= {}",
                a.gap_score,
                b.gap_score
            );
        }
    }

    #[test]
    fn gap_scores_stay_in_unit_interval() {
        let regions = [
            region("a", 9000, Some(25_000.0)),
            region("b", 100, Some(250_000.0)),
            region("c", 4000, None),
        ];
        let features = vec![
            uniform_features("a", 4000.0),
            uniform_features("b", 100.0),
            uniform_features("c", 900.0),
        ];
        let walkability = score_regions(&features, &ScoringConfig::default());

        let analyzer = analyzer(&regions, &walkability);
        for record in analyzer.gap_records(AmenityCategory::Parks) {
            assert!((0.0..=1.0).contains(&record.gap_score));
            assert!((0.0..=1.0).contains(&record.need_score));
            assert!((0.0..=1.0).contains(&record.access_score));
        }
    }

    #[test]
    fn population_floor_excludes_small_regions() {
        let regions = [
            region("tiny", 999, Some(20_000.0)),
            region("big", 1000, Some(90_000.0)),
        ];
        // The tiny region is far worse off, but sits below the floor.
        let features = vec![
            uniform_features("tiny", 6000.0),
            uniform_features("big", 200.0),
        ];
        let walkability = score_regions(&features, &ScoringConfig::default());

        let analyzer = analyzer(&regions, &walkability);
        let ranked = analyzer.identify_underserved_areas(AmenityCategory::Parks, 10, 1000);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].region_id, "big");
    }

    #[test]
    fn ties_rank_deterministically_by_region_id() {
        let regions = [
            region("b", 5000, Some(50_000.0)),
            region("a", 5000, Some(50_000.0)),
        ];
        let features = vec![uniform_features("a", 1200.0), uniform_features("b", 1200.0)];
        let walkability = score_regions(&features, &ScoringConfig::default());

        let analyzer = analyzer(&regions, &walkability);
        let ranked = analyzer.identify_underserved_areas(AmenityCategory::Schools, 10, 0);
        assert_eq!(ranked[0].region_id, "a");
        assert_eq!(ranked[1].region_id, "b");
    }

    #[test]
    fn bad_need_weights_fail_construction() {
        let regions = [region("a", 5000, Some(50_000.0))];
        let features = vec![uniform_features("a", 500.0)];
        let walkability = score_regions(&features, &ScoringConfig::default());

        let err = EquityGapAnalyzer::new(
            &regions,
            &walkability,
            NeedWeights {
                income: 0.9,
                density: 0.3,
            },
            Box::new(MultiplicativeGap),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidWeights { .. }));
    }

    #[test]
    fn siting_skips_centroids_near_existing_amenities() {
        use crate::model::Amenity;

        let mut far = region("far", 5000, Some(30_000.0));
        far.centroid = Point::new(-118.40, 34.10);
        let near = region("near", 5000, Some(30_000.0));

        let regions = [far, near];
        let features = vec![
            uniform_features("far", 3000.0),
            uniform_features("near", 3000.0),
        ];
        let walkability = score_regions(&features, &ScoringConfig::default());

        // One existing park right on top of the "near" centroid.
        let index = AmenityIndex::build(vec![Amenity {
            category: AmenityCategory::Parks,
            geometry: Point::new(-118.25, 34.05),
            importance: 1.0,
            node: None,
        }]);

        let analyzer = analyzer(&regions, &walkability);
        let sites =
            analyzer.find_optimal_locations(AmenityCategory::Parks, &index, 10, 0, 500.0);
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].region_id, "far");
    }
}
