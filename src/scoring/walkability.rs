use std::fmt;

use serde::{Deserialize, Serialize};

use super::config::ScoringConfig;
use crate::features::RegionFeatures;
use crate::model::AmenityCategory;

/// Ordinal walkability classification from fixed composite-index breaks.
/// Bands are inclusive on their lower bound, contiguous and exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WalkabilityCategory {
    Excellent,
    Good,
    Moderate,
    Poor,
    VeryPoor,
}

impl WalkabilityCategory {
    pub fn from_index(index: f64) -> Self {
        if index >= 80.0 {
            Self::Excellent
        } else if index >= 65.0 {
            Self::Good
        } else if index >= 50.0 {
            Self::Moderate
        } else if index >= 35.0 {
            Self::Poor
        } else {
            Self::VeryPoor
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::Poor => "Poor",
            Self::VeryPoor => "Very Poor",
        }
    }
}

impl fmt::Display for WalkabilityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-region walkability scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkabilityRecord {
    pub region_id: String,
    subscores: [f64; AmenityCategory::COUNT],
    /// Weighted composite, 0–100, rounded to 0.1.
    pub index: f64,
    pub category: WalkabilityCategory,
}

impl WalkabilityRecord {
    pub fn subscore(&self, category: AmenityCategory) -> f64 {
        self.subscores[category.index()]
    }
}

/// Converts distance features into walkability records, one per region,
/// preserving the input's region-id order.
pub fn score_regions(features: &[RegionFeatures], config: &ScoringConfig) -> Vec<WalkabilityRecord> {
    features
        .iter()
        .map(|region| {
            let subscores = AmenityCategory::ALL.map(|category| {
                config
                    .curve(category)
                    .score(region.feature(category).distance_m)
            });

            let index: f64 = AmenityCategory::ALL
                .iter()
                .map(|&category| config.weight(category) * subscores[category.index()])
                .sum();
            let index = (index * 10.0).round() / 10.0;

            WalkabilityRecord {
                region_id: region.region_id.clone(),
                subscores,
                index,
                category: WalkabilityCategory::from_index(index),
            }
        })
        .collect()
}
