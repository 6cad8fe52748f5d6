//! Distance feature assembly
//!
//! Iterates all regions × all amenity categories, resolving each region
//! centroid to a street node once and routing against the Euclidean-nearest
//! candidates of every category. Regions are independent read-only queries
//! against the shared [`StudyArea`], so the batch is embarrassingly parallel.

use hashbrown::HashSet;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::model::{AmenityCategory, Region, StudyArea};
use crate::routing::{candidates, nearest_distance};
use crate::{
    DEFAULT_CANDIDATES, DEFAULT_COUNT_RADIUS_M, DEFAULT_SEARCH_CUTOFF_M, DEFAULT_SNAP_RADIUS_M,
    Error, length_from_meters, length_to_meters,
};

/// Tunables of the routing phase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RoutingParams {
    /// Geometric candidates routed per (region, category) query.
    pub candidates_per_category: usize,
    /// Maximum centroid-to-node snap distance, meters.
    pub snap_radius_m: f64,
    /// Radius of the within-reach amenity count, meters.
    pub count_radius_m: f64,
    /// Search cutoff, meters; distances past it report as unreachable.
    pub search_cutoff_m: f64,
}

impl Default for RoutingParams {
    fn default() -> Self {
        Self {
            candidates_per_category: DEFAULT_CANDIDATES,
            snap_radius_m: DEFAULT_SNAP_RADIUS_M,
            count_radius_m: DEFAULT_COUNT_RADIUS_M,
            search_cutoff_m: DEFAULT_SEARCH_CUTOFF_M,
        }
    }
}

impl RoutingParams {
    /// # Errors
    ///
    /// `InvalidData` when a tunable is non-positive or the cutoff undercuts
    /// the count radius.
    pub fn validate(&self) -> Result<(), Error> {
        if self.candidates_per_category == 0 {
            return Err(Error::InvalidData(
                "candidates_per_category must be at least 1".to_string(),
            ));
        }
        if !(self.snap_radius_m > 0.0 && self.count_radius_m > 0.0) {
            return Err(Error::InvalidData(
                "snap radius and count radius must be positive".to_string(),
            ));
        }
        if self.search_cutoff_m < self.count_radius_m {
            return Err(Error::InvalidData(format!(
                "search cutoff ({} m) must cover the count radius ({} m)",
                self.search_cutoff_m, self.count_radius_m
            )));
        }
        Ok(())
    }
}

/// Per (region, category) access measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceFeature {
    /// Nearest network distance in meters, `None` = unreachable.
    pub distance_m: Option<f64>,
    /// Routed candidates within the count radius (1 km by default).
    pub count_within_radius: u32,
}

impl DistanceFeature {
    const UNREACHABLE: Self = Self {
        distance_m: None,
        count_within_radius: 0,
    };
}

/// All eight category features of one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionFeatures {
    pub region_id: String,
    features: [DistanceFeature; AmenityCategory::COUNT],
}

impl RegionFeatures {
    pub fn feature(&self, category: AmenityCategory) -> &DistanceFeature {
        &self.features[category.index()]
    }

    #[cfg(test)]
    pub(crate) fn synthetic(
        region_id: &str,
        features: [DistanceFeature; AmenityCategory::COUNT],
    ) -> Self {
        Self {
            region_id: region_id.to_string(),
            features,
        }
    }
}

/// Computes distance features for every region of the study area.
///
/// Output is sorted by region id, so the table is deterministic regardless
/// of worker scheduling. Regions whose centroid cannot be resolved to the
/// network are reported with all-unreachable features, not dropped.
///
/// # Errors
///
/// `InvalidData` for bad routing tunables; per-region failures never abort
/// the batch.
pub fn build_distance_features(
    area: &StudyArea,
    params: &RoutingParams,
) -> Result<Vec<RegionFeatures>, Error> {
    params.validate()?;
    log::info!(
        "Routing {} regions x {} categories ({} candidates per query)",
        area.regions.len(),
        AmenityCategory::COUNT,
        params.candidates_per_category
    );

    let mut features: Vec<RegionFeatures> = area
        .regions
        .par_iter()
        .map(|region| region_features(area, params, region))
        .collect();

    features.sort_by(|a, b| a.region_id.cmp(&b.region_id));
    Ok(features)
}

/// Recomputes only the regions missing from `completed` and merges the two
/// sets, sorted by region id.
///
/// Recomputation is idempotent (an unchanged region/graph pair yields
/// bit-identical features), so a cancelled batch can resume from whatever
/// prefix it persisted.
///
/// # Errors
///
/// Same contract as [`build_distance_features`].
pub fn resume_distance_features(
    area: &StudyArea,
    params: &RoutingParams,
    completed: Vec<RegionFeatures>,
) -> Result<Vec<RegionFeatures>, Error> {
    params.validate()?;
    let done: HashSet<&str> = completed.iter().map(|f| f.region_id.as_str()).collect();
    let pending: Vec<&Region> = area
        .regions
        .iter()
        .filter(|region| !done.contains(region.id.as_str()))
        .collect();
    log::info!(
        "Resuming distance features: {} done, {} pending",
        completed.len(),
        pending.len()
    );
    drop(done);

    let mut features = completed;
    features.extend(
        pending
            .par_iter()
            .map(|region| region_features(area, params, region))
            .collect::<Vec<_>>(),
    );
    features.sort_by(|a, b| a.region_id.cmp(&b.region_id));
    Ok(features)
}

fn region_features(area: &StudyArea, params: &RoutingParams, region: &Region) -> RegionFeatures {
    let source = match area
        .street_graph
        .snap(&region.centroid, params.snap_radius_m)
    {
        Ok(node) => node,
        Err(err) => {
            // Fatal for this region only; recorded as unreachable
            log::warn!("Region {}: {err}", region.id);
            return RegionFeatures {
                region_id: region.id.clone(),
                features: [DistanceFeature::UNREACHABLE; AmenityCategory::COUNT],
            };
        }
    };

    let radius = length_from_meters(params.count_radius_m);
    let cutoff = length_from_meters(params.search_cutoff_m);

    let features = AmenityCategory::ALL.map(|category| {
        let candidate_ids = candidates::nearest_candidates(
            &area.amenity_index,
            &region.centroid,
            category,
            params.candidates_per_category,
        );
        if candidate_ids.is_empty() {
            return DistanceFeature::UNREACHABLE;
        }

        let nodes = candidates::candidate_nodes(&area.amenity_index, &candidate_ids);
        let reach = nearest_distance(&area.street_graph, source, &nodes, radius, cutoff);
        DistanceFeature {
            distance_m: reach.min_distance.map(length_to_meters),
            count_within_radius: reach.within_radius,
        }
    });

    RegionFeatures {
        region_id: region.id.clone(),
        features,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_validate() {
        RoutingParams::default().validate().unwrap();
    }

    #[test]
    fn cutoff_must_cover_count_radius() {
        let params = RoutingParams {
            search_cutoff_m: 500.0,
            ..RoutingParams::default()
        };
        assert!(matches!(
            params.validate().unwrap_err(),
            Error::InvalidData(_)
        ));
    }

    #[test]
    fn zero_candidates_are_rejected() {
        let params = RoutingParams {
            candidates_per_category: 0,
            ..RoutingParams::default()
        };
        assert!(params.validate().is_err());
    }
}
