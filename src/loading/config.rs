use std::path::PathBuf;

use crate::DEFAULT_SNAP_RADIUS_M;

/// Input locations and build tunables for a study area.
#[derive(Debug, Clone)]
pub struct StudyAreaConfig {
    /// Region table (`region_id,name,centroid_lon,centroid_lat,population,median_income,area_sq_km`).
    pub regions_path: PathBuf,
    /// Amenity table (`amenity_type,lon,lat,importance_weight`).
    pub amenities_path: PathBuf,
    /// Street node table (`node_id,lon,lat`).
    pub nodes_path: PathBuf,
    /// Street edge table (`from_node,to_node,length_m,oneway`).
    pub edges_path: PathBuf,
    /// Minimum share of nodes the street network's largest strongly
    /// connected component must cover; anything below aborts the build.
    pub min_component_share: f64,
    /// Maximum amenity-to-node snap distance, meters.
    pub snap_radius_m: f64,
}

impl StudyAreaConfig {
    pub fn new(
        regions_path: impl Into<PathBuf>,
        amenities_path: impl Into<PathBuf>,
        nodes_path: impl Into<PathBuf>,
        edges_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            regions_path: regions_path.into(),
            amenities_path: amenities_path.into(),
            nodes_path: nodes_path.into(),
            edges_path: edges_path.into(),
            min_component_share: 0.9,
            snap_radius_m: DEFAULT_SNAP_RADIUS_M,
        }
    }
}
