use serde::Deserialize;

use crate::model::AmenityCategory;

use super::de::deserialize_flag;

#[derive(Debug, Deserialize)]
pub struct RawRegion {
    pub region_id: String,
    #[serde(default)]
    pub name: String,
    pub centroid_lon: f64,
    pub centroid_lat: f64,
    pub population: u32,
    #[serde(default)]
    pub median_income: Option<f64>,
    pub area_sq_km: f64,
}

#[derive(Debug, Deserialize)]
pub struct RawAmenity {
    pub amenity_type: AmenityCategory,
    pub lon: f64,
    pub lat: f64,
    /// Empty cells fall back to a neutral weight of 1.0 at conversion.
    #[serde(default)]
    pub importance_weight: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RawStreetNode {
    pub node_id: u64,
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Deserialize)]
pub struct RawStreetEdge {
    pub from_node: u64,
    pub to_node: u64,
    pub length_m: f64,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub oneway: bool,
}
