//! Walking-accessibility and equity-gap analysis over street networks.
//!
//! The crate computes, for a set of polygon regions (census tracts or
//! aggregated neighborhoods), the shortest walking network distance to the
//! nearest amenity of each of eight essential categories, turns those
//! distances into bounded 0–100 walkability scores, and derives an equity
//! gap ranking that highlights underserved populations.
//!
//! The pipeline is strictly staged: [`loading::create_study_area`] builds an
//! immutable [`StudyArea`] (street graph, amenity index, regions), then
//! [`features::build_distance_features`] routes all region × category pairs
//! in parallel, [`scoring::score_regions`] produces walkability records, and
//! [`equity::EquityGapAnalyzer`] ranks gaps and proposes facility sites.

pub mod equity;
pub mod error;
pub mod export;
pub mod features;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;
pub mod scoring;

pub use error::Error;
pub use model::{Amenity, AmenityCategory, AmenityIndex, Region, StreetGraph, StudyArea};

/// Network length in centimeters.
///
/// Edge weights and routing costs are integer centimeters so the routing
/// heap stays on a total order and repeated runs are bit-identical. A `u32`
/// tops out above 42 000 km, far beyond any metropolitan street network.
pub type Length = u32;

/// Geometric candidates routed per (region, category) query.
pub const DEFAULT_CANDIDATES: usize = 25;

/// Maximum snap distance from a coordinate to the street network, meters.
pub const DEFAULT_SNAP_RADIUS_M: f64 = 500.0;

/// Network radius for the "amenities within reach" count, meters.
pub const DEFAULT_COUNT_RADIUS_M: f64 = 1000.0;

/// Routing search cutoff, meters. The score curve floors to zero at this
/// distance, so bounding the search here never changes a reported score.
pub const DEFAULT_SEARCH_CUTOFF_M: f64 = 5000.0;

pub(crate) fn length_from_meters(meters: f64) -> Length {
    (meters * 100.0).round() as Length
}

pub(crate) fn length_to_meters(length: Length) -> f64 {
    f64::from(length) / 100.0
}
