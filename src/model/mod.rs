//! Data model for accessibility analysis
//!
//! Contains the immutable inputs of a run: the region set, the amenity
//! index and the walkable street network.

pub mod amenity;
pub mod region;
pub mod streets;

pub use amenity::{Amenity, AmenityCategory, AmenityIndex};
pub use region::Region;
pub use streets::{SegmentRecord, StreetEdge, StreetGraph, StreetNode};

/// Everything a computation phase needs, built once and shared read-only
/// between worker threads.
#[derive(Debug, Clone)]
pub struct StudyArea {
    pub street_graph: StreetGraph,
    pub amenity_index: AmenityIndex,
    /// Sorted by region id.
    pub regions: Vec<Region>,
}
