//! Network routing: bounded Dijkstra, the Euclidean candidate pre-filter
//! and the nearest-distance query used by the feature builder.

pub mod candidates;
pub mod dijkstra;
pub mod router;

pub use candidates::nearest_candidates;
pub use router::{CandidateReach, nearest_distance};
