//! Walkable street network model

pub mod components;
pub mod network;

pub use components::{SegmentRecord, StreetEdge, StreetNode};
pub use network::StreetGraph;
