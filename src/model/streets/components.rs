//! Street network components - intersections and segments

use geo::Point;

use crate::{Length, length_to_meters};

/// Street graph node (intersection)
#[derive(Debug, Clone)]
pub struct StreetNode {
    /// External id from the node table
    pub id: u64,
    /// Node coordinates, WGS84 lon/lat
    pub geometry: Point<f64>,
}

/// Street graph edge (street segment)
#[derive(Debug, Clone, Copy)]
pub struct StreetEdge {
    /// Segment length in centimeters
    pub weight: Length,
}

impl StreetEdge {
    pub fn length_m(&self) -> f64 {
        length_to_meters(self.weight)
    }
}

/// Street segment as it arrives from the edge table, keyed by external
/// node ids. One-way segments insert a single arc; everything else inserts
/// an arc pair.
#[derive(Debug, Clone, Copy)]
pub struct SegmentRecord {
    pub from: u64,
    pub to: u64,
    pub length_m: f64,
    pub oneway: bool,
}
