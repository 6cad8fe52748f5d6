//! Euclidean pre-filter for routing candidates.
//!
//! Network shortest-path queries are expensive; straight-line distance is an
//! admissible pre-filter because network distance can never undercut it.
//! Routing only the geometrically nearest `k` amenities of a category is
//! therefore sound as long as `k` is large enough that the true network
//! nearest neighbor is not excluded.

use geo::{Distance, Haversine, Point};
use petgraph::graph::NodeIndex;

use crate::model::{AmenityCategory, AmenityIndex};

/// Amenity ids of the `k` geodesically closest amenities of `category`,
/// ordered by distance ascending. Categories with fewer than `k` amenities
/// yield all of them; an empty category yields an empty set, which the
/// caller records as unreachable.
pub fn nearest_candidates(
    index: &AmenityIndex,
    origin: &Point<f64>,
    category: AmenityCategory,
    k: usize,
) -> Vec<usize> {
    // The R-tree iterates in planar lon/lat order; over-fetch slightly and
    // re-rank by haversine so latitude distortion cannot reorder the cut.
    let fetch = k.saturating_add(k / 4).max(k);
    let mut ranked: Vec<(f64, usize)> = index
        .tree(category)
        .nearest_neighbor_iter(origin)
        .take(fetch)
        .map(|obj| (Haversine.distance(*obj.geom(), *origin), obj.data))
        .collect();

    ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    ranked.truncate(k);
    ranked.into_iter().map(|(_, id)| id).collect()
}

/// Street nodes the given amenities snap to, preserving multiplicity so a
/// within-radius count still counts amenities rather than nodes. Amenities
/// that never snapped to the network are dropped.
pub fn candidate_nodes(index: &AmenityIndex, candidate_ids: &[usize]) -> Vec<NodeIndex> {
    candidate_ids
        .iter()
        .filter_map(|&id| index.amenity(id).node)
        .collect()
}
