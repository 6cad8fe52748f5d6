//! Nearest-candidate network distance query

use petgraph::graph::NodeIndex;

use super::dijkstra::multi_target_distances;
use crate::Length;
use crate::model::StreetGraph;

/// Result of routing from one source to a candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateReach {
    /// Shortest network distance to any candidate, `None` when no candidate
    /// is reachable within the search cutoff. An expected outcome for
    /// isolated sources, not an error.
    pub min_distance: Option<Length>,
    /// Candidates within `radius`, counted with multiplicity so two
    /// amenities snapped to the same node both count.
    pub within_radius: u32,
}

/// Shortest network distance from `source` to the nearest of
/// `candidate_nodes`, plus the count of candidates within `radius`.
///
/// Runs a single bounded least-cost-first expansion; only tie order among
/// equal-cost nodes is implementation-defined and the reported minimum does
/// not depend on it.
pub fn nearest_distance(
    graph: &StreetGraph,
    source: NodeIndex,
    candidate_nodes: &[NodeIndex],
    radius: Length,
    cutoff: Length,
) -> CandidateReach {
    if candidate_nodes.is_empty() {
        return CandidateReach {
            min_distance: None,
            within_radius: 0,
        };
    }

    let distances = multi_target_distances(graph, source, candidate_nodes, Some(cutoff));

    let mut min_distance: Option<Length> = None;
    let mut within_radius = 0u32;
    for node in candidate_nodes {
        // The map may hold tentative entries past the bound; treat those as
        // unreachable just like nodes the search never touched.
        let Some(&distance) = distances.get(node).filter(|&&d| d <= cutoff) else {
            continue;
        };
        if min_distance.is_none_or(|best| distance < best) {
            min_distance = Some(distance);
        }
        if distance <= radius {
            within_radius += 1;
        }
    }

    CandidateReach {
        min_distance,
        within_radius,
    }
}
