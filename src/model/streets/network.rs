//! Street graph construction, connectivity validation and node snapping

use geo::{Distance, Haversine, Point};
use hashbrown::{HashMap, HashSet};
use petgraph::Directed;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{Edges, Graph, NodeIndex};
use rstar::RTree;
use rstar::primitives::GeomWithData;

use super::components::{SegmentRecord, StreetEdge, StreetNode};
use crate::{Error, length_from_meters};

type IndexedNode = GeomWithData<Point<f64>, NodeIndex>;

/// Weighted street network with a spatial index over node coordinates.
///
/// Built once, then shared read-only between routing workers; no method
/// mutates the graph after construction.
#[derive(Debug, Clone)]
pub struct StreetGraph {
    pub graph: Graph<StreetNode, StreetEdge>,
    rtree: RTree<IndexedNode>,
}

impl StreetGraph {
    /// Builds the routing graph from node and segment tables.
    ///
    /// Segments referencing unknown nodes or carrying non-finite lengths are
    /// skipped with a warning. Connectivity is validated before the graph is
    /// handed out: the largest strongly connected component must cover at
    /// least `min_component_share` of all nodes, otherwise the data has to
    /// be fixed upstream. A smaller shortfall keeps the largest component
    /// and drops the rest, as routing across fragments cannot succeed.
    ///
    /// # Errors
    ///
    /// `InvalidData` for an empty node table or duplicate node ids,
    /// `DisconnectedGraph` when the connectivity check fails.
    pub fn build(
        nodes: Vec<StreetNode>,
        segments: &[SegmentRecord],
        min_component_share: f64,
    ) -> Result<Self, Error> {
        if nodes.is_empty() {
            return Err(Error::InvalidData(
                "street network has no nodes".to_string(),
            ));
        }

        let mut graph = Graph::with_capacity(nodes.len(), segments.len() * 2);
        let mut by_external_id: HashMap<u64, NodeIndex> = HashMap::with_capacity(nodes.len());

        for node in nodes {
            let external_id = node.id;
            let idx = graph.add_node(node);
            if by_external_id.insert(external_id, idx).is_some() {
                return Err(Error::InvalidData(format!(
                    "duplicate street node id {external_id}"
                )));
            }
        }

        let mut skipped = 0usize;
        for segment in segments {
            let (Some(&from), Some(&to)) = (
                by_external_id.get(&segment.from),
                by_external_id.get(&segment.to),
            ) else {
                skipped += 1;
                continue;
            };
            if !segment.length_m.is_finite() || segment.length_m < 0.0 {
                skipped += 1;
                continue;
            }

            let edge = StreetEdge {
                weight: length_from_meters(segment.length_m),
            };
            graph.add_edge(from, to, edge);
            if !segment.oneway {
                graph.add_edge(to, from, edge);
            }
        }
        if skipped > 0 {
            log::warn!("Skipped {skipped} street segments with unknown endpoints or bad lengths");
        }

        let graph = retain_largest_component(graph, min_component_share)?;

        let rtree = RTree::bulk_load(
            graph
                .node_indices()
                .map(|idx| GeomWithData::new(graph[idx].geometry, idx))
                .collect(),
        );

        Ok(Self { graph, rtree })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node(&self, idx: NodeIndex) -> &StreetNode {
        &self.graph[idx]
    }

    pub(crate) fn edges(&self, node: NodeIndex) -> Edges<'_, StreetEdge, Directed> {
        self.graph.edges(node)
    }

    /// Nearest graph node to `point` with its geodesic offset in meters.
    pub fn nearest_node(&self, point: &Point<f64>) -> Option<(NodeIndex, f64)> {
        self.rtree
            .nearest_neighbor(point)
            .map(|obj| (obj.data, Haversine.distance(*obj.geom(), *point)))
    }

    /// Resolves `point` to a graph node, failing when nothing lies within
    /// `max_distance_m`.
    ///
    /// # Errors
    ///
    /// `UnresolvableLocation` when the network is empty or the coordinate is
    /// outside coverage.
    pub fn snap(&self, point: &Point<f64>, max_distance_m: f64) -> Result<NodeIndex, Error> {
        match self.nearest_node(point) {
            Some((node, offset)) if offset <= max_distance_m => Ok(node),
            _ => Err(Error::UnresolvableLocation {
                x: point.x(),
                y: point.y(),
                radius_m: max_distance_m,
            }),
        }
    }
}

fn retain_largest_component(
    graph: Graph<StreetNode, StreetEdge>,
    min_component_share: f64,
) -> Result<Graph<StreetNode, StreetEdge>, Error> {
    let components = tarjan_scc(&graph);
    let largest = components
        .iter()
        .max_by_key(|component| component.len())
        .cloned()
        .unwrap_or_default();

    let total = graph.node_count();
    let share = largest.len() as f64 / total as f64;
    if share < min_component_share {
        return Err(Error::DisconnectedGraph {
            share: share * 100.0,
            required: min_component_share * 100.0,
        });
    }

    if largest.len() == total {
        return Ok(graph);
    }

    log::warn!(
        "Street network is not strongly connected: keeping largest component \
         ({} of {total} nodes, {:.1}%)",
        largest.len(),
        share * 100.0
    );

    let members: HashSet<NodeIndex> = largest.into_iter().collect();
    Ok(graph.filter_map(
        |idx, node| members.contains(&idx).then(|| node.clone()),
        |_, edge| Some(*edge),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u64, lon: f64, lat: f64) -> StreetNode {
        StreetNode {
            id,
            geometry: Point::new(lon, lat),
        }
    }

    fn segment(from: u64, to: u64, length_m: f64) -> SegmentRecord {
        SegmentRecord {
            from,
            to,
            length_m,
            oneway: false,
        }
    }

    fn line_nodes() -> Vec<StreetNode> {
        vec![
            node(10, -118.2500, 34.0500),
            node(11, -118.2490, 34.0500),
            node(12, -118.2480, 34.0500),
        ]
    }

    #[test]
    fn builds_two_way_edges_by_default() {
        let graph = StreetGraph::build(
            line_nodes(),
            &[segment(10, 11, 90.0), segment(11, 12, 90.0)],
            0.9,
        )
        .unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn oneway_segments_insert_a_single_arc() {
        let oneway = |from, to| SegmentRecord {
            from,
            to,
            length_m: 90.0,
            oneway: true,
        };
        // A one-way ring is strongly connected with exactly one arc per segment.
        let graph = StreetGraph::build(
            line_nodes(),
            &[oneway(10, 11), oneway(11, 12), oneway(12, 10)],
            0.9,
        )
        .unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn fragmented_network_fails_validation() {
        let nodes = vec![
            node(1, -118.25, 34.05),
            node(2, -118.24, 34.05),
            node(3, -118.00, 34.20),
            node(4, -117.99, 34.20),
        ];
        let err = StreetGraph::build(nodes, &[segment(1, 2, 900.0), segment(3, 4, 900.0)], 0.9)
            .unwrap_err();
        assert!(matches!(err, Error::DisconnectedGraph { .. }));
    }

    #[test]
    fn small_fragments_are_dropped_when_within_tolerance() {
        let nodes = vec![
            node(1, -118.250, 34.05),
            node(2, -118.249, 34.05),
            node(3, -118.248, 34.05),
            node(4, -118.00, 34.20),
        ];
        let graph = StreetGraph::build(
            nodes,
            &[segment(1, 2, 90.0), segment(2, 3, 90.0)],
            0.75,
        )
        .unwrap();

        assert_eq!(graph.node_count(), 3);
        // The isolated node is gone from the spatial index too.
        let (_, offset) = graph.nearest_node(&Point::new(-118.00, 34.20)).unwrap();
        assert!(offset > 1000.0);
    }

    #[test]
    fn snap_rejects_far_coordinates() {
        let graph = StreetGraph::build(line_nodes(), &[segment(10, 11, 90.0)], 0.0).unwrap();
        let err = graph
            .snap(&Point::new(-119.00, 35.00), 500.0)
            .unwrap_err();
        assert!(matches!(err, Error::UnresolvableLocation { .. }));
    }

    #[test]
    fn empty_node_table_is_invalid() {
        let err = StreetGraph::build(Vec::new(), &[], 0.9).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn duplicate_node_ids_are_invalid() {
        let nodes = vec![node(1, -118.25, 34.05), node(1, -118.24, 34.05)];
        let err = StreetGraph::build(nodes, &[], 0.9).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }
}
