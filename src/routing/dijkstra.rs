use std::{cmp::Ordering, collections::BinaryHeap};

use hashbrown::{HashMap, HashSet};
use petgraph::{graph::NodeIndex, visit::EdgeRef};

use crate::Length;
use crate::model::StreetGraph;

#[derive(Copy, Clone, Eq, PartialEq)]
struct State {
    cost: Length,
    node: NodeIndex,
}

// Implement Ord for State to use in BinaryHeap
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap by cost (reversed from standard Rust BinaryHeap),
        // ties broken by node index for a stable expansion order
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Dijkstra's algorithm over the street network.
/// Returns a map of node indices to network distances in centimeters.
pub fn dijkstra_path_weights(
    graph: &StreetGraph,
    start: NodeIndex,
    max_cost: Option<Length>,
) -> HashMap<NodeIndex, Length> {
    let estimated_nodes = graph.graph.node_count().min(1000);
    let mut distances: HashMap<NodeIndex, Length> = HashMap::with_capacity(estimated_nodes);
    let mut heap = BinaryHeap::with_capacity(estimated_nodes / 4);

    heap.push(State {
        cost: 0,
        node: start,
    });
    distances.insert(start, 0);

    while let Some(State { cost, node }) = heap.pop() {
        // Skip if we've found a better path
        if let Some(&best) = distances.get(&node)
            && cost > best
        {
            continue;
        }

        // The heap pops in non-decreasing cost order, so past the bound
        // nothing closer can appear
        if let Some(max) = max_cost
            && cost > max
        {
            break;
        }

        for edge in graph.edges(node) {
            let next = edge.target();
            let next_cost = cost + edge.weight().weight;

            match distances.entry(next) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    heap.push(State {
                        cost: next_cost,
                        node: next,
                    });
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        heap.push(State {
                            cost: next_cost,
                            node: next,
                        });
                    }
                }
            }
        }
    }

    distances
}

/// Dijkstra that stops as soon as every distinct target node has been
/// finalized, or the frontier passes `max_cost`.
///
/// Produces the same distances as [`dijkstra_path_weights`] for every target
/// within the bound; the early exit only avoids expanding the rest of the
/// graph once all targets are settled.
pub fn multi_target_distances(
    graph: &StreetGraph,
    start: NodeIndex,
    targets: &[NodeIndex],
    max_cost: Option<Length>,
) -> HashMap<NodeIndex, Length> {
    let mut remaining: HashSet<NodeIndex> = targets.iter().copied().collect();
    let estimated_nodes = graph.graph.node_count().min(1000);
    let mut distances: HashMap<NodeIndex, Length> = HashMap::with_capacity(estimated_nodes);
    let mut heap = BinaryHeap::with_capacity(estimated_nodes / 4);

    heap.push(State {
        cost: 0,
        node: start,
    });
    distances.insert(start, 0);

    while let Some(State { cost, node }) = heap.pop() {
        if let Some(&best) = distances.get(&node)
            && cost > best
        {
            continue;
        }

        if let Some(max) = max_cost
            && cost > max
        {
            break;
        }

        // A popped node is finalized; once the last target is settled the
        // remaining frontier cannot improve any answer
        if remaining.remove(&node) && remaining.is_empty() {
            break;
        }

        for edge in graph.edges(node) {
            let next = edge.target();
            let next_cost = cost + edge.weight().weight;

            match distances.entry(next) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    heap.push(State {
                        cost: next_cost,
                        node: next,
                    });
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        heap.push(State {
                            cost: next_cost,
                            node: next,
                        });
                    }
                }
            }
        }
    }

    distances
}
