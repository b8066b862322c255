use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, VecDeque};

use pen_core::{DEFAULT_EDGE_WEIGHT, Graph};
use tracing::trace;

use crate::adjacency::Adjacency;

/// Breadth-first visitation order from `start`, ignoring edge direction.
///
/// Returns an empty list when `start` is not a node of the graph.
#[must_use]
pub fn reachable(graph: &Graph, start: &str) -> Vec<String> {
    let adjacency = Adjacency::undirected(graph);
    let Some(origin) = adjacency.slot(start) else {
        return Vec::new();
    };
    let (order, _) = bfs_from(&adjacency, origin, None);
    adjacency.path_ids(order)
}

/// Unweighted shortest path from `start` to `target`, both inclusive.
///
/// Every edge is walked in both directions. Ties go to the neighbor whose edge
/// was inserted first.
#[must_use]
pub fn shortest_path(graph: &Graph, start: &str, target: &str) -> Option<Vec<String>> {
    let adjacency = Adjacency::undirected(graph);
    let origin = adjacency.slot(start)?;
    let goal = adjacency.slot(target)?;
    let (_, parents) = bfs_from(&adjacency, origin, Some(goal));
    if origin != goal && parents[goal].is_none() {
        return None;
    }
    Some(adjacency.path_ids(unwind(&parents, goal)))
}

fn bfs_from(
    adjacency: &Adjacency<'_>,
    origin: usize,
    goal: Option<usize>,
) -> (Vec<usize>, Vec<Option<usize>>) {
    let mut visited = vec![false; adjacency.len()];
    let mut parents = vec![None; adjacency.len()];
    let mut order = Vec::new();
    let mut queue = VecDeque::from([origin]);
    visited[origin] = true;

    while let Some(current) = queue.pop_front() {
        order.push(current);
        if goal == Some(current) {
            break;
        }
        for &(neighbor, _) in &adjacency.slots[current] {
            if visited[neighbor] {
                continue;
            }
            visited[neighbor] = true;
            parents[neighbor] = Some(current);
            queue.push_back(neighbor);
        }
    }

    (order, parents)
}

fn unwind(parents: &[Option<usize>], goal: usize) -> Vec<usize> {
    let mut path = vec![goal];
    let mut cursor = goal;
    while let Some(parent) = parents[cursor] {
        path.push(parent);
        cursor = parent;
    }
    path.reverse();
    path
}

/// Total order over path costs; weights are finite in practice.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cost(f64);

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Weighted shortest path from `start` to `target`.
///
/// In a directed graph only `source -> target` edges relax; otherwise edges
/// are walked from either endpoint. Equal costs pop in push order.
///
/// Returns `None` if any edge carries a negative weight.
#[must_use]
pub fn dijkstra_path(graph: &Graph, start: &str, target: &str) -> Option<Vec<String>> {
    if graph.edges.iter().any(|edge| edge.weight < 0.0) {
        return None;
    }
    let adjacency = Adjacency::oriented(graph, graph.directed);
    let origin = adjacency.slot(start)?;
    let goal = adjacency.slot(target)?;

    let mut distances = vec![f64::INFINITY; adjacency.len()];
    let mut previous: Vec<Option<usize>> = vec![None; adjacency.len()];
    let mut heap = BinaryHeap::new();
    let mut pushes = 0_usize;

    distances[origin] = 0.0;
    heap.push(Reverse((Cost(0.0), pushes, origin)));

    while let Some(Reverse((Cost(cost), _, current))) = heap.pop() {
        if current == goal {
            trace!(cost, pushes, "dijkstra reached target");
            return Some(adjacency.path_ids(unwind(&previous, goal)));
        }
        if cost > distances[current] {
            continue;
        }
        for &(neighbor, edge_index) in &adjacency.slots[current] {
            let weight = graph
                .edges
                .get(edge_index)
                .map_or(DEFAULT_EDGE_WEIGHT, |edge| edge.weight);
            let candidate = cost + weight;
            if candidate < distances[neighbor] {
                distances[neighbor] = candidate;
                previous[neighbor] = Some(current);
                pushes += 1;
                heap.push(Reverse((Cost(candidate), pushes, neighbor)));
            }
        }
    }

    None
}

/// Connected components in discovery order; members follow BFS order.
#[must_use]
pub fn connected_components(graph: &Graph) -> Vec<Vec<String>> {
    let adjacency = Adjacency::undirected(graph);
    let mut assigned = vec![false; adjacency.len()];
    let mut components = Vec::new();

    for origin in 0..adjacency.len() {
        if assigned[origin] {
            continue;
        }
        let (order, _) = bfs_from(&adjacency, origin, None);
        for &slot in &order {
            assigned[slot] = true;
        }
        components.push(adjacency.path_ids(order));
    }

    components
}

#[cfg(test)]
mod tests {
    use pen_core::Graph;

    use super::{connected_components, dijkstra_path, reachable, shortest_path};

    fn graph_with(nodes: &[&str], edges: &[(&str, &str, f64)]) -> Graph {
        let mut graph = Graph::new("test");
        for id in nodes {
            graph.create_node(id, None).expect("fresh node");
        }
        for (source, target, weight) in edges {
            graph
                .connect(source, target, Some(*weight))
                .expect("valid edge");
        }
        graph
    }

    #[test]
    fn reachable_follows_insertion_order() {
        let graph = graph_with(
            &["0", "1", "2", "3"],
            &[("0", "2", 1.0), ("1", "0", 1.0), ("2", "3", 1.0)],
        );
        assert_eq!(reachable(&graph, "0"), vec!["0", "2", "1", "3"]);
        assert!(reachable(&graph, "missing").is_empty());
    }

    #[test]
    fn shortest_path_ignores_direction() {
        let mut graph = graph_with(&["0", "1", "2"], &[("1", "0", 1.0), ("2", "1", 1.0)]);
        graph.directed = true;
        assert_eq!(
            shortest_path(&graph, "0", "2"),
            Some(vec!["0".to_string(), "1".to_string(), "2".to_string()])
        );
        assert_eq!(shortest_path(&graph, "1", "1"), Some(vec!["1".to_string()]));
    }

    #[test]
    fn shortest_path_reports_unreachable() {
        let graph = graph_with(&["0", "1", "2"], &[("0", "1", 1.0)]);
        assert_eq!(shortest_path(&graph, "0", "2"), None);
        assert_eq!(shortest_path(&graph, "0", "nope"), None);
    }

    #[test]
    fn dijkstra_prefers_cheaper_detour() {
        let graph = graph_with(
            &["a", "b", "c"],
            &[("a", "c", 10.0), ("a", "b", 2.0), ("b", "c", 3.0)],
        );
        assert_eq!(
            dijkstra_path(&graph, "a", "c"),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn dijkstra_respects_direction_flag() {
        let mut graph = graph_with(&["a", "b"], &[("b", "a", 1.0)]);
        assert!(dijkstra_path(&graph, "a", "b").is_some());
        graph.directed = true;
        assert_eq!(dijkstra_path(&graph, "a", "b"), None);
        assert!(dijkstra_path(&graph, "b", "a").is_some());
    }

    #[test]
    fn dijkstra_refuses_negative_weights() {
        let mut graph = graph_with(&["a", "b", "c"], &[("a", "b", 1.0), ("b", "c", 1.0)]);
        graph.edges[0].weight = -1.0;
        assert_eq!(dijkstra_path(&graph, "a", "c"), None);
    }

    #[test]
    fn components_in_discovery_order() {
        let graph = graph_with(
            &["x", "y", "z", "w"],
            &[("x", "z", 1.0), ("y", "w", 1.0)],
        );
        assert_eq!(
            connected_components(&graph),
            vec![
                vec!["x".to_string(), "z".to_string()],
                vec!["y".to_string(), "w".to_string()],
            ]
        );
        assert!(connected_components(&Graph::new("empty")).is_empty());
    }
}
