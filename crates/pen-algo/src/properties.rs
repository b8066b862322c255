use std::collections::{BTreeSet, VecDeque};

use pen_core::Graph;
use serde::Serialize;

use crate::adjacency::Adjacency;
use crate::chromatic_number;
use crate::traversal::reachable;

/// Number of edges touching `id`. A self-loop counts once; `(a, b)` and
/// `(b, a)` count separately.
#[must_use]
pub fn degree(graph: &Graph, id: &str) -> usize {
    graph.edges.iter().filter(|edge| edge.touches(id)).count()
}

/// True when an edge joins the two nodes in either direction.
#[must_use]
pub fn are_adjacent(graph: &Graph, a: &str, b: &str) -> bool {
    graph.edges.iter().any(|edge| edge.joins(a, b))
}

/// True when the empty graph, or when every node is reachable from the first one.
#[must_use]
pub fn is_connected(graph: &Graph) -> bool {
    let Some(first) = graph.nodes.first() else {
        return true;
    };
    reachable(graph, &first.id).len() == graph.nodes.len()
}

/// Undirected cycle check. Only the edge used to enter a node is exempt from
/// closing a cycle, so self-loops and parallel edges both count.
#[must_use]
pub fn is_acyclic(graph: &Graph) -> bool {
    let adjacency = Adjacency::undirected(graph);
    let mut visited = vec![false; adjacency.len()];
    let mut on_stack = vec![false; adjacency.len()];

    for root in 0..adjacency.len() {
        if visited[root] {
            continue;
        }
        // (node, edge used to reach it, next adjacency cursor)
        let mut stack: Vec<(usize, Option<usize>, usize)> = vec![(root, None, 0)];
        visited[root] = true;
        on_stack[root] = true;

        while let Some(frame) = stack.last_mut() {
            let (node, arrived_by, cursor) = *frame;
            let Some(&(neighbor, edge_index)) = adjacency.slots[node].get(cursor) else {
                on_stack[node] = false;
                stack.pop();
                continue;
            };
            frame.2 += 1;

            if Some(edge_index) == arrived_by {
                continue;
            }
            if !visited[neighbor] {
                visited[neighbor] = true;
                on_stack[neighbor] = true;
                stack.push((neighbor, Some(edge_index), 0));
            } else if on_stack[neighbor] {
                return false;
            }
        }
    }

    true
}

#[must_use]
pub fn is_tree(graph: &Graph) -> bool {
    is_connected(graph) && is_acyclic(graph)
}

#[must_use]
pub fn is_forest(graph: &Graph) -> bool {
    is_acyclic(graph)
}

/// No self-loops and no two edges joining the same unordered pair.
#[must_use]
pub fn is_simple(graph: &Graph) -> bool {
    let mut seen: BTreeSet<(&str, &str)> = BTreeSet::new();
    for edge in &graph.edges {
        if edge.is_self_loop() {
            return false;
        }
        let key = if edge.source <= edge.target {
            (edge.source.as_str(), edge.target.as_str())
        } else {
            (edge.target.as_str(), edge.source.as_str())
        };
        if !seen.insert(key) {
            return false;
        }
    }
    true
}

/// Every node has the same degree. Graphs with at most one node qualify.
#[must_use]
pub fn is_regular(graph: &Graph) -> bool {
    let mut degrees = graph.nodes.iter().map(|node| degree(graph, &node.id));
    let Some(first) = degrees.next() else {
        return true;
    };
    degrees.all(|value| value == first)
}

/// Simple, with exactly `n(n-1)/2` edges.
#[must_use]
pub fn is_complete(graph: &Graph) -> bool {
    let n = graph.nodes.len();
    is_simple(graph) && graph.edges.len() == n * n.saturating_sub(1) / 2
}

/// Breadth-first two-coloring of every component.
#[must_use]
pub fn is_bipartite(graph: &Graph) -> bool {
    let adjacency = Adjacency::undirected(graph);
    let mut side: Vec<Option<bool>> = vec![None; adjacency.len()];

    for root in 0..adjacency.len() {
        if side[root].is_some() {
            continue;
        }
        side[root] = Some(false);
        let mut queue = VecDeque::from([root]);
        while let Some(current) = queue.pop_front() {
            let current_side = side[current].unwrap_or(false);
            for &(neighbor, _) in &adjacency.slots[current] {
                match side[neighbor] {
                    None => {
                        side[neighbor] = Some(!current_side);
                        queue.push_back(neighbor);
                    }
                    Some(neighbor_side) if neighbor_side == current_side => return false,
                    Some(_) => {}
                }
            }
        }
    }

    true
}

/// One-shot structural report over the current graph.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct GraphProperties {
    pub node_count: usize,
    pub edge_count: usize,
    pub directed: bool,
    pub weighted: bool,
    pub connected: bool,
    pub acyclic: bool,
    pub tree: bool,
    pub forest: bool,
    pub simple: bool,
    pub regular: bool,
    pub complete: bool,
    pub bipartite: bool,
    pub chromatic_number: usize,
}

impl GraphProperties {
    #[must_use]
    pub fn of(graph: &Graph) -> Self {
        let connected = is_connected(graph);
        let acyclic = is_acyclic(graph);
        Self {
            node_count: graph.nodes.len(),
            edge_count: graph.edges.len(),
            directed: graph.directed,
            weighted: graph.weighted,
            connected,
            acyclic,
            tree: connected && acyclic,
            forest: acyclic,
            simple: is_simple(graph),
            regular: is_regular(graph),
            complete: is_complete(graph),
            bipartite: is_bipartite(graph),
            chromatic_number: chromatic_number(graph),
        }
    }

    /// Single-line summary used by `Get PROPERTIES`.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} nodes, {} edges; connected={}, acyclic={}, tree={}, forest={}, simple={}, regular={}, complete={}, bipartite={}, chromatic number={}",
            self.node_count,
            self.edge_count,
            self.connected,
            self.acyclic,
            self.tree,
            self.forest,
            self.simple,
            self.regular,
            self.complete,
            self.bipartite,
            self.chromatic_number,
        )
    }
}

#[cfg(test)]
mod tests {
    use pen_core::Graph;

    use super::{
        GraphProperties, are_adjacent, degree, is_acyclic, is_bipartite, is_complete,
        is_connected, is_forest, is_regular, is_simple, is_tree,
    };

    fn graph_with(nodes: &[&str], edges: &[(&str, &str)]) -> Graph {
        let mut graph = Graph::new("test");
        for id in nodes {
            graph.create_node(id, None).expect("fresh node");
        }
        for (source, target) in edges {
            graph.connect(source, target, None).expect("valid edge");
        }
        graph
    }

    #[test]
    fn empty_graph_is_vacuously_everything() {
        let graph = Graph::new("empty");
        assert!(is_connected(&graph));
        assert!(is_acyclic(&graph));
        assert!(is_tree(&graph));
        assert!(is_regular(&graph));
        assert!(is_complete(&graph));
        assert!(is_bipartite(&graph));
    }

    #[test]
    fn path_is_a_tree() {
        let graph = graph_with(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        assert!(is_tree(&graph));
        assert!(is_bipartite(&graph));
        assert!(!is_regular(&graph));
        assert_eq!(degree(&graph, "b"), 2);
    }

    #[test]
    fn triangle_has_cycle_and_is_complete() {
        let graph = graph_with(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "a")]);
        assert!(!is_acyclic(&graph));
        assert!(!is_forest(&graph));
        assert!(is_complete(&graph));
        assert!(is_regular(&graph));
        assert!(!is_bipartite(&graph));
    }

    #[test]
    fn self_loop_is_a_cycle_and_not_simple() {
        let graph = graph_with(&["a"], &[("a", "a")]);
        assert!(!is_acyclic(&graph));
        assert!(!is_simple(&graph));
        assert_eq!(degree(&graph, "a"), 1);
    }

    #[test]
    fn antiparallel_edges_form_a_cycle() {
        let graph = graph_with(&["a", "b"], &[("a", "b"), ("b", "a")]);
        assert!(!is_acyclic(&graph));
        assert!(!is_simple(&graph));
        assert!(are_adjacent(&graph, "b", "a"));
        assert_eq!(degree(&graph, "a"), 2);
    }

    #[test]
    fn disconnected_forest() {
        let graph = graph_with(&["a", "b", "c", "d"], &[("a", "b"), ("c", "d")]);
        assert!(!is_connected(&graph));
        assert!(is_forest(&graph));
        assert!(!is_tree(&graph));
    }

    #[test]
    fn properties_report_matches_individual_checks() {
        let graph = graph_with(&["a", "b", "c", "d"], &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "a")]);
        let props = GraphProperties::of(&graph);
        assert!(props.connected && !props.acyclic && !props.tree);
        assert!(props.bipartite && props.regular && props.simple && !props.complete);
        assert_eq!(props.chromatic_number, 2);
        assert!(props.summary().starts_with("4 nodes, 4 edges"));
    }
}
