use pen_core::Graph;
use rustc_hash::FxHashMap;

/// Index-based undirected view of a graph.
///
/// Node slots follow store order; each slot lists `(neighbor, edge)` pairs in
/// edge insertion order. A self-loop contributes one entry to its node.
pub(crate) struct Adjacency<'a> {
    pub(crate) ids: Vec<&'a str>,
    pub(crate) slots: Vec<Vec<(usize, usize)>>,
    index: FxHashMap<&'a str, usize>,
}

impl<'a> Adjacency<'a> {
    pub(crate) fn undirected(graph: &'a Graph) -> Self {
        Self::build(graph, false)
    }

    /// Outgoing edges only when `directed` is set, both endpoints otherwise.
    pub(crate) fn oriented(graph: &'a Graph, directed: bool) -> Self {
        Self::build(graph, directed)
    }

    fn build(graph: &'a Graph, forward_only: bool) -> Self {
        let ids: Vec<&str> = graph.nodes.iter().map(|node| node.id.as_str()).collect();
        let mut index = FxHashMap::default();
        for (slot, id) in ids.iter().enumerate() {
            index.insert(*id, slot);
        }

        let mut slots = vec![Vec::new(); ids.len()];
        for (edge_index, edge) in graph.edges.iter().enumerate() {
            let (Some(&source), Some(&target)) = (
                index.get(edge.source.as_str()),
                index.get(edge.target.as_str()),
            ) else {
                continue;
            };
            slots[source].push((target, edge_index));
            if source != target && !forward_only {
                slots[target].push((source, edge_index));
            }
        }

        Self { ids, slots, index }
    }

    pub(crate) fn slot(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }

    pub(crate) fn path_ids(&self, slots: impl IntoIterator<Item = usize>) -> Vec<String> {
        slots
            .into_iter()
            .map(|slot| self.ids[slot].to_string())
            .collect()
    }
}
