use pen_core::Graph;

use crate::adjacency::Adjacency;

/// Greedy coloring in node store order.
///
/// Each node takes the smallest color index unused by its already-colored
/// neighbors. Direction is ignored and self-loops never block a color.
#[must_use]
pub fn greedy_coloring(graph: &Graph) -> Vec<(String, usize)> {
    let adjacency = Adjacency::undirected(graph);
    let mut colors: Vec<Option<usize>> = vec![None; adjacency.len()];

    for slot in 0..adjacency.len() {
        let mut used = vec![false; adjacency.slots[slot].len() + 1];
        for &(neighbor, _) in &adjacency.slots[slot] {
            if let Some(taken) = colors[neighbor].and_then(|color| used.get_mut(color)) {
                *taken = true;
            }
        }
        let chosen = used.iter().position(|taken| !taken).unwrap_or(used.len());
        colors[slot] = Some(chosen);
    }

    adjacency
        .ids
        .iter()
        .zip(colors)
        .map(|(id, color)| ((*id).to_string(), color.unwrap_or_default()))
        .collect()
}

/// Number of colors used by [`greedy_coloring`]; zero for an empty graph.
#[must_use]
pub fn chromatic_number(graph: &Graph) -> usize {
    greedy_coloring(graph)
        .iter()
        .map(|(_, color)| color + 1)
        .max()
        .unwrap_or(0)
}
