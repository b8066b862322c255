#![forbid(unsafe_code)]

//! Graph algorithms over [`pen_core::Graph`]: traversal, shortest paths,
//! components, greedy coloring, and structural checks.

mod adjacency;
mod coloring;
mod properties;
mod traversal;

pub use coloring::{chromatic_number, greedy_coloring};
pub use properties::{
    GraphProperties, are_adjacent, degree, is_acyclic, is_bipartite, is_complete, is_connected,
    is_forest, is_regular, is_simple, is_tree,
};
pub use traversal::{connected_components, dijkstra_path, reachable, shortest_path};
