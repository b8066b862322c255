use serde::{Deserialize, Serialize};

use crate::{EntityKind, Graph, PenError, PenResult};

pub const DEFAULT_GRAPH_NAME: &str = "main";

/// Owned copy of the current graph plus the registry's names, handed to
/// renderers and serialized by the CLI and wasm surfaces.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphSnapshot {
    #[serde(flatten)]
    pub graph: Graph,
    pub graphs: Vec<String>,
}

/// Registry of named graphs with a single current-graph selector.
///
/// Graphs are never removed, so `current` always indexes a live entry.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GraphStore {
    graphs: Vec<Graph>,
    current: usize,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new(DEFAULT_GRAPH_NAME)
    }
}

impl GraphStore {
    /// Create a store whose current graph is a fresh graph called `initial`.
    #[must_use]
    pub fn new(initial: &str) -> Self {
        Self {
            graphs: vec![Graph::new(initial)],
            current: 0,
        }
    }

    #[must_use]
    pub fn current_name(&self) -> &str {
        &self.current().name
    }

    #[must_use]
    pub fn current(&self) -> &Graph {
        &self.graphs[self.current]
    }

    pub fn current_mut(&mut self) -> &mut Graph {
        &mut self.graphs[self.current]
    }

    #[must_use]
    pub fn graph(&self, name: &str) -> Option<&Graph> {
        self.graphs.iter().find(|graph| graph.name == name)
    }

    /// Graph names in creation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.graphs.iter().map(|graph| graph.name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    /// Register an empty graph. The current selector does not move.
    pub fn create_graph(&mut self, name: &str) -> PenResult<()> {
        if self.graph(name).is_some() {
            return Err(PenError::duplicate(EntityKind::Graph, name));
        }
        self.graphs.push(Graph::new(name));
        Ok(())
    }

    pub fn use_graph(&mut self, name: &str) -> PenResult<&Graph> {
        let index = self
            .graphs
            .iter()
            .position(|graph| graph.name == name)
            .ok_or_else(|| PenError::not_found(EntityKind::Graph, name))?;
        self.current = index;
        Ok(&self.graphs[index])
    }

    pub fn reset_current(&mut self) {
        self.current_mut().reset();
    }

    #[must_use]
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            graph: self.current().clone(),
            graphs: self.names().map(str::to_string).collect(),
        }
    }
}
