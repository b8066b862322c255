use pen_core::DEFAULT_GRAPH_NAME;
use serde::{Deserialize, Serialize};

pub const DEFAULT_WHILE_ITERATION_LIMIT: usize = 100;
pub const DEFAULT_MAX_BLOCK_DEPTH: usize = 64;

/// Session limits and startup state. Every field has a default, so partial
/// TOML files and JS objects deserialize cleanly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    /// Hard ceiling on `While` iterations, independent of the condition.
    pub while_iteration_limit: usize,
    /// Deepest block nesting a script may reach before it is rejected.
    pub max_block_depth: usize,
    /// Name of the graph selected when the session starts.
    pub default_graph: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            while_iteration_limit: DEFAULT_WHILE_ITERATION_LIMIT,
            max_block_depth: DEFAULT_MAX_BLOCK_DEPTH,
            default_graph: DEFAULT_GRAPH_NAME.to_string(),
        }
    }
}
