//! Nodes, edges, and the mutations a single graph supports.

use serde::{Deserialize, Serialize};

use crate::{EntityKind, NodeValue, PenError, PenResult};

pub const DEFAULT_NODE_COLOR: &str = "#4a90e2";
pub const DEFAULT_BACKGROUND: &str = "#f5f5f5";
pub const DEFAULT_EDGE_WEIGHT: f64 = 1.0;

/// Named background colors accepted by `Set Background`.
const BACKGROUND_COLORS: &[(&str, &str)] = &[
    ("black", "#1E1E1E"),
    ("red", "#FF5555"),
    ("blue", "#6272A4"),
    ("green", "#50FA7B"),
    ("yellow", "#F1FA8C"),
    ("purple", "#BD93F9"),
    ("white", "#F5F5F5"),
    ("clear", "transparent"),
];

/// Map a background color name to its fixed value. Unknown names pass through.
#[must_use]
pub fn background_color(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    BACKGROUND_COLORS
        .iter()
        .find(|(known, _)| *known == lower)
        .map_or_else(|| name.to_string(), |(_, value)| (*value).to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: String,
    pub value: Option<NodeValue>,
    pub color: String,
    /// Set by the most recent `Traverse`.
    pub traversed: bool,
}

impl Node {
    #[must_use]
    pub fn new(id: impl Into<String>, value: Option<NodeValue>) -> Self {
        Self {
            id: id.into(),
            value,
            color: DEFAULT_NODE_COLOR.to_string(),
            traversed: false,
        }
    }
}

/// Endpoints reference node ids by value. Directedness belongs to the graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

impl Edge {
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>, weight: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight,
        }
    }

    #[must_use]
    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }

    /// True for `(a, b)` or `(b, a)`.
    #[must_use]
    pub fn joins(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }

    /// The endpoint opposite `id`, or `None` if the edge does not touch it.
    #[must_use]
    pub fn opposite(&self, id: &str) -> Option<&str> {
        if self.source == id {
            Some(&self.target)
        } else if self.target == id {
            Some(&self.source)
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Graph {
    pub name: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub directed: bool,
    pub weighted: bool,
    pub background: String,
}

impl Graph {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            directed: false,
            weighted: false,
            background: DEFAULT_BACKGROUND.to_string(),
        }
    }

    /// Clear nodes, edges, flags, and background. The name is kept.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.directed = false;
        self.weighted = false;
        self.background = DEFAULT_BACKGROUND.to_string();
    }

    #[must_use]
    pub fn find_node_index(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|node| node.id == id)
    }

    #[must_use]
    pub fn find_node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    #[must_use]
    pub fn contains_node(&self, id: &str) -> bool {
        self.find_node(id).is_some()
    }

    fn require_node(&self, id: &str) -> PenResult<()> {
        if self.contains_node(id) {
            Ok(())
        } else {
            Err(PenError::not_found(EntityKind::Node, id))
        }
    }

    /// Neighbor ids of `id` in edge insertion order, ignoring direction.
    pub fn neighbors<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.edges.iter().filter_map(move |edge| edge.opposite(id))
    }

    /// Insert a node with an optional, already-classified value.
    pub fn create_node(&mut self, id: &str, value: Option<NodeValue>) -> PenResult<()> {
        if self.contains_node(id) {
            return Err(PenError::duplicate(EntityKind::Node, id));
        }
        self.nodes.push(Node::new(id, value));
        Ok(())
    }

    /// Remove a node and every edge incident to it. Returns the removed edge count.
    pub fn remove_node(&mut self, id: &str) -> PenResult<usize> {
        let index = self
            .find_node_index(id)
            .ok_or_else(|| PenError::not_found(EntityKind::Node, id))?;
        self.nodes.remove(index);
        Ok(self.drop_incident_edges(id))
    }

    /// Add an edge. Duplicates are detected on the exact ordered pair only.
    /// Negative weights are rejected.
    pub fn connect(&mut self, source: &str, target: &str, weight: Option<f64>) -> PenResult<()> {
        if !self.contains_node(source) || !self.contains_node(target) {
            let missing = if self.contains_node(source) {
                target
            } else {
                source
            };
            return Err(PenError::not_found(EntityKind::Node, missing));
        }
        if self
            .edges
            .iter()
            .any(|edge| edge.source == source && edge.target == target)
        {
            return Err(PenError::duplicate(
                EntityKind::Edge,
                edge_label(source, target),
            ));
        }
        let weight = weight.unwrap_or(DEFAULT_EDGE_WEIGHT);
        if weight < 0.0 {
            return Err(PenError::rejected(format!(
                "Edge weight must not be negative: {weight}."
            )));
        }
        self.edges.push(Edge::new(source, target, weight));
        Ok(())
    }

    /// Remove every edge joining the pair in either direction.
    pub fn remove_edge(&mut self, source: &str, target: &str) -> PenResult<usize> {
        let before = self.edges.len();
        self.edges.retain(|edge| !edge.joins(source, target));
        let removed = before - self.edges.len();
        if removed == 0 {
            return Err(PenError::not_found(
                EntityKind::Edge,
                edge_label(source, target),
            ));
        }
        Ok(removed)
    }

    /// Drop every edge touching `id` but keep the node.
    pub fn isolate_node(&mut self, id: &str) -> PenResult<usize> {
        self.require_node(id)?;
        Ok(self.drop_incident_edges(id))
    }

    pub fn set_node_color(&mut self, id: &str, color: &str) -> PenResult<()> {
        let node = self
            .nodes
            .iter_mut()
            .find(|node| node.id == id)
            .ok_or_else(|| PenError::not_found(EntityKind::Node, id))?;
        node.color = color.to_string();
        Ok(())
    }

    /// Set the background from a color name and return the stored value.
    pub fn set_background(&mut self, name: &str) -> &str {
        self.background = background_color(name);
        &self.background
    }

    /// Flag exactly the given nodes as traversed.
    pub fn mark_traversed<'a>(&mut self, visited: impl IntoIterator<Item = &'a str>) {
        let visited: Vec<&str> = visited.into_iter().collect();
        for node in &mut self.nodes {
            node.traversed = visited.contains(&node.id.as_str());
        }
    }

    /// Replace the edge between `source` and `target` with a path through a new node.
    ///
    /// The first matching edge in either direction is replaced; the two new
    /// edges keep its orientation.
    pub fn subdivide_edge(&mut self, source: &str, target: &str, new_id: &str) -> PenResult<()> {
        let index = self
            .edges
            .iter()
            .position(|edge| edge.joins(source, target))
            .ok_or_else(|| PenError::not_found(EntityKind::Edge, edge_label(source, target)))?;
        if self.contains_node(new_id) {
            return Err(PenError::duplicate(EntityKind::Node, new_id));
        }

        let replaced = self.edges.remove(index);
        self.nodes.push(Node::new(new_id, None));
        self.edges.push(Edge::new(
            replaced.source,
            new_id,
            DEFAULT_EDGE_WEIGHT,
        ));
        self.edges.push(Edge::new(
            new_id,
            replaced.target,
            DEFAULT_EDGE_WEIGHT,
        ));
        Ok(())
    }

    /// Merge two adjacent nodes into a new node whose id is `a` followed by `b`.
    pub fn contract_nodes(&mut self, a: &str, b: &str) -> PenResult<String> {
        if !self.edges.iter().any(|edge| edge.joins(a, b)) {
            return Err(PenError::rejected(format!(
                "Cannot contract non-adjacent nodes {a} and {b}."
            )));
        }
        let merged_id = format!("{a}{b}");
        if self.contains_node(&merged_id) {
            return Err(PenError::duplicate(EntityKind::Node, merged_id));
        }

        self.nodes.retain(|node| node.id != a && node.id != b);
        self.nodes.push(Node::new(merged_id.clone(), None));

        let is_pair = |id: &str| id == a || id == b;
        self.edges
            .retain(|edge| !(is_pair(&edge.source) && is_pair(&edge.target)));
        for edge in &mut self.edges {
            if is_pair(&edge.source) {
                edge.source.clone_from(&merged_id);
            }
            if is_pair(&edge.target) {
                edge.target.clone_from(&merged_id);
            }
        }
        Ok(merged_id)
    }

    fn drop_incident_edges(&mut self, id: &str) -> usize {
        let before = self.edges.len();
        self.edges.retain(|edge| !edge.touches(id));
        before - self.edges.len()
    }
}

fn edge_label(source: &str, target: &str) -> String {
    format!("between {source} and {target}")
}
