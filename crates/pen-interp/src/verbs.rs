//! Statement verbs. Each returns the success message or the error that the
//! session records against the statement's line.

use pen_core::{EntityKind, NodeValue, PenError, PenResult, ValueKind};
use tracing::debug;

use crate::DEFAULT_SCRIPT;
use crate::env::format_number;
use crate::script::Script;
use crate::session::{RunSummary, Session};

fn invalid(family: &str, statement: &str) -> PenError {
    PenError::malformed(format!("Invalid {family} command: {statement}."))
}

/// Positional argument `index`, or a malformed-statement error naming `family`.
fn arg<'s>(parts: &[&'s str], index: usize, family: &str, statement: &str) -> PenResult<&'s str> {
    parts
        .get(index)
        .copied()
        .ok_or_else(|| invalid(family, statement))
}

fn joined<T: AsRef<str>>(items: &[T], separator: &str) -> String {
    items
        .iter()
        .map(|item| -> &str { item.as_ref() })
        .collect::<Vec<_>>()
        .join(separator)
}

impl Session {
    pub(crate) fn dispatch(&mut self, statement: &str, depth: usize) -> PenResult<String> {
        let parts: Vec<&str> = statement.split_whitespace().collect();
        let Some(&verb) = parts.first() else {
            return Err(PenError::malformed(format!("Invalid command: {statement}.")));
        };
        debug!(verb, graph = self.store.current_name(), "dispatching statement");

        match verb {
            "Initialize" => Ok(self.initialize(depth)),
            "Reset" => {
                self.store.reset_current();
                Ok("Graph has been reset.".to_string())
            }
            "Create" => self.create(&parts, statement),
            "Use" => self.use_graph(&parts, statement),
            "Let" => self.let_binding(&parts, statement),
            "Set" => self.set(&parts, statement),
            "Connect" => self.connect(&parts, statement),
            "Remove" => self.remove(&parts, statement),
            "Isolate" => self.isolate(&parts, statement),
            "Traverse" => self.traverse(&parts, statement),
            "Color" => self.color(&parts, statement),
            "Subdivide" => self.subdivide(&parts, statement),
            "Contract" => self.contract(&parts, statement),
            "Partition" => Ok(self.partition()),
            "Get" => self.get(&parts, statement),
            _ => Err(PenError::malformed(format!("Invalid command: {statement}."))),
        }
    }

    /// Reset the current graph and replay the bundled example into it. The
    /// example's own tally is discarded.
    fn initialize(&mut self, depth: usize) -> String {
        self.store.reset_current();
        let script = Script::parse_nested(DEFAULT_SCRIPT, self.config().max_block_depth);
        let mut discarded = RunSummary::default();
        self.execute(&script.items, depth, &mut discarded);
        debug!(
            success = discarded.success,
            errors = discarded.errors,
            "default example loaded"
        );
        "Graph initialized with a default example.".to_string()
    }

    fn create(&mut self, parts: &[&str], statement: &str) -> PenResult<String> {
        match arg(parts, 1, "CREATE", statement)? {
            "GRAPH" => {
                let name = arg(parts, 2, "CREATE", statement)?;
                self.store.create_graph(name)?;
                Ok(format!("Created graph {name}."))
            }
            "Node" => self.create_node(parts, statement),
            _ => Err(invalid("CREATE", statement)),
        }
    }

    /// `Create Node <id> [VALUE <literal...> [AS <kind>]]`
    fn create_node(&mut self, parts: &[&str], statement: &str) -> PenResult<String> {
        let id = self.env.resolve(arg(parts, 2, "CREATE", statement)?)?;
        let value = match parts.get(3).copied() {
            None => None,
            Some("VALUE") => Some(self.node_value(&parts[4..], statement)?),
            Some(_) => return Err(invalid("CREATE", statement)),
        };

        let message = match &value {
            Some(value) => format!("Created node {id} with value {}.", value.raw),
            None => format!("Created node {id}."),
        };
        self.store.current_mut().create_node(&id, value)?;
        Ok(message)
    }

    fn node_value(&self, tokens: &[&str], statement: &str) -> PenResult<NodeValue> {
        let (literal, kind) = match tokens.iter().position(|token| *token == "AS") {
            Some(at) => {
                let name = arg(tokens, at + 1, "CREATE", statement)?;
                let kind = ValueKind::parse(name)
                    .ok_or_else(|| PenError::malformed(format!("Unknown value kind: {name}.")))?;
                (&tokens[..at], kind)
            }
            None => (tokens, ValueKind::Undefined),
        };
        if literal.is_empty() {
            return Err(invalid("CREATE", statement));
        }

        let raw = if literal.len() == 1 {
            self.env.resolve(literal[0])?
        } else {
            joined(literal, " ")
        };
        Ok(NodeValue::with_kind(&raw, kind))
    }

    fn use_graph(&mut self, parts: &[&str], statement: &str) -> PenResult<String> {
        if arg(parts, 1, "USE", statement)? != "GRAPH" {
            return Err(invalid("USE", statement));
        }
        let name = arg(parts, 2, "USE", statement)?;
        self.store.use_graph(name)?;
        Ok(format!("Now using graph {name}."))
    }

    /// `Let <var> = <expression>`
    fn let_binding(&mut self, parts: &[&str], statement: &str) -> PenResult<String> {
        let name = arg(parts, 1, "LET", statement)?;
        let valid_name = name.chars().all(|c| c.is_alphanumeric() || c == '_');
        if !valid_name || arg(parts, 2, "LET", statement)? != "=" || parts.len() < 4 {
            return Err(invalid("LET", statement));
        }
        let value = self.env.evaluate(&joined(&parts[3..], " "))?;
        self.env.set(name, value);
        Ok(format!("Set variable {name} = {}.", format_number(value)))
    }

    fn set(&mut self, parts: &[&str], statement: &str) -> PenResult<String> {
        let setting = arg(parts, 1, "SET", statement)?.to_ascii_lowercase();
        match setting.as_str() {
            "background" => {
                let name = parts.get(2).copied().unwrap_or("white");
                self.store.current_mut().set_background(name);
                Ok(format!(
                    "Canvas background set to {}.",
                    name.to_ascii_lowercase()
                ))
            }
            "directed" => {
                let directed = parts.get(2).is_some_and(|v| v.eq_ignore_ascii_case("true"));
                self.store.current_mut().directed = directed;
                Ok(if directed {
                    "Graph set to directed."
                } else {
                    "Graph set to undirected."
                }
                .to_string())
            }
            "weighted" => {
                let weighted = parts.get(2).is_some_and(|v| v.eq_ignore_ascii_case("true"));
                self.store.current_mut().weighted = weighted;
                Ok(if weighted {
                    "Graph set to weighted."
                } else {
                    "Graph set to unweighted."
                }
                .to_string())
            }
            "node_color" => {
                let id = self.env.resolve(arg(parts, 2, "SET", statement)?)?;
                let color = arg(parts, 3, "SET", statement)?;
                self.store.current_mut().set_node_color(&id, color)?;
                Ok(format!("Node {id} color set to {color}."))
            }
            _ => Err(invalid("SET", statement)),
        }
    }

    /// `Connect <a> To <b> [WEIGHT <n>]`; the weight only counts on a
    /// weighted graph.
    fn connect(&mut self, parts: &[&str], statement: &str) -> PenResult<String> {
        arg(parts, 2, "CONNECT", statement)?;
        let source = self.env.resolve(arg(parts, 1, "CONNECT", statement)?)?;
        let target = self.env.resolve(arg(parts, 3, "CONNECT", statement)?)?;

        let weighted = self.store.current().weighted;
        let weight = if weighted && parts.get(4) == Some(&"WEIGHT") {
            Some(self.env.evaluate(arg(parts, 5, "CONNECT", statement)?)?)
        } else {
            None
        };

        self.store.current_mut().connect(&source, &target, weight)?;
        Ok(match weight {
            Some(weight) => format!(
                "Connected node {source} to {target} with weight {}.",
                format_number(weight)
            ),
            None if weighted => format!("Connected node {source} to {target} with weight 1."),
            None => format!("Connected node {source} to {target}."),
        })
    }

    fn remove(&mut self, parts: &[&str], statement: &str) -> PenResult<String> {
        match arg(parts, 1, "REMOVE", statement)? {
            "Node" => {
                let id = self.env.resolve(arg(parts, 2, "REMOVE", statement)?)?;
                self.store.current_mut().remove_node(&id)?;
                Ok(format!("Removed node {id} and its incident edges."))
            }
            "EDGE" => {
                arg(parts, 3, "REMOVE", statement)?;
                let source = self.env.resolve(arg(parts, 2, "REMOVE", statement)?)?;
                let target = self.env.resolve(arg(parts, 4, "REMOVE", statement)?)?;
                self.store.current_mut().remove_edge(&source, &target)?;
                Ok(format!("Removed edge between {source} and {target}."))
            }
            _ => Err(invalid("REMOVE", statement)),
        }
    }

    fn isolate(&mut self, parts: &[&str], statement: &str) -> PenResult<String> {
        if arg(parts, 1, "ISOLATE", statement)? != "Node" {
            return Err(invalid("ISOLATE", statement));
        }
        let id = self.env.resolve(arg(parts, 2, "ISOLATE", statement)?)?;
        self.store.current_mut().isolate_node(&id)?;
        Ok(format!("Isolated node {id}."))
    }

    fn traverse(&mut self, parts: &[&str], statement: &str) -> PenResult<String> {
        let start = self.env.resolve(arg(parts, 1, "TRAVERSE", statement)?)?;
        let visited = pen_algo::reachable(self.store.current(), &start);
        if visited.is_empty() {
            return Err(PenError::not_found(EntityKind::Node, start));
        }
        self.store
            .current_mut()
            .mark_traversed(visited.iter().map(String::as_str));
        Ok(format!(
            "Traversed graph from node {start}. Nodes visited: {}.",
            joined(&visited, ", ")
        ))
    }

    fn color(&self, parts: &[&str], statement: &str) -> PenResult<String> {
        if arg(parts, 1, "COLOR", statement)? != "GRAPH" {
            return Err(invalid("COLOR", statement));
        }
        let assignment: Vec<String> = pen_algo::greedy_coloring(self.store.current())
            .into_iter()
            .map(|(id, color)| format!("{id}: Color {color}"))
            .collect();
        Ok(format!(
            "Graph colored with a greedy algorithm: {}.",
            joined(&assignment, ", ")
        ))
    }

    /// `Subdivide EDGE <a> <b> WITH <new>`; words at positions 1 and 4 are
    /// not checked.
    fn subdivide(&mut self, parts: &[&str], statement: &str) -> PenResult<String> {
        arg(parts, 4, "SUBDIVIDE", statement)?;
        let source = self.env.resolve(arg(parts, 2, "SUBDIVIDE", statement)?)?;
        let target = self.env.resolve(arg(parts, 3, "SUBDIVIDE", statement)?)?;
        let new_id = self.env.resolve(arg(parts, 5, "SUBDIVIDE", statement)?)?;
        self.store
            .current_mut()
            .subdivide_edge(&source, &target, &new_id)?;
        Ok(format!(
            "Subdivided edge between {source} and {target} with new node {new_id}."
        ))
    }

    fn contract(&mut self, parts: &[&str], statement: &str) -> PenResult<String> {
        let a = self.env.resolve(arg(parts, 1, "CONTRACT", statement)?)?;
        let b = self.env.resolve(arg(parts, 2, "CONTRACT", statement)?)?;
        let merged = self.store.current_mut().contract_nodes(&a, &b)?;
        Ok(format!("Contracted nodes {a} and {b} into a new node {merged}."))
    }

    fn partition(&self) -> String {
        let components = pen_algo::connected_components(self.store.current());
        let details: Vec<String> = components
            .iter()
            .enumerate()
            .map(|(index, members)| format!("Component {}: {}", index + 1, joined(members, ", ")))
            .collect();
        format!(
            "Graph partitioned into {} components. Details: {}",
            components.len(),
            joined(&details, "; ")
        )
    }

    fn get(&self, parts: &[&str], statement: &str) -> PenResult<String> {
        let graph = self.store.current();
        match arg(parts, 1, "GET", statement)? {
            "DEGREE" => {
                let id = self.env.resolve(arg(parts, 2, "GET", statement)?)?;
                if !graph.contains_node(&id) {
                    return Err(PenError::not_found(EntityKind::Node, id));
                }
                let degree = pen_algo::degree(graph, &id);
                Ok(format!("The degree of node {id} is {degree}."))
            }
            "CHROMATIC_NUMBER" => Ok(format!(
                "The chromatic number of the graph (greedy approximation) is {}.",
                pen_algo::chromatic_number(graph)
            )),
            "PATH" => {
                let start = self.env.resolve(arg(parts, 2, "GET", statement)?)?;
                let target = self.env.resolve(arg(parts, 3, "GET", statement)?)?;
                let (method, path) = if graph.weighted {
                    ("Dijkstra's", pen_algo::dijkstra_path(graph, &start, &target))
                } else {
                    ("BFS", pen_algo::shortest_path(graph, &start, &target))
                };
                let path = path.ok_or_else(|| {
                    PenError::rejected(format!("No path found from {start} to {target}."))
                })?;
                Ok(format!("Shortest path ({method}): {}", joined(&path, " -> ")))
            }
            "COMPONENTS" => {
                let components = pen_algo::connected_components(graph);
                let listed: Vec<String> = components
                    .iter()
                    .enumerate()
                    .map(|(index, members)| {
                        format!("Component {}: [{}]", index + 1, joined(members, ", "))
                    })
                    .collect();
                Ok(format!(
                    "Found {} connected components: {}",
                    components.len(),
                    joined(&listed, ", ")
                ))
            }
            "PROPERTIES" => Ok(format!(
                "Graph properties: {}.",
                pen_algo::GraphProperties::of(graph).summary()
            )),
            _ => Err(invalid("GET", statement)),
        }
    }
}
