use pen_core::{Graph, PenError, PenResult};

use crate::env::Environment;

/// Structural predicates usable as `If`/`While` conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    HasCycle,
    IsAcyclic,
    IsTree,
    IsForest,
    IsConnected,
    IsSimple,
    IsRegular,
    IsComplete,
    IsBipartite,
}

impl Check {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HasCycle => "HAS_CYCLE",
            Self::IsAcyclic => "IS_ACYCLIC",
            Self::IsTree => "IS_TREE",
            Self::IsForest => "IS_FOREST",
            Self::IsConnected => "IS_CONNECTED",
            Self::IsSimple => "IS_SIMPLE",
            Self::IsRegular => "IS_REGULAR",
            Self::IsComplete => "IS_COMPLETE",
            Self::IsBipartite => "IS_BIPARTITE",
        }
    }

    #[must_use]
    pub fn parse(keyword: &str) -> Option<Self> {
        [
            Self::HasCycle,
            Self::IsAcyclic,
            Self::IsTree,
            Self::IsForest,
            Self::IsConnected,
            Self::IsSimple,
            Self::IsRegular,
            Self::IsComplete,
            Self::IsBipartite,
        ]
        .into_iter()
        .find(|check| check.as_str() == keyword)
    }

    #[must_use]
    pub fn holds(self, graph: &Graph) -> bool {
        match self {
            Self::HasCycle => !pen_algo::is_acyclic(graph),
            Self::IsAcyclic => pen_algo::is_acyclic(graph),
            Self::IsTree => pen_algo::is_tree(graph),
            Self::IsForest => pen_algo::is_forest(graph),
            Self::IsConnected => pen_algo::is_connected(graph),
            Self::IsSimple => pen_algo::is_simple(graph),
            Self::IsRegular => pen_algo::is_regular(graph),
            Self::IsComplete => pen_algo::is_complete(graph),
            Self::IsBipartite => pen_algo::is_bipartite(graph),
        }
    }
}

/// Parsed control-flow condition. Text that matches no form is kept as
/// `Unknown` and always evaluates to false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Check(Check),
    /// `CONNECTED a b`; operands may be `$variables`.
    Connected(String, String),
    Not(Box<Condition>),
    Unknown(String),
}

impl Condition {
    /// Parse condition text. Stacked `NOT`s cancel in pairs, so the result
    /// holds at most one `Not` layer.
    pub fn parse(text: &str) -> PenResult<Self> {
        let mut text = text.trim();
        let mut negated = false;
        while let Some(rest) = text.strip_prefix("NOT ") {
            negated = !negated;
            text = rest.trim_start();
        }
        let condition = Self::parse_positive(text)?;
        Ok(if negated {
            Self::Not(Box::new(condition))
        } else {
            condition
        })
    }

    fn parse_positive(text: &str) -> PenResult<Self> {
        if let Some(check) = Check::parse(text) {
            return Ok(Self::Check(check));
        }
        if let Some(rest) = text.strip_prefix("CONNECTED ") {
            let operands: Vec<&str> = rest.split_whitespace().collect();
            return match operands.as_slice() {
                [a, b] => Ok(Self::Connected((*a).to_string(), (*b).to_string())),
                _ => Err(PenError::malformed(format!(
                    "CONNECTED expects two nodes: {text}"
                ))),
            };
        }
        Ok(Self::Unknown(text.to_string()))
    }

    /// Evaluate against the current graph. Fails only when a `$variable`
    /// operand is unbound.
    pub fn evaluate(&self, graph: &Graph, env: &Environment) -> PenResult<bool> {
        match self {
            Self::Check(check) => Ok(check.holds(graph)),
            Self::Connected(a, b) => {
                let a = env.resolve(a)?;
                let b = env.resolve(b)?;
                Ok(pen_algo::are_adjacent(graph, &a, &b))
            }
            Self::Not(inner) => inner.evaluate(graph, env).map(|value| !value),
            Self::Unknown(_) => Ok(false),
        }
    }
}
