#![forbid(unsafe_code)]

mod graph;
mod store;
mod value;

pub use graph::{
    DEFAULT_BACKGROUND, DEFAULT_EDGE_WEIGHT, DEFAULT_NODE_COLOR, Edge, Graph, Node,
    background_color,
};
pub use store::{DEFAULT_GRAPH_NAME, GraphSnapshot, GraphStore};
pub use value::{NodeValue, ParsedValue, ValueKind};

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type PenResult<T> = Result<T, PenError>;

/// What kind of entity an error refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Graph,
    Node,
    Edge,
    Variable,
}

impl EntityKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Graph => "Graph",
            Self::Node => "Node",
            Self::Edge => "Edge",
            Self::Variable => "Variable",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PenErrorCode {
    Duplicate,
    NotFound,
    Malformed,
    InvalidExpression,
    Rejected,
}

impl PenErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Duplicate => "pen/error/duplicate",
            Self::NotFound => "pen/error/not-found",
            Self::Malformed => "pen/error/malformed",
            Self::InvalidExpression => "pen/error/invalid-expression",
            Self::Rejected => "pen/error/rejected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Error, PartialEq, Eq)]
pub enum PenError {
    #[error("{kind} {id} already exists.")]
    Duplicate { kind: EntityKind, id: String },
    #[error("{kind} {id} not found.")]
    NotFound { kind: EntityKind, id: String },
    #[error("{message}")]
    Malformed { message: String },
    #[error("Invalid expression: {expression} ({reason})")]
    InvalidExpression { expression: String, reason: String },
    /// The statement was well formed but the graph refuses the operation.
    #[error("{message}")]
    Rejected { message: String },
}

impl PenError {
    #[must_use]
    pub fn duplicate(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::Duplicate {
            kind,
            id: id.into(),
        }
    }

    #[must_use]
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_expression(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidExpression {
            expression: expression.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn code(&self) -> PenErrorCode {
        match self {
            Self::Duplicate { .. } => PenErrorCode::Duplicate,
            Self::NotFound { .. } => PenErrorCode::NotFound,
            Self::Malformed { .. } => PenErrorCode::Malformed,
            Self::InvalidExpression { .. } => PenErrorCode::InvalidExpression,
            Self::Rejected { .. } => PenErrorCode::Rejected,
        }
    }
}

/// A statement failure tagged with its 1-based source line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub code: String,
    pub message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn from_error(line: usize, error: &PenError) -> Self {
        Self {
            line,
            code: error.code().as_str().to_string(),
            message: error.to_string(),
        }
    }

    /// Human-readable form used as a run's last message.
    #[must_use]
    pub fn render(&self) -> String {
        format!("Error on line {}: {}", self.line, self.message)
    }
}
