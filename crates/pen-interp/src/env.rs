use std::collections::BTreeMap;

use pen_core::{EntityKind, PenError, PenResult};
use serde::{Deserialize, Serialize};

use crate::expression;

/// Numeric variables shared by every block of a session. There is no
/// scoping: loop counters stay bound after their loop ends.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Environment {
    variables: BTreeMap<String, f64>,
}

impl Environment {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.variables.get(name).copied()
    }

    pub fn set(&mut self, name: &str, value: f64) {
        self.variables.insert(name.to_string(), value);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.variables
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
    }

    /// Replace a `$name` token with the variable's value; any other token is
    /// returned unchanged.
    pub fn resolve(&self, token: &str) -> PenResult<String> {
        let Some(name) = token.strip_prefix('$') else {
            return Ok(token.to_string());
        };
        self.get(name)
            .map(format_number)
            .ok_or_else(|| PenError::not_found(EntityKind::Variable, name))
    }

    pub fn evaluate(&self, source: &str) -> PenResult<f64> {
        expression::evaluate(source, &self.variables)
    }
}

/// Render a number the way scripts write them: integral values carry no
/// fractional part, so `$i` bound to `3.0` names node `3`.
#[must_use]
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // Collapses -0.
        return "0".to_string();
    }
    value.to_string()
}
