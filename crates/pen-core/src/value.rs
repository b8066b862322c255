//! Typed scalar values attached to graph nodes.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Int,
    Double,
    Bool,
    Char,
    String,
    #[default]
    Undefined,
}

impl ValueKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Double => "double",
            Self::Bool => "bool",
            Self::Char => "char",
            Self::String => "string",
            Self::Undefined => "undefined",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" => Some(Self::Int),
            "double" | "float" => Some(Self::Double),
            "bool" | "boolean" => Some(Self::Bool),
            "char" => Some(Self::Char),
            "string" | "str" => Some(Self::String),
            "undefined" => Some(Self::Undefined),
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed payload of a node value. The variant is the kind discriminant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ParsedValue {
    Int(i64),
    Double(f64),
    Bool(bool),
    Char(char),
    String(String),
}

impl ParsedValue {
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Int(_) => ValueKind::Int,
            Self::Double(_) => ValueKind::Double,
            Self::Bool(_) => ValueKind::Bool,
            Self::Char(_) => ValueKind::Char,
            Self::String(_) => ValueKind::String,
        }
    }
}

impl fmt::Display for ParsedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Double(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Char(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
        }
    }
}

/// A literal as written in the script together with its classification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeValue {
    pub raw: String,
    pub parsed: ParsedValue,
}

impl NodeValue {
    /// Classify a literal token. Never fails.
    ///
    /// Detection order: `true`/`false`, numeric with a `.`, integer numeric,
    /// double-quoted string (quotes stripped), single character, string.
    #[must_use]
    pub fn detect(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            parsed: detect_parsed(raw),
        }
    }

    /// Classify a literal with a caller-supplied kind. `Undefined` falls back to
    /// [`NodeValue::detect`], as does a literal that does not fit the kind.
    #[must_use]
    pub fn with_kind(raw: &str, kind: ValueKind) -> Self {
        let coerced = match kind {
            ValueKind::Undefined => None,
            ValueKind::Int => raw.trim().parse::<i64>().ok().map(ParsedValue::Int),
            ValueKind::Double => {
                if looks_numeric(raw) {
                    raw.trim().parse::<f64>().ok().map(ParsedValue::Double)
                } else {
                    None
                }
            }
            ValueKind::Bool => match raw {
                "true" => Some(ParsedValue::Bool(true)),
                "false" => Some(ParsedValue::Bool(false)),
                _ => None,
            },
            ValueKind::Char => {
                let mut chars = strip_quotes(raw).chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => Some(ParsedValue::Char(ch)),
                    _ => None,
                }
            }
            ValueKind::String => Some(ParsedValue::String(strip_quotes(raw).to_string())),
        };

        match coerced {
            Some(parsed) => Self {
                raw: raw.to_string(),
                parsed,
            },
            None => Self::detect(raw),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        self.parsed.kind()
    }
}

impl fmt::Display for NodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.parsed, self.kind())
    }
}

fn detect_parsed(raw: &str) -> ParsedValue {
    if raw == "true" || raw == "false" {
        return ParsedValue::Bool(raw == "true");
    }

    if looks_numeric(raw) {
        let trimmed = raw.trim();
        if !trimmed.contains('.') {
            if let Ok(value) = trimmed.parse::<i64>() {
                return ParsedValue::Int(value);
            }
        }
        if let Ok(value) = trimmed.parse::<f64>() {
            return ParsedValue::Double(value);
        }
    }

    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return ParsedValue::String(raw[1..raw.len() - 1].to_string());
    }

    let mut chars = raw.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        return ParsedValue::Char(ch);
    }

    ParsedValue::String(raw.to_string())
}

/// Decimal notation only; rejects the `inf`/`NaN` spellings `f64::from_str` accepts.
fn looks_numeric(raw: &str) -> bool {
    let trimmed = raw.trim();
    let unsigned = trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('+'))
        .unwrap_or(trimmed);
    unsigned.chars().any(|ch| ch.is_ascii_digit())
        && unsigned
            .chars()
            .all(|ch| ch.is_ascii_digit() || matches!(ch, '.' | 'e' | 'E' | '-' | '+'))
        && unsigned.starts_with(|ch: char| ch.is_ascii_digit() || ch == '.')
}

fn strip_quotes(raw: &str) -> &str {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        &raw[1..raw.len() - 1]
    } else {
        raw
    }
}
