//! Splits script text into statements and brace-delimited blocks.
//!
//! A `.` ends a statement when it sits outside double quotes and is followed
//! by whitespace, a closing brace, or the end of the line. Block headers end
//! at `{`; bodies end at the matching `}` and may open and close on one line
//! or span several. Every item remembers the 1-based line it started on.

use pen_core::{Diagnostic, PenError, PenResult};

use crate::condition::Condition;
use crate::config::DEFAULT_MAX_BLOCK_DEPTH;

/// Control-flow construct introduced by a block header.
#[derive(Debug, Clone, PartialEq)]
pub enum Header {
    If(Condition),
    /// Bounds are expressions evaluated when the loop starts.
    For {
        variable: String,
        start: String,
        end: String,
    },
    While(Condition),
}

impl Header {
    pub fn parse(text: &str) -> PenResult<Self> {
        let text = text.trim();
        if let Some(condition) = text.strip_prefix("If ") {
            return Ok(Self::If(Condition::parse(condition)?));
        }
        if let Some(condition) = text.strip_prefix("While ") {
            return Ok(Self::While(Condition::parse(condition)?));
        }
        if let Some(range) = text.strip_prefix("For ") {
            return parse_for(range).ok_or_else(|| {
                PenError::malformed(format!(
                    "Invalid FOR header: {text} (expected `For <var> = <start> to <end> {{`)"
                ))
            });
        }
        Err(PenError::malformed(format!("Invalid command: {text} {{")))
    }
}

fn parse_for(range: &str) -> Option<Header> {
    let (variable, bounds) = range.split_once('=')?;
    let variable = variable.trim();
    let (start, end) = bounds.split_once(" to ")?;
    let (start, end) = (start.trim(), end.trim());
    let valid_name = !variable.is_empty()
        && variable
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_');
    if !valid_name || start.is_empty() || end.is_empty() {
        return None;
    }
    Some(Header::For {
        variable: variable.to_string(),
        start: start.to_string(),
        end: end.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// Statement text without its terminating period.
    Statement { line: usize, text: String },
    Block {
        line: usize,
        header: Header,
        body: Vec<Item>,
    },
    /// Text that could not be turned into a statement or block.
    Broken { line: usize, error: PenError },
}

impl Item {
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::Statement { line, .. } | Self::Block { line, .. } | Self::Broken { line, .. } => {
                *line
            }
        }
    }
}

/// A scanned script, ready to execute.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Script {
    pub items: Vec<Item>,
}

impl Script {
    /// Scan with the default nesting ceiling.
    #[must_use]
    pub fn parse(source: &str) -> Self {
        Self::parse_nested(source, DEFAULT_MAX_BLOCK_DEPTH)
    }

    /// Scan, turning any block header nested `max_depth` or more blocks deep
    /// into a broken item. Its body is skipped up to the matching `}`.
    #[must_use]
    pub fn parse_nested(source: &str, max_depth: usize) -> Self {
        Self {
            items: assemble(tokenize(source), max_depth),
        }
    }

    /// Structural problems found while scanning, in source order.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut found = Vec::new();
        collect_broken(&self.items, &mut found);
        found
    }

    /// Statements at any depth, counted once regardless of loops.
    #[must_use]
    pub fn statement_count(&self) -> usize {
        count_statements(&self.items)
    }
}

fn collect_broken(items: &[Item], found: &mut Vec<Diagnostic>) {
    for item in items {
        match item {
            Item::Broken { line, error } => found.push(Diagnostic::from_error(*line, error)),
            Item::Block { body, .. } => collect_broken(body, found),
            Item::Statement { .. } => {}
        }
    }
}

fn count_statements(items: &[Item]) -> usize {
    items
        .iter()
        .map(|item| match item {
            Item::Statement { .. } => 1,
            Item::Block { body, .. } => count_statements(body),
            Item::Broken { .. } => 0,
        })
        .sum()
}

#[derive(Debug, PartialEq)]
enum Token {
    Statement { line: usize, text: String },
    Unterminated { line: usize },
    Open { line: usize, header: String },
    Close { line: usize },
}

fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }

        let mut pending = String::new();
        let mut in_quotes = false;
        let mut chars = trimmed.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '"' => {
                    in_quotes = !in_quotes;
                    pending.push(ch);
                }
                '.' if !in_quotes
                    && chars
                        .peek()
                        .is_none_or(|next| next.is_whitespace() || *next == '}') =>
                {
                    tokens.push(Token::Statement {
                        line,
                        text: pending.trim().to_string(),
                    });
                    pending.clear();
                }
                '{' if !in_quotes => {
                    tokens.push(Token::Open {
                        line,
                        header: pending.trim().to_string(),
                    });
                    pending.clear();
                }
                '}' if !in_quotes => {
                    if !pending.trim().is_empty() {
                        tokens.push(Token::Unterminated { line });
                    }
                    tokens.push(Token::Close { line });
                    pending.clear();
                }
                _ => pending.push(ch),
            }
        }

        if !pending.trim().is_empty() {
            tokens.push(Token::Unterminated { line });
        }
    }

    tokens
}

struct Frame {
    line: usize,
    header: String,
    body: Vec<Item>,
}

fn assemble(tokens: Vec<Token>, max_depth: usize) -> Vec<Item> {
    let mut root = Vec::new();
    let mut open: Vec<Frame> = Vec::new();
    // Open braces still to close inside a rejected block.
    let mut skipping = 0_usize;

    for token in tokens {
        if skipping > 0 {
            match token {
                Token::Open { .. } => skipping += 1,
                Token::Close { .. } => skipping -= 1,
                Token::Statement { .. } | Token::Unterminated { .. } => {}
            }
            continue;
        }

        let item = match token {
            Token::Statement { line, text } => Item::Statement { line, text },
            Token::Unterminated { line } => Item::Broken {
                line,
                error: PenError::malformed("Each statement must end with a period."),
            },
            Token::Open { line, .. } if open.len() >= max_depth => {
                skipping = 1;
                Item::Broken {
                    line,
                    error: PenError::malformed(format!(
                        "Blocks nest deeper than {max_depth} levels."
                    )),
                }
            }
            Token::Open { line, header } => {
                open.push(Frame {
                    line,
                    header,
                    body: Vec::new(),
                });
                continue;
            }
            Token::Close { line } => match open.pop() {
                Some(frame) => close_block(frame),
                None => Item::Broken {
                    line,
                    error: PenError::malformed("Unexpected closing brace."),
                },
            },
        };
        push_item(&mut open, &mut root, item);
    }

    while let Some(frame) = open.pop() {
        let item = Item::Broken {
            line: frame.line,
            error: PenError::malformed(format!(
                "Block `{} {{` is never closed.",
                frame.header
            )),
        };
        push_item(&mut open, &mut root, item);
    }

    root
}

fn close_block(frame: Frame) -> Item {
    match Header::parse(&frame.header) {
        Ok(header) => Item::Block {
            line: frame.line,
            header,
            body: frame.body,
        },
        Err(error) => Item::Broken {
            line: frame.line,
            error,
        },
    }
}

fn push_item(open: &mut [Frame], root: &mut Vec<Item>, item: Item) {
    match open.last_mut() {
        Some(frame) => frame.body.push(item),
        None => root.push(item),
    }
}
