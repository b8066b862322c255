#![forbid(unsafe_code)]

//! PenCode interpreter: scans script text into statements and blocks,
//! evaluates conditions and arithmetic, and dispatches verbs against a
//! [`Session`]'s graph store.

mod condition;
mod config;
mod env;
mod expression;
mod script;
mod session;
mod verbs;

pub use condition::{Check, Condition};
pub use config::{DEFAULT_MAX_BLOCK_DEPTH, DEFAULT_WHILE_ITERATION_LIMIT, SessionConfig};
pub use env::{Environment, format_number};
pub use script::{Header, Item, Script};
pub use session::{RunSummary, Session};

/// Example graph loaded by `Initialize.`
pub const DEFAULT_SCRIPT: &str = include_str!("../scripts/default.pen");

/// Run `source` in a fresh session with default limits.
#[must_use]
pub fn interpret(source: &str) -> (RunSummary, Session) {
    let mut session = Session::new();
    let summary = session.run(source);
    (summary, session)
}
