use pen_core::{Diagnostic, Graph, GraphSnapshot, GraphStore, PenError, PenResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::condition::Condition;
use crate::config::SessionConfig;
use crate::env::Environment;
use crate::script::{Header, Item, Script};

/// Aggregate outcome of running a script.
///
/// `last_message` is overwritten by every statement, success or failure.
/// `diagnostics` keeps every failure in execution order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunSummary {
    pub success: usize,
    pub errors: usize,
    pub last_message: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunSummary {
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.errors == 0
    }

    fn record_success(&mut self, message: String) {
        self.success += 1;
        self.last_message = message;
    }

    fn record_failure(&mut self, line: usize, error: &PenError) {
        let diagnostic = Diagnostic::from_error(line, error);
        self.errors += 1;
        self.last_message = diagnostic.render();
        self.diagnostics.push(diagnostic);
    }
}

/// Interpreter context: graph registry, variables, and limits.
///
/// State persists across [`Session::run`] calls, so a host can feed a script
/// piecemeal.
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) store: GraphStore,
    pub(crate) env: Environment,
    config: SessionConfig,
}

impl Default for Session {
    fn default() -> Self {
        Self::with_config(SessionConfig::default())
    }
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            store: GraphStore::new(&config.default_graph),
            env: Environment::default(),
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub const fn store(&self) -> &GraphStore {
        &self.store
    }

    #[must_use]
    pub const fn environment(&self) -> &Environment {
        &self.env
    }

    /// The graph every verb currently targets.
    #[must_use]
    pub fn graph(&self) -> &Graph {
        self.store.current()
    }

    #[must_use]
    pub fn snapshot(&self) -> GraphSnapshot {
        self.store.snapshot()
    }

    pub fn run(&mut self, source: &str) -> RunSummary {
        self.run_script(&Script::parse_nested(source, self.config.max_block_depth))
    }

    pub fn run_script(&mut self, script: &Script) -> RunSummary {
        let mut summary = RunSummary::default();
        self.execute(&script.items, 0, &mut summary);
        debug!(
            success = summary.success,
            errors = summary.errors,
            graph = self.store.current_name(),
            "script finished"
        );
        summary
    }

    pub(crate) fn execute(&mut self, items: &[Item], depth: usize, summary: &mut RunSummary) {
        for item in items {
            match item {
                Item::Statement { line, text } => {
                    self.run_statement(*line, text, depth, summary);
                }
                Item::Block { line, header, body } => {
                    if let Err(error) = self.run_block(*line, header, body, depth, summary) {
                        debug!(line, code = error.code().as_str(), %error, "block failed");
                        summary.record_failure(*line, &error);
                    }
                }
                Item::Broken { line, error } => summary.record_failure(*line, error),
            }
        }
    }

    fn run_statement(&mut self, line: usize, text: &str, depth: usize, summary: &mut RunSummary) {
        match self.dispatch(text, depth) {
            Ok(message) => summary.record_success(message),
            Err(error) => {
                debug!(line, code = error.code().as_str(), %error, "statement failed");
                summary.record_failure(line, &error);
            }
        }
    }

    fn run_block(
        &mut self,
        line: usize,
        header: &Header,
        body: &[Item],
        depth: usize,
        summary: &mut RunSummary,
    ) -> PenResult<()> {
        if depth >= self.config.max_block_depth {
            return Err(PenError::malformed(format!(
                "Blocks nest deeper than {} levels.",
                self.config.max_block_depth
            )));
        }

        match header {
            Header::If(condition) => {
                let holds = condition.evaluate(self.store.current(), &self.env)?;
                trace!(line, holds, "if");
                if holds {
                    self.execute(body, depth + 1, summary);
                }
            }
            Header::For {
                variable,
                start,
                end,
            } => {
                let first = self.env.evaluate(start)?;
                let last = self.env.evaluate(end)?;
                for step in 0..for_iterations(first, last) {
                    let counter = first + step as f64;
                    self.env.set(variable, counter);
                    trace!(line, variable = variable.as_str(), counter, "for iteration");
                    self.execute(body, depth + 1, summary);
                }
            }
            Header::While(condition) => {
                let capped = self.run_while(condition, body, depth, summary)?;
                if capped {
                    warn!(
                        line,
                        limit = self.config.while_iteration_limit,
                        "while loop stopped at the iteration limit"
                    );
                }
            }
        }
        Ok(())
    }

    /// Run a `While` body until its condition fails or the iteration limit is
    /// reached. Returns true only when the limit stopped a loop whose
    /// condition still held.
    fn run_while(
        &mut self,
        condition: &Condition,
        body: &[Item],
        depth: usize,
        summary: &mut RunSummary,
    ) -> PenResult<bool> {
        let limit = self.config.while_iteration_limit;
        let mut iterations = 0;
        while condition.evaluate(self.store.current(), &self.env)? {
            if iterations == limit {
                return Ok(true);
            }
            self.execute(body, depth + 1, summary);
            iterations += 1;
        }
        trace!(iterations, "while finished");
        Ok(false)
    }
}

/// Inclusive ascending count from `first` to `last` in steps of one.
fn for_iterations(first: f64, last: f64) -> u64 {
    if last < first {
        return 0;
    }
    // Saturates for spans beyond u64.
    ((last - first).floor() as u64).saturating_add(1)
}

#[cfg(test)]
mod tests {
    use pen_core::PenErrorCode;

    use super::{Session, for_iterations};
    use crate::condition::Condition;
    use crate::config::SessionConfig;
    use crate::script::{Item, Script};

    #[test]
    fn failures_do_not_stop_the_run() {
        let mut session = Session::new();
        let summary = session.run("Create Node a.\nBogus.\nCreate Node b.");
        assert_eq!(summary.success, 2);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.diagnostics[0].line, 2);
        assert_eq!(summary.last_message, "Created node b.");
        assert_eq!(session.graph().nodes.len(), 2);
    }

    #[test]
    fn state_persists_between_runs() {
        let mut session = Session::new();
        session.run("Let n = 2.");
        let summary = session.run("Create Node $n.");
        assert!(summary.is_clean());
        assert!(session.graph().contains_node("2"));
    }

    #[test]
    fn while_limit_comes_from_config() {
        let config = SessionConfig {
            while_iteration_limit: 7,
            ..SessionConfig::default()
        };
        let mut session = Session::with_config(config);
        let summary = session.run(
            "Create Node a. Connect a To a. Let n = 0.\nWhile HAS_CYCLE {\n  Let n = $n + 1.\n}",
        );
        assert_eq!(session.environment().get("n"), Some(7.0));
        assert_eq!(summary.success, 3 + 7);
    }

    #[test]
    fn nesting_beyond_limit_is_malformed() {
        let config = SessionConfig {
            max_block_depth: 2,
            ..SessionConfig::default()
        };
        let mut session = Session::with_config(config);
        let summary = session.run("If NOT IS_CYCLIC {\nIf NOT X {\nIf NOT Y {\nReset.\n}\n}\n}");
        assert_eq!(summary.success, 0);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.diagnostics[0].line, 3);
        assert_eq!(summary.diagnostics[0].code, PenErrorCode::Malformed.as_str());
    }

    #[test]
    fn for_bounds_accept_expressions() {
        let mut session = Session::new();
        let summary = session.run("Let n = 2.\nFor k = $n - 1 to $n * 2 { Create Node $k. }");
        assert!(summary.is_clean());
        assert_eq!(summary.success, 5);
        assert_eq!(session.environment().get("k"), Some(4.0));
        let ids: Vec<&str> = session.graph().nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn default_graph_name_is_configurable() {
        let config = SessionConfig {
            default_graph: "scratch".to_string(),
            ..SessionConfig::default()
        };
        let session = Session::with_config(config);
        assert_eq!(session.snapshot().graph.name, "scratch");
    }

    #[test]
    fn for_counts_past_float_precision_terminate() {
        assert_eq!(for_iterations(1.0, 3.0), 3);
        assert_eq!(for_iterations(0.5, 2.0), 2);
        assert_eq!(for_iterations(3.0, 1.0), 0);
        assert_eq!(for_iterations(9_007_199_254_740_992.0, 9_007_199_254_740_994.0), 3);

        let mut session = Session::new();
        let summary = session.run(
            "Let n = 0.\nFor i = 9007199254740992 to 9007199254740993 {\n  Let n = $n + 1.\n}",
        );
        assert!(summary.is_clean(), "{:?}", summary.diagnostics);
        assert_eq!(session.environment().get("n"), Some(1.0));
    }

    fn while_loop(source: &str) -> (Condition, Vec<Item>) {
        let script = Script::parse(source);
        match script.items.into_iter().next() {
            Some(Item::Block {
                header: crate::script::Header::While(condition),
                body,
                ..
            }) => (condition, body),
            other => panic!("expected a while block, got {other:?}"),
        }
    }

    #[test]
    fn while_reports_cap_only_when_condition_still_holds() {
        let config = SessionConfig {
            while_iteration_limit: 3,
            ..SessionConfig::default()
        };
        let mut session = Session::with_config(config.clone());
        session.run(
            "Create Node 1. Create Node 2. Create Node 3.\n\
             Connect 1 To 1. Connect 2 To 2. Connect 3 To 3.\n\
             Let k = 1.",
        );
        let (condition, body) =
            while_loop("While HAS_CYCLE {\n  Remove EDGE $k To $k.\n  Let k = $k + 1.\n}");
        let mut summary = super::RunSummary::default();
        let capped = session
            .run_while(&condition, &body, 0, &mut summary)
            .expect("condition evaluates");
        assert!(!capped);
        assert_eq!(summary.success, 6);

        let mut session = Session::with_config(config);
        session.run("Create Node a. Connect a To a.");
        let (condition, body) = while_loop("While HAS_CYCLE { Reset. Create Node a. Connect a To a. }");
        let mut summary = super::RunSummary::default();
        assert!(
            session
                .run_while(&condition, &body, 0, &mut summary)
                .expect("condition evaluates")
        );
        assert_eq!(summary.success, 9);

        let mut session = Session::with_config(SessionConfig {
            while_iteration_limit: 0,
            ..SessionConfig::default()
        });
        let (condition, body) = while_loop("While HAS_CYCLE { Reset. }");
        let mut summary = super::RunSummary::default();
        assert!(
            !session
                .run_while(&condition, &body, 0, &mut summary)
                .expect("condition evaluates")
        );
    }
}
