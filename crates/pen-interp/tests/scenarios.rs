//! End-to-end scripts run through a fresh session.
//!
//! Each test feeds complete PenCode text to the interpreter and checks the
//! tally, the last message, and the resulting graph.

use pen_interp::{Session, interpret};
use proptest::prelude::*;

fn node_ids(session: &Session) -> Vec<String> {
    session
        .graph()
        .nodes
        .iter()
        .map(|node| node.id.clone())
        .collect()
}

/// Building a two-node path and querying it.
#[test]
fn path_query_over_fresh_graph() {
    let (summary, _) = interpret("Create Node 0. Create Node 1. Connect 0 To 1. Get PATH 0 1.");
    assert_eq!(summary.success, 4);
    assert_eq!(summary.errors, 0);
    assert!(
        summary.last_message.contains("0 -> 1"),
        "unexpected message: {}",
        summary.last_message
    );
}

/// A duplicate node is one error on its own line, and the graph keeps one node.
#[test]
fn duplicate_node_reports_second_line() {
    let (summary, session) = interpret("Create Node X.\nCreate Node X.");
    assert_eq!(summary.success, 1);
    assert_eq!(summary.errors, 1);
    assert!(summary.last_message.contains("line 2"));
    assert!(summary.last_message.contains("already exists"));
    assert_eq!(node_ids(&session), vec!["X"]);
}

#[test]
fn for_loop_creates_numbered_nodes() {
    let (summary, session) = interpret("For i = 1 to 3 { Create Node $i. }");
    assert!(summary.is_clean(), "{:?}", summary.diagnostics);
    assert_eq!(node_ids(&session), vec!["1", "2", "3"]);
}

#[test]
fn for_loop_spanning_lines() {
    let script = "\
Let total = 0.
For i = 2 to 4 {
    Create Node $i.
    Let total = $total + $i.
}
";
    let (summary, session) = interpret(script);
    assert_eq!(summary.success, 1 + 3 * 2);
    assert_eq!(session.environment().get("total"), Some(9.0));
    // Loop variables stay bound after the loop.
    assert_eq!(session.environment().get("i"), Some(4.0));
}

#[test]
fn while_on_acyclic_graph_never_runs() {
    let (summary, session) =
        interpret("Create Node a. Create Node b. Connect a To b.\nWhile HAS_CYCLE { Create Node Z. }");
    assert_eq!(summary.success, 3);
    assert!(!session.graph().contains_node("Z"));
}

#[test]
fn while_stops_after_one_hundred_iterations() {
    let script = "\
Create Node a. Create Node b.
Connect a To b. Connect b To a.
Let n = 0.
While IS_CONNECTED {
    Let n = $n + 1.
}
";
    let (summary, session) = interpret(script);
    assert_eq!(session.environment().get("n"), Some(100.0));
    assert_eq!(summary.success, 5 + 100);
    assert_eq!(summary.last_message, "Set variable n = 100.");
}

#[test]
fn while_condition_can_become_false() {
    let script = "\
Create Node a.
Connect a To a.
While HAS_CYCLE {
    Remove EDGE a To a.
}
";
    let (summary, session) = interpret(script);
    assert!(summary.is_clean(), "{:?}", summary.diagnostics);
    assert_eq!(summary.success, 3);
    assert!(session.graph().edges.is_empty());
}

#[test]
fn if_block_runs_only_when_condition_holds() {
    let script = "\
Create Node 0. Create Node 1. Connect 0 To 1.
If CONNECTED 0 1 {
    Set NODE_COLOR 0 blue.
}
If CONNECTED 1 2 {
    Set NODE_COLOR 1 blue.
}
If IS_TREE { Create Node leaf. Connect leaf To 1. }
";
    let (summary, session) = interpret(script);
    assert!(summary.is_clean(), "{:?}", summary.diagnostics);
    let graph = session.graph();
    assert_eq!(graph.find_node("0").map(|n| n.color.as_str()), Some("blue"));
    assert_ne!(graph.find_node("1").map(|n| n.color.as_str()), Some("blue"));
    assert!(graph.contains_node("leaf"));
}

#[test]
fn errors_inside_blocks_use_absolute_lines() {
    let script = "\
Create Node a.
For i = 1 to 2 {
    Create Node a.
}
Create Node b
";
    let (summary, _) = interpret(script);
    assert_eq!(summary.success, 1);
    assert_eq!(summary.errors, 3);
    let lines: Vec<usize> = summary.diagnostics.iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![3, 3, 5]);
    assert_eq!(
        summary.last_message,
        "Error on line 5: Each statement must end with a period."
    );
}

#[test]
fn nested_loops_share_the_environment() {
    let script = "\
Let count = 0.
For i = 1 to 3 {
    For j = 1 to $i {
        Let count = $count + 1.
    }
}
";
    let (summary, session) = interpret(script);
    assert!(summary.is_clean(), "{:?}", summary.diagnostics);
    assert_eq!(session.environment().get("count"), Some(6.0));
}

#[test]
fn undefined_variable_in_loop_bound_fails_the_header() {
    let (summary, _) = interpret("Reset.\nFor i = 1 to $limit {\n  Reset.\n}");
    assert_eq!(summary.success, 1);
    assert_eq!(summary.errors, 1);
    assert_eq!(
        summary.last_message,
        "Error on line 2: Variable limit not found."
    );
}

#[test]
fn snapshot_reflects_the_current_graph() {
    let mut session = Session::new();
    session.run("Create GRAPH other.\nUse GRAPH other.\nCreate Node q.\nSet Background clear.");
    let snapshot = session.snapshot();
    assert_eq!(snapshot.graph.name, "other");
    assert_eq!(snapshot.graph.background, "transparent");
    assert_eq!(snapshot.graphs, vec!["main".to_string(), "other".to_string()]);

    let json = serde_json::to_value(&snapshot).expect("serialize snapshot");
    assert_eq!(json["nodes"][0]["id"], "q");
}

#[test]
fn default_example_is_clean_apart_from_known_duplicates() {
    let mut session = Session::new();
    let summary = session.run(pen_interp::DEFAULT_SCRIPT);
    // The loop re-creates nodes 5..8, which already exist.
    assert_eq!(summary.errors, 4);
    assert!(
        summary
            .diagnostics
            .iter()
            .all(|d| d.message.ends_with("already exists."))
    );
    assert!(session.graph().contains_node("Annoyance"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Repeating a create statement always yields one node and one error per repeat.
    #[test]
    fn prop_duplicate_creates_leave_one_node(id in "[A-Za-z][A-Za-z0-9_]{0,8}", repeats in 1_usize..5) {
        let script = std::iter::repeat_n(format!("Create Node {id}."), repeats + 1)
            .collect::<Vec<_>>()
            .join("\n");
        let (summary, session) = interpret(&script);
        prop_assert_eq!(summary.success, 1);
        prop_assert_eq!(summary.errors, repeats);
        prop_assert_eq!(session.graph().nodes.len(), 1);
    }

    /// The interpreter never panics, and every statement is accounted for.
    #[test]
    fn prop_arbitrary_text_is_tallied(source in "[ -~\n]{0,120}") {
        let (summary, _) = interpret(&source);
        prop_assert_eq!(summary.errors, summary.diagnostics.len());
    }
}
