//! Runs the built binary against scripts on disk.

use std::process::Command;

fn pen_cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_pen-cli"))
}

#[test]
fn run_reports_json_summary() {
    let dir = tempfile::tempdir().expect("temp dir");
    let script = dir.path().join("path.pen");
    std::fs::write(
        &script,
        "Create Node 0. Create Node 1.\nConnect 0 To 1.\nGet PATH 0 1.\n",
    )
    .expect("write script");

    let output = pen_cli()
        .args(["run", "--json"])
        .arg(&script)
        .output()
        .expect("run pen-cli");
    assert!(output.status.success(), "{output:?}");

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json summary");
    assert_eq!(report["success"], 4);
    assert_eq!(report["errors"], 0);
    assert_eq!(report["current_graph"], "main");
    assert!(
        report["last_message"]
            .as_str()
            .is_some_and(|message| message.contains("0 -> 1"))
    );
}

#[test]
fn run_fails_when_a_statement_fails() {
    let output = pen_cli()
        .args(["run", "Create Node X.\nCreate Node X."])
        .output()
        .expect("run pen-cli");
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Error on line 2: Node X already exists."));
}

#[test]
fn check_flags_unclosed_blocks() {
    let output = pen_cli()
        .args(["check", "--json", "For i = 1 to 3 {\nCreate Node $i.\n"])
        .output()
        .expect("run pen-cli");
    assert_eq!(output.status.code(), Some(1));
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json result");
    assert_eq!(result["valid"], false);
    assert_eq!(result["diagnostics"][0]["line"], 1);
}

#[test]
fn snapshot_honors_config_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = dir.path().join("pen.toml");
    std::fs::write(&config, "default_graph = \"canvas\"\n").expect("write config");
    let out = dir.path().join("snapshot.json");

    let status = pen_cli()
        .args(["snapshot", "Create Node a. Set Background black."])
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&out)
        .status()
        .expect("run pen-cli");
    assert!(status.success());

    let snapshot: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).expect("read snapshot"))
            .expect("json snapshot");
    assert_eq!(snapshot["name"], "canvas");
    assert_eq!(snapshot["graphs"][0], "canvas");
    assert_eq!(snapshot["nodes"][0]["id"], "a");
}
