#![forbid(unsafe_code)]

//! PenCode CLI - run and inspect graph scripts.
//!
//! # Commands
//!
//! - `run`: Execute a script and report the tally and diagnostics
//! - `check`: Scan a script for structural problems without executing it
//! - `repl`: Read statements from stdin and run them against one session
//! - `snapshot`: Execute a script and print the current graph as JSON

use std::io::{self, BufRead, Read, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use pen_core::Diagnostic;
use pen_interp::{RunSummary, Script, Session, SessionConfig};
use serde::Serialize;
use tracing::{debug, info, warn};

/// PenCode CLI - run and inspect graph scripts.
#[derive(Debug, Parser)]
#[command(
    name = "pen-cli",
    version,
    about = "PenCode CLI - run and inspect graph scripts",
    long_about = "An interpreter for PenCode, a small line-oriented language for\n\
        building graphs, querying their structure, and looping over them."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging (can be repeated for more detail: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Execute a script and report how it went.
    Run {
        /// Input file path, inline script text, or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// TOML file with session limits.
        #[arg(short, long)]
        config: Option<String>,

        /// Output file path. If omitted, writes to stdout.
        #[arg(short, long)]
        output: Option<String>,

        /// Output the run summary as JSON.
        #[arg(long)]
        json: bool,

        /// Pretty-print JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Scan a script for unterminated statements and unbalanced blocks.
    Check {
        /// Input file path, inline script text, or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Read statements from stdin and run each one as soon as it is complete.
    Repl {
        /// TOML file with session limits.
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Execute a script and print the current graph for a renderer.
    Snapshot {
        /// Input file path, inline script text, or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// TOML file with session limits.
        #[arg(short, long)]
        config: Option<String>,

        /// Output file path. If omitted, writes to stdout.
        #[arg(short, long)]
        output: Option<String>,

        /// Pretty-print JSON output.
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Debug, Serialize)]
struct RunReport<'a> {
    success: usize,
    errors: usize,
    last_message: &'a str,
    current_graph: &'a str,
    diagnostics: &'a [Diagnostic],
    elapsed_ms: f64,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    valid: bool,
    statements: usize,
    diagnostics: Vec<Diagnostic>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Run {
            input,
            config,
            output,
            json,
            pretty,
        } => cmd_run(&input, config.as_deref(), output.as_deref(), json, pretty),

        Command::Check { input, json } => cmd_check(&input, json),

        Command::Repl { config } => cmd_repl(config.as_deref()),

        Command::Snapshot {
            input,
            config,
            output,
            pretty,
        } => cmd_snapshot(&input, config.as_deref(), output.as_deref(), pretty),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .try_init();
}

fn load_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else if Path::new(input).exists() {
        std::fs::read_to_string(input).context(format!("Failed to read file: {input}"))
    } else {
        // Treat as inline script text
        Ok(input.to_string())
    }
}

fn load_config(path: Option<&str>) -> Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };
    let text = std::fs::read_to_string(path).context(format!("Failed to read config: {path}"))?;
    let config: SessionConfig =
        toml::from_str(&text).context(format!("Invalid config file: {path}"))?;
    if config.max_block_depth == 0 {
        bail!("Invalid config file: {path}: max_block_depth must be at least 1");
    }
    if config.default_graph.trim().is_empty() || config.default_graph.contains(char::is_whitespace)
    {
        bail!(
            "Invalid config file: {path}: default_graph {:?} is not a graph name",
            config.default_graph
        );
    }
    debug!(?config, "loaded session config");
    Ok(config)
}

fn write_output(output: Option<&str>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content).context(format!("Failed to write to: {path}"))?;
            info!("Wrote output to: {path}");
        }
        None => {
            io::stdout()
                .write_all(content.as_bytes())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let mut json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    json.push('\n');
    Ok(json)
}

// =============================================================================
// Command: run
// =============================================================================

fn cmd_run(
    input: &str,
    config: Option<&str>,
    output: Option<&str>,
    json_output: bool,
    pretty: bool,
) -> Result<()> {
    let source = load_input(input)?;
    let mut session = Session::with_config(load_config(config)?);

    let start = Instant::now();
    let summary = session.run(&source);
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    info!(
        success = summary.success,
        errors = summary.errors,
        elapsed_ms,
        "run finished"
    );

    let content = if json_output {
        let report = RunReport {
            success: summary.success,
            errors: summary.errors,
            last_message: &summary.last_message,
            current_graph: session.store().current_name(),
            diagnostics: &summary.diagnostics,
            elapsed_ms,
        };
        to_json(&report, pretty)?
    } else {
        render_summary(&summary)
    };
    write_output(output, &content)?;

    if !summary.is_clean() {
        std::process::exit(1);
    }

    Ok(())
}

fn render_summary(summary: &RunSummary) -> String {
    let mut text = String::new();
    for diagnostic in &summary.diagnostics {
        text.push_str(&diagnostic.render());
        text.push('\n');
    }
    text.push_str(&format!(
        "Executed {} statements successfully, {} errors.\n",
        summary.success, summary.errors
    ));
    if !summary.last_message.is_empty() {
        text.push_str(&format!("Last message: {}\n", summary.last_message));
    }
    text
}

// =============================================================================
// Command: check
// =============================================================================

fn cmd_check(input: &str, json_output: bool) -> Result<()> {
    let source = load_input(input)?;
    let script = Script::parse(&source);
    let diagnostics = script.diagnostics();

    let result = CheckResult {
        valid: diagnostics.is_empty(),
        statements: script.statement_count(),
        diagnostics,
    };

    if json_output {
        print!("{}", to_json(&result, true)?);
    } else {
        if result.valid {
            println!("✓ {} statements, no structural problems", result.statements);
        } else {
            println!("✗ {} structural problems", result.diagnostics.len());
        }
        for diagnostic in &result.diagnostics {
            println!("  [{}] {}", diagnostic.code, diagnostic.render());
        }
    }

    if !result.valid {
        std::process::exit(1);
    }

    Ok(())
}

// =============================================================================
// Command: repl
// =============================================================================

fn cmd_repl(config: Option<&str>) -> Result<()> {
    let mut session = Session::with_config(load_config(config)?);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut pending = String::new();

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read from stdin")?;
        pending.push_str(&line);
        pending.push('\n');
        if !is_complete(&pending) {
            continue;
        }

        let summary = session.run(&pending);
        pending.clear();
        for message in repl_messages(&summary) {
            writeln!(stdout, "{message}").context("Failed to write to stdout")?;
        }
    }

    if !pending.trim().is_empty() {
        let summary = session.run(&pending);
        for message in repl_messages(&summary) {
            writeln!(stdout, "{message}").context("Failed to write to stdout")?;
        }
    }

    Ok(())
}

/// Every failure in the chunk, then the final message unless it was one of them.
fn repl_messages(summary: &RunSummary) -> Vec<String> {
    let mut messages: Vec<String> = summary.diagnostics.iter().map(Diagnostic::render).collect();
    if !summary.last_message.is_empty() && messages.last() != Some(&summary.last_message) {
        messages.push(summary.last_message.clone());
    }
    messages
}

/// A chunk is ready to run once every block it opens has closed.
fn is_complete(pending: &str) -> bool {
    let mut depth = 0_i64;
    let mut quoted = false;
    for ch in pending.chars() {
        match ch {
            '"' => quoted = !quoted,
            '{' if !quoted => depth += 1,
            '}' if !quoted => depth -= 1,
            _ => {}
        }
    }
    depth <= 0
}

// =============================================================================
// Command: snapshot
// =============================================================================

fn cmd_snapshot(
    input: &str,
    config: Option<&str>,
    output: Option<&str>,
    pretty: bool,
) -> Result<()> {
    let source = load_input(input)?;
    let mut session = Session::with_config(load_config(config)?);
    let summary = session.run(&source);
    for diagnostic in &summary.diagnostics {
        warn!(line = diagnostic.line, "{}", diagnostic.message);
    }
    write_output(output, &to_json(&session.snapshot(), pretty)?)
}
