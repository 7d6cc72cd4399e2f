//! opttools - support tooling for the `opt` optional-value library.
//!
//! ## Commands
//!
//! - `generate`: emit a synthetic benchmark translation unit
//! - `check`: run example executables and verify their output against
//!   inline `//$` expectations

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::debug;

use opttools_core::{generate_benchmark, run_check, CheckSpec, Mode, Violation};

#[derive(Parser)]
#[command(name = "opttools")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Benchmark generation and example-output checking for the opt library", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit machine-readable JSON (log lines and check reports)
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a synthetic benchmark source file
    Generate {
        /// Optional-value implementation to target (`opt::option` or `std::optional`)
        mode: String,

        /// Output file path (overwritten unconditionally)
        output: String,

        /// Number of struct/value declaration pairs to emit
        iterations: i64,
    },

    /// Run example executables and verify their output
    Check {
        /// Semicolon-separated list of annotated source files
        files: String,

        /// Semicolon-separated list of example executables, paired by index
        targets: String,

        /// Per-target timeout in seconds (0 = no timeout)
        #[arg(long, default_value_t = 0)]
        timeout_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    opttools_core::init_tracing(cli.json, cli.verbose);

    match cli.command {
        Commands::Generate {
            mode,
            output,
            iterations,
        } => cmd_generate(&mode, &output, iterations),
        Commands::Check {
            files,
            targets,
            timeout_secs,
        } => cmd_check(&files, &targets, timeout_secs, cli.json).await,
    }
}

/// Generate a synthetic benchmark source file.
fn cmd_generate(mode: &str, output: &str, iterations: i64) -> Result<()> {
    let mode: Mode = mode.parse()?;
    let output = PathBuf::from(output.trim());

    generate_benchmark(mode, &output, iterations)
        .with_context(|| format!("Failed to write benchmark source to {:?}", output))?;

    println!(
        "Generated {:?} ({} iterations, mode {})",
        output,
        iterations.max(0),
        mode.name()
    );

    Ok(())
}

/// Run example executables and verify their output against expectations.
async fn cmd_check(files: &str, targets: &str, timeout_secs: u64, json: bool) -> Result<()> {
    let files = split_list(files);
    let targets = split_list(targets);

    let spec = CheckSpec::new(files, targets, timeout_secs)?;
    debug!(suite_digest = %spec.suite_digest, "check spec built");

    let report = run_check(&spec).await?;

    for pair in &report.pairs {
        for violation in &pair.violations {
            eprintln!("{}", render_violation(violation));
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if report.success {
        if !json {
            println!("Completed successfully");
        }
        Ok(())
    } else {
        anyhow::bail!(
            "check failed: {} violation(s) across {} of {} pair(s)",
            report.violation_count(),
            report.failed_count(),
            report.pairs.len()
        )
    }
}

/// Split a semicolon-separated path list, dropping empty segments.
fn split_list(raw: &str) -> Vec<PathBuf> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Render a violation in the established diagnostic wording.
fn render_violation(violation: &Violation) -> String {
    match violation {
        Violation::TargetFailure {
            target,
            exit_code,
            stderr,
        } => format!(
            "Error while running {:?} (exit code {}):\n{}",
            target, exit_code, stderr
        ),
        Violation::Mismatch {
            file,
            line,
            expected,
            received,
        } => format!(
            "Expected: \"{}\", received: \"{}\".\nAt line {}, file: {:?}\n",
            expected, received, line, file
        ),
        Violation::Abundance {
            file,
            count,
            last_line,
        } => format!(
            "Abundance of {} lines.\n{}",
            count,
            render_anchor(*last_line, file)
        ),
        Violation::Lack {
            file,
            count,
            last_line,
        } => format!(
            "Lack of {} lines.\n{}",
            count,
            render_anchor(*last_line, file)
        ),
    }
}

fn render_anchor(last_line: Option<u32>, file: &Path) -> String {
    match last_line {
        Some(line) => format!("Last match at line {}, file: {:?}", line, file),
        None => format!("No expectations in file: {:?}", file),
    }
}
