//! repverify - reproducibility check for published agent metrics
//!
//! Reads per-episode results (one JSON object per line), averages each metric
//! per agent and compares the averages with Table 3 of the paper.
//!
//! Exit status is 0 when every reference metric matches within tolerance and
//! 1 on any load error, mismatch or missing agent.

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

use repverify_core::{
    obs, render, verify_results, write_verification_json, RunSpan, VerificationArtifact,
};

/// Results file used when `--input` is not given, relative to the working directory.
const DEFAULT_INPUT: &str = "results/results.jsonl";

#[derive(Parser)]
#[command(name = "repverify")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Verify aggregate episode metrics against the published reference table", long_about = None)]
struct Cli {
    /// Path to the line-delimited JSON results file. Relative paths, including
    /// the default, are resolved against the current working directory; run
    /// from the checkout that holds the `results/` directory.
    #[arg(long, env = "REPVERIFY_INPUT", default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Also write a machine-readable verification artifact (JSON) to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json_logs: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    repverify_core::init_tracing(cli.json_logs, level);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("ERROR: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether verification passed; load and write failures are errors.
fn run(cli: &Cli) -> Result<bool> {
    let _span = RunSpan::enter(&cli.input);

    let verification = verify_results(&cli.input).map_err(|err| {
        obs::emit_load_failed(&err);
        err
    })?;

    let rendered = render(&verification);
    rendered
        .emit(&mut io::stdout().lock(), &mut io::stderr().lock())
        .context("write report to terminal")?;

    if let Some(path) = &cli.report {
        let artifact = VerificationArtifact::from_verification(&verification, &cli.input);
        write_verification_json(path, &artifact)?;
        obs::emit_report_written(path);
    }

    Ok(rendered.passed)
}
