//! Human-readable comparison table.
//!
//! Rendering is pure: [`render`] returns the text for both streams and the
//! caller decides where to write it.

use std::fmt::Write as _;
use std::io::{self, Write};

use crate::metric::Metric;
use crate::verify::{ConditionReport, ConditionStatus, Discrepancy, Verification};

pub const PASS_MESSAGE: &str = "PASS: All metrics match Table 3 of the paper.";
pub const FAIL_MESSAGE: &str = "FAIL: Some metrics do not match.";

const CONDITION_WIDTH: usize = 14;
const COUNT_WIDTH: usize = 5;
const METRIC_WIDTH: usize = 20;

/// Rendered output, split by destination stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub stdout: String,
    pub stderr: String,
    pub passed: bool,
}

impl RenderedReport {
    /// Write both streams and flush them.
    pub fn emit<O: Write, E: Write>(&self, out: &mut O, err: &mut E) -> io::Result<()> {
        out.write_all(self.stdout.as_bytes())?;
        out.flush()?;
        err.write_all(self.stderr.as_bytes())?;
        err.flush()
    }
}

/// Header line for the table.
fn header() -> String {
    let metrics: Vec<String> = Metric::ALL
        .iter()
        .map(|m| format!("{:>width$}", m.as_str(), width = METRIC_WIDTH))
        .collect();
    format!(
        "{:<cw$} {:>nw$}  {}",
        "Agent",
        "N",
        metrics.join("  "),
        cw = CONDITION_WIDTH,
        nw = COUNT_WIDTH
    )
}

fn row(report: &ConditionReport) -> String {
    let cells: Vec<String> = match &report.averages {
        Some(avg) => avg
            .iter()
            .map(|(_, v)| format!("{:>width$.3}", v, width = METRIC_WIDTH))
            .collect(),
        None => Metric::ALL
            .iter()
            .map(|_| format!("{:>width$}", "-", width = METRIC_WIDTH))
            .collect(),
    };
    format!(
        "{:<cw$} {:>nw$}  {}",
        report.condition,
        report.episodes,
        cells.join("  "),
        cw = CONDITION_WIDTH,
        nw = COUNT_WIDTH
    )
}

fn diagnostics(report: &ConditionReport) -> Vec<String> {
    match report.status {
        ConditionStatus::Missing => vec![format!(
            "  MISSING: {}",
            Discrepancy::MissingCondition {
                condition: report.condition.clone()
            }
        )],
        ConditionStatus::Unchecked => vec![format!(
            "  NOTE: {} is not in the reference table (not checked)",
            report.condition
        )],
        ConditionStatus::Checked => report
            .checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| {
                let d = Discrepancy::MetricMismatch {
                    condition: report.condition.clone(),
                    metric: c.metric,
                    computed: c.computed,
                    expected: c.expected,
                    deviation: c.deviation,
                };
                format!("  MISMATCH: {}", d)
            })
            .collect(),
    }
}

/// Render the table, per-condition diagnostics, total and summary line.
pub fn render(verification: &Verification) -> RenderedReport {
    let mut stdout = String::new();
    let mut stderr = String::new();

    let header = header();
    let _ = writeln!(stdout, "{}", header);
    let _ = writeln!(stdout, "{}", "-".repeat(header.len()));

    for report in &verification.conditions {
        let _ = writeln!(stdout, "{}", row(report));
        for line in diagnostics(report) {
            let _ = writeln!(stdout, "{}", line);
        }
    }

    let _ = writeln!(stdout);
    let _ = writeln!(stdout, "Total episodes: {}", verification.total_episodes());

    let passed = verification.passed();
    if passed {
        let _ = writeln!(stdout, "{}", PASS_MESSAGE);
    } else {
        let _ = writeln!(stderr, "{}", FAIL_MESSAGE);
    }

    RenderedReport {
        stdout,
        stderr,
        passed,
    }
}
