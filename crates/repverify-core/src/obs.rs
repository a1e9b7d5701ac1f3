//! Structured lifecycle events for a verification run.
//!
//! Events are emitted at `info!` level (filter with `REPVERIFY_LOG`); the
//! binary enables them with `--verbose`.

use std::path::Path;

use tracing::info;

/// RAII guard that enters a run-scoped span tagged with the input path.
pub struct RunSpan {
    _span: tracing::span::EnteredSpan,
}

impl RunSpan {
    pub fn enter(input: &Path) -> Self {
        let span = tracing::info_span!("repverify.run", input = %input.display());
        Self {
            _span: span.entered(),
        }
    }
}

pub fn emit_load_started(input: &Path) {
    info!(event = "load.started", input = %input.display());
}

/// Emit event: loading and aggregation finished.
pub fn emit_load_finished(episodes: u64, conditions: usize) {
    info!(event = "load.finished", episodes = episodes, conditions = conditions);
}

/// Emit event: verification verdict with the number of discrepancies found.
pub fn emit_verify_finished(passed: bool, discrepancies: usize) {
    info!(
        event = "verify.finished",
        passed = passed,
        discrepancies = discrepancies,
    );
}

pub fn emit_report_written(path: &Path) {
    info!(event = "report.written", path = %path.display());
}

/// Emit event: fatal load error (warning level).
pub fn emit_load_failed(error: &dyn std::fmt::Display) {
    tracing::warn!(event = "load.failed", error = %error);
}
