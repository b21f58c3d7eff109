//! End-of-run summary.
//!
//! [`RunSummary::render`] is a pure function of the [`RunResult`]: the same
//! result always renders to the same text.

use fxp_protocol::run_models::RunResult;
use fxp_protocol::stage_models::{StageResult, StageStatus};
use std::fmt::Write as _;
use tracing::{error, info};

const RULE_WIDTH: usize = 60;

/// Completed run plus its rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    result: RunResult,
}

/// Whether a stage's output reports degraded-mode inference.
fn is_degraded(stage: &StageResult) -> bool {
    stage
        .output
        .as_ref()
        .and_then(|output| output.get("mode"))
        .and_then(|mode| mode.as_str())
        == Some("degraded")
}

fn stage_line(stage: &StageResult) -> String {
    let mut line = format!(
        "  {:<8} {:<25} {:>7.2}s",
        stage.status.as_str(),
        stage.name.as_str(),
        stage.elapsed.as_secs_f64()
    );
    if stage.status == StageStatus::Failed {
        if let Some(error) = &stage.error {
            let _ = write!(line, "  ({error})");
        }
    }
    if is_degraded(stage) {
        line.push_str("  [degraded]");
    }
    line
}

impl RunSummary {
    pub fn new(result: RunResult) -> Self {
        Self { result }
    }

    pub fn result(&self) -> &RunResult {
        &self.result
    }

    pub fn into_result(self) -> RunResult {
        self.result
    }

    /// Whether any stage FAILED. Drives the process exit code.
    pub fn has_failures(&self) -> bool {
        self.result.has_failures()
    }

    /// `Total: X.XXs | Passed: n | Skipped: n | Failed: n`
    pub fn totals_line(&self) -> String {
        format!(
            "Total: {:.2}s | Passed: {} | Skipped: {} | Failed: {}",
            self.result.total_elapsed.as_secs_f64(),
            self.result.succeeded,
            self.result.skipped,
            self.result.failed
        )
    }

    /// Per-stage lines in execution order.
    pub fn stage_lines(&self) -> Vec<String> {
        self.result.stages.iter().map(stage_line).collect()
    }

    /// Render the full report.
    pub fn render(&self) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let mut out = String::new();

        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "PIPELINE SUMMARY (run {})", self.result.run_id);
        let _ = writeln!(out, "{rule}");
        for line in self.stage_lines() {
            let _ = writeln!(out, "{line}");
        }
        let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
        let _ = writeln!(out, "{}", self.totals_line());
        out
    }

    /// Emit the summary through `tracing`.
    pub fn log(&self) {
        info!("PIPELINE SUMMARY");
        for line in self.stage_lines() {
            info!("{line}");
        }
        if self.has_failures() {
            error!("{}", self.totals_line());
            error!("pipeline finished with errors");
        } else {
            info!("{}", self.totals_line());
            info!("pipeline finished successfully");
        }
    }
}
