//! Custom assertion helpers for run results.

use fxp_protocol::run_models::RunResult;
use fxp_protocol::stage_models::{StageName, StageStatus};
use std::time::Duration;

/// Assert the exact `(stage, status)` sequence of a run.
#[allow(dead_code)]
pub fn assert_statuses(result: &RunResult, expected: &[(StageName, StageStatus)]) {
    let actual: Vec<(StageName, StageStatus)> = result
        .stages
        .iter()
        .map(|stage| (stage.name, stage.status))
        .collect();
    assert_eq!(actual, expected, "unexpected stage outcomes");
}

/// Assert that the aggregates agree with the per-stage results.
///
/// Checks that:
/// 1. Total elapsed equals the sum of stage elapsed times
/// 2. Success + skipped + failed equals the number of stages
#[allow(dead_code)]
pub fn assert_totals_consistent(result: &RunResult) {
    let sum: Duration = result.stages.iter().map(|stage| stage.elapsed).sum();
    assert_eq!(result.total_elapsed, sum, "total elapsed is not the sum");
    assert_eq!(
        result.succeeded + result.skipped + result.failed,
        result.stages.len(),
        "counts do not cover every stage"
    );
}

/// Assert that every skipped stage took no time and every failed stage has
/// an error description.
#[allow(dead_code)]
pub fn assert_result_shapes(result: &RunResult) {
    for stage in &result.stages {
        match stage.status {
            StageStatus::Skipped => {
                assert_eq!(stage.elapsed, Duration::ZERO, "{} skipped with time", stage.name)
            }
            StageStatus::Failed => assert!(
                stage.error.as_deref().is_some_and(|e| !e.is_empty()),
                "{} failed without an error",
                stage.name
            ),
            _ => assert!(stage.error.is_none(), "{} has a stray error", stage.name),
        }
    }
}
