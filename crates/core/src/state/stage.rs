//! Stage lifecycle state machine.
//!
//! This module provides functions for moving a [`StageProgress`] through
//! its lifecycle:
//!
//! ```text
//! PENDING ──► RUNNING ──► SUCCESS | SKIPPED | FAILED
//!    └──────► SKIPPED
//! ```
//!
//! Every transition is checked against
//! [`StageStatus::can_transition_to`]; an invalid transition leaves the
//! progress untouched and returns `false`.

use fxp_protocol::stage_models::{StageName, StageResult, StageStatus};
use std::time::{Duration, Instant};
use tracing::warn;

/// In-flight record for one stage. Frozen into a [`StageResult`] by
/// [`finish`].
#[derive(Debug, Clone)]
pub struct StageProgress {
    pub name: StageName,
    pub status: StageStatus,
    started: Option<Instant>,
    elapsed: Duration,
    error: Option<String>,
    provider: Option<String>,
    note: Option<String>,
    output: Option<serde_json::Value>,
}

impl StageProgress {
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

fn transition(progress: &mut StageProgress, next: StageStatus) -> bool {
    if !progress.status.can_transition_to(next) {
        warn!(
            stage = %progress.name,
            from = %progress.status,
            to = %next,
            "rejected invalid stage transition"
        );
        return false;
    }
    progress.status = next;
    true
}

fn stop_clock(progress: &mut StageProgress) {
    progress.elapsed = progress
        .started
        .map(|started| started.elapsed())
        .unwrap_or_default();
}

/// Create a new progress record with Pending status.
pub fn begin(name: StageName) -> StageProgress {
    StageProgress {
        name,
        status: StageStatus::Pending,
        started: None,
        elapsed: Duration::ZERO,
        error: None,
        provider: None,
        note: None,
        output: None,
    }
}

/// Transition to Running and start the clock, without a provider yet.
pub fn start(progress: &mut StageProgress) -> bool {
    if !transition(progress, StageStatus::Running) {
        return false;
    }
    progress.started = Some(Instant::now());
    true
}

/// Transition to Running and start the clock.
///
/// # Arguments
///
/// * `progress` - The stage to start
/// * `provider` - The provider id the stage resolved to
pub fn mark_running(progress: &mut StageProgress, provider: &str) -> bool {
    if !start(progress) {
        return false;
    }
    progress.provider = Some(provider.to_string());
    true
}

/// Transition to Skipped. Elapsed time stays zero.
///
/// # Arguments
///
/// * `progress` - The stage to skip
/// * `note` - Why the stage was skipped
pub fn skip(progress: &mut StageProgress, note: impl Into<String>) -> bool {
    if !transition(progress, StageStatus::Skipped) {
        return false;
    }
    progress.elapsed = Duration::ZERO;
    progress.note = Some(note.into());
    true
}

/// Transition to Success, stop the clock and attach the output payload.
pub fn succeed(progress: &mut StageProgress, output: Option<serde_json::Value>) -> bool {
    if !transition(progress, StageStatus::Success) {
        return false;
    }
    stop_clock(progress);
    progress.output = output;
    true
}

/// Transition to Failed, stop the clock and record the error.
///
/// # Arguments
///
/// * `progress` - The stage that failed
/// * `error` - Description of the failure; never empty in the result
pub fn fail(progress: &mut StageProgress, error: impl Into<String>) -> bool {
    if !transition(progress, StageStatus::Failed) {
        return false;
    }
    stop_clock(progress);
    let error = error.into();
    progress.error = Some(if error.trim().is_empty() {
        "stage failed without a description".to_string()
    } else {
        error
    });
    true
}

/// Attach a diagnostic note without changing status.
pub fn annotate(progress: &mut StageProgress, note: impl Into<String>) {
    progress.note = Some(note.into());
}

/// Freeze the progress into a result.
pub fn finish(progress: StageProgress) -> StageResult {
    StageResult {
        name: progress.name,
        status: progress.status,
        elapsed: progress.elapsed,
        error: progress.error,
        provider: progress.provider,
        note: progress.note,
        output: progress.output,
    }
}
