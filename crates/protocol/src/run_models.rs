//! Aggregate result of one pipeline run.

use crate::stage_models::{StageResult, StageStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Ordered stage results of one invocation of the pipeline runner, plus
/// the counts derived from them.
///
/// Built once at run end; read-only afterwards.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunResult {
    /// Identifier for this run, used to correlate log lines.
    pub run_id: Uuid,

    /// When the runner started.
    pub started_at: DateTime<Utc>,

    /// Stage results in execution order.
    pub stages: Vec<StageResult>,

    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,

    /// Sum of all stage elapsed times.
    pub total_elapsed: Duration,
}

impl RunResult {
    /// Derive counts and total elapsed time from `stages`.
    pub fn new(run_id: Uuid, started_at: DateTime<Utc>, stages: Vec<StageResult>) -> Self {
        let count = |status: StageStatus| stages.iter().filter(|r| r.status == status).count();
        let succeeded = count(StageStatus::Success);
        let skipped = count(StageStatus::Skipped);
        let failed = count(StageStatus::Failed);
        let total_elapsed = stages.iter().map(|r| r.elapsed).sum();

        Self {
            run_id,
            started_at,
            stages,
            succeeded,
            skipped,
            failed,
            total_elapsed,
        }
    }

    /// Whether any executed stage ended in `Failed`.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
