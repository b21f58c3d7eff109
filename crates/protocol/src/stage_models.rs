//! Stage catalog, lifecycle status and per-stage results.
//!
//! The catalog is the fixed, ordered list of stages the pipeline knows how to
//! run. Every run executes a subsequence of it, never a reordering.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// One named unit of work in the pipeline catalog.
///
/// Variant order is catalog order; `Ord` follows it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    /// Path resolution and environment setup.
    Setup,
    /// Market data loading and pre-processing.
    LoadData,
    /// Feature engineering.
    GenerateFeatures,
    /// Target label generation.
    GenerateLabels,
    /// Model inference.
    ModelPredictions,
    /// Evaluation metrics and gate checks.
    Evaluation,
    /// Position sizing.
    RiskSizing,
    /// Trade processing.
    ProcessTrades,
}

impl StageName {
    /// The catalog, in execution order.
    pub const ALL: [StageName; 8] = [
        StageName::Setup,
        StageName::LoadData,
        StageName::GenerateFeatures,
        StageName::GenerateLabels,
        StageName::ModelPredictions,
        StageName::Evaluation,
        StageName::RiskSizing,
        StageName::ProcessTrades,
    ];

    /// Canonical snake_case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::LoadData => "load_data",
            Self::GenerateFeatures => "generate_features",
            Self::GenerateLabels => "generate_labels",
            Self::ModelPredictions => "model_predictions",
            Self::Evaluation => "evaluation",
            Self::RiskSizing => "risk_sizing",
            Self::ProcessTrades => "process_trades",
        }
    }

    /// 1-based position in the catalog.
    pub fn index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|stage| stage == self)
            .map_or(0, |pos| pos + 1)
    }

    /// Look up a stage by its 1-based catalog position.
    pub fn from_index(index: usize) -> Option<Self> {
        index
            .checked_sub(1)
            .and_then(|pos| Self::ALL.get(pos).copied())
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no catalog stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStageName(pub String);

impl fmt::Display for UnknownStageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown stage: {}", self.0)
    }
}

impl std::error::Error for UnknownStageName {}

impl FromStr for StageName {
    type Err = UnknownStageName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| UnknownStageName(s.to_string()))
    }
}

/// Lifecycle status of a single stage within one run.
///
/// Valid transitions:
/// - Pending -> Running -> Success | Skipped | Failed
/// - Pending -> Skipped (dry-run, or the stage could not be resolved)
///
/// Success, Skipped and Failed are terminal.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageStatus {
    /// Stage has not been looked at yet.
    Pending,

    /// Stage body is being invoked.
    Running,

    /// Stage resolved and its body returned normally.
    Success,

    /// Stage was not invoked: dry-run, or no implementation was found.
    Skipped,

    /// Stage resolved but its body raised an error.
    Failed,
}

impl StageStatus {
    /// Whether no further transition is allowed from this status.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Skipped | Self::Failed)
    }

    /// Whether moving from `self` to `next` is a legal lifecycle step.
    pub fn can_transition_to(self, next: StageStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running)
                | (Self::Pending, Self::Skipped)
                | (Self::Running, Self::Success)
                | (Self::Running, Self::Skipped)
                | (Self::Running, Self::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Success => "SUCCESS",
            Self::Skipped => "SKIPPED",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of executing one stage in one run.
///
/// Created once by the stage executor and never mutated after it is
/// appended to the run's result sequence.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StageResult {
    /// Which catalog stage this result belongs to.
    pub name: StageName,

    /// Terminal status of the stage.
    pub status: StageStatus,

    /// Wall-clock time spent invoking the stage body. Zero when skipped.
    pub elapsed: Duration,

    /// Description of the raised condition. Present only when failed.
    pub error: Option<String>,

    /// Provider id that satisfied resolution, if any.
    pub provider: Option<String>,

    /// Diagnostic note, e.g. why a stage was skipped.
    pub note: Option<String>,

    /// Free-form payload the stage body chose to return.
    pub output: Option<serde_json::Value>,
}

impl StageResult {
    pub fn is_failed(&self) -> bool {
        self.status == StageStatus::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order_and_indices() {
        let names: Vec<&str> = StageName::ALL.iter().map(StageName::as_str).collect();
        assert_eq!(
            names,
            vec![
                "setup",
                "load_data",
                "generate_features",
                "generate_labels",
                "model_predictions",
                "evaluation",
                "risk_sizing",
                "process_trades",
            ]
        );

        for (pos, stage) in StageName::ALL.iter().enumerate() {
            assert_eq!(stage.index(), pos + 1);
            assert_eq!(StageName::from_index(pos + 1), Some(*stage));
        }
        assert_eq!(StageName::from_index(0), None);
        assert_eq!(StageName::from_index(9), None);
    }

    #[test]
    fn test_stage_name_ordering_matches_catalog() {
        let mut shuffled = vec![StageName::RiskSizing, StageName::Setup, StageName::Evaluation];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![StageName::Setup, StageName::Evaluation, StageName::RiskSizing]
        );
    }

    #[test]
    fn test_stage_name_from_str() {
        assert_eq!("risk_sizing".parse::<StageName>(), Ok(StageName::RiskSizing));
        assert_eq!(
            "bogus".parse::<StageName>(),
            Err(UnknownStageName("bogus".to_string()))
        );
    }

    #[test]
    fn test_status_transitions() {
        use StageStatus::*;

        assert!(Pending.can_transition_to(Running));
        assert!(Pending.can_transition_to(Skipped));
        assert!(Running.can_transition_to(Success));
        assert!(Running.can_transition_to(Failed));
        assert!(Running.can_transition_to(Skipped));

        assert!(!Pending.can_transition_to(Success));
        assert!(!Pending.can_transition_to(Failed));
        for terminal in [Success, Skipped, Failed] {
            assert!(terminal.is_terminal());
            for next in [Pending, Running, Success, Skipped, Failed] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }
}
