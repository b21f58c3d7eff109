//! Pipeline execution engine.
//!
//! The [`PipelineRunner`] validates the stage selection, then runs the
//! selected stages one at a time in catalog order through the
//! [`StageExecutor`]. A stage failure never stops the run; only an invalid
//! selection does, and it does so before any stage starts.

pub mod executor;

pub use executor::StageExecutor;

use crate::config::RunConfig;
use crate::report::RunSummary;
use crate::stages::registry::StageRegistry;
use crate::stages::resolver::{LookupResolver, StageResolver};
use chrono::Utc;
use fxp_protocol::run_models::RunResult;
use fxp_protocol::stage_models::StageName;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Run-fatal errors, detected before any stage executes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("Unknown stage '{0}'")]
    UnknownStage(String),

    #[error("Stage index {0} is out of range (1-{max})", max = StageName::ALL.len())]
    InvalidStageIndex(usize),
}

/// Turn stage selectors (names or 1-based catalog indices) into catalog
/// stages, deduplicated and in catalog order. Blank selectors are ignored.
///
/// # Errors
///
/// Returns the first selector that is neither a catalog name nor a valid
/// index.
///
/// # Example
///
/// ```
/// use fxp_core::engine::select_stages;
/// use fxp_protocol::stage_models::StageName;
///
/// let selected = select_stages(&["risk_sizing".to_string(), "1".to_string()]).unwrap();
/// assert_eq!(selected, vec![StageName::Setup, StageName::RiskSizing]);
/// ```
pub fn select_stages(selectors: &[String]) -> Result<Vec<StageName>, RunError> {
    let mut selected = BTreeSet::new();

    for selector in selectors.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let stage = match selector.parse::<usize>() {
            Ok(index) => StageName::from_index(index).ok_or(RunError::InvalidStageIndex(index))?,
            Err(_) => selector
                .parse::<StageName>()
                .map_err(|_| RunError::UnknownStage(selector.to_string()))?,
        };
        selected.insert(stage);
    }

    Ok(selected.into_iter().collect())
}

/// Drives a whole run.
///
/// # Example
///
/// ```rust,no_run
/// use fxp_core::config::RunConfig;
/// use fxp_core::engine::PipelineRunner;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = RunConfig::default();
/// let summary = PipelineRunner::from_config(&config).run(&config).await?;
/// println!("{}", summary.render());
/// # Ok(())
/// # }
/// ```
pub struct PipelineRunner {
    registry: StageRegistry,
    executor: StageExecutor,
}

impl PipelineRunner {
    /// Create a runner that resolves stages through `resolver`.
    pub fn new(resolver: Arc<dyn StageResolver>) -> Self {
        Self {
            registry: StageRegistry::new(),
            executor: StageExecutor::new(resolver),
        }
    }

    /// Create a runner with the default filesystem-plus-built-ins resolver.
    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(Arc::new(LookupResolver::from_config(config)))
    }

    pub fn registry(&self) -> &StageRegistry {
        &self.registry
    }

    /// Execute the configured selection and summarise it.
    ///
    /// # Errors
    ///
    /// Returns [`RunError`] when the selection names an unknown stage or an
    /// out-of-range index. No stage runs in that case.
    pub async fn run(&self, config: &RunConfig) -> Result<RunSummary, RunError> {
        let stages = select_stages(&config.stages)?;

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let span = info_span!("run", %run_id);

        let results = async {
            info!(
                stages = stages.len(),
                project_root = %config.project_root.display(),
                dry_run = config.dry_run,
                "pipeline starting"
            );

            let mut results = Vec::with_capacity(stages.len());
            for stage in &stages {
                let binding = self.registry.binding(*stage);
                results.push(self.executor.execute(&binding, config).await);
            }
            results
        }
        .instrument(span.clone())
        .await;

        let summary = RunSummary::new(RunResult::new(run_id, started_at, results));
        span.in_scope(|| summary.log());
        Ok(summary)
    }
}
