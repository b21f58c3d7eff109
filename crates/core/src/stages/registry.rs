//! Stage registry: the binding from each catalog stage to the providers that
//! can satisfy it.
//!
//! The binding table is exhaustive over [`StageName`], so adding a stage to
//! the catalog does not compile until it has a binding here.

use crate::stages::dispatch::DispatchPolicy;
use fxp_protocol::stage_models::StageName;

/// How one catalog stage is resolved and invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageBinding {
    pub stage: StageName,

    /// Acceptable provider ids, highest priority first.
    pub candidates: &'static [&'static str],

    /// The stage-specific named entry point.
    pub entry: &'static str,

    /// One-line description for listings.
    pub description: &'static str,
}

impl StageBinding {
    pub fn dispatch_policy(&self) -> DispatchPolicy {
        DispatchPolicy::for_named(self.entry)
    }

    /// Whether the working directories are created before this stage's
    /// provider is resolved.
    pub fn prepares_workspace(&self) -> bool {
        self.stage == StageName::Setup
    }
}

/// Immutable view over the catalog and its bindings.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageRegistry;

impl StageRegistry {
    pub fn new() -> Self {
        Self
    }

    /// The catalog in execution order.
    pub fn catalog(&self) -> &'static [StageName] {
        &StageName::ALL
    }

    pub fn binding(&self, stage: StageName) -> StageBinding {
        let (candidates, entry, description): (&'static [&'static str], _, _) = match stage {
            StageName::Setup => (
                &["path_resolver", "workspace_setup"],
                "resolve",
                "Path resolution & environment setup",
            ),
            StageName::LoadData => (
                &["Load_and_process", "load_and_process"],
                "load_and_process",
                "Load & process market data",
            ),
            StageName::GenerateFeatures => (
                &["feature_engineering", "generate_features", "GenerateFeatures"],
                "generate",
                "Generate features",
            ),
            StageName::GenerateLabels => (&["generate_labels"], "generate", "Generate labels"),
            StageName::ModelPredictions => (
                &[
                    "ensemble_predictions",
                    "generate_signals_with_xgboost",
                    "xgboost_predictions_api",
                ],
                "predict",
                "Model predictions",
            ),
            StageName::Evaluation => (
                &["evaluation_framework"],
                "evaluate_model",
                "Evaluation framework",
            ),
            StageName::RiskSizing => (
                &["evaluation_framework", "risk_management", "risk_managementnew"],
                "calculate_risk",
                "Risk sizing",
            ),
            StageName::ProcessTrades => (
                &["process_trades", "trading_integration"],
                "process",
                "Process trades",
            ),
        };

        StageBinding {
            stage,
            candidates,
            entry,
            description,
        }
    }

    /// All bindings in catalog order.
    pub fn bindings(&self) -> impl Iterator<Item = StageBinding> + '_ {
        self.catalog().iter().map(|stage| self.binding(*stage))
    }
}
