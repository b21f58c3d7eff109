//! Built-in `model_predictions` provider.
//!
//! Turns market rows into BUY / HOLD / SELL signals:
//! 1. Load input rows (configured CSV, or deterministic sample rows)
//! 2. Standardise them onto the 15-column schema
//! 3. Predict `[p_sell, p_hold, p_buy]` with a [`ProbabilityModel`]
//! 4. Threshold the probabilities into decisions
//! 5. Write the signals CSV
//!
//! When no model can be loaded the stage runs in degraded mode: every row gets
//! the uniform fallback, the output payload says `"mode": "degraded"`, and the
//! run configuration decides whether that is acceptable.

pub mod classify;
pub mod io;
pub mod model;
pub mod schema;

use crate::stages::base::{EntryPoint, StageContext, StageError, StageOutput, StageUnit};
use async_trait::async_trait;
use classify::{predictions_to_signals, SignalCounts};
use fxp_protocol::signal_models::{InferenceMode, SignalRecord};
use model::{uniform_fallback, LinearModel, ProbabilityModel};
use schema::{sample_rows, standardise, RawRow};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Rows generated when no input file is configured.
const SAMPLE_ROWS: usize = 5;

/// Outcome of one signal generation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalReport {
    pub mode: InferenceMode,
    /// Why the backend was unavailable, in degraded mode.
    pub degraded_reason: Option<String>,
    pub records: Vec<SignalRecord>,
    pub counts: SignalCounts,
    /// `None` when there was nothing to write.
    pub signals_path: Option<PathBuf>,
}

impl SignalReport {
    pub fn to_output(&self) -> serde_json::Value {
        let mut output = serde_json::json!({
            "mode": self.mode.as_str(),
            "rows": self.records.len(),
            "buy": self.counts.buy,
            "sell": self.counts.sell,
            "hold": self.counts.hold,
            "signals_path": self.signals_path.as_ref().map(|p| p.display().to_string()),
        });
        if let Some(reason) = &self.degraded_reason {
            output["reason"] = serde_json::Value::String(reason.clone());
        }
        output
    }
}

#[derive(Clone, Default)]
pub struct SignalGenerationStage {
    model: Option<Arc<dyn ProbabilityModel>>,
}

impl fmt::Debug for SignalGenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalGenerationStage")
            .field("model", &self.model.as_ref().map(|m| m.name()))
            .finish()
    }
}

impl SignalGenerationStage {
    /// Use `model` instead of loading one from the models directory.
    pub fn with_model(model: Arc<dyn ProbabilityModel>) -> Self {
        Self { model: Some(model) }
    }

    async fn input_rows(&self, context: &StageContext) -> anyhow::Result<Vec<RawRow>> {
        let params = &context.params;
        if !params.data_file.is_empty() {
            let path = context.data_dir.join(&params.data_file);
            if path.is_file() {
                return io::load_rows(&path).await;
            }
            warn!(path = %path.display(), "data file not found, using sample data");
        }
        Ok(sample_rows(&params.symbol, SAMPLE_ROWS))
    }

    async fn backend(&self, context: &StageContext) -> Result<Arc<dyn ProbabilityModel>, String> {
        if let Some(model) = &self.model {
            return Ok(Arc::clone(model));
        }

        let path = context.models_dir.join(&context.params.model_file);
        if !path.is_file() {
            return Err(format!("model file not found: {}", path.display()));
        }
        let model = LinearModel::load(&path).await.map_err(|err| format!("{err:#}"))?;
        info!(path = %path.display(), "model loaded");
        Ok(Arc::new(model))
    }

    /// Run one full generation pass.
    ///
    /// # Errors
    ///
    /// Fails when the input file is unreadable, the signals file cannot be
    /// written, or the backend is unavailable and degraded inference is not
    /// allowed.
    pub async fn generate(&self, context: &StageContext) -> Result<SignalReport, StageError> {
        let rows = standardise(&self.input_rows(context).await?);
        let features: Vec<_> = rows.iter().map(|row| row.features).collect();

        let prediction = match self.backend(context).await {
            Ok(model) => model
                .predict(&features)
                .map_err(|err| format!("{} prediction failed: {err:#}", model.name())),
            Err(reason) => Err(reason),
        };

        let (mode, degraded_reason, probabilities) = match prediction {
            Ok(probabilities) => (InferenceMode::Model, None, probabilities),
            Err(reason) => {
                if !context.params.allow_degraded_inference {
                    return Err(StageError::DegradedRefused(reason));
                }
                warn!(%reason, rows = features.len(), "inference backend unavailable, running degraded");
                (
                    InferenceMode::Degraded,
                    Some(reason),
                    uniform_fallback(features.len()),
                )
            }
        };

        let records = predictions_to_signals(&probabilities, context.params.confidence_threshold);
        let counts = SignalCounts::tally(&records);
        info!(
            mode = mode.as_str(),
            buy = counts.buy,
            sell = counts.sell,
            hold = counts.hold,
            total = records.len(),
            "signal summary"
        );

        let path = context.output_dir.join(&context.params.signals_file);
        let signals_path = io::write_signals(&records, &path).await?.then_some(path);

        Ok(SignalReport {
            mode,
            degraded_reason,
            records,
            counts,
            signals_path,
        })
    }
}

#[async_trait]
impl StageUnit for SignalGenerationStage {
    fn entry_points(&self) -> Vec<EntryPoint> {
        vec![EntryPoint::named("predict"), EntryPoint::Run]
    }

    async fn invoke(
        &self,
        _entry: &EntryPoint,
        context: &StageContext,
    ) -> Result<StageOutput, StageError> {
        let report = self.generate(context).await?;
        Ok(Some(report.to_output()))
    }
}
