//! Inference backends producing `[p_sell, p_hold, p_buy]` rows.

use crate::stages::builtin::signals::schema::{FeatureVector, FEATURE_COUNT};
use anyhow::{bail, Context};
use serde::Deserialize;
use std::path::Path;

/// Probabilities emitted when no backend is available.
pub const UNIFORM_FALLBACK: [f64; 3] = [0.33, 0.34, 0.33];

/// A model mapping feature vectors to class probabilities.
pub trait ProbabilityModel: Send + Sync {
    fn name(&self) -> &str;

    /// One probability row per input row, in `[sell, hold, buy]` order.
    fn predict(&self, features: &[FeatureVector]) -> anyhow::Result<Vec<Vec<f64>>>;
}

/// Multinomial logistic model stored as JSON:
///
/// ```json
/// { "weights": [[...13 floats...], [...], [...]], "bias": [0.0, 0.0, 0.0] }
/// ```
///
/// A single weight row is a binary model whose output `p` is widened to
/// `[1 - p, 0, p]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinearModel {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

impl LinearModel {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let model: Self = serde_json::from_str(json).context("Invalid model JSON")?;
        model.validate()?;
        Ok(model)
    }

    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Model file not readable: {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Failed to load {}", path.display()))
    }

    fn validate(&self) -> anyhow::Result<()> {
        let classes = self.weights.len();
        if classes != 1 && classes != 3 {
            bail!("expected 1 or 3 weight rows, found {classes}");
        }
        if self.bias.len() != classes {
            bail!(
                "expected {classes} bias terms, found {}",
                self.bias.len()
            );
        }
        if let Some(row) = self.weights.iter().find(|row| row.len() != FEATURE_COUNT) {
            bail!(
                "expected {FEATURE_COUNT} weights per row, found {}",
                row.len()
            );
        }
        Ok(())
    }

    fn logits(&self, features: &FeatureVector) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(row, bias)| {
                row.iter()
                    .zip(features)
                    .map(|(w, x)| w * x)
                    .sum::<f64>()
                    + bias
            })
            .collect()
    }
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|z| (z - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl ProbabilityModel for LinearModel {
    fn name(&self) -> &str {
        "linear"
    }

    fn predict(&self, features: &[FeatureVector]) -> anyhow::Result<Vec<Vec<f64>>> {
        let rows = features
            .iter()
            .map(|row| {
                let logits = self.logits(row);
                match logits.as_slice() {
                    [z] => {
                        let p = sigmoid(*z);
                        vec![1.0 - p, 0.0, p]
                    }
                    _ => softmax(&logits),
                }
            })
            .collect::<Vec<_>>();

        if rows.iter().flatten().any(|p| !p.is_finite()) {
            bail!("model produced non-finite probabilities");
        }
        Ok(rows)
    }
}

/// Uniform rows standing in for a missing backend.
pub fn uniform_fallback(rows: usize) -> Vec<Vec<f64>> {
    vec![UNIFORM_FALLBACK.to_vec(); rows]
}
