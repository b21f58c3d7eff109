//! Stage parameters and the on-disk configuration file shape.
//!
//! Parameters are handed opaquely to the stages that need them; the engine
//! never inspects them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Parameters consumed by individual stages.
///
/// Defaults mirror the values the trading project ships with.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StageParams {
    /// Instrument symbol, e.g. `EURUSD`.
    pub symbol: String,

    /// Bar timeframe, e.g. `H1`.
    pub timeframe: String,

    /// Input data file, relative to the data directory. Empty means "none".
    pub data_file: String,

    /// Number of engineered features expected downstream.
    pub feature_count: u32,

    /// Minimum winning probability for a BUY/SELL decision.
    pub confidence_threshold: f64,

    /// Model file, relative to the models directory.
    pub model_file: String,

    /// Signals CSV, relative to the output directory.
    pub signals_file: String,

    /// Accept uniform fallback predictions when no model is available.
    pub allow_degraded_inference: bool,

    pub sharpe_threshold: f64,
    pub sortino_threshold: f64,
    pub profit_factor_threshold: f64,
    pub expectancy_threshold: f64,
    pub calmar_threshold: f64,

    /// Account equity used for position sizing.
    pub account_equity: f64,

    /// Maximum risk per trade, in percent of equity.
    pub max_risk_pct: f64,
}

impl Default for StageParams {
    fn default() -> Self {
        Self {
            symbol: "EURUSD".to_string(),
            timeframe: "H1".to_string(),
            data_file: String::new(),
            feature_count: 43,
            confidence_threshold: 0.60,
            model_file: "xgboost_model.json".to_string(),
            signals_file: "signals.csv".to_string(),
            allow_degraded_inference: true,
            sharpe_threshold: 0.8,
            sortino_threshold: 1.25,
            profit_factor_threshold: 1.7,
            expectancy_threshold: 0.10,
            calmar_threshold: 1.0,
            account_equity: 10_000.0,
            max_risk_pct: 1.5,
        }
    }
}

impl StageParams {
    /// Render the bundle as `FXJEFE_*` environment pairs for external stages.
    pub fn to_env(&self) -> Vec<(String, String)> {
        let pairs: [(&str, String); 15] = [
            ("SYMBOL", self.symbol.clone()),
            ("TIMEFRAME", self.timeframe.clone()),
            ("DATA_FILE", self.data_file.clone()),
            ("FEATURE_COUNT", self.feature_count.to_string()),
            ("CONFIDENCE_THRESHOLD", self.confidence_threshold.to_string()),
            ("MODEL_FILE", self.model_file.clone()),
            ("SIGNALS_FILE", self.signals_file.clone()),
            (
                "ALLOW_DEGRADED_INFERENCE",
                self.allow_degraded_inference.to_string(),
            ),
            ("SHARPE_THRESHOLD", self.sharpe_threshold.to_string()),
            ("SORTINO_THRESHOLD", self.sortino_threshold.to_string()),
            (
                "PROFIT_FACTOR_THRESHOLD",
                self.profit_factor_threshold.to_string(),
            ),
            ("EXPECTANCY_THRESHOLD", self.expectancy_threshold.to_string()),
            ("CALMAR_THRESHOLD", self.calmar_threshold.to_string()),
            ("ACCOUNT_EQUITY", self.account_equity.to_string()),
            ("MAX_RISK_PCT", self.max_risk_pct.to_string()),
        ];

        pairs
            .into_iter()
            .map(|(key, value)| (format!("FXJEFE_{key}"), value))
            .collect()
    }
}

/// One entry of a `steps` list in a configuration file: a stage name or a
/// bare 1-based catalog index.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum StageSelector {
    Index(usize),
    Name(String),
}

impl fmt::Display for StageSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<&str> for StageSelector {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// Contents of an optional configuration file (`.toml`, `.yaml` or `.json`).
///
/// Every field is optional; absent fields fall back to the built-in default
/// and are themselves overridden by command-line flags. Unknown keys are
/// ignored.
///
/// # Example
///
/// ```toml
/// steps = ["setup", 5]
/// symbol = "GBPUSD"
/// confidence_threshold = 0.65
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct FileConfig {
    /// Stage selectors: names or 1-based catalog indices, quoted or not.
    pub steps: Option<Vec<StageSelector>>,
    pub dry_run: Option<bool>,
    pub project_root: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub models_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    /// Extra root-relative directories searched for stage providers.
    pub lookup_dirs: Option<Vec<PathBuf>>,

    pub symbol: Option<String>,
    pub timeframe: Option<String>,
    pub data_file: Option<String>,
    pub feature_count: Option<u32>,
    pub confidence_threshold: Option<f64>,
    pub model_file: Option<String>,
    pub signals_file: Option<String>,
    pub allow_degraded_inference: Option<bool>,
    pub sharpe_threshold: Option<f64>,
    pub sortino_threshold: Option<f64>,
    pub profit_factor_threshold: Option<f64>,
    pub expectancy_threshold: Option<f64>,
    pub calmar_threshold: Option<f64>,
    pub account_equity: Option<f64>,
    pub max_risk_pct: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = StageParams::default();
        assert_eq!(params.symbol, "EURUSD");
        assert_eq!(params.timeframe, "H1");
        assert_eq!(params.feature_count, 43);
        assert!((params.confidence_threshold - 0.60).abs() < f64::EPSILON);
        assert!((params.account_equity - 10_000.0).abs() < f64::EPSILON);
        assert!((params.max_risk_pct - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_params_to_env() {
        let env = StageParams::default().to_env();
        assert!(env.iter().all(|(key, _)| key.starts_with("FXJEFE_")));
        assert!(env.contains(&("FXJEFE_SYMBOL".to_string(), "EURUSD".to_string())));
        assert!(env.contains(&("FXJEFE_ACCOUNT_EQUITY".to_string(), "10000".to_string())));
    }
}
